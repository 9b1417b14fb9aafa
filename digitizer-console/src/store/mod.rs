pub mod live_state_store;

pub use live_state_store::{LiveStateStore, SubscriptionId};
