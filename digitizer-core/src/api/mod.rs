//! Backend HTTP surface shared by the console's clients.

pub mod routes;
