use std::sync::Arc;
use std::time::Duration;

use digitizer_core::api::routes::utils;
use digitizer_core::backoff::{
    DEFAULT_RECONNECT_CEILING_MS, DEFAULT_RECONNECT_FLOOR_MS,
};
use digitizer_core::{ReconnectBackoff, decode_frame};
use digitizer_model::DigitizerEvent;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("event channel is already connected")]
    AlreadyConnected,
    #[error("invalid event channel URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Open,
    Closed,
}

/// Published on every transition of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    pub phase: ConnectionPhase,
    /// Delay the next reconnect attempt will wait.
    pub backoff: Duration,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        self.phase == ConnectionPhase::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub url: String,
    pub reconnect_floor: Duration,
    pub reconnect_ceiling: Duration,
}

impl ChannelConfig {
    /// Channel pointed at `url` (`ws://` or `wss://`) with default backoff.
    pub fn new(url: impl Into<String>) -> Result<Self, ChannelError> {
        let url = url.into();
        let parsed =
            url::Url::parse(&url).map_err(|err| ChannelError::InvalidUrl {
                url: url.clone(),
                reason: err.to_string(),
            })?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ChannelError::InvalidUrl {
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
                url,
            });
        }
        Ok(Self {
            url,
            reconnect_floor: Duration::from_millis(DEFAULT_RECONNECT_FLOOR_MS),
            reconnect_ceiling: Duration::from_millis(
                DEFAULT_RECONNECT_CEILING_MS,
            ),
        })
    }

    /// Derive the `/api/ws` endpoint from the HTTP base URL.
    pub fn from_base_url(base_url: &str) -> Result<Self, ChannelError> {
        Self::new(utils::events_url(base_url))
    }

    pub fn with_backoff(mut self, floor: Duration, ceiling: Duration) -> Self {
        self.reconnect_floor = floor;
        self.reconnect_ceiling = ceiling;
        self
    }

    fn backoff(&self) -> ReconnectBackoff {
        ReconnectBackoff::new(self.reconnect_floor, self.reconnect_ceiling)
    }
}

/// Receives decoded events in server order.
///
/// Delivery is at-least-once across reconnects, so implementations must be
/// idempotent.
pub trait EventHandler: Send + 'static {
    fn handle(&mut self, event: DigitizerEvent);

    fn on_connection(&mut self, _state: &ConnectionState) {}
}

impl<F> EventHandler for F
where
    F: FnMut(DigitizerEvent) + Send + 'static,
{
    fn handle(&mut self, event: DigitizerEvent) {
        self(event)
    }
}

#[derive(Debug)]
struct LiveChannel {
    token: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the single push connection to the backend and its reconnect loop.
#[derive(Debug)]
pub struct EventChannel {
    config: ChannelConfig,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    state_rx: watch::Receiver<ConnectionState>,
    live: Option<LiveChannel>,
}

impl EventChannel {
    pub fn new(config: ChannelConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(ConnectionState {
            phase: ConnectionPhase::Closed,
            backoff: config.reconnect_floor,
        });
        Self {
            config,
            state_tx: Arc::new(state_tx),
            state_rx,
            live: None,
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    pub fn is_live(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| !live.task.is_finished())
    }

    /// Start the connection loop, delivering events to `handler` until
    /// [`teardown`](Self::teardown).
    pub fn connect<H: EventHandler>(
        &mut self,
        handler: H,
    ) -> Result<(), ChannelError> {
        if self.is_live() {
            return Err(ChannelError::AlreadyConnected);
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(run_channel(
            self.config.clone(),
            handler,
            Arc::clone(&self.state_tx),
            token.clone(),
        ));
        self.live = Some(LiveChannel { token, task });
        Ok(())
    }

    /// Close the connection and cancel any pending reconnect. Returns once
    /// the loop has exited; no reconnect happens afterwards.
    pub async fn teardown(&mut self) {
        let Some(live) = self.live.take() else {
            return;
        };
        live.token.cancel();
        if let Err(err) = live.task.await {
            warn!(error = %err, "event channel task ended abnormally");
        }
        info!(url = %self.config.url, "event channel torn down");
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        if let Some(live) = &self.live {
            live.token.cancel();
        }
    }
}

enum PumpExit {
    Closed,
    Cancelled,
}

fn publish<H: EventHandler>(
    state_tx: &watch::Sender<ConnectionState>,
    handler: &mut H,
    phase: ConnectionPhase,
    backoff: Duration,
) {
    let state = ConnectionState { phase, backoff };
    state_tx.send_replace(state);
    handler.on_connection(&state);
}

async fn run_channel<H: EventHandler>(
    config: ChannelConfig,
    mut handler: H,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    token: CancellationToken,
) {
    let mut backoff = config.backoff();

    loop {
        publish(
            &state_tx,
            &mut handler,
            ConnectionPhase::Connecting,
            backoff.current(),
        );

        let connected = tokio::select! {
            _ = token.cancelled() => break,
            result = connect_async(config.url.as_str()) => result,
        };

        match connected {
            Ok((stream, _response)) => {
                backoff.reset();
                info!(url = %config.url, "event channel open");
                publish(
                    &state_tx,
                    &mut handler,
                    ConnectionPhase::Open,
                    backoff.current(),
                );
                if let PumpExit::Cancelled =
                    pump(stream, &mut handler, &token).await
                {
                    break;
                }
            }
            Err(err) => {
                warn!(url = %config.url, error = %err, "event channel connect failed");
            }
        }

        let delay = backoff.next_delay();
        publish(&state_tx, &mut handler, ConnectionPhase::Closed, delay);
        warn!(
            delay_ms = delay.as_millis() as u64,
            "event channel closed, scheduling reconnect"
        );

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    publish(
        &state_tx,
        &mut handler,
        ConnectionPhase::Closed,
        backoff.current(),
    );
}

async fn pump<H: EventHandler>(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    handler: &mut H,
    token: &CancellationToken,
) -> PumpExit {
    loop {
        let message = tokio::select! {
            _ = token.cancelled() => {
                if let Err(err) = stream.close(None).await {
                    debug!(error = %err, "close handshake failed");
                }
                return PumpExit::Cancelled;
            }
            message = stream.next() => message,
        };

        match message {
            Some(Ok(Message::Text(text))) => deliver(text.as_str(), handler),
            Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes)
            {
                Ok(text) => deliver(text, handler),
                Err(_) => debug!(len = bytes.len(), "dropping binary frame"),
            },
            Some(Ok(Message::Close(frame))) => {
                info!(?frame, "event channel closed by server");
                return PumpExit::Closed;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                warn!(error = %err, "event channel transport error");
                return PumpExit::Closed;
            }
            None => return PumpExit::Closed,
        }
    }
}

fn deliver<H: EventHandler>(text: &str, handler: &mut H) {
    match decode_frame(text) {
        Ok(DigitizerEvent::Unknown { event }) => {
            debug!(%event, "ignoring unknown event type");
            handler.handle(DigitizerEvent::Unknown { event });
        }
        Ok(event) => {
            if let Some(kind) = event.kind() {
                debug!(%kind, "delivering event");
            }
            handler.handle(event);
        }
        Err(err) => warn!(error = %err, "dropping malformed frame"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_derives_ws_url_from_http_base() {
        let config =
            ChannelConfig::from_base_url("https://digitizer.lan/").expect("url");
        assert_eq!(config.url, "wss://digitizer.lan/api/ws");
        assert_eq!(config.reconnect_floor, Duration::from_millis(1_000));
        assert_eq!(config.reconnect_ceiling, Duration::from_millis(30_000));
    }

    #[test]
    fn config_rejects_non_websocket_urls() {
        assert!(matches!(
            ChannelConfig::new("http://localhost/api/ws"),
            Err(ChannelError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ChannelConfig::new("not a url"),
            Err(ChannelError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn second_connect_is_rejected_until_teardown() {
        let config = ChannelConfig::new("ws://127.0.0.1:9/api/ws")
            .expect("url")
            .with_backoff(Duration::from_millis(10), Duration::from_millis(20));
        let mut channel = EventChannel::new(config);

        channel.connect(|_event: DigitizerEvent| {}).expect("first connect");
        assert_eq!(
            channel.connect(|_event: DigitizerEvent| {}),
            Err(ChannelError::AlreadyConnected)
        );

        channel.teardown().await;
        assert!(!channel.is_live());
        assert_eq!(channel.state().phase, ConnectionPhase::Closed);
        channel.connect(|_event: DigitizerEvent| {}).expect("connect after teardown");
        channel.teardown().await;
    }
}
