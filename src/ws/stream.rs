//! Subscription lifecycle: dial, read loop, keep-alive loop and shutdown.
//!
//! Every subscription runs three tasks. The read task decodes frames and
//! calls the handler; the keep-alive task pings on an interval; the
//! supervisor joins both, closes the socket and then fires the done signal.
//! Either loop ending raises the stop signal so the other one follows.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::net::{TcpSocket, TcpStream};
use tokio::sync::{Mutex, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, client_async_tls, connect_async};
use tracing::{debug, info, warn};

use crate::error::AsterError;
use crate::ws::client::WsConfig;
use crate::ws::streams::StreamDescriptor;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

pub(crate) type ErrorHandler = Arc<dyn Fn(AsterError) + Send + Sync>;

/// Lifecycle of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Dialing (only seen on reconnecting subscriptions).
    Connecting,
    Open,
    /// Loops finished, socket closing.
    Closing,
    Closed,
}

/// Asks a subscription to shut down.
///
/// Cloneable and idempotent: stopping twice, or after the stream already
/// ended, is a no-op.
#[derive(Debug, Clone)]
pub struct StopSignal(Arc<watch::Sender<bool>>);

impl StopSignal {
    pub(crate) fn new() -> Self {
        Self(Arc::new(watch::channel(false).0))
    }

    /// Raise the signal.
    pub fn stop(&self) {
        self.0.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.0.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.0.subscribe()
    }
}

/// Resolves once a subscription has fully shut down.
#[derive(Debug, Clone)]
pub struct DoneSignal(watch::Receiver<StreamState>);

impl DoneSignal {
    /// Wait until both loops have exited and the socket is closed.
    pub async fn wait(&self) {
        let mut state = self.0.clone();
        // A dropped sender means the supervisor is gone, which also counts as done.
        let _ = state.wait_for(|s| *s == StreamState::Closed).await;
    }

    pub fn is_done(&self) -> bool {
        *self.0.borrow() == StreamState::Closed
    }
}

/// The caller's side of a running subscription.
///
/// Dropping the handle does not end the stream; use the stop signal.
#[derive(Debug)]
pub struct StreamHandle {
    url: String,
    stop: StopSignal,
    state: watch::Receiver<StreamState>,
}

impl StreamHandle {
    pub(crate) fn new(url: String, stop: StopSignal, state: watch::Receiver<StreamState>) -> Self {
        Self { url, stop, state }
    }

    /// The URL this subscription dialed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// A cloneable signal that asks the stream to shut down.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// A signal that resolves once the stream has fully shut down.
    pub fn done(&self) -> DoneSignal {
        DoneSignal(self.state.clone())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Stop the stream and wait for it to finish.
    pub async fn close(self) {
        self.stop.stop();
        self.done().wait().await;
    }
}

/// Resolves once `stop` is raised or every stop signal has been dropped.
pub(crate) async fn stopped(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

/// Open a WebSocket, optionally from a fixed local address.
pub(crate) async fn connect(url: &str, local_address: Option<IpAddr>) -> Result<WsStream, AsterError> {
    let Some(local) = local_address else {
        let (ws, _) = connect_async(url).await?;
        return Ok(ws);
    };

    let parsed = url::Url::parse(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AsterError::InvalidConfig(format!("no host in {url}")))?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| AsterError::InvalidConfig(format!("no port for {url}")))?;

    let remote = tokio::net::lookup_host((host, port))
        .await
        .map_err(tokio_tungstenite::tungstenite::Error::Io)?
        .find(|addr| addr.is_ipv4() == local.is_ipv4())
        .ok_or_else(|| AsterError::InvalidConfig(format!("{host} has no address matching {local}")))?;

    let socket = if local.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(tokio_tungstenite::tungstenite::Error::Io)?;
    socket
        .bind(SocketAddr::new(local, 0))
        .map_err(tokio_tungstenite::tungstenite::Error::Io)?;
    let tcp = socket
        .connect(remote)
        .await
        .map_err(tokio_tungstenite::tungstenite::Error::Io)?;

    let (ws, _) = client_async_tls(url, tcp).await?;
    Ok(ws)
}

/// Dial `url` and start the read, keep-alive and supervisor tasks.
pub(crate) async fn spawn<T, H, E>(
    url: String,
    descriptor: StreamDescriptor<T>,
    handler: H,
    err_handler: E,
    config: &WsConfig,
) -> Result<StreamHandle, AsterError>
where
    T: DeserializeOwned + Send + 'static,
    H: FnMut(T) + Send + 'static,
    E: Fn(AsterError) + Send + Sync + 'static,
{
    let ws = connect(&url, config.local_address).await?;
    info!(url = %url, "stream connected");

    let (sink, source) = ws.split();
    let sink = Arc::new(Mutex::new(sink));
    let errors: ErrorHandler = Arc::new(err_handler);
    let stop = StopSignal::new();
    let (state_tx, state_rx) = watch::channel(StreamState::Open);

    let reader = tokio::spawn(read_loop(
        source,
        descriptor,
        handler,
        errors.clone(),
        stop.clone(),
        config.read_timeout,
    ));
    let keepalive = config.ping_interval.map(|interval| {
        tokio::spawn(keepalive_loop(sink.clone(), interval, errors, stop.clone()))
    });

    let close_timeout = config.close_timeout;
    let supervisor_url = url.clone();
    let supervisor_stop = stop.clone();
    tokio::spawn(async move {
        if let Err(err) = reader.await {
            warn!(error = %err, "stream read task failed");
        }
        // Covers a panicking handler, which skips the read loop's own stop.
        supervisor_stop.stop();
        if let Some(keepalive) = keepalive {
            if let Err(err) = keepalive.await {
                warn!(error = %err, "stream keepalive task failed");
            }
        }

        state_tx.send_replace(StreamState::Closing);
        match tokio::time::timeout(close_timeout, async { sink.lock().await.close().await }).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!(error = %err, "close handshake failed"),
            Err(_) => debug!("close handshake timed out"),
        }
        state_tx.send_replace(StreamState::Closed);
        info!(url = %supervisor_url, "stream closed");
    });

    Ok(StreamHandle::new(url, stop, state_rx))
}

async fn read_frame(
    source: &mut WsSource,
    limit: Option<Duration>,
) -> Result<Option<Message>, AsterError> {
    let next = match limit {
        Some(limit) => tokio::time::timeout(limit, source.next())
            .await
            .map_err(|_| AsterError::Stream(format!("no frame received within {limit:?}")))?,
        None => source.next().await,
    };
    Ok(next.transpose()?)
}

/// Whether a close frame is a normal shutdown by the server.
fn is_expected_close(frame: Option<&CloseFrame>) -> bool {
    matches!(
        frame.map(|f| f.code),
        Some(CloseCode::Normal) | Some(CloseCode::Away)
    )
}

async fn read_loop<T, H>(
    mut source: WsSource,
    descriptor: StreamDescriptor<T>,
    mut handler: H,
    errors: ErrorHandler,
    stop: StopSignal,
    read_timeout: Option<Duration>,
) where
    T: DeserializeOwned,
    H: FnMut(T),
{
    let mut stop_rx = stop.subscribe();

    loop {
        let frame = tokio::select! {
            biased;
            _ = stopped(&mut stop_rx) => break,
            frame = read_frame(&mut source, read_timeout) => frame,
        };

        match frame {
            Ok(Some(Message::Text(text))) => dispatch(&descriptor, &mut handler, &errors, text.as_bytes()),
            Ok(Some(Message::Binary(data))) => dispatch(&descriptor, &mut handler, &errors, &data),
            Ok(Some(Message::Close(frame))) => {
                if is_expected_close(frame.as_ref()) {
                    debug!(?frame, "server closed the stream");
                } else {
                    let reason = frame
                        .map(|f| format!("{} {}", u16::from(f.code), f.reason))
                        .unwrap_or_else(|| "no status".into());
                    errors(AsterError::Stream(format!("unexpected close: {reason}")));
                }
                break;
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!("stream ended");
                break;
            }
            Err(err) => {
                warn!(error = %err, "stream read failed");
                errors(err);
                break;
            }
        }
    }

    stop.stop();
}

/// Decode one frame and hand its events over; decode errors don't end the stream.
fn dispatch<T, H>(descriptor: &StreamDescriptor<T>, handler: &mut H, errors: &ErrorHandler, frame: &[u8])
where
    T: DeserializeOwned,
    H: FnMut(T),
{
    match descriptor.decode(frame) {
        Ok(events) => events.into_iter().for_each(handler),
        Err(err) => {
            debug!(error = %err, "failed to decode stream frame");
            errors(err);
        }
    }
}

async fn keepalive_loop(
    sink: Arc<Mutex<WsSink>>,
    interval: Duration,
    errors: ErrorHandler,
    stop: StopSignal,
) {
    let mut stop_rx = stop.subscribe();
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = stopped(&mut stop_rx) => break,
            _ = ticker.tick() => {
                let sent = sink.lock().await.send(Message::Ping(Default::default())).await;
                if let Err(err) = sent {
                    warn!(error = %err, "keepalive ping failed");
                    errors(AsterError::Stream(format!("keepalive ping failed: {err}")));
                    stop.stop();
                    break;
                }
            }
        }
    }
}
