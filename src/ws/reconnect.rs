//! Opt-in reconnection on top of plain subscriptions.
//!
//! A plain subscription ends for good when its connection drops. A
//! [`ReconnectingStream`] dials the same descriptor again with exponential
//! backoff until it is stopped or runs out of attempts.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::AsterError;
use crate::ws::client::StreamClient;
use crate::ws::stream::{ErrorHandler, StopSignal, StreamHandle, StreamState, stopped};
use crate::ws::streams::StreamDescriptor;

/// Delay before reconnection attempt number `attempt` (0-based).
pub fn backoff_duration(initial: Duration, max: Duration, attempt: u32) -> Duration {
    let base = initial.as_millis() as u64;
    let max = max.as_millis() as u64;
    let multiplier = 2u64.saturating_pow(attempt);
    Duration::from_millis(base.saturating_mul(multiplier).min(max))
}

/// A subscription that survives dropped connections.
///
/// Its [`StreamHandle`] reports [`StreamState::Connecting`] while dialing and
/// [`StreamState::Closed`] once stopped or out of attempts.
pub struct ReconnectingStream;

impl ReconnectingStream {
    /// Start the reconnect loop. Must be called within a tokio runtime.
    pub fn spawn<T, H, E>(
        client: StreamClient,
        descriptor: StreamDescriptor<T>,
        handler: H,
        err_handler: E,
    ) -> Result<StreamHandle, AsterError>
    where
        T: DeserializeOwned + Send + 'static,
        H: FnMut(T) + Send + 'static,
        E: Fn(AsterError) + Send + Sync + 'static,
    {
        let url = descriptor.url(client.url())?;
        let stop = StopSignal::new();
        let (state_tx, state_rx) = watch::channel(StreamState::Connecting);

        tokio::spawn(run(
            client,
            descriptor,
            Arc::new(Mutex::new(handler)),
            Arc::new(err_handler),
            stop.clone(),
            state_tx,
        ));

        Ok(StreamHandle::new(url, stop, state_rx))
    }
}

async fn run<T, H>(
    client: StreamClient,
    descriptor: StreamDescriptor<T>,
    handler: Arc<Mutex<H>>,
    errors: ErrorHandler,
    stop: StopSignal,
    state: watch::Sender<StreamState>,
) where
    T: DeserializeOwned + Send + 'static,
    H: FnMut(T) + Send + 'static,
{
    let config = client.ws_config().clone();
    let mut stop_rx = stop.subscribe();
    let mut attempt: u32 = 0;

    loop {
        state.send_replace(StreamState::Connecting);

        let handler = handler.clone();
        let inner_errors = errors.clone();
        let subscribed = tokio::select! {
            _ = stopped(&mut stop_rx) => break,
            subscribed = client.subscribe(
                descriptor.clone(),
                move |event| {
                    let mut handler = handler.lock().unwrap_or_else(PoisonError::into_inner);
                    (&mut *handler)(event)
                },
                move |err| inner_errors(err),
            ) => subscribed,
        };

        match subscribed {
            Ok(inner) => {
                attempt = 0;
                state.send_replace(StreamState::Open);
                let done = inner.done();
                tokio::select! {
                    _ = stopped(&mut stop_rx) => {
                        inner.close().await;
                        break;
                    }
                    _ = done.wait() => info!(url = %inner.url(), "stream dropped, reconnecting"),
                }
            }
            Err(err) => {
                warn!(error = %err, attempt, "stream dial failed");
                errors(err);
            }
        }

        if config.max_reconnect_attempts.is_some_and(|max| attempt >= max) {
            errors(AsterError::Stream(format!("gave up after {attempt} reconnection attempts")));
            break;
        }

        let delay = backoff_duration(config.initial_backoff, config.max_backoff, attempt);
        attempt = attempt.saturating_add(1);
        tokio::select! {
            _ = stopped(&mut stop_rx) => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    state.send_replace(StreamState::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_max() {
        let initial = Duration::from_millis(100);
        let max = Duration::from_secs(1);
        assert_eq!(backoff_duration(initial, max, 0), Duration::from_millis(100));
        assert_eq!(backoff_duration(initial, max, 1), Duration::from_millis(200));
        assert_eq!(backoff_duration(initial, max, 3), Duration::from_millis(800));
        assert_eq!(backoff_duration(initial, max, 4), max);
        assert_eq!(backoff_duration(initial, max, 200), max);
    }
}
