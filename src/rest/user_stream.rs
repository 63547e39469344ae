//! Listen key lifecycle for user data streams.
//!
//! A listen key is created with POST, kept alive with PUT and released with
//! DELETE. The stream manager only consumes the key; refreshing it is the
//! caller's job, which [`ListenKeyKeeper`] automates.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AsterError;
use crate::rest::client::RestClient;
use crate::rest::request::{Request, SecurityLevel};

/// How often a listen key should be refreshed.
pub const LISTEN_KEY_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListenKeyResponse {
    listen_key: String,
}

/// Operations on user data stream listen keys.
///
/// Implemented by both the spot and the futures client.
pub trait UserDataStreamApi: Send + Sync {
    /// Create a listen key.
    fn start_user_stream(&self) -> impl Future<Output = Result<String, AsterError>> + Send;

    /// Extend the validity of a listen key.
    fn keepalive_user_stream(
        &self,
        listen_key: &str,
    ) -> impl Future<Output = Result<(), AsterError>> + Send;

    /// Release a listen key.
    fn close_user_stream(
        &self,
        listen_key: &str,
    ) -> impl Future<Output = Result<(), AsterError>> + Send;
}

pub(crate) async fn start(
    rest: &RestClient,
    path: &str,
    security: SecurityLevel,
) -> Result<String, AsterError> {
    let response: ListenKeyResponse = rest.call(Request::new(Method::POST, path, security)).await?;
    if response.listen_key.is_empty() {
        return Err(AsterError::MalformedResponse {
            status: 200,
            body: "empty listenKey".into(),
        });
    }
    Ok(response.listen_key)
}

pub(crate) async fn keepalive(
    rest: &RestClient,
    path: &str,
    security: SecurityLevel,
    listen_key: &str,
) -> Result<(), AsterError> {
    let request = Request::new(Method::PUT, path, security).set_form_param("listenKey", listen_key);
    rest.execute(request).await.map(|_| ())
}

pub(crate) async fn close(
    rest: &RestClient,
    path: &str,
    security: SecurityLevel,
    listen_key: &str,
) -> Result<(), AsterError> {
    let request =
        Request::new(Method::DELETE, path, security).set_form_param("listenKey", listen_key);
    rest.execute(request).await.map(|_| ())
}

/// Background task that refreshes a listen key until stopped.
///
/// Failures are logged and the task keeps trying at the next tick; a key the
/// exchange no longer knows ends the task. Dropping the keeper also ends it.
#[derive(Debug)]
pub struct ListenKeyKeeper {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenKeyKeeper {
    /// Refresh every [`LISTEN_KEY_KEEPALIVE_INTERVAL`].
    pub fn spawn<C>(client: Arc<C>, listen_key: impl Into<String>) -> Self
    where
        C: UserDataStreamApi + 'static,
    {
        Self::spawn_with_interval(client, listen_key, LISTEN_KEY_KEEPALIVE_INTERVAL)
    }

    pub fn spawn_with_interval<C>(
        client: Arc<C>,
        listen_key: impl Into<String>,
        interval: Duration,
    ) -> Self
    where
        C: UserDataStreamApi + 'static,
    {
        let listen_key = listen_key.into();
        let (stop, mut stopped) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                tokio::select! {
                    _ = stopped.changed() => break,
                    _ = ticker.tick() => {
                        match client.keepalive_user_stream(&listen_key).await {
                            Ok(()) => debug!("listen key refreshed"),
                            Err(AsterError::Api(err)) if err.is_listen_key_missing() => {
                                warn!(error = %err, "listen key expired, stopping keepalive");
                                break;
                            }
                            Err(err) => warn!(error = %err, "listen key keepalive failed"),
                        }
                    }
                }
            }
        });

        Self { stop, task }
    }

    /// Stop refreshing and wait for the task to finish.
    pub async fn stop(self) {
        self.stop.send_replace(true);
        if let Err(err) = self.task.await {
            warn!(error = %err, "listen key keeper task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
