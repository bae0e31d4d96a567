//! Draining triggers on shutdown.
//!
//! A trigger that is already running keeps ingesting until it finishes or
//! the drain window closes, whichever comes first.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Process signal that asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Ctrl+C.
    Interrupt,
    /// SIGTERM, sent by the hosting platform before it scales an instance down.
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Waits for the first stop signal.
///
/// A signal whose handler cannot be installed is never reported.
pub async fn wait_for_signal() -> Signal {
    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Signal::Interrupt,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %error,
                    "Cannot listen for SIGINT"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                Signal::Terminate
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %error,
                    "Cannot listen for SIGTERM"
                );
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Signal>();

    tokio::select! {
        signal = interrupt => signal,
        signal = terminate => signal,
    }
}

/// Bounds how long running triggers may finish after a stop was requested.
#[derive(Debug, Clone)]
pub struct TriggerDrain {
    window: Duration,
    started: Arc<Notify>,
}

impl TriggerDrain {
    /// Creates a drain that lasts `window` once it starts.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            started: Arc::new(Notify::new()),
        }
    }

    /// Starts the drain after `stop` resolves.
    ///
    /// The returned future is what the server waits on before it stops
    /// accepting triggers.
    pub fn begin_after<F>(&self, stop: F) -> impl Future<Output = ()> + Send + use<F>
    where
        F: Future + Send + 'static,
        F::Output: fmt::Display,
    {
        let window = self.window;
        let started = Arc::clone(&self.started);

        async move {
            let reason = stop.await;
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                signal = %reason,
                drain_secs = window.as_secs(),
                "No longer accepting triggers, draining running ones"
            );
            started.notify_one();
        }
    }

    /// Resolves when the drain window has closed.
    ///
    /// Never resolves if the drain has not started.
    pub async fn closed(&self) {
        self.started.notified().await;
        tokio::time::sleep(self.window).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn window_opens_only_after_stop() {
        let drain = TriggerDrain::new(Duration::from_secs(30));

        let closed = tokio::time::timeout(Duration::from_secs(60), drain.closed()).await;
        assert!(closed.is_err());

        drain.begin_after(async { Signal::Terminate }).await;

        let closed = tokio::time::timeout(Duration::from_secs(29), drain.closed()).await;
        assert!(closed.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn window_closes_after_its_length() {
        let drain = TriggerDrain::new(Duration::from_secs(30));
        drain.begin_after(async { Signal::Interrupt }).await;

        let closed = tokio::time::timeout(Duration::from_secs(31), drain.closed()).await;
        assert!(closed.is_ok());
    }

    #[test]
    fn signals_print_their_names() {
        assert_eq!(Signal::Interrupt.to_string(), "SIGINT");
        assert_eq!(Signal::Terminate.to_string(), "SIGTERM");
    }
}
