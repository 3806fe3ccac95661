//! Tokio glue: timer and interrupt handling.

use std::time::Duration;

use sitetester_core::Sleeper;
use tokio_util::sync::CancellationToken;

/// [`Sleeper`] backed by `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Cancel `token` on the first Ctrl-C.
///
/// A second Ctrl-C falls through to the default handler once the watcher
/// has returned.
pub fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => {
                        log::info!("🛑 Interrupt received, cancelling");
                        token.cancel();
                    }
                    Err(e) => log::warn!("⚠️ Could not listen for Ctrl-C: {}", e),
                }
            }
            _ = token.cancelled() => {}
        }
    });
}
