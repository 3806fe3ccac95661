//! gloo-timers sleeper.

use std::time::Duration;

use sitetester_core::Sleeper;

/// Browser `setTimeout` as a [`Sleeper`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooSleeper;

impl Sleeper for GlooSleeper {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await
    }
}
