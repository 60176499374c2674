//! The components module contains the widget's UI.

mod host;
mod icons;
mod player;

pub use host::*;
pub use icons::*;
pub use player::*;

/// Cadence at which components drain commands queued from outside the runtime.
pub(crate) const POLL_INTERVAL_MS: u32 = 100;

/// Delay before a restored or configured autoplay fires.
pub(crate) const AUTOPLAY_DELAY_MS: u32 = 500;

#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep_ms(ms: u32) {
    gloo_timers::future::TimeoutFuture::new(ms).await;
}

/// Off the browser there is nothing to poll; park the task.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep_ms(_ms: u32) {
    std::future::pending::<()>().await;
}
