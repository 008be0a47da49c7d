//! Notice sink that writes to the tracing pipeline.

use rocketshoes_cart::{Notice, Notifier};

/// Emits every notice as a `warn` event; stands in for a toast sink when the
/// cart runs headless.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = notice.kind(), "{}", notice.message());
    }
}
