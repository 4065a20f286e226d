pub mod telegram;

use async_trait::async_trait;

pub use telegram::TelegramNotifier;

/// Best-effort operator channel. Delivery problems are logged by the
/// implementation and never reach the caller.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, text: &str);
}
