/// Delivery side of a reminder.
///
/// Implementations are fire-and-forget: failures are logged, never returned.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Shows an OS notification through the desktop notification service.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    fn notify(&self, title: &str, message: &str) {
        if let Err(err) = notify_rust::Notification::new()
            .summary(title)
            .body(message)
            .show()
        {
            tracing::warn!(error = %err, "Desktop notification failed");
        }
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn notify(&self, title: &str, message: &str) {
        LogNotifier.notify(title, message);
    }
}

/// Writes reminders to the log instead of the desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        tracing::info!(title, message, "Reminder due");
    }
}
