use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use tokio::task::JoinHandle;

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::notifier::Notifier;

pub const DEFAULT_NOTIFICATION_TITLE: &str = "Reminder!";

// Naive timestamps are read as local time, the way a datetime-local input is meant.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn reminder_message(label: &str) -> String {
    format!("Reminder for note: {label}")
}

/// Parses a stored reminder date. `None` means it can never fire.
pub fn parse_reminder_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Time left until `target`, or `None` if it is not in the future.
pub fn delay_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (target - now).to_std().ok().filter(|delay| !delay.is_zero())
}

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

type Timers = Arc<Mutex<HashMap<i64, Timer>>>;

/// One-shot reminder timers, at most one per note.
///
/// Must be used from within a tokio runtime.
pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    title: String,
    timers: Timers,
    next_generation: AtomicU64,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            timers: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Arms a reminder for `note_id`, replacing any pending one.
    ///
    /// Past or unparseable dates arm nothing and clear the pending reminder.
    /// Returns whether a timer was armed.
    pub fn schedule(&self, note_id: i64, reminder_date: &str, label: &str) -> bool {
        self.schedule_at(note_id, reminder_date, label, Utc::now())
    }

    fn schedule_at(
        &self,
        note_id: i64,
        reminder_date: &str,
        label: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(target) = parse_reminder_date(reminder_date) else {
            tracing::debug!(note_id, reminder_date, "Ignoring malformed reminder date");
            self.cancel(note_id);
            return false;
        };

        let Some(delay) = delay_until(target, now) else {
            tracing::debug!(note_id, reminder_date, "Ignoring reminder in the past");
            self.cancel(note_id);
            return false;
        };

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let notifier = Arc::clone(&self.notifier);
        let timers = Arc::clone(&self.timers);
        let title = self.title.clone();
        let message = reminder_message(label);

        let mut pending = lock(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            tracing::info!(note_id, "Delivering reminder");
            notifier.notify(&title, &message);

            let mut timers = lock(&timers);
            if timers
                .get(&note_id)
                .is_some_and(|timer| timer.generation == generation)
            {
                timers.remove(&note_id);
            }
        });

        if let Some(previous) = pending.insert(note_id, Timer { generation, handle }) {
            previous.handle.abort();
            tracing::debug!(note_id, "Replaced pending reminder");
        }

        tracing::info!(note_id, %target, "Reminder armed in {}s", delay.as_secs());
        true
    }

    /// Drops the pending reminder for a note. Returns whether one existed.
    pub fn cancel(&self, note_id: i64) -> bool {
        let removed = lock(&self.timers).remove(&note_id);

        removed.is_some_and(|timer| {
            timer.handle.abort();
            tracing::debug!(note_id, "Canceled pending reminder");
            true
        })
    }

    pub fn pending(&self) -> usize {
        lock(&self.timers).len()
    }

    pub fn shutdown(&self) {
        let timers = std::mem::take(&mut *lock(&self.timers));
        let count = timers.len();

        for timer in timers.into_values() {
            timer.handle.abort();
        }

        if count > 0 {
            tracing::info!("Dropped {} pending reminders", count);
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// Timer bookkeeping stays consistent even if a holder panicked.
fn lock(timers: &Mutex<HashMap<i64, Timer>>) -> MutexGuard<'_, HashMap<i64, Timer>> {
    timers.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeDelta;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, title: &str, message: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    fn scheduler() -> (ReminderScheduler, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (ReminderScheduler::new(notifier.clone()), notifier)
    }

    fn in_secs(secs: i64) -> String {
        (Utc::now() + TimeDelta::seconds(secs)).to_rfc3339()
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_reminder_date("2099-01-01T02:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2099-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_local_formats() {
        let expected = Local
            .with_ymd_and_hms(2099, 1, 1, 9, 30, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(parse_reminder_date("2099-01-01T09:30"), Some(expected));
        assert_eq!(parse_reminder_date("2099-01-01T09:30:00"), Some(expected));
        assert_eq!(parse_reminder_date("2099-01-01 09:30"), Some(expected));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_reminder_date(""), None);
        assert_eq!(parse_reminder_date("tomorrow"), None);
        assert_eq!(parse_reminder_date("2099-13-01T00:00"), None);
    }

    #[test]
    fn test_delay_only_for_future_targets() {
        let now = Utc::now();

        assert_eq!(delay_until(now, now), None);
        assert_eq!(delay_until(now - TimeDelta::seconds(5), now), None);
        assert_eq!(
            delay_until(now + TimeDelta::seconds(5), now),
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_message_embeds_label() {
        assert_eq!(reminder_message("Buy milk"), "Reminder for note: Buy milk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_reminder_never_fires() {
        let (scheduler, notifier) = scheduler();

        assert!(!scheduler.schedule(1, &in_secs(-60), "late"));
        assert!(!scheduler.schedule(2, "not a date", "broken"));
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_reminder_fires_once_not_before_target() {
        let (scheduler, notifier) = scheduler();

        assert!(scheduler.schedule(1, &in_secs(60), "Buy milk"));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(55)).await;
        assert!(notifier.sent().is_empty());

        tokio::time::sleep(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert_eq!(
            notifier.sent(),
            vec![(
                DEFAULT_NOTIFICATION_TITLE.to_string(),
                "Reminder for note: Buy milk".to_string()
            )]
        );
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rescheduling_replaces_pending_timer() {
        let (scheduler, notifier) = scheduler();
        let scheduler = scheduler.with_title("Heads up");

        assert!(scheduler.schedule(1, &in_secs(30), "first"));
        assert!(scheduler.schedule(1, &in_secs(90), "second"));
        assert_eq!(scheduler.pending(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        assert_eq!(
            notifier.sent(),
            vec![(
                "Heads up".to_string(),
                "Reminder for note: second".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_date_clears_pending_timer() {
        let (scheduler, notifier) = scheduler();

        assert!(scheduler.schedule(1, &in_secs(30), "first"));
        assert!(!scheduler.schedule(1, &in_secs(-30), "moved back"));
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_shutdown() {
        let (scheduler, notifier) = scheduler();

        assert!(scheduler.schedule(1, &in_secs(30), "one"));
        assert!(scheduler.schedule(2, &in_secs(30), "two"));
        assert!(scheduler.schedule(3, &in_secs(30), "three"));

        assert!(scheduler.cancel(1));
        assert!(!scheduler.cancel(1));
        assert_eq!(scheduler.pending(), 2);

        scheduler.shutdown();
        assert_eq!(scheduler.pending(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(notifier.sent().is_empty());
    }
}
