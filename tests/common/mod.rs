#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{TimeDelta, Utc};
use tempfile::TempDir;

use notes_reminder::{
    notifier::Notifier, repository::Repository, scheduler::ReminderScheduler,
    service::NoteService,
};

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
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

pub struct TestApp {
    pub repo: Repository,
    pub service: NoteService,
    pub scheduler: Arc<ReminderScheduler>,
    pub notifier: Arc<RecordingNotifier>,
    pub db_path: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("notes.db");

        let repo = Repository::open(&db_path).unwrap();
        repo.migrate().await.unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));
        let service = NoteService::new(repo.clone(), scheduler.clone());

        Self {
            repo,
            service,
            scheduler,
            notifier,
            db_path,
            _dir: dir,
        }
    }

    /// Makes every following statement fail by removing the table underneath the app.
    pub fn break_storage(&self) {
        let conn = rusqlite::Connection::open(&self.db_path).unwrap();
        conn.execute_batch("DROP TABLE notes").unwrap();
    }
}

pub fn in_secs(secs: i64) -> String {
    (Utc::now() + TimeDelta::seconds(secs)).to_rfc3339()
}
