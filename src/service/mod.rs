use crate::{
    dto::{CreateNoteRequest, UpdateNoteRequest},
    error::StorageResult,
    models::{Note, normalize_reminder_date},
    repository::Repository,
    scheduler::ReminderScheduler,
};

use std::sync::Arc;

#[derive(Clone)]
pub struct NoteService {
    repo: Repository,
    scheduler: Arc<ReminderScheduler>,
}

impl NoteService {
    pub const fn new(repo: Repository, scheduler: Arc<ReminderScheduler>) -> Self {
        Self { repo, scheduler }
    }

    pub async fn create_note(&self, request: CreateNoteRequest) -> StorageResult<i64> {
        let reminder_date = normalize_reminder_date(request.reminder_date);

        let id = self
            .repo
            .create_note(request.title.clone(), request.content, reminder_date.clone())
            .await?;

        if let Some(date) = &reminder_date {
            self.scheduler.schedule(id, date, &request.title);
        }

        Ok(id)
    }

    /// Returns `false` if there is no such note; its reminder is left untouched then.
    pub async fn update_note(&self, id: i64, request: UpdateNoteRequest) -> StorageResult<bool> {
        let reminder_date = normalize_reminder_date(request.reminder_date);

        let updated = self
            .repo
            .update_note(id, request.title.clone(), request.content, reminder_date.clone())
            .await?;

        if updated {
            match &reminder_date {
                Some(date) => {
                    self.scheduler.schedule(id, date, &request.title);
                }
                None => {
                    self.scheduler.cancel(id);
                }
            }
        }

        Ok(updated)
    }

    pub async fn delete_note(&self, id: i64) -> StorageResult<bool> {
        let deleted = self.repo.delete_note(id).await?;
        self.scheduler.cancel(id);

        Ok(deleted)
    }

    pub async fn get_one_note(&self, id: i64) -> StorageResult<Option<Note>> {
        self.repo.get_one_note(id).await
    }

    pub async fn get_all_notes(&self) -> StorageResult<Vec<Note>> {
        self.repo.get_all_notes().await
    }

    /// Arms timers for every stored reminder that is still in the future.
    pub async fn rearm_reminders(&self) -> StorageResult<usize> {
        let notes = self.repo.get_all_notes().await?;

        let armed = notes
            .iter()
            .filter_map(|note| {
                note.reminder_date
                    .as_deref()
                    .map(|date| self.scheduler.schedule(note.id, date, &note.title))
            })
            .filter(|armed| *armed)
            .count();

        tracing::info!("Re-armed {} reminders from storage", armed);

        Ok(armed)
    }
}
