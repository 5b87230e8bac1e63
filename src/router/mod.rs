//! In-process request/reply bus between the presentation layer and the note
//! service.
//!
//! Every [`NoteRequest`] carries its own reply channel and gets exactly one
//! reply. Storage failures are logged here and turned into the failure form
//! of the reply, so callers only ever see `success: false`, `None` or an
//! empty list.

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    dto::{CreateNoteReply, CreateNoteRequest, SuccessReply, UpdateNoteRequest},
    models::Note,
    service::NoteService,
};

pub const DEFAULT_BUFFER: usize = 64;

#[derive(Debug)]
pub enum NoteRequest {
    ListNotes {
        reply: oneshot::Sender<Vec<Note>>,
    },
    GetNote {
        id: i64,
        reply: oneshot::Sender<Option<Note>>,
    },
    CreateNote {
        request: CreateNoteRequest,
        reply: oneshot::Sender<CreateNoteReply>,
    },
    UpdateNote {
        id: i64,
        request: UpdateNoteRequest,
        reply: oneshot::Sender<SuccessReply>,
    },
    DeleteNote {
        id: i64,
        reply: oneshot::Sender<SuccessReply>,
    },
}

impl NoteRequest {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListNotes { .. } => "list-notes",
            Self::GetNote { .. } => "get-note",
            Self::CreateNote { .. } => "create-note",
            Self::UpdateNote { .. } => "update-note",
            Self::DeleteNote { .. } => "delete-note",
        }
    }
}

pub struct RequestRouter {
    service: NoteService,
    requests: mpsc::Receiver<NoteRequest>,
}

impl RequestRouter {
    /// Starts the dispatch loop. It stops once every handle is dropped.
    pub fn spawn(service: NoteService, buffer: usize) -> (RouterHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));

        let router = Self {
            service,
            requests: rx,
        };
        let task = tokio::spawn(router.run());

        (RouterHandle { requests: tx }, task)
    }

    async fn run(mut self) {
        tracing::info!("Request router started");

        while let Some(request) = self.requests.recv().await {
            tracing::debug!("Received {} request", request.name());

            // Requests are independent and may complete out of order.
            let service = self.service.clone();
            tokio::spawn(async move { handle_request(&service, request).await });
        }

        tracing::info!("Request router stopped");
    }
}

async fn handle_request(service: &NoteService, request: NoteRequest) {
    match request {
        NoteRequest::ListNotes { reply } => {
            let notes = service.get_all_notes().await.unwrap_or_else(|e| {
                tracing::error!("failed to get note entries: {}", e);
                Vec::new()
            });
            send_reply(reply, notes, "list-notes");
        }
        NoteRequest::GetNote { id, reply } => {
            let note = service.get_one_note(id).await.unwrap_or_else(|e| {
                tracing::error!("failed to get note entry {}: {}", id, e);
                None
            });
            send_reply(reply, note, "get-note");
        }
        NoteRequest::CreateNote { request, reply } => {
            let result = match service.create_note(request).await {
                Ok(id) => CreateNoteReply::created(id),
                Err(e) => {
                    tracing::error!("failed to create note entry: {}", e);
                    CreateNoteReply::failed()
                }
            };
            send_reply(reply, result, "create-note");
        }
        NoteRequest::UpdateNote { id, request, reply } => {
            let result = match service.update_note(id, request).await {
                Ok(updated) => {
                    if !updated {
                        tracing::debug!("update-note matched no note with id {}", id);
                    }
                    SuccessReply::ok()
                }
                Err(e) => {
                    tracing::error!("failed to update note entry {}: {}", id, e);
                    SuccessReply::failed()
                }
            };
            send_reply(reply, result, "update-note");
        }
        NoteRequest::DeleteNote { id, reply } => {
            let result = match service.delete_note(id).await {
                Ok(_) => SuccessReply::ok(),
                Err(e) => {
                    tracing::error!("failed to delete note entry {}: {}", id, e);
                    SuccessReply::failed()
                }
            };
            send_reply(reply, result, "delete-note");
        }
    }
}

fn send_reply<T>(reply: oneshot::Sender<T>, value: T, name: &str) {
    if reply.send(value).is_err() {
        tracing::warn!("{} caller went away before the reply was sent", name);
    }
}

/// Cloneable client side of the router.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    requests: mpsc::Sender<NoteRequest>,
}

impl RouterHandle {
    pub async fn list_notes(&self) -> Vec<Note> {
        self.request(|reply| NoteRequest::ListNotes { reply })
            .await
            .unwrap_or_default()
    }

    pub async fn get_note(&self, id: i64) -> Option<Note> {
        self.request(|reply| NoteRequest::GetNote { id, reply })
            .await
            .flatten()
    }

    pub async fn create_note(&self, request: CreateNoteRequest) -> CreateNoteReply {
        self.request(|reply| NoteRequest::CreateNote { request, reply })
            .await
            .unwrap_or_else(CreateNoteReply::failed)
    }

    pub async fn update_note(&self, id: i64, request: UpdateNoteRequest) -> SuccessReply {
        self.request(|reply| NoteRequest::UpdateNote { id, request, reply })
            .await
            .unwrap_or_else(SuccessReply::failed)
    }

    pub async fn delete_note(&self, id: i64) -> SuccessReply {
        self.request(|reply| NoteRequest::DeleteNote { id, reply })
            .await
            .unwrap_or_else(SuccessReply::failed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> NoteRequest,
    ) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        let request = build(tx);
        let name = request.name();

        if self.requests.send(request).await.is_err() {
            tracing::warn!("request router is not running, dropping {} request", name);
            return None;
        }

        match rx.await {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("{} request finished without a reply", name);
                None
            }
        }
    }
}
