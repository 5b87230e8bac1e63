use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_macros::debug_handler;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{
    dto::{CreateNoteReply, CreateNoteRequest, SuccessReply, UpdateNoteRequest},
    models::Note,
    router::RouterHandle,
};

#[derive(OpenApi)]
#[openapi(
    paths(create_note, update_note, delete_note, get_one_note, get_all_notes),
    components(schemas(
        Note,
        CreateNoteRequest,
        UpdateNoteRequest,
        CreateNoteReply,
        SuccessReply
    )),
    tags(
        (name = "notes", description = "Notes management API")
    )
)]
pub struct ApiDoc;

pub fn router(handle: RouterHandle) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/notes", get(get_all_notes).post(create_note))
        .route(
            "/notes/{id}",
            get(get_one_note).put(update_note).delete(delete_note),
        )
        .route("/api-doc/openapi.json", get(openapi))
        .with_state(handle)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Response {
    (StatusCode::OK, "Notes service is running").into_response()
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = CreateNoteReply),
        (status = 500, description = "Failed to store the note", body = CreateNoteReply)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(handle): State<RouterHandle>,
    Json(payload): Json<CreateNoteRequest>,
) -> Response {
    let reply = handle.create_note(payload).await;

    let status = if reply.success {
        StatusCode::CREATED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(reply)).into_response()
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated, or no note had this ID", body = SuccessReply),
        (status = 500, description = "Failed to update the note", body = SuccessReply)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(handle): State<RouterHandle>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Response {
    success_response(handle.update_note(id, payload).await)
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted, or no note had this ID", body = SuccessReply),
        (status = 500, description = "Failed to delete the note", body = SuccessReply)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(State(handle): State<RouterHandle>, Path(id): Path<i64>) -> Response {
    success_response(handle.delete_note(id).await)
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = Note),
        (status = 404, description = "Note not found")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_one_note(State(handle): State<RouterHandle>, Path(id): Path<i64>) -> Response {
    match handle.get_note(id).await {
        Some(note) => (StatusCode::OK, Json(note)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(None::<Note>)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "List of all notes", body = Vec<Note>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(State(handle): State<RouterHandle>) -> Response {
    (StatusCode::OK, Json(handle.list_notes().await)).into_response()
}

fn success_response(reply: SuccessReply) -> Response {
    let status = if reply.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(reply)).into_response()
}
