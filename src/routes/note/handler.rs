use axum::{
    extract::{
        Extension, Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    auth::Claims,
    error::AppError,
    models::{NewNote, Note, NoteChanges},
    routes::user::model::{DeletedResponse, PasswordRequest},
    utils::success_to_api_response,
};

use super::model::{CreateNoteRequest, NoteResponse, NotesResponse};

/// Loads a note and checks that the caller owns it.
async fn owned_note(state: &AppState, claims: &Claims, id: i64) -> Result<Note, AppError> {
    let note = state.notes.read_by_id(id).await?;
    if note.owner != claims.username {
        tracing::info!(
            "User {} denied access to note {} of {}",
            claims.username,
            id,
            note.owner
        );
        return Err(AppError::Forbidden("you are not the owner of this note".into()));
    }
    Ok(note)
}

#[axum::debug_handler]
pub async fn list_notes(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let notes = state.notes.read_by_owner(&claims.username).await?;
    Ok(success_to_api_response("success", NotesResponse { notes }))
}

#[axum::debug_handler]
pub async fn get_note(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let note = owned_note(&state, &claims, id).await?;
    Ok(success_to_api_response("success", NoteResponse { note }))
}

#[axum::debug_handler]
pub async fn create_note(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    body: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("note content is required".into()));
    }

    let note = state
        .notes
        .create(NewNote {
            title: req.title.filter(|t| !t.trim().is_empty()),
            content: req.content,
            owner: claims.username,
            archived: req.archived,
        })
        .await?;

    tracing::debug!("Created note {} for {}", note.id, note.owner);
    Ok((
        StatusCode::CREATED,
        success_to_api_response("note created", NoteResponse { note }),
    ))
}

#[axum::debug_handler]
pub async fn update_note(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<NoteChanges>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let Json(changes) = body?;

    let mut note = owned_note(&state, &claims, id).await?;
    changes.apply_to(&mut note);
    let note = state.notes.update(&note).await?;

    Ok(success_to_api_response("note updated", NoteResponse { note }))
}

#[axum::debug_handler]
pub async fn delete_note(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    let note = owned_note(&state, &claims, id).await?;
    state.notes.delete(&note).await?;

    Ok(success_to_api_response("note deleted", NoteResponse { note }))
}

/// Bulk deletion re-checks the caller's password and is not atomic.
#[axum::debug_handler]
pub async fn delete_all_notes(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    body: Result<Json<PasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body?;
    if !state
        .notes
        .verify_owner_password(&claims.username, &req.password)
        .await?
    {
        return Err(AppError::InvalidCredentials("invalid password".into()));
    }

    let deleted = state.notes.delete_all_by_owner(&claims.username).await?;
    tracing::info!("Deleted all {} notes of {}", deleted, claims.username);
    Ok(success_to_api_response(
        "notes deleted",
        DeletedResponse { deleted },
    ))
}
