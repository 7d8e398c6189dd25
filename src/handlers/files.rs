//! Stored file handlers: download, raw fetch and deletion

use axum::{
    body::Body,
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use tokio_util::io::ReaderStream;

use crate::{AppState, AppError, AppResult};
use crate::middleware::session::SessionState;
use crate::models::StoredFile;

/// Download the session's current file as an attachment
pub async fn download(
    State(state): State<AppState>,
    session: SessionState,
) -> AppResult<Response> {
    let name = session
        .current_file()
        .ok_or_else(|| AppError::NotFound("No file to download.".to_string()))?;

    let file = state
        .store
        .find(name)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found.".to_string()))?;

    stream_file(&file, true).await
}

/// Serve a stored file verbatim
pub async fn raw(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let file = state
        .store
        .find(&filename)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found.".to_string()))?;

    stream_file(&file, false).await
}

/// Delete one file; unknown names are a no-op
pub async fn delete(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    if state.store.remove(&filename).await? {
        tracing::info!("Deleted dataset {}", filename);
    }

    let mut session = SessionState::from_jar(&jar);
    let jar = if session.forget(&filename) {
        session.apply(jar, state.config.is_production())
    } else {
        jar
    };

    Ok((jar, Redirect::to("/dataset")))
}

/// Delete every stored file and clear the session binding
pub async fn delete_all(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<impl IntoResponse> {
    let removed = state.store.clear().await?;
    tracing::info!("Deleted {} datasets", removed);

    let mut session = SessionState::from_jar(&jar);
    session.clear();
    let jar = session.apply(jar, state.config.is_production());

    Ok((jar, Redirect::to("/dataset")))
}

async fn stream_file(file: &StoredFile, attachment: bool) -> AppResult<Response> {
    let handle = match tokio::fs::File::open(&file.path).await {
        Ok(handle) => handle,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("File not found.".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let mime = mime_guess::from_path(&file.path).first_or_octet_stream();
    let disposition = format!(
        "{}; filename=\"{}\"",
        if attachment { "attachment" } else { "inline" },
        file.name
    );

    let body = Body::from_stream(ReaderStream::new(handle));
    Ok((
        [(CONTENT_TYPE, mime.to_string()), (CONTENT_DISPOSITION, disposition)],
        body,
    )
        .into_response())
}
