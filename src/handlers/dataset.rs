//! Dataset upload and preview handlers

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;

use crate::{AppState, AppResult};
use crate::middleware::session::SessionState;
use crate::preview::load_preview;
use crate::upload::accept_upload;
use crate::views::{self, DatasetView, TableContent};

/// Multipart field carrying the dataset
const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct DatasetQuery {
    pub preview: Option<String>,
}

/// Show the dataset page, previewing `?preview=` or the session's file
pub async fn show(
    State(state): State<AppState>,
    session: SessionState,
    Query(query): Query<DatasetQuery>,
) -> AppResult<Html<String>> {
    render(&state, &session, query.preview.as_deref()).await
}

/// Accept an upload. Rejected uploads, including bodies that are not
/// multipart at all, fall through to a normal render with the session
/// untouched.
pub async fn upload(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<DatasetQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let mut session = SessionState::from_jar(&jar);

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!("Rejected upload: {}", rejection.body_text());
            return Ok(render(&state, &session, query.preview.as_deref())
                .await?
                .into_response());
        }
    };

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let Some(filename) = accept_upload(&original) else {
            tracing::warn!("Rejected upload {:?}: extension not allowed", original);
            break;
        };

        let bytes = field.bytes().await?;
        let stored = state.store.save(&filename, &bytes).await?;
        tracing::info!("Stored dataset {} ({} bytes)", stored.name, stored.size_bytes);

        session.bind(filename.as_str());
        let jar = session.apply(jar, state.config.is_production());
        let target = format!("/dataset?preview={}", urlencoding::encode(&filename));
        return Ok((jar, Redirect::to(&target)).into_response());
    }

    Ok(render(&state, &session, query.preview.as_deref())
        .await?
        .into_response())
}

async fn render(
    state: &AppState,
    session: &SessionState,
    explicit: Option<&str>,
) -> AppResult<Html<String>> {
    let filename = session.resolve(explicit).map(str::to_string);

    let table = match &filename {
        Some(name) => preview_table(state, name).await?,
        None => None,
    };

    let view = DatasetView {
        files: state.store.list().await?,
        filename,
        bound_file: session.current_file().map(str::to_string),
        table,
    };

    Ok(Html(views::dataset_page(&view)))
}

/// Preview area for a resolved name. A missing file is the empty state, a
/// parse failure becomes inline text.
async fn preview_table(state: &AppState, name: &str) -> AppResult<Option<TableContent>> {
    let Some(file) = state.store.find(name).await? else {
        tracing::debug!("No preview for {}: file not present", name);
        return Ok(None);
    };

    let path = file.path.clone();
    let rows = state.config.preview_rows;
    let loaded = tokio::task::spawn_blocking(move || load_preview(&path, rows)).await?;

    Ok(match loaded {
        Ok(Some(table)) => Some(TableContent::Table(table.to_html())),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Failed to read dataset {}: {}", file.name, e);
            Some(TableContent::Error(format!("Failed to read file: {}", e)))
        }
    })
}
