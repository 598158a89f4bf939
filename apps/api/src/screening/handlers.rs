//! Axum route handlers for the Screening API.

use std::path::Path;

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::document::DocumentKind;
use crate::extraction::{extract_text, parse_job_description};
use crate::models::job::JobDescription;
use crate::models::resume::ResumeDocument;
use crate::models::screening::ScreeningReport;
use crate::screening::orchestrator::run_screening;
use crate::state::AppState;

const JOB_DESCRIPTION_FIELD: &str = "job_description";
const RESUMES_FIELD: &str = "resumes";

#[derive(Debug, Deserialize)]
pub struct ParseJdRequest {
    pub jd_text: String,
}

/// POST /api/v1/job-descriptions/parse
///
/// Runs the heuristic job-description parser. No model calls.
pub async fn handle_parse_jd(
    Json(request): Json<ParseJdRequest>,
) -> Result<Json<JobDescription>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    Ok(Json(parse_job_description(&request.jd_text)))
}

/// POST /api/v1/screenings
///
/// Multipart body: one `job_description` text field and one or more
/// `resumes` file fields (PDF or DOCX; anything else is skipped).
/// Returns the ranked report, or 503 when the model clients cannot be built.
pub async fn handle_screen(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreeningReport>, AppError> {
    let mut jd_text = String::new();
    let mut uploads: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(JOB_DESCRIPTION_FIELD) => {
                jd_text = field.text().await.map_err(invalid_body)?;
            }
            Some(RESUMES_FIELD) => {
                let filename = field.file_name().map(str::to_string).unwrap_or_default();
                let bytes = field.bytes().await.map_err(invalid_body)?;
                if DocumentKind::from_filename(&filename).is_none() {
                    warn!("Skipping unsupported upload '{filename}'");
                    continue;
                }
                uploads.push((filename, bytes));
            }
            other => debug!("Ignoring multipart field {other:?}"),
        }
    }

    if jd_text.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if uploads.is_empty() {
        return Err(AppError::Validation(
            "No valid resume files uploaded (PDF or DOCX required)".to_string(),
        ));
    }

    // PDF and DOCX parsing is CPU-bound; keep it off the async workers.
    let documents = tokio::task::spawn_blocking(move || spool_and_extract(uploads))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Text extraction task failed: {e}")))??;

    let run_id = Uuid::new_v4();
    info!("Screening run {run_id}: {} resume(s)", documents.len());

    let results =
        run_screening(state.clients.as_ref(), state.settings.clone(), &jd_text, documents).await?;

    Ok(Json(ScreeningReport {
        run_id,
        generated_at: Utc::now(),
        candidate_count: results.len(),
        results,
    }))
}

fn invalid_body(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {e}"))
}

/// Writes each upload into a scratch directory and extracts its text.
/// Unreadable documents yield their error string, not an `Err`; only
/// failing to stage the files is fatal. The directory is removed on return.
fn spool_and_extract(uploads: Vec<(String, Bytes)>) -> anyhow::Result<Vec<ResumeDocument>> {
    let dir = tempfile::tempdir().context("Failed to create upload directory")?;

    uploads
        .into_iter()
        .enumerate()
        .map(|(index, (filename, bytes))| {
            // Client-supplied names may carry directories; keep the last component.
            let basename = Path::new(&filename)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let path = dir.path().join(format!("{index}-{basename}"));
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to stage upload '{filename}'"))?;

            let raw_text = extract_text(&path);
            Ok(ResumeDocument::new(filename, raw_text))
        })
        .collect()
}
