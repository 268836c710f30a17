use axum::{
    extract::{
        multipart::{Field, MultipartError},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::BytesMut;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::keywords::KeywordSet;
use crate::analysis::presenter::{present, AnalysisResponse, Envelope};
use crate::analysis::profiles::KeywordProfile;
use crate::analysis::rules::AnalysisRules;
use crate::errors::AppError;
use crate::ingest::{validate_extension, IngestError, UploadedDocument};
use crate::state::AppState;

#[derive(Serialize)]
pub struct RolesResponse {
    pub default_role: String,
    pub roles: Vec<KeywordProfile>,
}

/// Form fields of an analyze request.
struct AnalyzeForm {
    document: Option<UploadedDocument>,
    role: Option<String>,
    keywords: Option<String>,
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let request_id = Uuid::new_v4();
    match analyze_upload(&state, request_id, multipart).await {
        Ok(response) => {
            info!(
                %request_id,
                format = response.format.as_str(),
                score = response.report.overall_score,
                label = response.label_text,
                "Analysis complete"
            );
            Ok(Json(response))
        }
        Err(e) => {
            if !matches!(e, AppError::Internal(_)) {
                warn!(%request_id, error = %e, "Analysis request rejected");
            }
            Err(e)
        }
    }
}

async fn analyze_upload(
    state: &AppState,
    request_id: Uuid,
    multipart: Multipart,
) -> Result<AnalysisResponse, AppError> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let document = form
        .document
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;
    let keywords = resolve_keywords(
        &state.rules,
        &state.config.default_role,
        form.role.as_deref(),
        form.keywords.as_deref(),
    )?;

    let envelope = Envelope {
        request_id,
        file_name: document.file_name().to_string(),
        size_bytes: document.size(),
        format: document.format(),
        keyword_source: keywords.source().clone(),
        analyzed_at: Utc::now(),
    };
    info!(
        %request_id,
        file = %envelope.file_name,
        bytes = envelope.size_bytes,
        content_type = document.content_type().unwrap_or("unspecified"),
        keywords = %envelope.keyword_source,
        "Analysis started"
    );

    let report = state.analyzer.analyze(document, keywords).await?;
    Ok(present(report, envelope))
}

async fn read_form(mut multipart: Multipart, limit: usize) -> Result<AnalyzeForm, AppError> {
    let mut form = AnalyzeForm {
        document: None,
        role: None,
        keywords: None,
    };
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                if form.document.is_some() {
                    return Err(AppError::Validation(
                        "only one file may be uploaded per request".to_string(),
                    ));
                }
                form.document = Some(read_document(field, limit).await?);
            }
            Some("role") => form.role = Some(field.text().await.map_err(multipart_error)?),
            Some("keywords") => form.keywords = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }
    Ok(form)
}

/// Reads the uploaded file, checking the extension before any of the body is
/// consumed and aborting as soon as the size ceiling is crossed.
async fn read_document(mut field: Field<'_>, limit: usize) -> Result<UploadedDocument, AppError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::Validation("the 'file' field must carry a file name".to_string()))?;
    validate_extension(&file_name)?;
    let content_type = field.content_type().map(str::to_string);

    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        let size = buffer.len() + chunk.len();
        if size > limit {
            return Err(IngestError::TooLarge { size, limit }.into());
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(UploadedDocument::new(
        file_name,
        content_type,
        buffer.freeze(),
        limit,
    )?)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::TooLarge("upload exceeds the maximum request size".to_string())
    } else {
        AppError::Validation(format!("malformed multipart request: {}", err.body_text()))
    }
}

/// Custom keywords win over the profile; the role is validated either way.
fn resolve_keywords(
    rules: &AnalysisRules,
    default_role: &str,
    role: Option<&str>,
    custom: Option<&str>,
) -> Result<KeywordSet, AppError> {
    let role = role.map(str::trim).filter(|r| !r.is_empty());
    let profile_id = role.unwrap_or(default_role);
    let profile = rules.profile(profile_id).ok_or_else(|| {
        AppError::Validation(format!(
            "unknown role '{profile_id}'; GET /api/v1/roles lists the available roles"
        ))
    })?;

    match custom.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => KeywordSet::parse_custom(raw).map_err(|e| AppError::Validation(e.to_string())),
        None => Ok(KeywordSet::from_profile(profile)),
    }
}

/// GET /api/v1/roles
pub async fn handle_roles(State(state): State<AppState>) -> Json<RolesResponse> {
    Json(RolesResponse {
        default_role: state.config.default_role.clone(),
        roles: state.rules.profiles.clone(),
    })
}
