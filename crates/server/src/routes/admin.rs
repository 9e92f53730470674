//! Admin panel route handlers.
//!
//! The upload panel and its JSON endpoints. Uploads are validated per file;
//! only metadata of accepted files is kept.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};

use nexus_core::FileId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, UploadedFile};
use crate::services::uploads::{ALLOWED_TYPES, UploadCandidate, UploadError, UploadReport};
use crate::state::AppState;

/// Multipart field naming the target sector.
const DOMAIN_FIELD: &str = "domain";

/// Multipart field carrying the files.
const FILES_FIELD: &str = "files";

/// Admin panel template.
#[derive(Template, WebTemplate)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub admin: CurrentUser,
    pub domains: Vec<String>,
    pub files: Vec<UploadedFile>,
    pub accept: String,
}

/// Display the upload panel.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    AdminTemplate {
        admin,
        domains: state.domains().names(),
        files: state.uploads().list().await,
        accept: ALLOWED_TYPES.join(","),
    }
}

/// List uploaded files.
pub async fn list_files(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Json<Vec<UploadedFile>> {
    Json(state.uploads().list().await)
}

/// Accept a multipart upload of `domain` plus one or more `files`.
///
/// Files are read only to count their bytes; reading a file stops as soon as
/// it passes the size ceiling.
pub async fn upload_files(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>> {
    let max_bytes = state.config().max_upload_bytes;
    let mut domain = None;
    let mut candidates = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(DOMAIN_FIELD) => {
                domain = Some(field.text().await.map_err(multipart_error)?);
            }
            Some(FILES_FIELD) => {
                let name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();

                let mut size: u64 = 0;
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    size = size.saturating_add(u64::try_from(chunk.len()).unwrap_or(u64::MAX));
                    if size > max_bytes {
                        break;
                    }
                }

                // An empty file input still submits one nameless part
                if name.is_empty() && size == 0 {
                    continue;
                }
                candidates.push(UploadCandidate {
                    name,
                    content_type,
                    size,
                });
            }
            _ => {}
        }
    }

    let domain = domain
        .as_deref()
        .and_then(|raw| state.domains().resolve(raw))
        .ok_or(UploadError::DomainRequired)?;

    let report = state.uploads().upload(domain, candidates).await?;

    tracing::info!(
        admin = %admin.email,
        domain = %domain,
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        "Upload processed"
    );
    add_breadcrumb(
        "upload",
        "Uploaded resources",
        Some(&[("domain", domain.as_str())]),
    );

    Ok(Json(report))
}

/// Remove an uploaded file.
pub async fn delete_file(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id: FileId = id
        .parse()
        .map_err(|_| AppError::NotFound("File".to_string()))?;
    state.uploads().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Upload(UploadError::Malformed(err.body_text()))
    }
}
