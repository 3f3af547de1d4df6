//! `POST /api/upload/resume`: forwards a resume to the media host and
//! returns the hosted URL.

use axum::{
    Json,
    extract::{Multipart, State, multipart::{MultipartError, MultipartRejection}},
    http::StatusCode,
};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, warn};

use formhire_types::api::UploadResponse;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Request bodies may exceed the file itself by the multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_RESUME_BYTES + 64 * 1024;

pub const ALLOWED_RESUME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

struct ResumeFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

#[derive(Debug, Deserialize)]
struct HostedFile {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct HostError {
    error: HostErrorMessage,
}

#[derive(Debug, Deserialize)]
struct HostErrorMessage {
    message: String,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn read_resume(mut multipart: Multipart) -> ApiResult<ResumeFile> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("resume").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        return Ok(ResumeFile {
            file_name,
            content_type,
            data,
        });
    }
    Err(ApiError::validation("No file provided"))
}

fn check_resume(file: &ResumeFile) -> ApiResult<()> {
    if !ALLOWED_RESUME_TYPES.contains(&file.content_type.as_str()) {
        return Err(ApiError::validation(
            "Invalid file type. Please upload a PDF or Word document",
        ));
    }
    if file.data.is_empty() {
        return Err(ApiError::validation("No file provided"));
    }
    if file.data.len() > MAX_RESUME_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }
    Ok(())
}

fn upload_failed(detail: impl Into<String>) -> ApiError {
    ApiError::Dependency {
        context: "Upload failed",
        detail: detail.into(),
    }
}

pub async fn upload_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let multipart =
        multipart.map_err(|e| ApiError::validation(format!("Invalid multipart body: {}", e.body_text())))?;
    let file = read_resume(multipart).await?;
    check_resume(&file)?;

    let media = &state.config.media;
    let url = media.upload_url().ok_or_else(|| ApiError::Dependency {
        context: "File host not configured",
        detail: "CLOUDINARY_CLOUD_NAME is not set".into(),
    })?;

    info!(
        file_name = %file.file_name,
        content_type = %file.content_type,
        size = file.data.len(),
        "Forwarding resume to media host"
    );

    let part = Part::bytes(file.data.to_vec())
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|e| upload_failed(e.to_string()))?;
    let mut form = Form::new()
        .part("file", part)
        .text("folder", media.folder.clone());
    if let Some(preset) = &media.upload_preset {
        form = form.text("upload_preset", preset.clone());
    }

    let response = state
        .http
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| upload_failed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<HostError>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        warn!(%status, "Media host rejected upload: {}", detail);
        return Err(upload_failed(format!("{}: {}", status, detail)));
    }

    let hosted: HostedFile = response
        .json()
        .await
        .map_err(|e| upload_failed(format!("unexpected media host response: {}", e)))?;

    info!(public_id = %hosted.public_id, "Resume uploaded");
    Ok(Json(UploadResponse {
        secure_url: hosted.secure_url,
        public_id: hosted.public_id,
        message: "File uploaded successfully".into(),
    }))
}
