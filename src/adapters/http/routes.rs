use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::error;

use crate::adapters::http::state::HttpState;
use crate::application::dto::ExtractResponse;
use crate::domain::errors::DomainError;
use crate::domain::record::NewSubmission;

pub async fn hello() -> &'static str {
    "Hello world"
}

/// Recibe la imagen del documento como campo multipart `image` y devuelve
/// la lista de campos detectados con su texto y confianza.
pub async fn extract_text(
    State(st): State<HttpState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut image_bytes: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            image_bytes = field.bytes().await.ok().map(|b| b.to_vec());
            break;
        }
    }

    let Some(bytes) = image_bytes else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No image file provided" })),
        )
            .into_response();
    };

    match st.extraction.extract(&bytes).await {
        Ok(fields) => Json(ExtractResponse { detections: fields }).into_response(),
        // Un campo `image` presente pero sin contenido equivale a no enviarlo.
        Err(DomainError::InvalidInput(_)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No image file provided" })),
        )
            .into_response(),
        Err(e) => {
            error!("Fallo en el pipeline de extracción: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Guarda un envío de usuario. Los cuatro campos son obligatorios y un
/// campo ausente o vacío rechaza la petición sin tocar el almacén.
pub async fn submit(
    State(st): State<HttpState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let field = |key: &str| {
        body.get(key)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .filter(|s| !s.is_empty())
    };

    let (Some(aadhar_number), Some(name), Some(gender), Some(dob)) = (
        field("aadharNumber"),
        field("name"),
        field("gender"),
        field("dob"),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing data" })),
        )
            .into_response();
    };

    let submission = NewSubmission {
        aadhar_number,
        name,
        gender,
        dob,
    };

    match st.submissions.submit(submission).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({ "message": "Data saved successfully" })),
        )
            .into_response(),
        Err(e) => {
            error!("Fallo al persistir el envío: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
