use serde::{Deserialize, Serialize};

use crate::domain::detection::ExtractedField;

/// Cuerpo de la respuesta de `/extract-text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub detections: Vec<ExtractedField>,
}
