use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
    pub label: String,
}

/// Resultado final por campo detectado: etiqueta de clase, texto reconocido
/// y confianza del detector redondeada a dos decimales.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField {
    pub class_name: String,
    pub extracted_text: String,
    pub confidence: f32,
}
