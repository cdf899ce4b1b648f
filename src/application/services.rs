use std::sync::Arc;

use image::{imageops, RgbImage};

use crate::{
    application::ports::{DetectorPort, RecognizerPort, SubmissionStorePort},
    domain::{
        detection::{Detection, ExtractedField},
        errors::{DomainError, DomainResult},
        record::NewSubmission,
    },
};

/// Orquestador del pipeline de extracción:
/// decodificar la imagen subida, detectar los campos del documento y
/// reconocer el texto de cada recorte.
#[derive(Clone)]
pub struct ExtractionService {
    detector: Arc<dyn DetectorPort>,
    recognizer: Arc<dyn RecognizerPort>,
}

impl ExtractionService {
    pub fn new(detector: Arc<dyn DetectorPort>, recognizer: Arc<dyn RecognizerPort>) -> Self {
        Self {
            detector,
            recognizer,
        }
    }

    /// Ejecuta el pipeline completo sobre los bytes subidos, de forma
    /// síncrona dentro de la petición: una única pasada del detector y un
    /// reconocimiento por caja. Si falla el reconocimiento de un recorte,
    /// falla la petición entera (no hay resultados parciales).
    pub async fn extract(&self, image_bytes: &[u8]) -> DomainResult<Vec<ExtractedField>> {
        if image_bytes.is_empty() {
            return Err(DomainError::InvalidInput("imagen vacía".into()));
        }

        let rgb = decode_rgb(image_bytes)?;
        let detections = self.detector.detect(&rgb).await?;

        let mut fields = Vec::with_capacity(detections.len());
        for det in detections {
            let crop = crop_detection(&rgb, &det)?;
            let text = self.recognizer.recognize(&crop).await?;
            fields.push(ExtractedField {
                class_name: det.label,
                extracted_text: text.trim().to_string(),
                confidence: round_confidence(det.score),
            });
        }
        Ok(fields)
    }
}

/// Servicio encargado de persistir los envíos de usuario.
/// La validación de campos obligatorios vive en la capa HTTP; aquí solo
/// se delega en el puerto de almacenamiento.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn SubmissionStorePort>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn SubmissionStorePort>) -> Self {
        Self { store }
    }

    pub async fn submit(&self, submission: NewSubmission) -> DomainResult<i64> {
        self.store.insert(submission).await
    }
}

/// Decodifica los bytes subidos a RGB de 8 bits. Cubre la normalización de
/// canales (RGBA, escala de grises, paleta) que exige el detector.
fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DomainError::OperationFailed(format!("imagen no decodificable: {e}")))?;
    Ok(img.to_rgb8())
}

/// Recorta la región de una detección sobre la imagen original.
/// Las coordenadas se redondean a entero y se fijan a los límites de la
/// imagen; una región degenerada tras el ajuste es un error.
fn crop_detection(img: &RgbImage, det: &Detection) -> DomainResult<RgbImage> {
    let x1 = (det.x1.round().max(0.0) as u32).min(img.width().saturating_sub(1));
    let y1 = (det.y1.round().max(0.0) as u32).min(img.height().saturating_sub(1));
    let x2 = (det.x2.round().max(0.0) as u32).min(img.width());
    let y2 = (det.y2.round().max(0.0) as u32).min(img.height());

    if x2 <= x1 || y2 <= y1 {
        return Err(DomainError::OperationFailed(format!(
            "región de recorte degenerada: ({x1}, {y1}) a ({x2}, {y2})"
        )));
    }

    Ok(imageops::crop_imm(img, x1, y1, x2 - x1, y2 - y1).to_image())
}

fn round_confidence(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}
