use crate::application::services::{ExtractionService, SubmissionService};
use std::sync::Arc;

/// Estado compartido para los manejadores HTTP de Axum.
/// Siguiendo la Arquitectura Hexagonal, el estado contiene los servicios (Casos de Uso).
#[derive(Clone)]
pub struct HttpState {
    /// Servicio que orquesta el pipeline de detección y reconocimiento.
    pub extraction: Arc<ExtractionService>,
    /// Servicio que persiste los envíos de usuario.
    pub submissions: Arc<SubmissionService>,
}
