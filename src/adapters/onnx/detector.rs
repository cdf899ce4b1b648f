use async_trait::async_trait;
use image::RgbImage;
use std::sync::Mutex;

use crate::application::ports::DetectorPort;
use crate::domain::detection::Detection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::DetectorConfig;

use super::yolo_engine::OnnxYoloEngine;

/// Adaptador del detector: una sesión ONNX cargada una sola vez al arranque
/// y compartida entre todas las peticiones. La sesión exige acceso exclusivo
/// para inferir, así que las inferencias se serializan con un mutex.
pub struct OnnxDetector {
    engine: Mutex<OnnxYoloEngine>,
    config: DetectorConfig,
}

impl OnnxDetector {
    pub fn load(config: DetectorConfig) -> anyhow::Result<Self> {
        let engine = OnnxYoloEngine::load(&config.onnx_path)?;
        Ok(Self {
            engine: Mutex::new(engine),
            config,
        })
    }
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    async fn detect(&self, image: &RgbImage) -> DomainResult<Vec<Detection>> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| DomainError::OperationFailed("lock del detector envenenado".into()))?;
        engine
            .infer(image, &self.config.params)
            .map_err(|e| DomainError::OperationFailed(format!("inferencia fallida: {e}")))
    }
}
