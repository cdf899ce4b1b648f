mod adapters;
mod application;
mod domain;

use std::sync::Arc;

use crate::adapters::{
    http::{router, state::HttpState},
    onnx::detector::OnnxDetector,
    sqlite::submission_store::SqliteSubmissionStore,
    tesseract::recognizer::TesseractRecognizer,
};
use crate::application::services::{ExtractionService, SubmissionService};
use crate::domain::model::{DetectorConfig, DetectorParams};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Inicializar logs (RUST_LOG=info por defecto)
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("🔧 Inicializando adaptadores de infraestructura...");

    // 2. Instanciar Adaptadores (Capa de Infraestructura)
    // Usamos Arc porque serán compartidos entre servicios y el servidor HTTP.
    // El modelo se carga una sola vez aquí y queda de solo lectura.
    let detector_cfg = DetectorConfig {
        onnx_path: env_or("MODEL_PATH", "models/aadhaar_yolov8n.onnx"),
        params: DetectorParams::default(),
    };
    let detector = Arc::new(OnnxDetector::load(detector_cfg)?);

    let tessdata = std::env::var("TESSDATA_DIR").ok();
    let recognizer = Arc::new(TesseractRecognizer::new(tessdata, env_or("TESS_LANG", "eng")));

    let store = Arc::new(SqliteSubmissionStore::new(env_or(
        "DATABASE_PATH",
        "user_data.db",
    )));
    // Paso de arranque deliberado: el esquema se reinicia de forma destructiva
    // en cada arranque y los envíos anteriores se pierden.
    store.reset_schema()?;

    // 3. Instanciar Servicios (Capa de Aplicación - Casos de Uso)
    let extraction = Arc::new(ExtractionService::new(detector, recognizer));
    let submissions = Arc::new(SubmissionService::new(store));

    // 4. Configurar el Estado de la API y el Router de Axum
    let state = HttpState {
        extraction,
        submissions,
    };
    let app = router(state);

    // 5. Lanzar el Servidor
    let port = env_or("PORT", "5000");
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("🚀 Servidor de extracción Aadhaar iniciado en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
