use anyhow::Result;
use async_trait::async_trait;
use image::RgbImage;
use tesseract::Tesseract;

use crate::application::ports::RecognizerPort;
use crate::domain::errors::{DomainError, DomainResult};

/// Modo de segmentación 6: un único bloque uniforme de texto por recorte.
const PAGE_SEG_MODE_SINGLE_BLOCK: &str = "6";

/// Reconocedor de texto sobre recortes, respaldado por libtesseract.
///
/// La API de tesseract es con estado y se consume al usarla, así que cada
/// recorte inicializa un motor nuevo; no se arrastra estado entre peticiones.
pub struct TesseractRecognizer {
    datapath: Option<String>,
    lang: String,
}

impl TesseractRecognizer {
    pub fn new(datapath: Option<String>, lang: impl Into<String>) -> Self {
        Self {
            datapath,
            lang: lang.into(),
        }
    }

    fn run(&self, crop: &RgbImage) -> Result<String> {
        let width = crop.width() as i32;
        let height = crop.height() as i32;

        let mut tess = Tesseract::new(self.datapath.as_deref(), Some(&self.lang))?
            .set_variable("tessedit_pageseg_mode", PAGE_SEG_MODE_SINGLE_BLOCK)?
            .set_frame(crop.as_raw(), width, height, 3, 3 * width)?;

        Ok(tess.get_text()?)
    }
}

#[async_trait]
impl RecognizerPort for TesseractRecognizer {
    async fn recognize(&self, crop: &RgbImage) -> DomainResult<String> {
        self.run(crop)
            .map_err(|e| DomainError::OperationFailed(format!("reconocimiento fallido: {e}")))
    }
}
