use anyhow::Result;
use image::{imageops::FilterType, RgbImage};
use ndarray::{s, Array4, ArrayViewD, Axis, IxDyn};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Value;
use std::fs;
use std::path::Path;

use crate::domain::detection::Detection;
use crate::domain::model::DetectorParams;

/// Etiquetas del modelo YOLOv8 de campos de documento Aadhaar,
/// en el orden de entrenamiento.
const AADHAAR_CLASSES: [&str; 5] = [
    "AADHAR_NUMBER",
    "DATE_OF_BIRTH",
    "GENDER",
    "NAME",
    "ADDRESS",
];

pub struct OnnxYoloEngine {
    session: Session,
}

impl OnnxYoloEngine {
    pub fn load(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            anyhow::bail!("ruta del modelo vacía");
        }
        if !Path::new(path).exists() {
            anyhow::bail!("modelo no encontrado: {}", path);
        }

        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        let cuda = CUDAExecutionProvider::default().build();
        if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
            builder = builder_with_cuda;
        }

        // Con `ort` sin default-features, usamos commit_from_memory.
        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        Ok(Self { session })
    }

    pub fn infer(&mut self, rgb: &RgbImage, params: &DetectorParams) -> Result<Vec<Detection>> {
        let imgsz = params.input_size as usize;
        let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Nearest);

        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let input_tensor = Value::from_array((input_shape, input.into_raw_vec()))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.into_iter().map(|&x| x as usize).collect();
        let array_view = ArrayViewD::from_shape(IxDyn(&dims), data_out)?;
        let view = array_view.index_axis(Axis(0), 0);

        // Salida YOLOv8: filas [cx, cy, w, h, clase_0..clase_n] por candidato.
        let num_candidates = view.shape()[1];
        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;

        let mut detections = Vec::new();

        for i in 0..num_candidates {
            let scores = view.slice(s![4.., i]);
            let (class_id, &max_score) = scores
                .indexed_iter()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .unwrap();

            if max_score > params.conf_threshold {
                let cx = view[[0, i]];
                let cy = view[[1, i]];
                let w = view[[2, i]];
                let h = view[[3, i]];

                detections.push(Detection {
                    x1: (cx - w / 2.0) * sx,
                    y1: (cy - h / 2.0) * sy,
                    x2: (cx + w / 2.0) * sx,
                    y2: (cy + h / 2.0) * sy,
                    score: max_score,
                    class_id,
                    label: AADHAAR_CLASSES
                        .get(class_id)
                        .copied()
                        .unwrap_or("UNKNOWN")
                        .to_string(),
                });
            }
        }

        detections.sort_unstable_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        Ok(nms(detections, params.iou_threshold, params.max_detections))
    }
}

/// Supresión de no máximos sobre cajas ya ordenadas por confianza:
/// descarta cajas de la misma clase con IoU por encima del umbral.
fn nms(sorted: Vec<Detection>, iou_threshold: f32, max_detections: usize) -> Vec<Detection> {
    let mut keep: Vec<Detection> = Vec::new();
    for det in sorted {
        if keep.len() >= max_detections {
            break;
        }
        let suppressed = keep
            .iter()
            .any(|k| k.class_id == det.class_id && iou(k, &det) > iou_threshold);
        if !suppressed {
            keep.push(det);
        }
    }
    keep
}

fn iou(a: &Detection, b: &Detection) -> f32 {
    let x_min = a.x1.max(b.x1);
    let y_min = a.y1.max(b.y1);
    let x_max = a.x2.min(b.x2);
    let y_max = a.y2.min(b.y2);

    if x_max <= x_min || y_max <= y_min {
        return 0.0;
    }

    let intersection = (x_max - x_min) * (y_max - y_min);
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: usize) -> Detection {
        Detection {
            x1,
            y1,
            x2,
            y2,
            score,
            class_id,
            label: AADHAAR_CLASSES.get(class_id).copied().unwrap_or("UNKNOWN").to_string(),
        }
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = det(0.0, 0.0, 10.0, 10.0, 0.9, 0);
        assert_eq!(iou(&a, &a), 1.0);
    }

    #[test]
    fn test_iou_disjoint_boxes() {
        let a = det(0.0, 0.0, 10.0, 10.0, 0.9, 0);
        let b = det(20.0, 20.0, 30.0, 30.0, 0.8, 0);
        assert_eq!(iou(&a, &b), 0.0);
    }

    #[test]
    fn test_nms_suppresses_same_class_overlap() {
        let boxes = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(1.0, 1.0, 11.0, 11.0, 0.8, 0),
        ];
        let kept = nms(boxes, 0.45, 100);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_keeps_overlap_of_distinct_classes() {
        let boxes = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(1.0, 1.0, 11.0, 11.0, 0.8, 3),
        ];
        let kept = nms(boxes, 0.45, 100);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_respects_max_detections() {
        let boxes = vec![
            det(0.0, 0.0, 10.0, 10.0, 0.9, 0),
            det(50.0, 50.0, 60.0, 60.0, 0.8, 1),
            det(100.0, 100.0, 110.0, 110.0, 0.7, 2),
        ];
        let kept = nms(boxes, 0.45, 2);
        assert_eq!(kept.len(), 2);
    }
}
