pub mod http;
pub mod onnx;
pub mod sqlite;
pub mod tesseract;
