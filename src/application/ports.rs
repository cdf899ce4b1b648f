use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{detection::Detection, errors::DomainResult, record::NewSubmission};

#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: &RgbImage) -> DomainResult<Vec<Detection>>;
}

#[async_trait]
pub trait RecognizerPort: Send + Sync {
    async fn recognize(&self, crop: &RgbImage) -> DomainResult<String>;
}

#[async_trait]
pub trait SubmissionStorePort: Send + Sync {
    async fn insert(&self, submission: NewSubmission) -> DomainResult<i64>;
}
