//! Meal image analysis
//!
//! The vision provider sits behind `MealAnalyzer`. No provider client ships
//! with this crate; the default analyzer reports itself as unavailable.

use async_trait::async_trait;

/// An uploaded meal photo
#[derive(Debug, Clone)]
pub struct MealImage {
    /// MIME type, e.g. `image/jpeg`
    pub content_type: String,
    /// Base64-encoded image bytes
    pub data_base64: String,
}

impl MealImage {
    pub const DEFAULT_CONTENT_TYPE: &'static str = "image/jpeg";

    pub fn new(data_base64: String, content_type: Option<String>) -> Self {
        Self {
            content_type: content_type.unwrap_or_else(|| Self::DEFAULT_CONTENT_TYPE.to_string()),
            data_base64,
        }
    }

    /// `data:` URL form expected by vision APIs
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.data_base64)
    }
}

/// Errors from the analysis provider
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Meal analysis provider is not configured")]
    NotConfigured,

    #[error("Meal analysis provider failed: {0}")]
    Provider(String),
}

/// Produces a nutritional analysis for a meal photo
#[async_trait]
pub trait MealAnalyzer: Send + Sync {
    async fn analyze(&self, image: &MealImage) -> Result<String, AnalysisError>;
}

/// Analyzer used when no provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAnalyzer;

#[async_trait]
impl MealAnalyzer for DisabledAnalyzer {
    async fn analyze(&self, _image: &MealImage) -> Result<String, AnalysisError> {
        Err(AnalysisError::NotConfigured)
    }
}
