use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const ASSET_NAME_REQUIRED: &str = "Asset name required.";
pub const ANALYSIS_FAILED: &str = "Failed to generate financial analysis";
pub const STATUS_MESSAGE: &str = "Finance AI API is running.";

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default, rename = "assetName")]
    pub asset_name: Option<String>,
}

impl AnalysisRequest {
    /// The trimmed asset name, or a validation error if it is absent or blank.
    pub fn asset_name(&self) -> Result<&str> {
        self.asset_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::validation(ASSET_NAME_REQUIRED))
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
