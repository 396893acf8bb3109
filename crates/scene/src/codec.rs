//! JSON form of [`TourData`], as stored under the local cache key.
//!
//! Field names follow the browser format (`startScene`, `targetScene`), so a
//! cache written by one build is readable by the next.

use crate::model::TourData;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("tour data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tour data is empty")]
    Empty,
}

pub fn to_json(data: &TourData) -> Result<String, CodecError> {
    Ok(serde_json::to_string(data)?)
}

pub fn to_json_pretty(data: &TourData) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn from_json(raw: &str) -> Result<TourData, CodecError> {
    if raw.trim().is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(raw)?)
}
