//! Error taxonomy for loading, layout and step control.
//!
//! Load-time errors (`DataFormatError`, `FetchError`, `ConfigError`) abort
//! startup and are surfaced to the caller. `LayoutError` means the entity
//! store and the pack layout have diverged; it is never retried.

use thiserror::Error;

use crate::data::EntityId;

/// A dataset row could not be turned into an entity.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("row {row}: {reason}")]
pub struct DataFormatError {
    /// 1-based data row number (header excluded)
    pub row: usize,
    pub reason: String,
}

impl DataFormatError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

/// Internal-consistency faults raised by the layout code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("centroid requested for an empty group (or zero total weight)")]
    EmptyGroup,
    #[error("entity {0} could not be resolved")]
    Lookup(EntityId),
    #[error("enclosing circle basis could not be extended")]
    Enclose,
}

/// A step index outside `[0, num_steps)`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("step {step} is outside 0..{num_steps}")]
pub struct InvalidStepError {
    pub step: usize,
    pub num_steps: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("canvas must have positive size, got {width}x{height}")]
    Canvas { width: f64, height: f64 },
    #[error("dot radius must be positive, got {0}")]
    Radius(f64),
    #[error("padding must be finite and non-negative, got {0}")]
    Padding(f64),
    #[error("invalid colour {0:?}")]
    Colour(String),
    #[error("at least one step must be configured")]
    NoSteps,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("server answered {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("remote sources need the `remote` feature: {0}")]
    RemoteDisabled(String),
}

/// Everything a [`crate::engine::pipeline::Story`] can fail with.
#[derive(Error, Debug)]
pub enum StoryError {
    #[error(transparent)]
    DataFormat(#[from] DataFormatError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    InvalidStep(#[from] InvalidStepError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
