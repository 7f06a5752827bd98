//! Input errors for the plan pipeline.
//!
//! Placement rejections are not errors; they are values returned by the
//! engine (see [`crate::placement::RejectReason`]).

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;

/// Errors that abort the current top-level operation.
#[derive(Error, Debug)]
pub enum PlanError {
    /// I/O error while reading or writing a plan file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A raster image could not be decoded or encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input held nothing to work with.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Configuration failed validation.
    #[error("Invalid configuration: {}", join(.0))]
    InvalidConfig(Vec<ConfigError>),

    /// Catalog failed validation.
    #[error("Invalid catalog: {}", join(.0))]
    InvalidCatalog(Vec<CatalogError>),
}

fn join<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, PlanError>;
