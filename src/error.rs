//! Error types for the quote engine.
//!
//! "No price available" is a business state carried as `None` in a quote and never
//! surfaces here.

use std::path::PathBuf;
use thiserror::Error;

use crate::orders::OrderStatus;

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("Format not found: {0}")]
    FormatNotFound(String),

    #[error("Invalid format dimensions for {id}: {width} x {height}")]
    InvalidDimensions { id: String, width: f64, height: f64 },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid production option '{field}': {message}")]
    InvalidProductionOption { field: String, message: String },

    #[error("Catalog not found: {path}")]
    CatalogNotFound { path: PathBuf },

    #[error("Catalog version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Invalid share token: {0}")]
    InvalidShareToken(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
