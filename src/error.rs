//! Crate-level error type.

use crate::config::ConfigError;
use crate::graph::FilterError;
use crate::parser::FactsError;
use crate::render::LayoutError;

/// Any error a library entry point can return.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Facts(#[from] FactsError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
