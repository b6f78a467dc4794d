//! Bridge to the Graphviz layout engine for image output.
//!
//! The `dot` text produced by [`GraphvizRenderer`](super::graphviz::GraphvizRenderer)
//! is piped through an installed `dot` binary to obtain SVG, PNG and the
//! other formats Graphviz supports. Format `dot` never touches the engine.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Output formats accepted by the layout engine.
pub const SUPPORTED_FORMATS: [&str; 29] = [
    "bmp", "canon", "cmap", "cmapx", "dot", "eps", "fig", "gd", "gif", "gv", "imap", "jpe", "jpeg", "jpg", "json",
    "pdf", "pic", "plain", "plain-ext", "png", "ps", "ps2", "svg", "svgz", "tif", "tiff", "vrml", "webp", "xdot",
];

/// Errors raised while producing image output.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// No `dot` executable on the search path.
    #[error("Graphviz 'dot' executable not found; install Graphviz (https://graphviz.org/download/) and make sure 'dot' is on PATH")]
    EngineNotFound,

    /// The requested format is not one Graphviz produces.
    #[error("'{format}' is not a supported output format. Supported formats are: {}", .supported.join(", "))]
    UnsupportedFormat { format: String, supported: Vec<String> },

    /// The engine ran but exited unsuccessfully.
    #[error("Graphviz 'dot' failed ({status}): {stderr}; upgrading Graphviz may help")]
    EngineFailed { status: String, stderr: String },

    /// Talking to the engine process failed.
    #[error("Failed to run Graphviz 'dot': {0}")]
    Io(#[from] io::Error),
}

/// Checks whether Graphviz can produce the given format.
pub fn is_supported_format(format: &str) -> bool {
    SUPPORTED_FORMATS.contains(&format)
}

/// A located `dot` executable.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    program: PathBuf,
}

impl LayoutEngine {
    /// Finds `dot` on the search path.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::EngineNotFound`] when it is not installed.
    pub fn locate() -> Result<Self, LayoutError> {
        let program = which::which("dot").map_err(|_| LayoutError::EngineNotFound)?;
        debug!(program = %program.display(), "located layout engine");
        Ok(Self { program })
    }

    /// Uses an explicit executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Lays out `dot_source` and returns the engine output in `format`.
    ///
    /// # Errors
    ///
    /// Fails when the format is unsupported, the executable cannot be
    /// started, or it exits with a non-zero status.
    pub fn render(&self, dot_source: &str, format: &str) -> Result<Vec<u8>, LayoutError> {
        check_format(format)?;

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => LayoutError::EngineNotFound,
                _ => LayoutError::Io(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // An engine that exits early reports through its status below.
            if let Err(e) = stdin.write_all(dot_source.as_bytes()) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }
        let output = child.wait_with_output()?;

        if !output.status.success() {
            return Err(LayoutError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        info!(format = %format, bytes = output.stdout.len(), "rendered graph image");
        Ok(output.stdout)
    }
}

fn check_format(format: &str) -> Result<(), LayoutError> {
    if is_supported_format(format) {
        return Ok(());
    }
    Err(LayoutError::UnsupportedFormat {
        format: format.to_string(),
        supported: SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect(),
    })
}

/// Produces `format` output from `dot_source`.
///
/// Format `dot` returns the source unchanged; anything else goes through
/// the engine found on the search path.
pub fn layout(dot_source: &str, format: &str) -> Result<Vec<u8>, LayoutError> {
    if format == "dot" {
        return Ok(dot_source.as_bytes().to_vec());
    }
    check_format(format)?;
    LayoutEngine::locate()?.render(dot_source, format)
}
