//! Reader for package fact documents.
//!
//! The document is either a JSON array of facts or an object with a
//! `packages` array, as written by the environment inspector.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::types::PackageFact;

/// Errors that can occur while reading a fact document.
#[derive(Debug, thiserror::Error)]
pub enum FactsError {
    /// Failed to read the document.
    #[error("Failed to read package facts: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse package facts JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for fact reading.
pub type FactsResult<T> = Result<T, FactsError>;

#[derive(Deserialize)]
#[serde(untagged)]
enum FactDocument {
    List(Vec<PackageFact>),
    Wrapped { packages: Vec<PackageFact> },
}

impl From<FactDocument> for Vec<PackageFact> {
    fn from(doc: FactDocument) -> Self {
        match doc {
            FactDocument::List(packages) | FactDocument::Wrapped { packages } => packages,
        }
    }
}

/// Reads a fact document from a file path.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use pkgdeptree::parser::parse_file;
///
/// let facts = parse_file(Path::new("facts.json")).unwrap();
/// println!("{} packages installed", facts.len());
/// ```
pub fn parse_file(path: &Path) -> FactsResult<Vec<PackageFact>> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Reads a fact document from any reader (e.g. stdin).
pub fn parse_reader<R: Read>(mut reader: R) -> FactsResult<Vec<PackageFact>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_str(&content)
}

/// Parses a fact document from a string.
///
/// # Example
///
/// ```
/// use pkgdeptree::parser::parse_str;
///
/// let facts = parse_str(r#"{"packages": [{"name": "a", "version": "1.0"}]}"#).unwrap();
/// assert_eq!(facts[0].name, "a");
/// assert!(facts[0].requirements.is_empty());
/// ```
pub fn parse_str(content: &str) -> FactsResult<Vec<PackageFact>> {
    let doc: FactDocument = serde_json::from_str(content)?;
    Ok(doc.into())
}
