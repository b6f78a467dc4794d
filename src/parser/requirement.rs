//! Parser for PEP 508 style requirement lines.
//!
//! Handles the subset found in installed package metadata:
//! `name[extras] (constraint) ; marker` and `name @ url ; marker`.

use super::types::DeclaredRequirement;

/// Errors for requirement lines that do not even yield a target name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementSyntaxError {
    /// The line does not start with a package name.
    #[error("requirement has no package name: '{0}'")]
    MissingName(String),

    /// An extras list was opened but never closed.
    #[error("unterminated extras in requirement: '{0}'")]
    UnterminatedExtras(String),
}

/// Splits a requirement line into name, constraint and marker.
///
/// The constraint is returned as raw text; version parsing happens later
/// so a bad constraint can degrade to "any" instead of dropping the edge.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::parser::parse_requirement;
///
/// let req = parse_requirement("requests[socks] (>=2.0,<3) ; python_version >= '3.8'").unwrap();
/// assert_eq!(req.name, "requests");
/// assert_eq!(req.constraint.as_deref(), Some(">=2.0,<3"));
/// assert_eq!(req.marker.as_deref(), Some("python_version >= '3.8'"));
/// ```
pub fn parse_requirement(line: &str) -> Result<DeclaredRequirement, RequirementSyntaxError> {
    let (body, marker) = match line.split_once(';') {
        Some((body, marker)) => (body.trim(), Some(marker.trim().to_string())),
        None => (line.trim(), None),
    };

    let name_end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() {
        return Err(RequirementSyntaxError::MissingName(line.to_string()));
    }

    let mut rest = body[name_end..].trim_start();
    if rest.starts_with('[') {
        let close = rest
            .find(']')
            .ok_or_else(|| RequirementSyntaxError::UnterminatedExtras(line.to_string()))?;
        rest = rest[close + 1..].trim_start();
    }

    // Direct URL references carry no version constraint.
    let constraint = if rest.starts_with('@') {
        None
    } else {
        let rest = rest
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(rest)
            .trim();
        (!rest.is_empty()).then(|| rest.to_string())
    };

    Ok(DeclaredRequirement {
        name: name.to_string(),
        constraint,
        marker: marker.filter(|m| !m.is_empty()),
    })
}
