//! Version specifiers (`>=1.0`, `~=2.2`, `==1.*`) and comma separated sets.

use std::fmt;

use super::pep440::Version;

/// Errors produced while parsing a version specifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecifierError {
    /// No comparison operator at the start of a clause.
    #[error("missing comparison operator in '{0}'")]
    MissingOperator(String),

    /// The operator was not followed by a version.
    #[error("missing version after operator in '{0}'")]
    MissingVersion(String),

    /// The version part could not be parsed.
    #[error("invalid version in specifier '{clause}': {source}")]
    InvalidVersion {
        /// The clause as written
        clause: String,
        /// Underlying version error
        source: super::VersionError,
    },

    /// A `.*` suffix was used with an operator that does not allow it.
    #[error("wildcard not allowed in '{0}'")]
    UnexpectedWildcard(String),

    /// `~=` needs at least two release segments.
    #[error("compatible release '{0}' needs at least two release segments")]
    CompatibleTooShort(String),
}

/// Comparison operator of a single specifier clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `~=`
    Compatible,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `===`
    Arbitrary,
}

impl Operator {
    // Longest operators first so `===` is not read as `==`.
    const ALL: [(&'static str, Operator); 8] = [
        ("===", Operator::Arbitrary),
        ("~=", Operator::Compatible),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessEqual),
        (">=", Operator::GreaterEqual),
        ("<", Operator::Less),
        (">", Operator::Greater),
    ];

    /// Returns the operator as written in a specifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Arbitrary => "===",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `operator version` clause.
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    /// Version text as written, including a trailing `.*`
    text: String,
    /// Parsed version, absent only for `===`
    version: Option<Version>,
    wildcard: bool,
}

impl Specifier {
    /// Parses one clause such as `>=2.0.0` or `== 1.4.*`.
    pub fn parse(clause: &str) -> Result<Self, SpecifierError> {
        let clause = clause.trim();
        let (operator, rest) = Operator::ALL
            .iter()
            .find_map(|(symbol, op)| clause.strip_prefix(symbol).map(|rest| (*op, rest)))
            .ok_or_else(|| SpecifierError::MissingOperator(clause.to_string()))?;

        let text = rest.trim();
        if text.is_empty() {
            return Err(SpecifierError::MissingVersion(clause.to_string()));
        }

        if operator == Operator::Arbitrary {
            return Ok(Self {
                operator,
                text: text.to_string(),
                version: None,
                wildcard: false,
            });
        }

        let (version_text, wildcard) = match text.strip_suffix(".*") {
            Some(prefix) if matches!(operator, Operator::Equal | Operator::NotEqual) => {
                (prefix, true)
            }
            Some(_) => return Err(SpecifierError::UnexpectedWildcard(clause.to_string())),
            None => (text, false),
        };

        let version =
            Version::parse(version_text).map_err(|source| SpecifierError::InvalidVersion {
                clause: clause.to_string(),
                source,
            })?;

        if operator == Operator::Compatible && version.release().len() < 2 {
            return Err(SpecifierError::CompatibleTooShort(clause.to_string()));
        }

        Ok(Self {
            operator,
            text: text.to_string(),
            version: Some(version),
            wildcard,
        })
    }

    /// Returns the comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// True when the clause itself names a pre-release, which opts the
    /// whole set into accepting pre-release candidates.
    fn names_prerelease(&self) -> bool {
        self.operator != Operator::NotEqual
            && !self.wildcard
            && self.version.as_ref().is_some_and(Version::is_prerelease)
    }

    /// Checks a parsed candidate against this clause.
    pub fn contains(&self, candidate: &Version) -> bool {
        let Some(spec) = &self.version else {
            return candidate.to_string() == self.text.to_ascii_lowercase();
        };

        match self.operator {
            Operator::Equal if self.wildcard => {
                candidate.release_starts_with(spec.epoch(), spec.release())
            }
            Operator::NotEqual if self.wildcard => {
                !candidate.release_starts_with(spec.epoch(), spec.release())
            }
            Operator::Equal => Self::equal(spec, candidate),
            Operator::NotEqual => !Self::equal(spec, candidate),
            Operator::LessEqual => candidate.public() <= *spec,
            Operator::GreaterEqual => candidate.public() >= *spec,
            Operator::Less => {
                candidate < spec
                    && !(candidate.is_prerelease()
                        && !spec.is_prerelease()
                        && candidate.base() == spec.base())
            }
            Operator::Greater => {
                candidate > spec
                    && !(candidate.is_postrelease()
                        && !spec.is_postrelease()
                        && candidate.base() == spec.base())
                    && !(candidate.has_local() && candidate.base() == spec.base())
            }
            Operator::Compatible => {
                let prefix = &spec.release()[..spec.release().len() - 1];
                candidate.public() >= *spec && candidate.release_starts_with(spec.epoch(), prefix)
            }
            Operator::Arbitrary => false,
        }
    }

    fn equal(spec: &Version, candidate: &Version) -> bool {
        if spec.has_local() {
            candidate == spec
        } else {
            candidate.public() == *spec
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.text)
    }
}

/// A comma separated set of specifiers; empty means "any version".
///
/// # Example
///
/// ```rust
/// use pkgdeptree::version::SpecifierSet;
///
/// let any = SpecifierSet::default();
/// assert!(any.is_empty());
/// assert!(any.contains("0.0.1"));
///
/// let set = SpecifierSet::parse("<2.42, >=2.30").unwrap();
/// assert_eq!(set.to_string(), ">=2.30,<2.42");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// Parses a comma separated constraint. Blank input yields an empty set.
    pub fn parse(text: &str) -> Result<Self, SpecifierError> {
        let specifiers = text
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    /// True when no constraint was declared.
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Checks whether an installed version string satisfies every clause.
    ///
    /// Unparsable installed versions only satisfy `===` clauses with the
    /// identical text. Pre-releases are rejected unless a clause names one.
    pub fn contains(&self, installed: &str) -> bool {
        if self.is_empty() {
            return true;
        }

        let Ok(candidate) = Version::parse(installed) else {
            let installed = installed.trim();
            return self.specifiers.iter().all(|spec| {
                spec.operator == Operator::Arbitrary && spec.text.eq_ignore_ascii_case(installed)
            });
        };

        let allow_prerelease = self.specifiers.iter().any(Specifier::names_prerelease);
        if candidate.is_prerelease() && !allow_prerelease {
            return false;
        }

        self.specifiers.iter().all(|spec| spec.contains(&candidate))
    }
}

impl fmt::Display for SpecifierSet {
    /// Clauses sorted descending by their text, so `>` sorts before `<`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut clauses: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        clauses.sort_unstable_by(|a, b| b.cmp(a));
        f.write_str(&clauses.join(","))
    }
}
