//! PEP 440 version parsing and ordering.
//!
//! Only the parts needed to compare installed versions against declared
//! constraints are modeled: epoch, release, pre/post/dev segments and the
//! local label.

use std::cmp::Ordering;
use std::fmt;

/// Errors produced while parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The input was empty after trimming.
    #[error("empty version string")]
    Empty,

    /// The input did not follow the expected version grammar.
    #[error("invalid version '{input}': {reason}")]
    Invalid {
        /// The original text
        input: String,
        /// What went wrong
        reason: &'static str,
    },
}

/// Pre-release phase, ordered alpha < beta < release candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl PreKind {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "rc" | "c" | "pre" | "preview" => Some(Self::Rc),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Alpha => "a",
            Self::Beta => "b",
            Self::Rc => "rc",
        }
    }
}

/// A segment of the local version label (`+ubuntu.1`).
///
/// Numeric segments sort after alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocalSegment {
    Text(String),
    Number(u64),
}

/// A parsed package version.
///
/// # Example
///
/// ```rust
/// use pkgdeptree::version::Version;
///
/// let v = Version::parse("1!2.0.post3.dev1+local.7").unwrap();
/// assert_eq!(v.epoch(), 1);
/// assert_eq!(v.release(), &[2, 0]);
/// assert!(v.is_prerelease());
/// assert!(v.is_postrelease());
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Vec<LocalSegment>,
}

// Sort keys mirror the PEP 440 rules: a dev-only release sorts before any
// pre-release of the same base, and a final release after all of them.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreKind, u64),
    Final,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    Final,
}

impl Version {
    /// Parses a version string.
    ///
    /// Accepts an optional leading `v`, is case-insensitive and tolerates
    /// the usual alternative spellings (`alpha`, `-1` as post-release, ...).
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let lowered = input.trim().to_ascii_lowercase();
        if lowered.is_empty() {
            return Err(VersionError::Empty);
        }
        let invalid = |reason| VersionError::Invalid {
            input: input.to_string(),
            reason,
        };

        let text = lowered.strip_prefix('v').unwrap_or(&lowered);
        let (public, local) = match text.split_once('+') {
            Some((public, local)) => (public, Some(local)),
            None => (text, None),
        };
        let (epoch, rest) = match public.split_once('!') {
            Some((epoch, rest)) => (
                epoch.parse().map_err(|_| invalid("epoch is not a number"))?,
                rest,
            ),
            None => (0, public),
        };

        let mut cursor = Cursor::new(rest);
        let mut release = vec![cursor.number().ok_or_else(|| invalid("missing release number"))?];
        while cursor.peek() == Some(b'.') && cursor.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            cursor.bump();
            release.push(cursor.number().ok_or_else(|| invalid("bad release segment"))?);
        }

        let pre = cursor.labeled_segment(|word| PreKind::from_word(word));
        let post = if cursor.peek() == Some(b'-') && cursor.peek_at(1).is_some_and(|b| b.is_ascii_digit()) {
            cursor.bump();
            cursor.number()
        } else {
            cursor
                .labeled_segment(|word| matches!(word, "post" | "rev" | "r").then_some(()))
                .map(|((), n)| n)
        };
        let dev = cursor
            .labeled_segment(|word| (word == "dev").then_some(()))
            .map(|((), n)| n);

        if !cursor.is_done() {
            return Err(invalid("unexpected trailing characters"));
        }

        let local = match local {
            Some(label) => parse_local(label).ok_or_else(|| invalid("bad local label"))?,
            None => Vec::new(),
        };

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// Returns the epoch (`N!` prefix), zero when absent.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the release segments as written.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// True for pre-releases and dev-releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// True for post-releases.
    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// True when a local label (`+...`) is present.
    pub fn has_local(&self) -> bool {
        !self.local.is_empty()
    }

    /// Returns a copy without the local label.
    pub fn public(&self) -> Self {
        Self {
            local: Vec::new(),
            ..self.clone()
        }
    }

    /// Returns the epoch and release only (`1.2.3rc1.post4` -> `1.2.3`).
    pub fn base(&self) -> Self {
        Self {
            epoch: self.epoch,
            release: self.release.clone(),
            pre: None,
            post: None,
            dev: None,
            local: Vec::new(),
        }
    }

    /// Checks whether this version's release starts with `prefix`, with
    /// missing trailing segments treated as zero.
    pub fn release_starts_with(&self, epoch: u64, prefix: &[u64]) -> bool {
        self.epoch == epoch
            && prefix
                .iter()
                .enumerate()
                .all(|(i, part)| self.release.get(i).copied().unwrap_or(0) == *part)
    }

    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&part| part != 0)
            .map_or(0, |pos| pos + 1);
        &self.release[..end]
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            (None, _, _) => PreKey::Final,
        }
    }

    fn dev_key(&self) -> DevKey {
        self.dev.map_or(DevKey::Final, DevKey::Dev)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.trimmed_release().cmp(other.trimmed_release()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        write!(f, "{}", release.join("."))?;
        if let Some((kind, n)) = self.pre {
            write!(f, "{}{}", kind.label(), n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if !self.local.is_empty() {
            let local: Vec<String> = self
                .local
                .iter()
                .map(|segment| match segment {
                    LocalSegment::Text(text) => text.clone(),
                    LocalSegment::Number(n) => n.to_string(),
                })
                .collect();
            write!(f, "+{}", local.join("."))?;
        }
        Ok(())
    }
}

fn parse_local(label: &str) -> Option<Vec<LocalSegment>> {
    label
        .split(['.', '-', '_'])
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
                None
            } else if let Ok(n) = segment.parse() {
                Some(LocalSegment::Number(n))
            } else {
                Some(LocalSegment::Text(segment.to_string()))
            }
        })
        .collect()
}

/// Byte cursor over the public part of a version string.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn is_done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn number(&mut self) -> Option<u64> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.bump();
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
    }

    fn separator(&mut self) {
        if matches!(self.peek(), Some(b'.' | b'-' | b'_')) {
            self.bump();
        }
    }

    fn word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.bump();
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default()
    }

    /// Consumes `[sep] word [sep] [number]` when `accept` recognizes the
    /// word, otherwise leaves the cursor untouched.
    fn labeled_segment<T>(&mut self, accept: impl Fn(&str) -> Option<T>) -> Option<(T, u64)> {
        let start = self.pos;
        self.separator();
        let Some(label) = accept(self.word()) else {
            self.pos = start;
            return None;
        };

        let before_number = self.pos;
        self.separator();
        match self.number() {
            Some(n) => Some((label, n)),
            None => {
                self.pos = before_number;
                Some((label, 0))
            }
        }
    }
}
