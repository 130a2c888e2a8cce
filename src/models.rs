use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Digest algorithms computed for every file, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
}

impl Algorithm {
    pub const COUNT: usize = 3;

    pub fn all() -> [Algorithm; Algorithm::COUNT] {
        [Algorithm::Md5, Algorithm::Sha1, Algorithm::Sha256]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "MD5",
            Algorithm::Sha1 => "SHA1",
            Algorithm::Sha256 => "SHA256",
        }
    }

    /// Position of the algorithm in `all()`.
    pub fn index(&self) -> usize {
        match self {
            Algorithm::Md5 => 0,
            Algorithm::Sha1 => 1,
            Algorithm::Sha256 => 2,
        }
    }

    pub fn digest_len(&self) -> usize {
        match self {
            Algorithm::Md5 => 16,
            Algorithm::Sha1 => 20,
            Algorithm::Sha256 => 32,
        }
    }

    pub fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }

    pub fn description(&self) -> &'static str {
        match self {
            Algorithm::Md5 => "Legacy, not recommended for security",
            Algorithm::Sha1 => "Legacy, collisions are practical",
            Algorithm::Sha256 => "Industry standard, widely used",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown digest algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(Algorithm::Md5),
            "SHA1" | "SHA-1" => Ok(Algorithm::Sha1),
            "SHA256" | "SHA-256" => Ok(Algorithm::Sha256),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Outcome of hashing one file with one algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestResult {
    pub algorithm: Algorithm,
    /// Lowercase hex digest, or the error text shown in its place.
    pub outcome: Result<String, String>,
}

impl DigestResult {
    pub fn success(algorithm: Algorithm, hex: String) -> Self {
        Self { algorithm, outcome: Ok(hex) }
    }

    pub fn failure(algorithm: Algorithm, message: String) -> Self {
        Self { algorithm, outcome: Err(message) }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn hex(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.as_ref().err().map(String::as_str)
    }

    /// Text to display for this result: the digest or the error message.
    pub fn text(&self) -> &str {
        match &self.outcome {
            Ok(hex) => hex,
            Err(message) => message,
        }
    }
}

/// Results keyed by algorithm. Empty while nothing has been computed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSet {
    results: BTreeMap<Algorithm, DigestResult>,
}

impl DigestSet {
    pub fn get(&self, algorithm: Algorithm) -> Option<&DigestResult> {
        self.results.get(&algorithm)
    }

    /// The successful hex digest for `algorithm`, if there is one.
    pub fn digest(&self, algorithm: Algorithm) -> Option<&str> {
        self.get(algorithm).and_then(DigestResult::hex)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DigestResult> {
        self.results.values()
    }

    pub fn is_complete(&self) -> bool {
        Algorithm::all().iter().all(|a| self.results.contains_key(a))
    }
}

impl FromIterator<DigestResult> for DigestSet {
    fn from_iter<I: IntoIterator<Item = DigestResult>>(iter: I) -> Self {
        let results = iter.into_iter().map(|r| (r.algorithm, r)).collect();
        Self { results }
    }
}

/// Identifies one `process_file` call. Later sessions have larger ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// All digests of one file, handed to the consumer once every algorithm reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSession {
    pub id: SessionId,
    pub path: PathBuf,
    pub results: DigestSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    EmptyExpected,
    Matches(Algorithm),
    NoMatch,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::EmptyExpected => write!(f, "Enter or paste an expected value to check..."),
            MatchOutcome::Matches(algorithm) => write!(f, "Expected equals {}", algorithm),
            MatchOutcome::NoMatch => write!(f, "Expected doesn't equal any hash"),
        }
    }
}
