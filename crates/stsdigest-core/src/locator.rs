//! Run discovery and directory-name identity parsing.
//!
//! Runs live at `<root>/<category>/<run>/`. The run directory name encodes
//! where the tested bitstream came from:
//!
//! - `encrypted_<category>_<seed>`: ciphertext of generated plaintext
//! - `<category>_from_text_<seed>`: cipher transform applied to text-derived input
//!
//! Anything else is still a run, just one without identity.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::layout::ReportLayout;

/// Prefix of ciphertext-derived run directories.
pub const CIPHERTEXT_PREFIX: &str = "encrypted";

static ENCRYPTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{CIPHERTEXT_PREFIX}_(\w+?)_(\d+)$")).expect("invalid ENCRYPTED_RE pattern")
});
static FROM_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+?)_from_text_(\d+)$").expect("invalid FROM_TEXT_RE pattern"));

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Where a run's bitstream originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OriginKind {
    /// Derived from ciphertext.
    #[serde(rename = "encrypted")]
    Encrypted,
    /// Derived from plaintext through the cipher transform.
    #[serde(rename = "from_text")]
    FromText,
}

impl OriginKind {
    pub const ALL: [OriginKind; 2] = [OriginKind::Encrypted, OriginKind::FromText];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Encrypted => "encrypted",
            Self::FromText => "from_text",
        }
    }
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a run directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunName {
    Encrypted { category: String, seed: u64 },
    FromText { category: String, seed: u64 },
    Unknown,
}

impl RunName {
    /// Try the ciphertext convention first, then the plaintext one.
    pub fn parse(name: &str) -> Self {
        if let Some((category, seed)) = capture_category_seed(&ENCRYPTED_RE, name) {
            return Self::Encrypted { category, seed };
        }
        if let Some((category, seed)) = capture_category_seed(&FROM_TEXT_RE, name) {
            return Self::FromText { category, seed };
        }
        Self::Unknown
    }
}

fn capture_category_seed(re: &Regex, name: &str) -> Option<(String, u64)> {
    let caps = re.captures(name)?;
    let category = caps.get(1)?.as_str().to_string();
    // An out-of-range seed makes the name unrecognized, not a panic.
    let seed = caps.get(2)?.as_str().parse().ok()?;
    Some((category, seed))
}

/// Run metadata recovered from a directory name. Either all fields are set or
/// none are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    #[serde(rename = "cipher")]
    pub category: Option<String>,
    #[serde(rename = "source_type")]
    pub origin: Option<OriginKind>,
    pub seed: Option<u64>,
}

impl RunIdentity {
    pub fn from_dir_name(name: &str) -> Self {
        RunName::parse(name).into()
    }

    pub fn is_known(&self) -> bool {
        self.category.is_some() && self.origin.is_some() && self.seed.is_some()
    }
}

impl From<RunName> for RunIdentity {
    fn from(name: RunName) -> Self {
        match name {
            RunName::Encrypted { category, seed } => Self {
                category: Some(category),
                origin: Some(OriginKind::Encrypted),
                seed: Some(seed),
            },
            RunName::FromText { category, seed } => Self {
                category: Some(category),
                origin: Some(OriginKind::FromText),
                seed: Some(seed),
            },
            RunName::Unknown => Self::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Directory scan
// ---------------------------------------------------------------------------

/// A candidate run directory. It becomes a run only if its report exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCandidate {
    /// Category directory the run was found under.
    pub category: String,
    /// Run directory name.
    pub name: String,
    pub path: PathBuf,
}

/// Candidates found under one existing category directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRuns {
    pub category: String,
    pub candidates: Vec<RunCandidate>,
}

/// Enumerate run directories for every category of `layout` under `root`.
///
/// Missing or unreadable category directories are skipped with a warning and
/// do not appear in the result. Candidates are sorted by directory name.
pub fn locate_runs(root: &Path, layout: &ReportLayout) -> Vec<CategoryRuns> {
    let mut found = Vec::new();

    for category in &layout.categories {
        let category_dir = root.join(category);
        if !category_dir.is_dir() {
            log::warn!(
                "category directory {} does not exist, skipping",
                category_dir.display()
            );
            continue;
        }

        let entries = match std::fs::read_dir(&category_dir) {
            Ok(e) => e,
            Err(e) => {
                log::warn!("failed to read {}: {e}", category_dir.display());
                continue;
            }
        };

        let mut candidates: Vec<RunCandidate> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some(RunCandidate {
                    category: category.clone(),
                    name,
                    path,
                })
            })
            .collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        found.push(CategoryRuns {
            category: category.clone(),
            candidates,
        });
    }

    found
}
