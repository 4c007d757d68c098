//! Incremental update distribution
//!
//! The update directory holds files named after the version that introduced
//! them:
//!
//! ```text
//! 1.2-update.sql   -> ("sql", ...)
//! 1.3-config.py    -> ("config", ...)
//! 1.4-bash.sh      -> ("shell", ...)
//! bash.sh          -> ("shell", ...)   always sent last
//! ```
//!
//! A request for `from-to` returns one file per version in that inclusive
//! range (sql before config before shell), oldest first, then the
//! unversioned script.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Versioned file kinds in the order they are looked up for one version
const VERSIONED_KINDS: [(&str, UpdateKind); 3] = [
    ("update.sql", UpdateKind::Sql),
    ("config.py", UpdateKind::Config),
    ("bash.sh", UpdateKind::Shell),
];

/// Unversioned script sent with every update
const TRAILING_SCRIPT: &str = "bash.sh";

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("expected two versions joined by '-', got {0:?}")]
    MalformedRange(String),

    #[error("invalid version {0:?}")]
    InvalidVersion(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// `major.minor` release number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UpdateError::InvalidVersion(s.to_string());
        let (major, minor) = s.split_once('.').unwrap_or((s, "0"));
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parse a `from-to` range
pub fn parse_range(range: &str) -> Result<(Version, Version), UpdateError> {
    let (from, to) = range
        .split_once('-')
        .ok_or_else(|| UpdateError::MalformedRange(range.to_string()))?;
    Ok((from.parse()?, to.parse()?))
}

/// What an update file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Sql,
    Config,
    Shell,
}

/// One file to apply, serialized as `[kind, content]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFile(pub UpdateKind, pub String);

/// Collect the files for a `from-to` range out of `dir`
pub fn collect(dir: &Path, range: &str) -> Result<Vec<UpdateFile>, UpdateError> {
    let (from, to) = parse_range(range)?;

    // Version -> (rank in VERSIONED_KINDS, file name); lowest rank wins
    let mut selected: BTreeMap<Version, (usize, String)> = BTreeMap::new();
    let mut trailing = false;

    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name == TRAILING_SCRIPT {
            trailing = true;
            continue;
        }
        let Some((prefix, suffix)) = name.split_once('-') else {
            continue;
        };
        let Ok(version) = prefix.parse::<Version>() else {
            continue;
        };
        if version < from || version > to {
            continue;
        }
        let Some(rank) = VERSIONED_KINDS.iter().position(|(s, _)| *s == suffix) else {
            continue;
        };

        if selected.get(&version).map_or(true, |(held, _)| rank < *held) {
            selected.insert(version, (rank, name));
        }
    }

    let mut files = Vec::with_capacity(selected.len() + 1);
    for (rank, name) in selected.into_values() {
        let kind = VERSIONED_KINDS[rank].1;
        files.push(UpdateFile(kind, std::fs::read_to_string(dir.join(name))?));
    }
    if trailing {
        files.push(UpdateFile(
            UpdateKind::Shell,
            std::fs::read_to_string(dir.join(TRAILING_SCRIPT))?,
        ));
    }
    Ok(files)
}
