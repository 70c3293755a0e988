// 📋 Roster - canonical identities
// Composite names "<full name> [<class>]" are parsed ONCE at load time.
//
// Problem solved:
// - "Jane Doe [10A]" → RosterEntry { full_name: "Jane Doe", class: "10A" }
// - A malformed roster line fails the run before any attendance row is read

use crate::error::{PresenceError, PresenceResult};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

// ============================================================================
// ROSTER ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Composite name exactly as stored in the roster
    pub composite: String,

    /// Full name (text before the class suffix)
    pub full_name: String,

    /// Class / group label (text inside the brackets)
    pub class: String,
}

impl RosterEntry {
    /// Parse a composite `"<full name> [<class>]"` name
    pub fn parse(composite: &str) -> PresenceResult<Self> {
        let open = composite
            .find('[')
            .ok_or_else(|| PresenceError::structural(composite))?;

        let class = composite[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| PresenceError::structural(composite))?;

        let full_name = composite[..open].trim_end();

        if full_name.is_empty() || class.is_empty() {
            return Err(PresenceError::structural(composite));
        }

        Ok(RosterEntry {
            composite: composite.to_string(),
            full_name: full_name.to_string(),
            class: class.to_string(),
        })
    }
}

// ============================================================================
// ROSTER
// ============================================================================

/// Ordered list of roster entries; order is the tie-break order of the matcher
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Name")]
    name: String,
}

impl Roster {
    /// Build a roster from composite names, validating every one
    pub fn from_composites<I, S>(names: I) -> PresenceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = names
            .into_iter()
            .map(|name| RosterEntry::parse(name.as_ref().trim()))
            .collect::<PresenceResult<Vec<_>>>()?;

        Ok(Roster { entries })
    }

    /// Load a roster file.
    ///
    /// `.csv` files need a `Name` column; anything else is read as one
    /// composite name per line (blank lines ignored).
    pub fn from_file(path: &Path) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let names: Vec<String> = if is_csv {
            let mut rdr = csv::Reader::from_path(path)
                .with_context(|| format!("Failed to open roster file: {}", path.display()))?;

            let mut names = Vec::new();
            for (line_num, result) in rdr.deserialize::<RosterRow>().enumerate() {
                let row = result.with_context(|| {
                    format!("Failed to parse roster line {} in {}", line_num + 2, path.display())
                })?;
                names.push(row.name);
            }
            names
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read roster file: {}", path.display()))?
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()
        };

        let roster = Roster::from_composites(&names)?;
        Ok(roster)
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&RosterEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn composites(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.composite.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
