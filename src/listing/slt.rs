//! Parser for 7-Zip technical listings (`7z l -slt`).
//!
//! The output starts with a header block describing the archive, terminated by a
//! line of ten dashes, followed by one block per entry separated by blank lines:
//!
//! ```text
//! Path = /data/a.7z.001
//! Type = Split
//! Multivolume = +
//! Volume Index = 0
//! Volumes = 2
//!
//! ----------
//! Path = docs
//! Folder = +
//! Modified = 2024-03-01 12:00:00
//!
//! Path = docs/readme.txt
//! Folder = -
//! Attributes = A
//! Modified = 2024-03-01 12:00:05
//! ```

use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

use super::{Listing, ListingEntry};
use crate::error::ListingError;
use crate::multi_volume::MultiVolumeInfo;

const SEPARATOR: &str = "----------";
const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Header facts about the archive as a whole
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Header {
    multi_volume: bool,
    volume_index: usize,
    volumes: usize,
}

/// Parse the full output of `7z l -slt <archive_path>`
///
/// Entries are inserted in reverse listing order (7-Zip lists children before
/// their directories in some formats) and the tree is sorted afterwards.
pub fn parse_slt(archive_path: &Path, output: &str) -> Result<Listing, ListingError> {
    let mut lines = output.lines();
    let header = parse_header(lines.by_ref().take_while(|line| line.trim_end() != SEPARATOR))?;

    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in lines.chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !block.is_empty()
                && let Some(entry) = parse_entry(&block)?
            {
                entries.push(entry);
            }
            block.clear();
        } else {
            block.push(line);
        }
    }

    debug!(
        archive = ?archive_path,
        entries = entries.len(),
        multi_volume = header.multi_volume,
        "parsed technical listing"
    );

    let mut listing = Listing::from_entries(archive_path, entries.into_iter().rev());
    if header.multi_volume {
        // `Volumes` counts the opened volume and the ones after it
        let count = (header.volume_index + header.volumes).max(1);
        if let Some(info) = MultiVolumeInfo::from_header(archive_path, count) {
            listing = listing.with_multi_volume(info);
        }
    }
    Ok(listing)
}

fn key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(" =")?;
    Some((key.trim(), value.trim()))
}

fn parse_count(line: &str, value: &str) -> Result<usize, ListingError> {
    value.parse().map_err(|_| ListingError::Malformed {
        line: line.to_string(),
        reason: "expected a number".into(),
    })
}

fn parse_header<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Header, ListingError> {
    let mut header = Header::default();
    for line in lines {
        match key_value(line) {
            Some(("Multivolume", value)) => header.multi_volume = value == "+",
            Some(("Volume Index", value)) => header.volume_index = parse_count(line, value)?,
            Some(("Volumes", value)) => header.volumes = parse_count(line, value)?,
            _ => {}
        }
    }
    Ok(header)
}

fn parse_entry(block: &[&str]) -> Result<Option<ListingEntry>, ListingError> {
    let mut path = None;
    let mut is_dir = false;
    let mut modified = None;

    for line in block {
        match key_value(line) {
            Some(("Path", value)) => {
                if looks_misdecoded(value) {
                    return Err(ListingError::InvalidUtf8(value.to_string()));
                }
                path = Some(value.to_string());
            }
            Some(("Folder", value)) => is_dir |= value == "+",
            Some(("Attributes", value)) => is_dir |= value.starts_with('D'),
            Some(("Modified", "")) => {}
            Some(("Modified", value)) => {
                let parsed = NaiveDateTime::parse_from_str(value, MODIFIED_FORMAT).map_err(|e| {
                    ListingError::Malformed {
                        line: line.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                modified = Some(parsed);
            }
            _ => {}
        }
    }

    Ok(path.map(|path| ListingEntry {
        path,
        is_dir,
        modified,
    }))
}

/// Whether a name most likely went through the wrong codepage
///
/// More than half of the characters being replacement characters, half-width
/// katakana or Latin-1/Latin Extended letters is the typical result of reading
/// GBK or Shift-JIS names as another codepage.
fn looks_misdecoded(name: &str) -> bool {
    let total = name.chars().count();
    if total == 0 {
        return false;
    }
    let suspicious = name
        .chars()
        .filter(|&c| {
            c == char::REPLACEMENT_CHARACTER
                || ('\u{FF61}'..='\u{FF9F}').contains(&c)
                || ('\u{0080}'..='\u{02FF}').contains(&c)
        })
        .count();
    suspicious * 2 > total
}
