//! Multi-volume archive naming conventions.
//!
//! Recognizes these volume suffixes:
//! - `archive.part1.rar`, `archive.part01.rar` (new-style RAR, rank = part number)
//! - `archive.rar`, `archive.r00`, `archive.r01` (old-style RAR: `.rar` is volume 1,
//!   `.r00` volume 2 and so on)
//! - `archive.7z.001`, `archive.zip.001` (split 7z / zip)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static VOLUME_SUFFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\.part(?<rarpart>\d+)\.rar|\.r(?<rnum>\d{2,})|\.(?<ext>7z|zip)\.(?<extnum>\d+))$",
    )
    .ok()
});

/// The on-disk volumes of one logical archive
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiVolumeInfo {
    /// Volume paths in rank order
    pub volumes: Vec<PathBuf>,
    /// Path identifying the logical archive (normally the first volume)
    #[serde(alias = "actualPath")]
    pub canonical_path: PathBuf,
}

impl MultiVolumeInfo {
    /// Volume set described by a listing header
    ///
    /// `volumes` is the volume count the lister reported for the set that
    /// `path` belongs to. Returns `None` when `path` does not follow a known
    /// volume naming scheme.
    pub fn from_header(path: &Path, volumes: usize) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy();
        let name = VolumeName::parse(&file_name)
            .or_else(|| VolumeName::old_rar_first(&file_name))?;
        let count = volumes.max(name.rank);
        let volumes: Vec<PathBuf> = (1..=count)
            .map(|rank| path.with_file_name(name.file_name(rank)))
            .collect();
        let canonical_path = volumes.first()?.clone();
        Some(Self {
            volumes,
            canonical_path,
        })
    }

    /// Whether `path` is one of the volumes
    pub fn contains(&self, path: &Path) -> bool {
        self.volumes.iter().any(|v| v == path)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scheme {
    RarPart,
    RarOld,
    Numbered,
}

/// A file name split into its volume-independent stem and its rank
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeName {
    stem: String,
    scheme: Scheme,
    ext: String,
    rank: usize,
    width: usize,
}

impl VolumeName {
    /// Parse a volume file name; `None` if it carries no volume suffix
    ///
    /// A plain `.rar` is not treated as a volume here since it is just as
    /// often a single-file archive.
    pub fn parse(file_name: &str) -> Option<Self> {
        let regex = VOLUME_SUFFIX.as_ref()?;
        let captures = regex.captures(file_name)?;
        let whole = captures.get(0)?;
        let stem = file_name[..whole.start()].to_string();

        if let Some(part) = captures.name("rarpart") {
            Some(Self {
                stem,
                scheme: Scheme::RarPart,
                ext: String::new(),
                rank: part.as_str().parse().ok()?,
                width: part.as_str().len(),
            })
        } else if let Some(num) = captures.name("rnum") {
            let index: usize = num.as_str().parse().ok()?;
            Some(Self {
                stem,
                scheme: Scheme::RarOld,
                ext: String::new(),
                rank: index + 2,
                width: num.as_str().len(),
            })
        } else {
            let num = captures.name("extnum")?;
            Some(Self {
                stem,
                scheme: Scheme::Numbered,
                ext: captures.name("ext")?.as_str().to_string(),
                rank: num.as_str().parse().ok()?,
                width: num.as_str().len(),
            })
        }
    }

    fn old_rar_first(file_name: &str) -> Option<Self> {
        let lower = file_name.to_lowercase();
        if !lower.ends_with(".rar") {
            return None;
        }
        Some(Self {
            stem: file_name.get(..file_name.len() - 4)?.to_string(),
            scheme: Scheme::RarOld,
            ext: String::new(),
            rank: 1,
            width: 2,
        })
    }

    /// 1-based position of the volume in its set
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Whether this is the volume extraction starts from
    pub fn is_first(&self) -> bool {
        self.rank == 1
    }

    /// File name of the volume with the given rank in the same set
    pub fn file_name(&self, rank: usize) -> String {
        let width = self.width;
        match self.scheme {
            Scheme::RarPart => format!("{}.part{:0width$}.rar", self.stem, rank),
            Scheme::RarOld if rank <= 1 => format!("{}.rar", self.stem),
            Scheme::RarOld => format!("{}.r{:0width$}", self.stem, rank - 2),
            Scheme::Numbered => format!("{}.{}.{:0width$}", self.stem, self.ext, rank),
        }
    }
}

/// Path of the first volume for a non-first volume path
///
/// Returns `None` for first volumes and for files that are not volumes.
///
/// # Examples
///
/// ```
/// use unzip_progress::multi_volume::first_volume;
/// use std::path::PathBuf;
///
/// assert_eq!(first_volume("/d/a.7z.003"), Some(PathBuf::from("/d/a.7z.001")));
/// assert_eq!(first_volume("/d/a.part02.rar"), Some(PathBuf::from("/d/a.part01.rar")));
/// assert_eq!(first_volume("/d/a.7z.001"), None);
/// assert_eq!(first_volume("/d/a.zip"), None);
/// ```
pub fn first_volume<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    let path = path.as_ref();
    let name = VolumeName::parse(&path.file_name()?.to_string_lossy())?;
    if name.is_first() {
        None
    } else {
        Some(path.with_file_name(name.file_name(1)))
    }
}

/// Paths of volumes `1..=count` of the set `path` belongs to
pub fn volume_paths<P: AsRef<Path>>(path: P, count: usize) -> Vec<PathBuf> {
    let path = path.as_ref();
    let Some(file_name) = path.file_name() else {
        return Vec::new();
    };
    match VolumeName::parse(&file_name.to_string_lossy()) {
        Some(name) => (1..=count)
            .map(|rank| path.with_file_name(name.file_name(rank)))
            .collect(),
        None => Vec::new(),
    }
}
