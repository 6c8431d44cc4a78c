//! Directory search with attribute filters.
//!
//! A [`Finder`] walks one directory and yields the entries whose names
//! match a `*`/`?` wildcard pattern and whose [`FileAttributes`] pass an
//! [`AttributeFilter`]. Matching is ASCII case-insensitive, since game
//! data paths are compared lowercased.

use std::fmt;
use std::fs::{self, Metadata, ReadDir};
use std::io;
use std::ops::BitOr;
use std::path::{Path, PathBuf};

/// Set of file attribute flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileAttributes(u32);

impl FileAttributes {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Archive bit (regular files on Unix).
    pub const ARCHIVE: Self = Self(0x01);
    /// Hidden entry (dot-files on Unix).
    pub const HIDDEN: Self = Self(0x02);
    /// Not writable.
    pub const READ_ONLY: Self = Self(0x04);
    /// A directory.
    pub const SUBDIR: Self = Self(0x08);
    /// System file (never set on Unix).
    pub const SYSTEM: Self = Self(0x10);

    /// Raw flag bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Build from raw bits, dropping unknown flags.
    pub fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & 0x1F)
    }

    /// Whether every flag in `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Derive attributes for the entry `name` from its metadata.
    pub fn from_metadata(name: &str, meta: &Metadata) -> Self {
        let mut attrs = Self::NONE;
        if meta.permissions().readonly() {
            attrs = attrs | Self::READ_ONLY;
        }
        if meta.is_dir() {
            attrs = attrs | Self::SUBDIR;
        }
        attrs | Self::platform_flags(name, meta)
    }

    #[cfg(windows)]
    fn platform_flags(_name: &str, meta: &Metadata) -> Self {
        use std::os::windows::fs::MetadataExt;
        use windows_sys::Win32::Storage::FileSystem::{
            FILE_ATTRIBUTE_ARCHIVE, FILE_ATTRIBUTE_HIDDEN, FILE_ATTRIBUTE_SYSTEM,
        };

        let raw = meta.file_attributes();
        let mut attrs = Self::NONE;
        if raw & FILE_ATTRIBUTE_HIDDEN != 0 {
            attrs = attrs | Self::HIDDEN;
        }
        if raw & FILE_ATTRIBUTE_SYSTEM != 0 {
            attrs = attrs | Self::SYSTEM;
        }
        if raw & FILE_ATTRIBUTE_ARCHIVE != 0 {
            attrs = attrs | Self::ARCHIVE;
        }
        attrs
    }

    #[cfg(not(windows))]
    fn platform_flags(name: &str, meta: &Metadata) -> Self {
        let mut attrs = Self::NONE;
        if name.starts_with('.') {
            attrs = attrs | Self::HIDDEN;
        }
        if meta.is_file() {
            attrs = attrs | Self::ARCHIVE;
        }
        attrs
    }
}

impl BitOr for FileAttributes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for FileAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(FileAttributes, &str); 5] = [
            (FileAttributes::ARCHIVE, "ARCHIVE"),
            (FileAttributes::HIDDEN, "HIDDEN"),
            (FileAttributes::READ_ONLY, "READ_ONLY"),
            (FileAttributes::SUBDIR, "SUBDIR"),
            (FileAttributes::SYSTEM, "SYSTEM"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// Attributes an entry must have and must not have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributeFilter {
    /// Every one of these must be present.
    pub must_have: FileAttributes,
    /// None of these may be present.
    pub cant_have: FileAttributes,
}

impl AttributeFilter {
    /// A filter that accepts everything.
    pub const ANY: Self = Self {
        must_have: FileAttributes::NONE,
        cant_have: FileAttributes::NONE,
    };

    /// Build a filter.
    pub fn new(must_have: FileAttributes, cant_have: FileAttributes) -> Self {
        Self {
            must_have,
            cant_have,
        }
    }

    /// Whether an entry with attributes `found` passes.
    pub fn matches(&self, found: FileAttributes) -> bool {
        !found.intersects(self.cant_have) && found.contains(self.must_have)
    }
}

/// Match `name` against a wildcard `pattern` (`*` = any run, `?` = any
/// single character), ignoring ASCII case.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    // Position of the last `*` seen and the name index it is matched up to.
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        match p.get(pi) {
            Some('*') => {
                star = Some((pi, ni));
                pi += 1;
            }
            Some(&c) if c == '?' || c.eq_ignore_ascii_case(&n[ni]) => {
                pi += 1;
                ni += 1;
            }
            _ => match star {
                Some((sp, sn)) => {
                    pi = sp + 1;
                    ni = sn + 1;
                    star = Some((sp, sn + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Iterator over the entries of one directory that match a pattern and
/// an attribute filter.
///
/// Yields `dir/name` paths. Entries that fail the pattern or the filter,
/// or whose metadata cannot be read, are skipped. A directory that
/// cannot be opened produces an empty search.
pub struct Finder {
    dir: PathBuf,
    pattern: String,
    filter: AttributeFilter,
    entries: Option<ReadDir>,
}

impl Finder {
    /// Start a search for `path`, whose last component is the wildcard
    /// pattern (for example `baseq2/*.pak`).
    pub fn new(path: impl AsRef<Path>, filter: AttributeFilter) -> Self {
        let path = path.as_ref();
        let pattern = path
            .file_name()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| "*".to_owned());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => Some(entries),
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "find: cannot open directory");
                None
            }
        };
        Self {
            dir,
            pattern,
            filter,
            entries,
        }
    }

    /// The directory being searched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The wildcard pattern names are matched against.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Iterator for Finder {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let entries = self.entries.as_mut()?;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(dir = %self.dir.display(), error = %err, "find: unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !wildcard_match(&self.pattern, &name) {
                continue;
            }
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(err) => {
                    tracing::warn!(entry = %name, error = %err, "find: no metadata");
                    continue;
                }
            };
            if self.filter.matches(FileAttributes::from_metadata(&name, &meta)) {
                return Some(self.dir.join(&*name));
            }
        }
        None
    }
}

/// Create the directory `path`; its parent must exist. An existing
/// directory is not an error.
pub fn make_dir(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::create_dir(path.as_ref()) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_basics() {
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("*", ""));
        assert!(wildcard_match("*.pak", "pak0.pak"));
        assert!(!wildcard_match("*.pak", "pak0.pk3"));
        assert!(wildcard_match("pak?.pak", "pak1.pak"));
        assert!(!wildcard_match("pak?.pak", "pak10.pak"));
        assert!(wildcard_match("*.*", "config.cfg"));
        assert!(!wildcard_match("", "a"));
    }

    #[test]
    fn wildcard_backtracks() {
        assert!(wildcard_match("*a*b", "xxaxxab"));
        assert!(wildcard_match("a*b*c", "abbbc"));
        assert!(!wildcard_match("a*b*c", "abbb"));
        assert!(wildcard_match("**x", "x"));
    }

    #[test]
    fn wildcard_ignores_ascii_case() {
        assert!(wildcard_match("*.PAK", "pak0.pak"));
        assert!(wildcard_match("Maps/*", "maps/base1"));
    }

    #[test]
    fn question_mark_matches_one_character() {
        assert!(wildcard_match("a?b", "aéb"));
        assert!(wildcard_match("save?.sav", "save\u{2603}.sav"));
        assert!(!wildcard_match("a?b", "aééb"));
        assert!(wildcard_match("*é*", "café.cfg"));
        // Case folding stays ASCII-only.
        assert!(!wildcard_match("É", "é"));
    }

    #[test]
    fn filter_rules() {
        let dir_only = AttributeFilter::new(FileAttributes::SUBDIR, FileAttributes::HIDDEN);
        assert!(dir_only.matches(FileAttributes::SUBDIR));
        assert!(dir_only.matches(FileAttributes::SUBDIR | FileAttributes::READ_ONLY));
        assert!(!dir_only.matches(FileAttributes::ARCHIVE));
        assert!(!dir_only.matches(FileAttributes::SUBDIR | FileAttributes::HIDDEN));
        assert!(AttributeFilter::ANY.matches(FileAttributes::NONE));
        assert!(AttributeFilter::ANY.matches(FileAttributes::from_bits_truncate(0xFF)));
    }

    #[test]
    fn attribute_bits() {
        let attrs = FileAttributes::SUBDIR | FileAttributes::HIDDEN;
        assert_eq!(attrs.bits(), 0x0A);
        assert!(attrs.contains(FileAttributes::SUBDIR));
        assert!(!attrs.contains(FileAttributes::SUBDIR | FileAttributes::SYSTEM));
        assert!(attrs.intersects(FileAttributes::SUBDIR | FileAttributes::SYSTEM));
        assert!(FileAttributes::NONE.is_empty());
        assert_eq!(FileAttributes::from_bits_truncate(0xE0), FileAttributes::NONE);
        assert_eq!(format!("{attrs:?}"), "{HIDDEN, SUBDIR}");
    }

    #[test]
    fn missing_directory_is_an_empty_search() {
        let finder = Finder::new("definitely/not/here/*", AttributeFilter::ANY);
        assert_eq!(finder.count(), 0);
    }

    #[test]
    fn bare_pattern_searches_current_dir() {
        let finder = Finder::new("*.nothing-has-this-extension", AttributeFilter::ANY);
        assert_eq!(finder.dir(), Path::new("."));
        assert_eq!(finder.pattern(), "*.nothing-has-this-extension");
    }
}
