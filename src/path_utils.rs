//! Path resolution shared by every operation.
//!
//! This module is intentionally **lexical**: it does not touch the filesystem and therefore does
//! not resolve symlinks or check existence. Its job is to turn caller-supplied strings into
//! absolute, normalized [`ResolvedPath`] values before any traversal or mutation sees them.
//!
//! Invariants of `normalize_path_lexical`:
//! - Removes `.` segments.
//! - Resolves `..` against preceding *normal* segments when possible.
//! - Preserves leading `..` for relative paths (e.g. `../../a/../b` → `../../b`).
//! - For absolute paths, `..` cannot escape the filesystem root (e.g. `/../etc` → `/etc`).
//! - On Windows, preserves path prefixes (Disk/UNC/verbatim) and does not drop them when
//!   normalizing.
use std::borrow::Cow;
use std::ffi::OsString;
use std::fmt;
use std::ops::Deref;
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// An absolute, lexically normalized path.
///
/// Only [`resolve`] and [`resolve_from`] construct one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }

    /// Whether `self` is `other` or lies underneath it.
    pub fn is_within(&self, other: &ResolvedPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl Deref for ResolvedPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl Serialize for ResolvedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Resolves `raw` against the process working directory.
pub fn resolve(raw: impl AsRef<Path>) -> Result<ResolvedPath> {
    let raw = raw.as_ref();
    validate_raw_path(raw)?;
    if raw.is_absolute() {
        return Ok(ResolvedPath(normalize_path_lexical(raw)));
    }
    let cwd = std::env::current_dir().map_err(|err| {
        Error::InvalidPath(format!(
            "failed to resolve {}: current directory is unavailable: {err}",
            raw.display()
        ))
    })?;
    Ok(ResolvedPath(normalize_path_lexical(&cwd.join(raw))))
}

/// Resolves `raw` against `base`, which must itself be absolute.
pub fn resolve_from(base: &Path, raw: impl AsRef<Path>) -> Result<ResolvedPath> {
    let raw = raw.as_ref();
    validate_raw_path(raw)?;
    if raw.is_absolute() {
        return Ok(ResolvedPath(normalize_path_lexical(raw)));
    }
    if !base.is_absolute() {
        return Err(Error::InvalidPath(format!(
            "base directory {} is not absolute",
            base.display()
        )));
    }
    Ok(ResolvedPath(normalize_path_lexical(&base.join(raw))))
}

fn validate_raw_path(raw: &Path) -> Result<()> {
    let bytes = raw.as_os_str().as_encoded_bytes();
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::InvalidPath("path must not be empty".to_string()));
    }
    if bytes.contains(&0) {
        return Err(Error::InvalidPath(format!(
            "path {:?} contains an interior NUL byte",
            raw
        )));
    }
    Ok(())
}

#[cfg(windows)]
#[inline]
pub(crate) fn normalize_glob_pattern(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') {
        return Cow::Borrowed(pattern);
    }
    Cow::Owned(pattern.replace('\\', "/"))
}

#[cfg(not(windows))]
#[inline]
pub(crate) fn normalize_glob_pattern(pattern: &str) -> Cow<'_, str> {
    Cow::Borrowed(pattern)
}

/// Splits a path into its normal components as UTF-8 strings (lossily), dropping roots,
/// prefixes and `.` segments. Used to feed the component-wise pattern matcher.
pub(crate) fn path_components_lossy(path: &Path) -> Vec<Cow<'_, str>> {
    path.components()
        .filter_map(|comp| match comp {
            Component::Normal(part) => Some(part.to_string_lossy()),
            Component::ParentDir => Some(Cow::Borrowed("..")),
            _ => None,
        })
        .collect()
}

pub(crate) fn normalize_path_lexical(path: &Path) -> PathBuf {
    #[derive(Debug)]
    enum Segment {
        ParentDir,
        Normal(OsString),
    }

    let mut path_prefix: Option<OsString> = None;
    let mut has_root = false;
    let mut segments: Vec<Segment> = Vec::new();

    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(segments.last(), Some(Segment::Normal(_))) {
                    segments.pop();
                } else if !has_root {
                    segments.push(Segment::ParentDir);
                }
            }
            Component::Normal(part) => segments.push(Segment::Normal(part.to_os_string())),
            Component::RootDir => {
                has_root = true;
            }
            Component::Prefix(prefix_comp) => {
                path_prefix = Some(prefix_comp.as_os_str().to_os_string());
            }
        }
    }

    let mut out = PathBuf::new();
    if let Some(prefix) = path_prefix {
        out.push(Path::new(&prefix));
    }
    if has_root {
        if out.as_os_str().is_empty() {
            #[cfg(windows)]
            out.push("\\");
            #[cfg(not(windows))]
            out.push("/");
        } else {
            // Pushing `RootDir` after `Prefix` on Windows drops the prefix.
            #[cfg(windows)]
            {
                out.as_mut_os_string()
                    .push(std::path::MAIN_SEPARATOR.to_string());
            }
            #[cfg(not(windows))]
            {
                out.push("/");
            }
        }
    }
    for segment in segments {
        match segment {
            Segment::ParentDir => out.push(".."),
            Segment::Normal(part) => out.push(part),
        }
    }

    if out.as_os_str().is_empty() && path.is_relative() {
        PathBuf::from(".")
    } else {
        out
    }
}
