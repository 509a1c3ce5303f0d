//! Human-readable renderings of operation responses.
//!
//! The JSON records are the machine interface; these strings are what a person (or a model
//! reading tool output) sees.
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::ops::{
    CopyResponse, DeleteResponse, Entry, GlobResponse, ListDirResponse, MovePathResponse,
    RemoveResponse, TreeResponse,
};

pub fn list_dir(response: &ListDirResponse) -> String {
    if response.entries.is_empty() {
        return "(empty)".to_string();
    }
    let lines = response.entries.iter().map(entry_line).collect::<Vec<_>>();
    let mut out = lines.join("\n");
    if response.truncated {
        out.push_str("\n(truncated)");
    }
    out
}

/// `{type:<4} {size:>12}B {mtime} {path}`; the mtime is RFC 3339 in UTC, `-` when unknown.
pub fn entry_line(entry: &Entry) -> String {
    let modified = entry
        .modified_ms
        .and_then(|ms| i64::try_from(ms).ok())
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<4} {:>12}B {} {}",
        entry.kind.as_str(),
        entry.size_bytes,
        modified,
        entry.path.display()
    )
}

pub fn tree(response: &TreeResponse) -> String {
    response.tree.clone()
}

pub fn glob(response: &GlobResponse) -> String {
    let mut out = format!("Found {} files:\n", response.files.len());
    if response.files.is_empty() {
        out.push_str("(none)");
        return out;
    }
    for file in &response.files {
        let _ = writeln!(out, "{}", file.display());
    }
    if response.truncated {
        out.push_str("(truncated)\n");
    }
    out
}

pub fn copy(response: &CopyResponse) -> String {
    format!(
        "Copied {} to {}",
        response.source.display(),
        response.destination.display()
    )
}

pub fn move_path(response: &MovePathResponse) -> String {
    format!(
        "Moved {} to {}",
        response.source.display(),
        response.destination.display()
    )
}

pub fn delete(response: &DeleteResponse) -> String {
    format!("Deleted file {}", response.path.display())
}

pub fn remove(response: &RemoveResponse) -> String {
    let action = if response.recursive {
        "Recursively removed"
    } else {
        "Removed"
    };
    format!("{action} {}", response.path.display())
}
