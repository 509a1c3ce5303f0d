use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
fn sync_parent_directory(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    let parent_dir = fs::File::open(parent)?;
    parent_dir.sync_all()
}

#[cfg(unix)]
fn sync_rename_parents(src_path: &Path, dest_path: &Path) -> io::Result<()> {
    sync_parent_directory(dest_path)?;
    if src_path.parent() != dest_path.parent() {
        sync_parent_directory(src_path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_rename_parents(_src_path: &Path, _dest_path: &Path) -> io::Result<()> {
    Ok(())
}

/// `rename(2)` followed by a best-effort sync of both parent directories.
///
/// The rename result is what callers act on; a failed directory sync is only logged because
/// the entry has already moved.
pub(crate) fn rename_synced(src_path: &Path, dest_path: &Path) -> io::Result<()> {
    fs::rename(src_path, dest_path)?;
    if let Err(err) = sync_rename_parents(src_path, dest_path) {
        tracing::warn!(
            from = %src_path.display(),
            to = %dest_path.display(),
            error = %err,
            "rename applied, but syncing parent directories failed"
        );
    }
    Ok(())
}

/// Whether `err` is the OS signal for a rename that crosses filesystems.
pub(crate) fn is_cross_device(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(libc::EXDEV)
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// Compares the device of `source` with the device `destination` would land on.
///
/// The destination usually does not exist yet, so its nearest existing ancestor stands in for
/// it. Returns `None` where device ids are unavailable; callers then rely on the rename error.
#[cfg(unix)]
pub(crate) fn same_device(source: &Path, destination: &Path) -> io::Result<Option<bool>> {
    use std::os::unix::fs::MetadataExt;

    let source_dev = fs::symlink_metadata(source)?.dev();
    let mut probe = destination.parent();
    while let Some(dir) = probe {
        match fs::metadata(dir) {
            Ok(meta) => return Ok(Some(meta.dev() == source_dev)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => probe = dir.parent(),
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}

#[cfg(not(unix))]
pub(crate) fn same_device(_source: &Path, _destination: &Path) -> io::Result<Option<bool>> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_device_signal_is_recognized() {
        assert!(is_cross_device(&io::Error::from(
            io::ErrorKind::CrossesDevices
        )));
        assert!(!is_cross_device(&io::Error::from(
            io::ErrorKind::PermissionDenied
        )));
        #[cfg(unix)]
        assert!(is_cross_device(&io::Error::from_raw_os_error(libc::EXDEV)));
    }

    #[test]
    #[cfg(unix)]
    fn same_device_uses_nearest_existing_ancestor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("source.txt");
        fs::write(&source, b"x").expect("write");
        let destination = dir.path().join("missing/nested/dest.txt");
        assert_eq!(
            same_device(&source, &destination).expect("same_device"),
            Some(true)
        );
    }

    #[test]
    fn rename_synced_moves_the_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("a.txt");
        let destination = dir.path().join("b.txt");
        fs::write(&source, b"payload").expect("write");
        rename_synced(&source, &destination).expect("rename");
        assert!(!source.exists());
        assert_eq!(fs::read(&destination).expect("read"), b"payload");
    }
}
