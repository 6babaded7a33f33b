//! Filesystem primitives for materializing and removing mod directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Copy `src_dir` into `dst_dir`, replacing whatever was there.
///
/// The copy lands in a staging directory next to `dst_dir` and is renamed into
/// place, so a failed copy never leaves a half-written destination behind.
pub fn replace_dir_with_copy(src_dir: &Path, dst_dir: &Path) -> anyhow::Result<()> {
    let staging = staging_path(dst_dir)?;
    remove_path_if_exists(&staging)?;

    if let Err(err) = copy_payload(src_dir, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(err);
    }

    remove_path_if_exists(dst_dir)?;
    fs::rename(&staging, dst_dir).with_context(|| {
        format!(
            "Failed to move {} into place at {}",
            staging.display(),
            dst_dir.display()
        )
    })?;
    Ok(())
}

/// Remove a file or directory. Returns `false` if nothing was there.
pub fn remove_path_if_exists(path: &Path) -> anyhow::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("Failed to read metadata: {}", path.display())));
        }
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    } else {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file: {}", path.display()))?;
    }
    Ok(true)
}

/// `<parent>/.<name>.staging-<pid>`, with the parent created. Leftovers from
/// a crashed run are cleared by the caller.
fn staging_path(dst_dir: &Path) -> anyhow::Result<PathBuf> {
    let (Some(parent), Some(name)) = (dst_dir.parent(), dst_dir.file_name()) else {
        anyhow::bail!("Install path has no parent directory: {}", dst_dir.display());
    };
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    Ok(parent.join(format!(
        ".{}.staging-{}",
        name.to_string_lossy(),
        std::process::id()
    )))
}

/// Copy every regular file under `src` to the same relative path under `dst`.
fn copy_payload(src: &Path, dst: &Path) -> anyhow::Result<()> {
    let mut pending = vec![(src.to_path_buf(), dst.to_path_buf())];
    while let Some((from_dir, to_dir)) = pending.pop() {
        fs::create_dir_all(&to_dir)
            .with_context(|| format!("Failed to create directory: {}", to_dir.display()))?;
        let listing = fs::read_dir(&from_dir)
            .with_context(|| format!("Failed to read payload dir: {}", from_dir.display()))?;

        for entry in listing {
            let entry = entry?;
            let from = entry.path();
            let to = to_dir.join(entry.file_name());
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push((from, to));
            } else if file_type.is_file() {
                fs::copy(&from, &to)
                    .with_context(|| format!("Failed to copy payload file: {}", from.display()))?;
            } else {
                anyhow::bail!("Payload contains a non-regular file: {}", from.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replace_dir_with_copy_overwrites_destination() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("out").join("mod");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested").join("a.txt"), "new").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("stale.txt"), "old").unwrap();

        replace_dir_with_copy(&src, &dst).unwrap();

        assert_eq!(
            fs::read_to_string(dst.join("nested").join("a.txt")).unwrap(),
            "new"
        );
        assert!(!dst.join("stale.txt").exists());
    }

    #[test]
    fn test_replace_dir_with_missing_source_keeps_destination() {
        let temp = TempDir::new().unwrap();
        let dst = temp.path().join("mod");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("keep.txt"), "x").unwrap();

        assert!(replace_dir_with_copy(&temp.path().join("missing"), &dst).is_err());
        assert!(dst.join("keep.txt").exists());
    }

    #[test]
    fn test_replace_dir_clears_stale_staging_dir() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("mods").join("42");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("mod.pak"), "data").unwrap();
        let stale = staging_path(&dst).unwrap();
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("partial.pak"), "junk").unwrap();

        replace_dir_with_copy(&src, &dst).unwrap();

        assert!(dst.join("mod.pak").exists());
        assert!(!dst.join("partial.pak").exists());
        assert!(!stale.exists());
    }

    #[test]
    fn test_remove_path_if_exists() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gone");
        fs::create_dir_all(&dir).unwrap();

        assert!(remove_path_if_exists(&dir).unwrap());
        assert!(!remove_path_if_exists(&dir).unwrap());
    }
}
