//! Disk side of a fetch task.
//!
//! Primary downloads stream into a freshly created hidden temp file next to
//! the destination and are renamed over the final name once complete, so a
//! failed transfer never leaves a truncated file under the requested name and
//! no other file in the directory is touched. Replicas are plain copies that
//! refuse to clobber.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name prefix of in-progress downloads.
const TEMP_PREFIX: &str = ".linkfetch-";
/// Name suffix of in-progress downloads.
const TEMP_SUFFIX: &str = ".part";

/// Full path of a manifest destination. An empty `output_dir` resolves
/// relative to the current directory.
pub fn destination_path(output_dir: &Path, name: &str) -> PathBuf {
    output_dir.join(name)
}

/// Create `dir` and its parents; a no-op when it already exists.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// On-disk size of `path`.
pub fn file_size(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    Ok(meta.len())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Stream `reader` into `final_path`, replacing any existing file.
/// Returns the size of the finished file.
///
/// The temp file is created with a random name that did not exist before, and
/// is deleted again if anything fails before the rename.
pub fn write_replacing(reader: &mut dyn Read, final_path: &Path) -> Result<u64> {
    let dir = parent_dir(final_path);
    let mut builder = tempfile::Builder::new();
    builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
    // Downloads get the usual umask-derived mode, not tempfile's 0600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp = builder
        .tempfile_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    let mut writer = BufWriter::new(temp);
    io::copy(reader, &mut writer).context("transfer failed")?;
    let temp: NamedTempFile = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flush failed")?;

    temp.persist(final_path).map_err(|e| e.error).with_context(|| {
        format!("failed to rename temp file to {}", final_path.display())
    })?;
    file_size(final_path)
}

/// Remove a file this module created, logging instead of failing.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), "could not remove partial file: {}", e);
        }
    }
}

/// Copy `src` to `dst`, failing if `dst` already exists. Returns bytes copied.
pub fn copy_no_clobber(src: &Path, dst: &Path) -> Result<u64> {
    let mut input = File::open(src).with_context(|| format!("open {}", src.display()))?;
    let output = File::options()
        .write(true)
        .create_new(true)
        .open(dst)
        .with_context(|| format!("create {}", dst.display()))?;
    let mut writer = BufWriter::new(output);
    let copied = io::copy(&mut input, &mut writer)
        .and_then(|n| writer.flush().map(|()| n))
        .with_context(|| format!("copy to {}", dst.display()));
    if copied.is_err() {
        // We created dst, so a partial copy is ours to clean up.
        discard(dst);
    }
    copied
}
