//! Text formats read and written by the pipeline.
//!
//! * [`counts`]: the intermediate `<count>\t<ngram>` file produced by counting.
//! * [`model`]: the `\data\` ... `\end\` language model layout.
//! * [`decimal`]: fixed-precision, half-up number formatting used by the model writer.

pub mod counts;
pub mod decimal;
pub mod model;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{NgramError, Result};

pub use counts::{load_counts, read_counts, save_counts, write_counts};
pub use decimal::format_decimal;
pub use model::{load_summary, read_summary, save_model, write_model, ModelSummary};

/// Writes `path` through a temporary file in the same directory, renaming it into place once
/// `write` succeeds. Missing parent directories are created.
///
/// A replaced file keeps its permissions; a new file gets [`NEW_FILE_MODE`] on Unix rather than
/// the owner-only mode of the temporary file.
pub fn write_atomic<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| NgramError::io(err, Some(parent.to_path_buf())))?;

    let temp = NamedTempFile::new_in(parent)
        .map_err(|err| NgramError::io(err, Some(parent.to_path_buf())))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|err| NgramError::io(err, Some(path.to_path_buf())))?;
    }
    let permissions = match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|err| NgramError::io(err, Some(path.to_path_buf())))?;
    }
    temp.persist(path)
        .map_err(|err| NgramError::io(err.error, Some(path.to_path_buf())))?;
    Ok(())
}

/// Unix mode given to newly created output files.
pub const NEW_FILE_MODE: u32 = 0o644;

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}
