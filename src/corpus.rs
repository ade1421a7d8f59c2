//! Facilities for discovering input files and reading line-oriented text corpora.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{NgramError, Result};

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Directories are traversed recursively by default; set [`IngestConfig::recursive`] to `false`
/// to limit discovery to the first level. Symlink traversal is controlled through
/// [`IngestConfig::follow_symlinks`]. The returned list is sorted so runs are reproducible.
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(NgramError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        let metadata = path
            .metadata()
            .map_err(|err| NgramError::io(err, Some(path.to_path_buf())))?;
        if metadata.is_dir() {
            let depth = if cfg.recursive { usize::MAX } else { 1 };
            let walker = WalkDir::new(path)
                .max_depth(depth)
                .follow_links(cfg.follow_symlinks)
                .sort_by_file_name();
            for entry in walker {
                let entry = entry.map_err(|err| {
                    let entry_path = err.path().map(Path::to_path_buf);
                    match err.into_io_error() {
                        Some(source) => NgramError::io(source, entry_path),
                        None => NgramError::Internal("filesystem loop detected".into()),
                    }
                })?;
                if entry.file_type().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else if metadata.is_file() {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(NgramError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Opens `path` for buffered line reading.
pub fn open_lines(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|err| NgramError::io(err, Some(path.to_path_buf())))?;
    Ok(BufReader::new(file))
}

/// Reads every line of a corpus, one sentence per line.
pub fn read_sentences<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    read_lines_from(open_lines(path)?, Some(path))
}

/// Reads every line from an arbitrary buffered source.
pub fn read_lines_from<R: BufRead>(reader: R, path: Option<&Path>) -> Result<Vec<String>> {
    reader
        .lines()
        .map(|line| line.map_err(|err| NgramError::io(err, path.map(Path::to_path_buf))))
        .collect()
}

/// Calls `f` with every whitespace separated token found in `path`.
pub fn for_each_token<F>(path: &Path, mut f: F) -> Result<()>
where
    F: FnMut(&str),
{
    let reader = open_lines(path)?;
    for line in reader.lines() {
        let line = line.map_err(|err| NgramError::io(err, Some(path.to_path_buf())))?;
        line.split_whitespace().for_each(&mut f);
    }
    Ok(())
}
