//! Centralized checks on the read files referenced by a samplesheet.
//!
//! Each check inspects the whole list before failing, so the error names
//! every offending path at once.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Buffer size used when hashing read files
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Read-file validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Files not found: {}", display_paths(.0))]
    MissingFiles(Vec<PathBuf>),

    #[error("MD5 checksum mismatch for: {}", display_paths(.0))]
    ChecksumMismatch(Vec<PathBuf>),

    #[error("Duplicate files in samplesheet: {}", display_paths(.0))]
    DuplicatePaths(Vec<PathBuf>),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Comma-separated paths; an empty path (a blank `R1` cell) shows as `''`
fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| {
            if p.as_os_str().is_empty() {
                "''".to_string()
            } else {
                p.display().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether a samplesheet checksum cell can be an MD5 digest: 32 hex digits,
/// either case, surrounding whitespace ignored.
///
/// ```
/// use biowdl_input_converter::utils::validation::is_md5_digest;
///
/// assert!(is_md5_digest("d41d8cd98f00b204e9800998ecf8427e"));
/// assert!(is_md5_digest(" D41D8CD98F00B204E9800998ECF8427E\n"));
/// assert!(!is_md5_digest("d41d8cd98f00b204e9800998ecf8427"));
/// assert!(!is_md5_digest("see_lab_notes"));
/// ```
#[must_use]
pub fn is_md5_digest(checksum: &str) -> bool {
    let checksum = checksum.trim();
    checksum.len() == 32 && checksum.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Fail if any path does not point to an existing file
///
/// # Errors
///
/// Returns `ValidationError::MissingFiles` naming every missing path.
pub fn check_existence_of_files<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
) -> Result<(), ValidationError> {
    let missing: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| !path.is_file())
        .map(Path::to_path_buf)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFiles(missing))
    }
}

/// Lowercase hex MD5 of a file's contents
///
/// # Errors
///
/// Returns `ValidationError::Io` if the file cannot be read.
pub fn compute_md5(path: &Path) -> Result<String, ValidationError> {
    let io_error = |source: std::io::Error| ValidationError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_error)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer).map_err(io_error)?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }
    Ok(format!("{:x}", context.compute()))
}

/// Fail if any file's MD5 differs from the expected checksum.
/// Checksums are compared case-insensitively. A checksum that is not an MD5
/// digest at all counts as a mismatch without the file being read.
///
/// # Errors
///
/// Returns `ValidationError::ChecksumMismatch` naming every mismatching path,
/// or `ValidationError::Io` if a file cannot be read.
pub fn check_md5sums<'a>(
    files: impl IntoIterator<Item = (&'a Path, &'a str)>,
) -> Result<(), ValidationError> {
    let mut mismatched = Vec::new();
    for (path, expected) in files {
        if !is_md5_digest(expected) {
            warn!("{}: '{}' is not an MD5 checksum", path.display(), expected);
            mismatched.push(path.to_path_buf());
            continue;
        }
        let actual = compute_md5(path)?;
        debug!("{}: expected {}, computed {}", path.display(), expected, actual);
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            mismatched.push(path.to_path_buf());
        }
    }

    if mismatched.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::ChecksumMismatch(mismatched))
    }
}

/// Fail if any path is referenced more than once.
/// Each duplicate is reported once, in first-seen order.
///
/// # Errors
///
/// Returns `ValidationError::DuplicatePaths` naming every repeated path.
pub fn check_duplicate_files<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
) -> Result<(), ValidationError> {
    let mut order = Vec::new();
    let mut counts: HashMap<&Path, usize> = HashMap::new();
    for path in paths {
        let count = counts.entry(path).or_insert(0);
        if *count == 0 {
            order.push(path);
        }
        *count += 1;
    }

    let duplicates: Vec<PathBuf> = order
        .into_iter()
        .filter(|path| counts[path] > 1)
        .map(Path::to_path_buf)
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::DuplicatePaths(duplicates))
    }
}
