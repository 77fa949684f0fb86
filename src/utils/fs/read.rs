//! Whole-file and line-oriented readers.
//!
//! Every reader takes an [`OnMissing`] policy deciding what a missing file
//! means. Only "not found" is affected: permission errors and friends always
//! propagate.

use crate::core::{FsError, FsOperation};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

/// What a reader does when the file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnMissing {
    /// Fail with [`FsError::NotFound`]
    #[default]
    Fail,
    /// Return `Ok(None)`
    ReturnNone,
    /// Return empty contents
    ReturnEmpty,
}

/// How file contents are turned into text.
///
/// Lenient variants replace undecodable bytes with U+FFFD; strict variants fail
/// with [`FsError::InvalidEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8, lossy
    #[default]
    Utf8,
    /// UTF-8, rejecting invalid sequences
    Utf8Strict,
    /// 7-bit ASCII, lossy
    Ascii,
    /// 7-bit ASCII, rejecting any byte above 0x7f
    AsciiStrict,
}

impl TextEncoding {
    fn decode(self, path: &Path, bytes: Vec<u8>) -> Result<String, FsError> {
        match self {
            TextEncoding::Utf8 => Ok(match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }),
            TextEncoding::Utf8Strict => String::from_utf8(bytes).map_err(|e| FsError::InvalidEncoding {
                path: path.to_path_buf(),
                encoding: "utf-8",
                reason: e.utf8_error().to_string(),
            }),
            TextEncoding::Ascii => Ok(bytes
                .into_iter()
                .map(|b| if b.is_ascii() { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect()),
            TextEncoding::AsciiStrict => {
                if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(FsError::InvalidEncoding {
                        path: path.to_path_buf(),
                        encoding: "ascii",
                        reason: format!("byte 0x{:02x} at offset {offset} is out of range", bytes[offset]),
                    });
                }
                Ok(bytes.into_iter().map(char::from).collect())
            }
        }
    }
}

/// Read the whole file as raw bytes.
///
/// # Errors
///
/// Any open or read failure, except a missing file when `on_missing` says otherwise.
pub fn read_file_bytes(path: &Path, on_missing: OnMissing) -> Result<Option<Vec<u8>>, FsError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) => missing_or(path, e, on_missing, Vec::new),
    }
}

/// Read the whole file as text.
///
/// # Examples
///
/// ```rust,no_run
/// use fsguard::utils::fs::{OnMissing, TextEncoding, read_file};
/// use std::path::Path;
///
/// # fn example() -> Result<(), fsguard::core::FsError> {
/// let passwd = read_file(Path::new("/etc/passwd"), TextEncoding::Utf8, OnMissing::Fail)?;
/// let optional = read_file(Path::new("/etc/nope"), TextEncoding::Utf8, OnMissing::ReturnNone)?;
/// assert!(passwd.is_some());
/// assert!(optional.is_none());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Open or read failures as in [`read_file_bytes`], plus
/// [`FsError::InvalidEncoding`] for strict encodings.
pub fn read_file(path: &Path, encoding: TextEncoding, on_missing: OnMissing) -> Result<Option<String>, FsError> {
    read_file_bytes(path, on_missing)?
        .map(|bytes| encoding.decode(path, bytes))
        .transpose()
}

/// Options for [`read_lines`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadLinesOptions {
    /// Text decoding
    pub encoding: TextEncoding,
    /// Strip leading and trailing whitespace, newline included, from each line
    pub strip_whitespace: bool,
    /// Missing file policy
    pub on_missing: OnMissing,
}

impl Default for ReadLinesOptions {
    fn default() -> Self {
        Self {
            encoding: TextEncoding::Utf8,
            strip_whitespace: true,
            on_missing: OnMissing::Fail,
        }
    }
}

/// Lines of a file together with its modification time at open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lines {
    lines: Vec<String>,
    mtime: Option<SystemTime>,
}

impl Lines {
    /// Modification time of the file when it was opened; `None` for a missing file.
    pub const fn mtime(&self) -> Option<SystemTime> {
        self.mtime
    }

    /// The lines read.
    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines were read.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl IntoIterator for Lines {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a Lines {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Read a file line by line.
///
/// With `strip_whitespace` each line is trimmed on both sides; otherwise lines
/// keep their `\n` terminator (the last line may lack one). The mtime is taken
/// from the open handle, so it matches the contents read.
///
/// [`OnMissing::ReturnEmpty`] yields an empty [`Lines`] without an mtime.
///
/// # Errors
///
/// Open, stat or read failures, and [`FsError::InvalidEncoding`] for strict
/// encodings.
pub fn read_lines(path: &Path, options: ReadLinesOptions) -> Result<Option<Lines>, FsError> {
    let mut file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) => return missing_or(path, e, options.on_missing, Lines::default),
    };

    let mtime = file
        .metadata()
        .and_then(|metadata| metadata.modified())
        .map_err(|e| FsError::from_io(FsOperation::Stat, path, e))?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| FsError::from_io(FsOperation::Read, path, e))?;
    let text = options.encoding.decode(path, bytes)?;

    let lines = if options.strip_whitespace {
        text.lines().map(|line| line.trim().to_string()).collect()
    } else {
        text.split_inclusive('\n').map(str::to_string).collect()
    };

    Ok(Some(Lines {
        lines,
        mtime: Some(mtime),
    }))
}

/// Remove a non-directory entry, ignoring "not found".
///
/// # Errors
///
/// Any other unlink failure, including `EISDIR`/`EPERM` for a directory.
pub fn unlink_if_exists(path: &Path) -> Result<(), FsError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FsError::from_io(FsOperation::Remove, path, e)),
    }
}

fn missing_or<T>(
    path: &Path,
    error: std::io::Error,
    on_missing: OnMissing,
    empty: impl FnOnce() -> T,
) -> Result<Option<T>, FsError> {
    if error.kind() == std::io::ErrorKind::NotFound {
        match on_missing {
            OnMissing::Fail => {}
            OnMissing::ReturnNone => return Ok(None),
            OnMissing::ReturnEmpty => return Ok(Some(empty())),
        }
    }
    Err(FsError::from_io(FsOperation::Read, path, error))
}
