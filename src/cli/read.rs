//! The `read` command.

use crate::utils::fs::{OnMissing, ReadLinesOptions, TextEncoding, read_file, read_file_bytes, read_lines};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

/// Encodings accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadEncoding {
    /// UTF-8 text
    Utf8,
    /// 7-bit ASCII text
    Ascii,
    /// Raw bytes, written unchanged
    Bytes,
}

/// Print a file's contents.
#[derive(Args)]
pub struct ReadCommand {
    /// File to read
    path: PathBuf,

    /// Print one line at a time, trimmed of surrounding whitespace
    #[arg(short, long)]
    lines: bool,

    /// With --lines, keep whitespace and line terminators
    #[arg(long, requires = "lines")]
    keep_whitespace: bool,

    /// How to decode the contents
    #[arg(short, long, value_enum, default_value_t = ReadEncoding::Utf8)]
    encoding: ReadEncoding,

    /// Fail on undecodable data instead of substituting U+FFFD
    #[arg(long)]
    strict: bool,

    /// Print nothing and succeed when the file does not exist
    #[arg(long)]
    missing_ok: bool,
}

impl ReadCommand {
    pub fn execute(self) -> Result<i32> {
        let on_missing = if self.missing_ok {
            OnMissing::ReturnNone
        } else {
            OnMissing::Fail
        };
        let context = || format!("Failed to read {}", self.path.display());
        let mut stdout = std::io::stdout().lock();

        if self.lines {
            let options = ReadLinesOptions {
                encoding: self.text_encoding(),
                strip_whitespace: !self.keep_whitespace,
                on_missing,
            };
            if let Some(lines) = read_lines(&self.path, options).with_context(context)? {
                for line in &lines {
                    if self.keep_whitespace {
                        write!(stdout, "{line}")?;
                    } else {
                        writeln!(stdout, "{line}")?;
                    }
                }
            }
        } else if self.encoding == ReadEncoding::Bytes {
            if let Some(bytes) = read_file_bytes(&self.path, on_missing).with_context(context)? {
                stdout.write_all(&bytes)?;
            }
        } else if let Some(text) = read_file(&self.path, self.text_encoding(), on_missing).with_context(context)? {
            write!(stdout, "{text}")?;
        }

        stdout.flush()?;
        Ok(0)
    }

    /// Bytes have no line structure of their own; split them as lenient UTF-8.
    fn text_encoding(&self) -> TextEncoding {
        match (self.encoding, self.strict) {
            (ReadEncoding::Ascii, true) => TextEncoding::AsciiStrict,
            (ReadEncoding::Ascii, false) => TextEncoding::Ascii,
            (ReadEncoding::Utf8, true) => TextEncoding::Utf8Strict,
            (ReadEncoding::Utf8 | ReadEncoding::Bytes, _) => TextEncoding::Utf8,
        }
    }
}
