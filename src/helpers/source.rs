//! Input and output resolution for the bulk readers and writers
//!
//! A [`Source`] is literal text, a file path, or a caller-owned stream.
//! [`Source::sniff`] picks between the first two: a string naming an existing
//! regular file is read from disk, anything else is treated as the content
//! itself. Literal text is copied into a spooled temp file so large inputs do
//! not have to stay in memory.

use crate::error::{Result, UtilError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Where a reader takes its bytes from.
pub enum Source<'a> {
    Text(String),
    File(PathBuf),
    /// Borrowed stream; never closed by the reader.
    Stream(Box<dyn Read + 'a>),
}

impl<'a> Source<'a> {
    /// Treat `input` as a file path when it names an existing regular file,
    /// otherwise as literal content.
    pub fn sniff(input: impl Into<String>) -> Self {
        let input = input.into();
        if !input.is_empty() && !input.contains('\n') && Path::new(&input).is_file() {
            Source::File(PathBuf::from(input))
        } else {
            Source::Text(input)
        }
    }

    pub fn stream(reader: impl Read + 'a) -> Self {
        Source::Stream(Box::new(reader))
    }

    /// Path shown in error messages.
    pub fn describe(&self) -> PathBuf {
        match self {
            Source::Text(_) => PathBuf::from("<text>"),
            Source::File(path) => path.clone(),
            Source::Stream(_) => PathBuf::from("<stream>"),
        }
    }

    /// Open for reading. Text larger than `spool_threshold` bytes is spilled
    /// to disk; a file that cannot be opened is [`UtilError::Unreadable`].
    pub fn open(self, spool_threshold: usize) -> Result<Box<dyn Read + 'a>> {
        match self {
            Source::Text(text) => {
                let mut spool = tempfile::spooled_tempfile(spool_threshold);
                let label = Path::new("<text>");
                spool
                    .write_all(text.as_bytes())
                    .map_err(|e| UtilError::io(label, e))?;
                spool
                    .seek(SeekFrom::Start(0))
                    .map_err(|e| UtilError::io(label, e))?;
                Ok(Box::new(spool))
            }
            Source::File(path) => {
                let meta = std::fs::metadata(&path).map_err(|e| UtilError::Unreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                if !meta.is_file() {
                    return Err(UtilError::Unreadable {
                        path,
                        reason: "not a regular file".to_owned(),
                    });
                }
                let file = File::open(&path).map_err(|e| UtilError::Unreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Box::new(file))
            }
            Source::Stream(reader) => Ok(reader),
        }
    }

    /// Read the whole source into a string.
    pub fn read_to_string(self, spool_threshold: usize) -> Result<String> {
        let label = self.describe();
        let mut reader = self.open(spool_threshold)?;
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| UtilError::io(label, e))?;
        Ok(text)
    }
}

impl From<String> for Source<'_> {
    fn from(input: String) -> Self {
        Source::sniff(input)
    }
}

impl From<&str> for Source<'_> {
    fn from(input: &str) -> Self {
        Source::sniff(input)
    }
}

/// Where a writer puts its bytes.
pub enum Sink<'a> {
    File(PathBuf),
    /// Borrowed stream; flushed but never closed by the writer.
    Stream(Box<dyn Write + 'a>),
}

impl<'a> Sink<'a> {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Sink::File(path.into())
    }

    pub fn stream(writer: impl Write + 'a) -> Self {
        Sink::Stream(Box::new(writer))
    }

    pub fn describe(&self) -> PathBuf {
        match self {
            Sink::File(path) => path.clone(),
            Sink::Stream(_) => PathBuf::from("<stream>"),
        }
    }

    /// Open for writing, truncating files. A path that cannot be created is
    /// [`UtilError::Unwritable`].
    pub fn open(self) -> Result<Box<dyn Write + 'a>> {
        match self {
            Sink::File(path) => {
                let file = File::create(&path).map_err(|e| UtilError::Unwritable {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Box::new(file))
            }
            Sink::Stream(writer) => Ok(writer),
        }
    }
}
