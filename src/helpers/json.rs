//! JSON reading with the same source sniffing as the CSV reader

use crate::config::Settings;
use crate::error::Result;
use crate::helpers::source::Source;
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct JsonReader {
    spool_threshold: usize,
}

impl JsonReader {
    pub fn new(settings: &Settings) -> Self {
        Self {
            spool_threshold: settings.spool_threshold,
        }
    }

    /// Parse JSON from literal text, an existing file, or a stream.
    pub fn read<'a>(&self, source: impl Into<Source<'a>>) -> Result<Value> {
        let input = source.into().open(self.spool_threshold)?;
        Ok(serde_json::from_reader(input)?)
    }
}
