//! JSON whitelist persistor

use crate::adapter::{PersistError, Persistor};
use schemaward_core::WhitelistDocument;
use serde::Serialize;
use std::path::Path;

/// Writes whitelist documents as pretty-printed JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonPersistor {
    indent: usize,
}

impl Default for JsonPersistor {
    fn default() -> Self {
        Self::new(4)
    }
}

impl JsonPersistor {
    /// Create a persistor indenting with `indent` spaces
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Render a document the way it is written to disk
    pub fn render(&self, document: &WhitelistDocument) -> Result<String, PersistError> {
        let indent = vec![b' '; self.indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buffer = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

        document
            .serialize(&mut serializer)
            .map_err(|e| PersistError::SerializeError(e.to_string()))?;
        buffer.push(b'\n');

        String::from_utf8(buffer).map_err(|e| PersistError::SerializeError(e.to_string()))
    }
}

impl Persistor for JsonPersistor {
    fn persist(&self, document: &WhitelistDocument, path: &Path) -> Result<(), PersistError> {
        let contents = self.render(document)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PersistError::IoError(parent.display().to_string(), e.to_string()))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PersistError::IoError(path.display().to_string(), e.to_string()))
    }
}
