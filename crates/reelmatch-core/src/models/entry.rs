use serde::{Deserialize, Serialize};

use reelmatch_api::ScannedFile;

/// A file or folder handed to a reconciliation run. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScannedEntry {
    pub path: String,
    pub display_name: String,
    pub size_bytes: u64,
}

impl From<ScannedFile> for ScannedEntry {
    fn from(file: ScannedFile) -> Self {
        Self {
            path: file.path,
            display_name: file.filename,
            size_bytes: file.size_bytes,
        }
    }
}
