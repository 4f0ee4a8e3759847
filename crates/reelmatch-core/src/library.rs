//! Local index of what the library already owns.
//!
//! Built once per run from the library's folder paths. Lookups are pure set
//! membership and never touch the network.

use std::collections::HashSet;

use crate::models::ScannedEntry;

#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    paths: HashSet<String>,
    external_ids: HashSet<u64>,
}

impl DuplicateIndex {
    /// Index the library's folder paths.
    pub fn build<I, S>(library_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = library_paths
            .into_iter()
            .map(|p| normalize_path(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            paths,
            external_ids: HashSet::new(),
        }
    }

    /// Whether the entry already lives in the library.
    ///
    /// A movie file sits one level below its library folder, so its parent
    /// directory is compared; a series entry is the folder itself.
    pub fn is_already_imported(&self, entry: &ScannedEntry, is_series: bool) -> bool {
        let unit = if is_series {
            Some(entry.path.as_str())
        } else {
            parent_dir(&entry.path)
        };
        unit.is_some_and(|p| self.contains_path(p))
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(&normalize_path(path))
    }

    pub fn contains_external_id(&self, external_id: u64) -> bool {
        self.external_ids.contains(&external_id)
    }

    /// Remember an item added during this run.
    pub fn record_import(&mut self, external_id: u64, folder_path: &str) {
        self.external_ids.insert(external_id);
        let path = normalize_path(folder_path);
        if !path.is_empty() {
            self.paths.insert(path);
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Strip trailing separators and lowercase.
pub fn normalize_path(path: &str) -> String {
    path.trim_end_matches(['/', '\\']).to_lowercase()
}

fn parent_dir(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches(['/', '\\']);
    trimmed.rfind(['/', '\\']).map(|i| &trimmed[..i])
}
