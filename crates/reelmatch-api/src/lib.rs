pub mod traits;

pub use traits::{
    CatalogCandidate, CatalogSearch, LibraryAddRequest, LibraryItem, LibraryService, MediaKind,
    ScannedFile, Scanner, Settings, SettingsProvider,
};
