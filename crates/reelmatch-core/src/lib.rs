pub mod commit;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod scorer;
