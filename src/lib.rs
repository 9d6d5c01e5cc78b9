pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod model;
pub mod store;
pub mod summary;
