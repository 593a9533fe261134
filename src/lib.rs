pub mod config;
pub mod errors;
pub mod guide;
pub mod ingestor;
pub mod models;
pub mod print;
pub mod scheduling;
pub mod sources;
pub mod utils;
