pub mod ingest;
pub mod snapshot;
