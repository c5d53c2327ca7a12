//! Shared state handed to every handler

use std::path::PathBuf;
use std::sync::Arc;

use crate::{access::AccessFilter, cache::StateStore, ingest::IngestionRouter};

#[derive(Clone)]
pub struct ApiState {
    /// Write path: endpoint table, normalizers, forwarders
    pub router: IngestionRouter,

    /// Read path: the same cache the router writes to
    pub cache: StateStore,

    pub access: Arc<AccessFilter>,

    /// Where admitted request bodies get dumped, if anywhere
    pub dump_dir: Option<Arc<PathBuf>>,
}

impl ApiState {
    pub fn new(router: IngestionRouter, access: AccessFilter) -> Self {
        Self {
            cache: router.cache().clone(),
            router,
            access: Arc::new(access),
            dump_dir: None,
        }
    }

    pub fn with_dump_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.dump_dir = dir.map(Arc::new);
        self
    }
}
