use std::sync::Arc;

use botpoly::VariablePool;
use log::debug;

use crate::{
    backend::Backends,
    base::settings::ProverSettings,
    construction::{
        ConstructionGraph, ObjectId,
        cache::EncodingCache,
        encoder::{BotanaEncoder, EncodingScope, StandardEncoder},
    },
};

pub mod settings;

/// State shared by every proof attempt over one construction.
///
/// The variable pool and the encoding cache live as long as the context, so
/// objects keep their Botana variables across attempts until they are
/// invalidated.
pub struct ProverContext {
    pub settings: ProverSettings,
    pub pool: VariablePool,
    pub cache: EncodingCache,
    pub encoder: Arc<dyn BotanaEncoder>,
    pub backends: Backends,
}

impl ProverContext {
    pub fn new(settings: ProverSettings, backends: Backends) -> Self {
        Self {
            settings,
            pool: VariablePool::new(),
            cache: EncodingCache::new(),
            encoder: Arc::new(StandardEncoder),
            backends,
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn BotanaEncoder>) -> Self {
        self.encoder = encoder;
        self.cache.clear();
        self
    }

    /// Encoding scope over `graph`, backed by the context cache.
    pub fn scope<'a>(&'a self, graph: &'a dyn ConstructionGraph) -> EncodingScope<'a> {
        EncodingScope::new(graph, &self.pool, &self.cache, self.encoder.as_ref())
    }

    /// Forget the encodings of objects whose definition changed.
    pub fn invalidate(&self, objects: &[ObjectId]) {
        debug!("Invalidating {} encodings", objects.len());
        self.cache.invalidate_all(objects.iter().copied());
    }
}
