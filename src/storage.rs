use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::{
    factory::{BoxedCloneFactory, BuildError},
    injector::Injector,
    service::Service as _,
};

/// Per-binding lifetime policy, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifetime {
    /// A new instance on every retrieval.
    Transient,
    /// One instance built on first retrieval and reused thereafter.
    Singleton,
}

/// Owns one factory and applies the binding's lifetime policy to it.
///
/// A singleton caches the first outcome, a failure included, and never
/// retries. The factory runs outside the cache lock; when two threads race on
/// first use the first stored outcome wins and the other build is discarded.
pub(crate) struct InstanceStorage<C> {
    factory: BoxedCloneFactory<C>,
    lifetime: Lifetime,
    cached: Mutex<Option<Result<Arc<C>, BuildError>>>,
}

impl<C: Send + Sync + 'static> InstanceStorage<C> {
    #[must_use]
    pub(crate) fn new(factory: BoxedCloneFactory<C>, lifetime: Lifetime) -> Self {
        Self {
            factory,
            lifetime,
            cached: Mutex::new(None),
        }
    }

    pub(crate) fn get(&self, injector: &Injector) -> Result<Arc<C>, BuildError> {
        match self.lifetime {
            Lifetime::Transient => self.factory.clone().call(injector.clone()),
            Lifetime::Singleton => {
                if let Some(outcome) = self.cached.lock().as_ref() {
                    debug!("Found in singleton cache");
                    return outcome.clone();
                }

                let outcome = self.factory.clone().call(injector.clone());
                self.cached.lock().get_or_insert(outcome).clone()
            }
        }
    }
}
