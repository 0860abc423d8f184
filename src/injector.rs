use parking_lot::RwLock;
use std::{
    any::{type_name, TypeId},
    collections::BTreeMap,
    sync::Arc,
};
use tracing::{debug, error, info_span, warn};

use crate::{
    dependency_resolver::DependencyResolver,
    errors::ResolveErrorKind,
    factory::{constant_factory, constructor_factory, function_factory, Factory},
    injectable::Injectable,
    provider::{Caster, CastingProvider, ComponentProvider, NonCastingProvider},
    service::Service as _,
    storage::{InstanceStorage, Lifetime},
    type_key::TypeKey,
};

/// The object registry.
///
/// Bindings map a type's identity to an insertion-ordered list of providers.
/// Single-instance retrieval uses the most recently registered provider;
/// collection retrieval walks all of them in registration order.
///
/// Cloning is cheap and hands out another handle to the same binding table,
/// so a clone sees every registration made through any other handle. All
/// operations take `&self` and may be called from multiple threads; the
/// `try_*` registrations are check-then-act and can double-register under a
/// concurrent race, as can two first retrievals of the same singleton (the
/// first stored outcome wins).
#[derive(Default, Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

#[derive(Default)]
struct InjectorInner {
    bindings: RwLock<BTreeMap<TypeKey, Vec<Arc<dyn ComponentProvider>>>>,
}

impl Injector {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding for `T`, constructed through its [`Injectable`]
    /// dependencies on each retrieval.
    pub fn add<T: Injectable>(&self) {
        self.add_registration(InstanceStorage::new(constructor_factory::<T>(), Lifetime::Transient));
    }

    /// [`Self::add`], unless `T` already has a binding.
    pub fn try_add<T: Injectable>(&self) {
        if !self.contains::<T>() {
            self.add::<T>();
        }
    }

    /// Adds a binding for `T`, constructed through its [`Injectable`]
    /// dependencies on first retrieval and reused thereafter.
    pub fn add_singleton<T: Injectable>(&self) {
        self.add_registration(InstanceStorage::new(constructor_factory::<T>(), Lifetime::Singleton));
    }

    /// [`Self::add_singleton`], unless `T` already has a binding.
    pub fn try_add_singleton<T: Injectable>(&self) {
        if !self.contains::<T>() {
            self.add_singleton::<T>();
        }
    }

    /// Adds a binding from interface `I` to concrete `C`: requesting `I`
    /// constructs a `C` through its [`Injectable`] dependencies and upcasts
    /// it. Write the caster with [`upcast!`](crate::upcast).
    pub fn add_bound<C, I>(&self, cast: Caster<C, I>)
    where
        C: Injectable,
        I: ?Sized + Send + Sync + 'static,
    {
        self.add_registration_bound(
            InstanceStorage::new(constructor_factory::<C>(), Lifetime::Transient),
            cast,
        );
    }

    /// [`Self::add_bound`], unless `I` already has a binding.
    pub fn try_add_bound<C, I>(&self, cast: Caster<C, I>)
    where
        C: Injectable,
        I: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<I>() {
            self.add_bound(cast);
        }
    }

    /// Adds a singleton binding from interface `I` to concrete `C`.
    pub fn add_singleton_bound<C, I>(&self, cast: Caster<C, I>)
    where
        C: Injectable,
        I: ?Sized + Send + Sync + 'static,
    {
        self.add_registration_bound(
            InstanceStorage::new(constructor_factory::<C>(), Lifetime::Singleton),
            cast,
        );
    }

    /// [`Self::add_singleton_bound`], unless `I` already has a binding.
    pub fn try_add_singleton_bound<C, I>(&self, cast: Caster<C, I>)
    where
        C: Injectable,
        I: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<I>() {
            self.add_singleton_bound(cast);
        }
    }

    /// Adds a binding for the factory's provided type, invoking the factory
    /// on each retrieval.
    pub fn provide<F, Deps>(&self, factory: F)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.add_registration(InstanceStorage::new(function_factory(factory), Lifetime::Transient));
    }

    /// [`Self::provide`], unless the provided type already has a binding.
    pub fn try_provide<F, Deps>(&self, factory: F)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        if !self.contains::<F::Provides>() {
            self.provide(factory);
        }
    }

    /// Adds a binding for the factory's provided type, invoking the factory
    /// on first retrieval only and reusing the outcome thereafter.
    pub fn provide_singleton<F, Deps>(&self, factory: F)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        self.add_registration(InstanceStorage::new(function_factory(factory), Lifetime::Singleton));
    }

    /// [`Self::provide_singleton`], unless the provided type already has a
    /// binding.
    pub fn try_provide_singleton<F, Deps>(&self, factory: F)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        if !self.contains::<F::Provides>() {
            self.provide_singleton(factory);
        }
    }

    /// Adds a binding from interface `I` to the factory's provided type.
    pub fn provide_bound<F, Deps, I>(&self, factory: F, cast: Caster<F::Provides, I>)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
        I: ?Sized + Send + Sync + 'static,
    {
        self.add_registration_bound(
            InstanceStorage::new(function_factory(factory), Lifetime::Transient),
            cast,
        );
    }

    /// [`Self::provide_bound`], unless `I` already has a binding.
    pub fn try_provide_bound<F, Deps, I>(&self, factory: F, cast: Caster<F::Provides, I>)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
        I: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<I>() {
            self.provide_bound(factory, cast);
        }
    }

    /// Adds a singleton binding from interface `I` to the factory's provided
    /// type.
    pub fn provide_singleton_bound<F, Deps, I>(&self, factory: F, cast: Caster<F::Provides, I>)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
        I: ?Sized + Send + Sync + 'static,
    {
        self.add_registration_bound(
            InstanceStorage::new(function_factory(factory), Lifetime::Singleton),
            cast,
        );
    }

    /// [`Self::provide_singleton_bound`], unless `I` already has a binding.
    pub fn try_provide_singleton_bound<F, Deps, I>(&self, factory: F, cast: Caster<F::Provides, I>)
    where
        F: Factory<Deps> + Send + Sync,
        F::Provides: Send + Sync,
        Deps: DependencyResolver,
        I: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<I>() {
            self.provide_singleton_bound(factory, cast);
        }
    }

    /// Adds a binding for `T` that hands out the given preconstructed
    /// instance on every retrieval. Effectively a singleton: every retrieval
    /// shares the one allocation.
    pub fn add_instance<T: Send + Sync + 'static>(&self, value: Arc<T>) {
        self.add_registration(InstanceStorage::new(constant_factory(value), Lifetime::Transient));
    }

    /// [`Self::add_instance`], unless `T` already has a binding.
    pub fn try_add_instance<T: Send + Sync + 'static>(&self, value: Arc<T>) {
        if !self.contains::<T>() {
            self.add_instance(value);
        }
    }

    /// Adds a binding from interface `I` to the given preconstructed
    /// concrete instance.
    pub fn add_instance_bound<C, I>(&self, value: Arc<C>, cast: Caster<C, I>)
    where
        C: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        self.add_registration_bound(
            InstanceStorage::new(constant_factory(value), Lifetime::Transient),
            cast,
        );
    }

    /// [`Self::add_instance_bound`], unless `I` already has a binding.
    pub fn try_add_instance_bound<C, I>(&self, value: Arc<C>, cast: Caster<C, I>)
    where
        C: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        if !self.contains::<I>() {
            self.add_instance_bound(value, cast);
        }
    }

    /// Gets a shared instance of `Dep` from its most recently registered
    /// provider.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NoProvider`] when nothing is bound to `Dep`;
    /// - a propagated construction failure otherwise.
    pub fn get<Dep: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        let span = info_span!("get", component = type_name::<Dep>());
        let _guard = span.enter();

        let Some(provider) = self.last_provider(TypeKey::of::<Dep>()) else {
            let err = ResolveErrorKind::NoProvider;
            warn!("{}", err);
            return Err(err);
        };

        self.run_provider(&provider)
    }

    /// Gets a shared instance of `Dep` from its most recently registered
    /// provider, or constructs one in place through `Dep`'s [`Injectable`]
    /// dependencies when nothing is bound. In-place construction registers
    /// nothing and builds a fresh instance per call.
    ///
    /// # Errors
    /// Propagated construction failure, from either path.
    pub fn get_or_construct<Dep: Injectable>(&self) -> Result<Arc<Dep>, ResolveErrorKind> {
        let span = info_span!("get_or_construct", component = type_name::<Dep>());
        let _guard = span.enter();

        if let Some(provider) = self.last_provider(TypeKey::of::<Dep>()) {
            return self.run_provider(&provider);
        }
        debug!("Not bound, constructing in place");

        match constructor_factory::<Dep>().call(self.clone()) {
            Ok(instance) => Ok(instance),
            Err(err) => {
                error!("{}", err);
                Err(ResolveErrorKind::Factory(err))
            }
        }
    }

    /// Gets one instance from every provider bound to `Dep`, in registration
    /// order. No bindings yield an empty vector; unlike [`Self::get`], this
    /// never constructs unbound components.
    ///
    /// # Errors
    /// The first propagated construction failure, if any provider fails.
    pub fn get_all<Dep: ?Sized + Send + Sync + 'static>(&self) -> Result<Vec<Arc<Dep>>, ResolveErrorKind> {
        let span = info_span!("get_all", component = type_name::<Dep>());
        let _guard = span.enter();

        let providers = self
            .inner
            .bindings
            .read()
            .get(&TypeKey::of::<Dep>())
            .cloned()
            .unwrap_or_default();

        providers
            .iter()
            .map(|provider| self.run_provider(provider))
            .collect()
    }

    /// Whether at least one provider is bound to `Dep`. Never constructs.
    #[must_use]
    pub fn contains<Dep: ?Sized + 'static>(&self) -> bool {
        self.inner
            .bindings
            .read()
            .get(&TypeKey::of::<Dep>())
            .is_some_and(|providers| !providers.is_empty())
    }
}

impl Injector {
    fn last_provider(&self, key: TypeKey) -> Option<Arc<dyn ComponentProvider>> {
        self.inner
            .bindings
            .read()
            .get(&key)
            .and_then(|providers| providers.last().cloned())
    }

    fn run_provider<Dep: ?Sized + Send + Sync + 'static>(
        &self,
        provider: &Arc<dyn ComponentProvider>,
    ) -> Result<Arc<Dep>, ResolveErrorKind> {
        match provider.provide(self) {
            Ok(instance) => match instance.downcast::<Arc<Dep>>() {
                Ok(handle) => Ok(*handle),
                Err(incorrect_type) => {
                    let err = ResolveErrorKind::IncorrectType {
                        expected: TypeId::of::<Arc<Dep>>(),
                        actual: (*incorrect_type).type_id(),
                    };
                    error!("{}", err);
                    Err(err)
                }
            },
            Err(err) => {
                error!("{}", err);
                Err(ResolveErrorKind::Factory(err))
            }
        }
    }

    fn add_registration<C: Send + Sync + 'static>(&self, storage: InstanceStorage<C>) {
        let provider: Arc<dyn ComponentProvider> = Arc::new(NonCastingProvider::new(storage));
        self.inner
            .bindings
            .write()
            .entry(TypeKey::of::<C>())
            .or_default()
            .push(provider);
    }

    fn add_registration_bound<C, I>(&self, storage: InstanceStorage<C>, cast: Caster<C, I>)
    where
        C: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        let provider: Arc<dyn ComponentProvider> = Arc::new(CastingProvider::new(storage, cast));
        self.inner
            .bindings
            .write()
            .entry(TypeKey::of::<I>())
            .or_default()
            .push(provider);
    }
}
