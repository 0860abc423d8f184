use std::sync::Arc;
use tracing::debug;

use crate::{
    dependency_resolver::DependencyResolver,
    errors::{FactoryErrorKind, InstantiateErrorKind, ResolveErrorKind},
    injectable::Injectable,
    injector::Injector,
    service::{service_fn, BoxCloneService},
};

/// A caller-supplied producer of one concrete component type.
///
/// Implemented for closures `FnMut(Deps...) -> Result<T, E>` whose parameters
/// each implement [`DependencyResolver`]; a zero-parameter closure is the
/// plain producer case.
pub trait Factory<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    fn build(&mut self, deps: Deps) -> Result<Self::Provides, Self::Error>;
}

macro_rules! impl_factory {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Factory<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            fn build(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_factory);

/// Error of one erased factory invocation.
pub(crate) type BuildError = FactoryErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>;

/// The uniform erased factory contract: produce a fresh shared instance of
/// the concrete type, resolving the factory's own dependencies first.
pub(crate) type BoxedCloneFactory<C> = BoxCloneService<Injector, Arc<C>, BuildError>;

#[must_use]
pub(crate) fn function_factory<F, Deps>(factory: F) -> BoxedCloneFactory<F::Provides>
where
    F: Factory<Deps> + Send + Sync,
    F::Provides: Send + Sync,
    Deps: DependencyResolver,
{
    BoxCloneService(Box::new(service_fn(move |injector: Injector| {
        let deps = Deps::resolve(&injector).map_err(|err| FactoryErrorKind::Deps(Box::new(err.into())))?;
        let value = factory
            .clone()
            .build(deps)
            .map_err(|err| FactoryErrorKind::Build(err.into()))?;

        debug!("Component built");

        Ok(Arc::new(value))
    })))
}

#[must_use]
pub(crate) fn constructor_factory<T: Injectable>() -> BoxedCloneFactory<T> {
    BoxCloneService(Box::new(service_fn(|injector: Injector| {
        let deps = T::Deps::resolve(&injector).map_err(|err| FactoryErrorKind::Deps(Box::new(err.into())))?;
        let value = T::inject(deps).map_err(FactoryErrorKind::Build)?;

        debug!("Component constructed");

        Ok(Arc::new(value))
    })))
}

#[must_use]
pub(crate) fn constant_factory<C: Send + Sync + 'static>(value: Arc<C>) -> BoxedCloneFactory<C> {
    BoxCloneService(Box::new(service_fn(move |_: Injector| {
        Ok::<_, BuildError>(value.clone())
    })))
}
