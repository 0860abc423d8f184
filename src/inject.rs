use std::sync::Arc;

use crate::{
    dependency_resolver::DependencyResolver, errors::ResolveErrorKind, injectable::Injectable,
    injector::Injector,
};

/// Resolves a registered binding for `Dep` and hands out its shared instance.
///
/// `Dep` may be unsized, so trait-object interfaces work:
/// `Inject<dyn UserRepo + Send + Sync>`. Resolution fails with
/// [`ResolveErrorKind::NoProvider`] when nothing is bound.
pub struct Inject<Dep: ?Sized>(pub Arc<Dep>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
        injector.get().map(Self)
    }
}

/// Like [`Inject`], but falls back to constructing `Dep` in place through its
/// [`Injectable`] dependencies when no binding exists.
pub struct InjectAuto<Dep>(pub Arc<Dep>);

impl<Dep: Injectable> DependencyResolver for InjectAuto<Dep> {
    type Error = ResolveErrorKind;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
        injector.get_or_construct().map(Self)
    }
}
