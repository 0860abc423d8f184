use crate::{errors::ResolveErrorKind, injector::Injector};

/// A value the registry knows how to produce for a factory parameter.
///
/// Implemented for [`crate::Inject`], [`crate::InjectAuto`] and for tuples of
/// resolvers, which makes a factory's whole parameter list resolvable in one
/// call. Resolution of each element recurses into the registry, so a
/// dependency chain is walked without explicit wiring code. There is no cycle
/// detection: a dependency cycle recurses until the stack is exhausted.
pub trait DependencyResolver: Sized {
    type Error: Into<ResolveErrorKind>;

    fn resolve(injector: &Injector) -> Result<Self, Self::Error>;
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            type Error = ResolveErrorKind;

            #[inline]
            #[allow(unused_variables)]
            fn resolve(injector: &Injector) -> Result<Self, Self::Error> {
                Ok(($($ty::resolve(injector).map_err(Into::into)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
