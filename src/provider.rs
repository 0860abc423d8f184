use std::{any::Any, sync::Arc};

use crate::{factory::BuildError, injector::Injector, storage::InstanceStorage};

/// A produced instance with the interface type erased. Always holds an
/// `Arc<I>` of the identity the provider was registered under.
pub(crate) type BoxedInstance = Box<dyn Any + Send + Sync>;

/// Upcast from a concrete shared instance to an interface-typed one sharing
/// the same allocation and reference count. Written at the registration site,
/// where the compiler checks the relationship between the two types; see
/// [`upcast!`].
pub type Caster<C, I> = fn(Arc<C>) -> Arc<I>;

/// One registered binding, erased over its concrete type: produces an
/// instance for the identity it was registered under.
pub(crate) trait ComponentProvider: Send + Sync + 'static {
    fn provide(&self, injector: &Injector) -> Result<BoxedInstance, BuildError>;
}

/// Binding where the requested type equals the concrete type.
pub(crate) struct NonCastingProvider<C> {
    storage: InstanceStorage<C>,
}

impl<C> NonCastingProvider<C> {
    #[must_use]
    pub(crate) fn new(storage: InstanceStorage<C>) -> Self {
        Self { storage }
    }
}

impl<C: Send + Sync + 'static> ComponentProvider for NonCastingProvider<C> {
    fn provide(&self, injector: &Injector) -> Result<BoxedInstance, BuildError> {
        self.storage
            .get(injector)
            .map(|instance| Box::new(instance) as BoxedInstance)
    }
}

/// Binding where retrieval requests interface `I` while the factory builds
/// concrete `C`; every produced instance is upcast through the caster.
pub(crate) struct CastingProvider<C, I: ?Sized> {
    storage: InstanceStorage<C>,
    cast: Caster<C, I>,
}

impl<C, I: ?Sized> CastingProvider<C, I> {
    #[must_use]
    pub(crate) fn new(storage: InstanceStorage<C>, cast: Caster<C, I>) -> Self {
        Self { storage, cast }
    }
}

impl<C, I> ComponentProvider for CastingProvider<C, I>
where
    C: Send + Sync + 'static,
    I: ?Sized + Send + Sync + 'static,
{
    fn provide(&self, injector: &Injector) -> Result<BoxedInstance, BuildError> {
        self.storage
            .get(injector)
            .map(|instance| Box::new((self.cast)(instance)) as BoxedInstance)
    }
}

/// Writes the [`Caster`] for a concrete-to-interface binding.
///
/// ```rust
/// use wirebox::{upcast, Injector, InstantiateErrorKind};
///
/// trait Greeter {
///     fn greet(&self) -> &'static str;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> &'static str {
///         "hello"
///     }
/// }
///
/// let injector = Injector::new();
/// injector.provide_bound(
///     || Ok::<_, InstantiateErrorKind>(English),
///     upcast!(English => dyn Greeter + Send + Sync),
/// );
///
/// let greeter = injector.get::<dyn Greeter + Send + Sync>().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
///
/// Binding unrelated types is rejected by the compiler: the conversion in the
/// generated closure only exists when the concrete type implements the
/// interface trait.
#[macro_export]
macro_rules! upcast {
    ($concrete:ty => $interface:ty) => {
        (|concrete: ::std::sync::Arc<$concrete>| -> ::std::sync::Arc<$interface> { concrete })
    };
}
