use crate::{dependency_resolver::DependencyResolver, errors::InstantiateErrorKind};

/// A type the registry can construct without an explicit factory.
///
/// `Deps` declares the constructor parameter list as a tuple of
/// [`DependencyResolver`]s; each element is fetched from the registry when
/// the type is built, recursively. Rust has no constructor-signature
/// reflection, so the parameter list is stated here once instead of being
/// deduced. Parameters that would borrow (`&T`, raw pointers) or name the
/// type itself have no resolver and therefore cannot be declared, which
/// keeps such constructors out of the injection path at compile time.
///
/// The [`injectable!`] macro writes the common impl shapes.
pub trait Injectable: Sized + Send + Sync + 'static {
    type Deps: DependencyResolver;

    fn inject(deps: Self::Deps) -> Result<Self, InstantiateErrorKind>;
}

/// Implements [`Injectable`] for a type.
///
/// Two forms:
/// - `injectable!(Config)` — no dependencies, requires [`Default`];
/// - `injectable!(Database { config: Config, pool: Pool })` — each listed
///   field must have type `Arc<..>` of the named dependency and is filled by
///   resolving that dependency from the registry, constructing it in place
///   when nothing is bound (the dependency must itself be [`Injectable`]).
///
/// Hand-write the impl with [`Inject`](crate::Inject) deps instead when a
/// dependency is registered-only, e.g. a trait-object interface.
///
/// ```rust
/// use std::sync::Arc;
/// use wirebox::{injectable, Injector};
///
/// #[derive(Default)]
/// struct Config {
///     verbose: bool,
/// }
///
/// struct Database {
///     config: Arc<Config>,
/// }
///
/// injectable!(Config);
/// injectable!(Database { config: Config });
///
/// let injector = Injector::new();
/// let database = injector.get_or_construct::<Database>().unwrap();
/// assert!(!database.config.verbose);
/// ```
#[macro_export]
macro_rules! injectable {
    ($ty:ty) => {
        impl $crate::Injectable for $ty {
            type Deps = ();

            fn inject((): ()) -> Result<Self, $crate::InstantiateErrorKind> {
                Ok(<$ty as Default>::default())
            }
        }
    };
    ($ty:ty { $($field:ident: $dep:ty),+ $(,)? }) => {
        impl $crate::Injectable for $ty {
            type Deps = ($($crate::InjectAuto<$dep>,)+);

            fn inject(($($crate::InjectAuto($field),)+): Self::Deps) -> Result<Self, $crate::InstantiateErrorKind> {
                Ok(Self { $($field),+ })
            }
        }
    };
}
