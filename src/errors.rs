mod dependency_resolver;
mod factory;
mod instantiate;

pub use dependency_resolver::ResolveErrorKind;
pub use factory::FactoryErrorKind;
pub use instantiate::InstantiateErrorKind;
