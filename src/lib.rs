//! A small in-process object registry.
//!
//! Callers register how instances of a type are built (through its declared
//! [`Injectable`] dependencies, a factory closure, or a preconstructed shared
//! value), optionally bind a concrete type to a trait-object interface, and
//! retrieve shared instances later. Each binding carries its own lifetime
//! policy: transient (a fresh instance per retrieval) or singleton (built
//! once, reused). Factory dependencies are resolved recursively from the same
//! registry.

#[macro_use]
pub(crate) mod macros;

pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod factory;
pub(crate) mod inject;
pub(crate) mod injectable;
pub(crate) mod injector;
pub(crate) mod provider;
pub(crate) mod service;
pub(crate) mod storage;
pub(crate) mod type_key;

pub use dependency_resolver::DependencyResolver;
pub use errors::{FactoryErrorKind, InstantiateErrorKind, ResolveErrorKind};
pub use factory::Factory;
pub use inject::{Inject, InjectAuto};
pub use injectable::Injectable;
pub use injector::Injector;
pub use provider::Caster;
pub use type_key::TypeKey;
