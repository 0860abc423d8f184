use std::any::TypeId;

use super::{factory::FactoryErrorKind, instantiate::InstantiateErrorKind};

#[derive(thiserror::Error, Debug, Clone)]
pub enum ResolveErrorKind {
    #[error("No provider registered for the requested component")]
    NoProvider,
    #[error("Incorrect provider instance type. Actual: {actual:?}, expected: {expected:?}")]
    IncorrectType { expected: TypeId, actual: TypeId },
    #[error(transparent)]
    Factory(FactoryErrorKind<Box<ResolveErrorKind>, InstantiateErrorKind>),
}
