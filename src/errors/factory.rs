/// Failure of one factory invocation, split by the phase that failed:
/// resolving the factory's own dependencies or running the factory body.
#[derive(thiserror::Error, Debug, Clone)]
pub enum FactoryErrorKind<DepsErr, BuildErr> {
    #[error(transparent)]
    Deps(DepsErr),
    #[error(transparent)]
    Build(BuildErr),
}
