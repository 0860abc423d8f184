use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone)]
pub enum InstantiateErrorKind {
    /// The producer declined to yield an instance.
    #[error("Factory produced no instance")]
    NoInstance,
    #[error("{0}")]
    Custom(Arc<anyhow::Error>),
}

impl From<anyhow::Error> for InstantiateErrorKind {
    fn from(err: anyhow::Error) -> Self {
        Self::Custom(Arc::new(err))
    }
}
