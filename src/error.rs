#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No connection header is attached to this event")]
    HeaderNotAttached,

    #[error("A private copy of the message is required but no factory was supplied")]
    NoFactoryAvailable,

    #[error("Erased message is not a '{expected}'")]
    TypeMismatch { expected: &'static str },
}

impl Error {
    pub(crate) fn type_mismatch<M>() -> Self {
        Error::TypeMismatch {
            expected: std::any::type_name::<M>(),
        }
    }
}
