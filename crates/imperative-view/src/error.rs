/// Errors raised by the entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] imperative_core::Error),
    #[error("no imperative renderer installed on this thread")]
    NoRenderer,
}

pub type Result<T> = std::result::Result<T, Error>;
