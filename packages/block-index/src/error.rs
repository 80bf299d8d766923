use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockIndexError {
    /// A method other than `init` was called before `init`.
    #[error("Block index is not initialized")]
    Uninitialized,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BlockIndexResult<T> = Result<T, BlockIndexError>;
