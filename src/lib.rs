pub mod position;
pub mod prefix_sum;
pub mod str_utils;
pub mod text_buffer;

/// Result type for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("offset {offset} is out of bounds for a document of {length} bytes")]
    OffsetOutOfBounds { offset: usize, length: usize },
}
