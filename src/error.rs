use thiserror::Error;

pub type Result<T> = std::result::Result<T, GradError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GradError {
    /// The graph contains an operation that only defines a forward value.
    #[error("Operation `{op}` has no gradient rule. Backpropagation through it is not supported.")]
    UnsupportedOperation { op: &'static str },
}
