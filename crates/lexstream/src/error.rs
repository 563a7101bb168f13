use thiserror::Error;

/// Failures raised by the character and token streams.
///
/// Requests that merely run past the end of a stream are clamped and never
/// produce one of these; every variant here is a contract violation by the
/// caller or a misconfigured stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// `consume()` was called while the next symbol is end of file.
    #[error("cannot consume EOF")]
    ConsumeEof,
    /// Direct indexing outside the tokens fetched so far.
    #[error("token index {index} out of range 0..{size}")]
    IndexOutOfRange { index: isize, size: usize },
    /// A token range with a bound outside the tokens fetched so far.
    #[error("token range {start}..={stop} out of range 0..{size}")]
    RangeOutOfRange {
        start: usize,
        stop: usize,
        size: usize,
    },
    /// A token stream was built without an upstream token source.
    #[error("token source cannot be absent")]
    MissingTokenSource,
    /// UTF-16 input that does not expose one flat slice of code units.
    #[error("UTF-16 input is not contiguous")]
    NonContiguousInput,
}
