use alloc::string::String;

/// Number of tokens requested from the source per round of
/// [`BufferedTokenStream::fill`](crate::BufferedTokenStream::fill).
pub const DEFAULT_FILL_CHUNK_SIZE: usize = 1000;

/// Configuration for the [`char_streams`](crate::char_streams) factory.
///
/// # Examples
///
/// ```rust
/// use lexstream::{CharStreamOptions, SymbolStream, char_streams};
///
/// let options = CharStreamOptions {
///     source_name: Some("query.sql".into()),
///     ..Default::default()
/// };
/// let stream = char_streams::from_string_with("select 1", &options);
/// assert_eq!(stream.source_name(), "query.sql");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharStreamOptions {
    /// Name reported by [`SymbolStream::source_name`](crate::SymbolStream::source_name).
    ///
    /// # Default
    ///
    /// `None`, reported as `"<unknown>"`. An empty name is treated the same.
    pub source_name: Option<String>,

    /// Capacity, in code points, the buffer builder starts with.
    ///
    /// # Default
    ///
    /// `None`: the length of the input when it is known up front, zero for
    /// chunked input.
    pub initial_capacity: Option<usize>,
}

/// Configuration for [`BufferedTokenStream`](crate::BufferedTokenStream).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenStreamOptions {
    /// Tokens requested per round when filling the whole stream. A short
    /// round signals that the source is exhausted. Zero is treated as one.
    ///
    /// # Default
    ///
    /// [`DEFAULT_FILL_CHUNK_SIZE`]
    pub fill_chunk_size: usize,
}

impl Default for TokenStreamOptions {
    fn default() -> Self {
        Self {
            fill_chunk_size: DEFAULT_FILL_CHUNK_SIZE,
        }
    }
}
