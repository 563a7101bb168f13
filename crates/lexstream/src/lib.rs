//! Character and token streams for lexers and parsers.
//!
//! Two layers implement the same [`SymbolStream`] contract:
//!
//! - [`CodePointCharStream`]: decoded Unicode code points held at the
//!   narrowest width that fits the input (8, 16 or 32 bits), with O(1)
//!   lookahead and substring extraction. Build one with [`char_streams`].
//! - [`BufferedTokenStream`]: tokens pulled lazily from a [`TokenSource`]
//!   into a cache that is never discarded, giving a parser unbounded
//!   lookahead, seeking and text reconstruction.
//!
//! ```rust
//! use lexstream::{CharStream, Interval, SymbolStream, char_streams};
//!
//! let mut chars = char_streams::from_string("a\u{1F600}b");
//! assert_eq!(chars.la(2), 0x1F600);
//! chars.consume().unwrap();
//! assert_eq!(chars.get_text(&Interval::of(1, 2)), "\u{1F600}b");
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffered_token_stream;
mod char_stream;
pub mod char_streams;
mod code_point_buffer;
mod error;
mod int_stream;
mod interval;
mod options;
mod token;
mod token_stream;

#[cfg(test)]
mod tests;

pub use buffered_token_stream::{
    BufferedTokenStream, OnChannel, SeekPolicy, TokenCache, TokenStreamBuilder, Unfiltered,
};
pub use char_stream::CodePointCharStream;
pub use code_point_buffer::{Builder, CodePointBuffer, CodePointType, Utf16Input};
pub use error::StreamError;
pub use int_stream::{CharStream, EOF, SymbolStream, UNKNOWN_SOURCE_NAME};
pub use interval::{INTERVAL_POOL_MAX_VALUE, Interval};
pub use options::{CharStreamOptions, DEFAULT_FILL_CHUNK_SIZE, TokenStreamOptions};
pub use token::{
    CommonToken, DEFAULT_CHANNEL, HIDDEN_CHANNEL, INVALID_TYPE, ListTokenSource, Token,
    TokenSource,
};
pub use token_stream::{SourceInterval, TokenStream};
