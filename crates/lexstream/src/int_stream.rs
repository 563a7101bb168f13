use alloc::string::String;

use crate::{StreamError, interval::Interval};

/// Symbol returned by lookahead past either end of a stream.
pub const EOF: i32 = -1;

/// Source name reported when none was configured.
pub const UNKNOWN_SOURCE_NAME: &str = "<unknown>";

/// The contract shared by character streams and token streams: a cursor over
/// an indexable sequence of integer symbols.
///
/// Relative lookahead follows the usual convention: `la(1)` is the symbol
/// under the cursor, `la(2)` the one after it, `la(-1)` the one before it and
/// `la(0)` is undefined.
pub trait SymbolStream {
    /// Advances the cursor by one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ConsumeEof`] when the next symbol is [`EOF`].
    fn consume(&mut self) -> Result<(), StreamError>;

    /// Symbol at relative offset `i`, or [`EOF`] when `i` points outside the
    /// stream. Streams that fetch lazily may pull more input, hence `&mut`.
    fn la(&mut self, i: isize) -> i32;

    /// Reserved for streams that cannot seek back losslessly. Every stream in
    /// this crate keeps all of its input, so the marker is a dummy.
    fn mark(&mut self) -> isize;

    /// Releases a marker obtained from [`SymbolStream::mark`].
    fn release(&mut self, marker: isize);

    /// Absolute index of the symbol under the cursor.
    fn index(&self) -> usize;

    /// Moves the cursor to an absolute index.
    fn seek(&mut self, index: usize);

    /// Number of symbols currently held by the stream.
    fn size(&self) -> usize;

    fn source_name(&self) -> &str;
}

/// A [`SymbolStream`] over Unicode code points.
pub trait CharStream: SymbolStream {
    /// Text of the code points covered by `interval`, clamped to the stream.
    fn get_text(&self, interval: &Interval) -> String;
}
