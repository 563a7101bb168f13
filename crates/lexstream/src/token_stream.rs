use alloc::string::String;

use crate::{
    StreamError,
    int_stream::SymbolStream,
    interval::Interval,
    token::{Token, TokenSource},
};

/// Anything that covers a span of token indices, such as a parse-tree rule
/// context.
pub trait SourceInterval {
    fn source_interval(&self) -> Interval;
}

impl SourceInterval for Interval {
    fn source_interval(&self) -> Interval {
        *self
    }
}

/// A [`SymbolStream`] whose symbols are tokens.
pub trait TokenStream: SymbolStream {
    type Source: TokenSource<Token = Self::Token>;
    type Token: Token;

    /// Token at relative offset `k` (1 = current, -1 = previous). `k == 0`
    /// and look-behind past the start yield `None`; lookahead past the end
    /// yields the EOF token.
    fn lt(&mut self, k: isize) -> Option<&Self::Token>;

    /// Already fetched token at absolute `index`; never fetches.
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfRange`] outside the fetched tokens.
    fn get(&self, index: isize) -> Result<&Self::Token, StreamError>;

    fn token_source(&self) -> &Self::Source;

    /// Text of every token up to, not including, EOF.
    fn text(&mut self) -> String;

    /// Text of the tokens in `interval`, clamped to the stream and cut at EOF.
    fn get_text(&mut self, interval: &Interval) -> String;

    /// Text between two tokens, inclusive; empty when either is absent.
    fn get_text_between(
        &mut self,
        start: Option<&Self::Token>,
        stop: Option<&Self::Token>,
    ) -> String {
        match (start, stop) {
            (Some(start), Some(stop)) => {
                let interval = Interval::of(start.token_index(), stop.token_index());
                self.get_text(&interval)
            }
            _ => String::new(),
        }
    }

    /// Text of whatever token span `context` covers.
    fn get_text_in(&mut self, context: &dyn SourceInterval) -> String {
        self.get_text(&context.source_interval())
    }
}
