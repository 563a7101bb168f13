//! Tokens and the sources that produce them.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::int_stream::{EOF, UNKNOWN_SOURCE_NAME};

/// Type code of a token that carries no type.
pub const INVALID_TYPE: i32 = 0;

/// Channel the parser reads by default.
pub const DEFAULT_CHANNEL: u32 = 0;

/// Conventional channel for whitespace and comments.
pub const HIDDEN_CHANNEL: u32 = 1;

/// A lexed symbol as seen by a token stream.
///
/// Indices and character offsets are `-1` when unknown.
pub trait Token {
    fn token_type(&self) -> i32;

    fn text(&self) -> &str;

    fn channel(&self) -> u32 {
        DEFAULT_CHANNEL
    }

    /// Position of this token within its source, assigned by the source.
    fn token_index(&self) -> i32;

    fn start_index(&self) -> i32 {
        -1
    }

    fn stop_index(&self) -> i32 {
        -1
    }

    fn is_eof(&self) -> bool {
        self.token_type() == EOF
    }
}

/// An ordered, append-only producer of tokens, typically a lexer.
///
/// Once the source has returned its [`EOF`] token it must keep returning EOF
/// tokens, and it never revises a token it already produced.
pub trait TokenSource {
    type Token: Token;

    fn next_token(&mut self) -> Self::Token;

    fn source_name(&self) -> &str {
        UNKNOWN_SOURCE_NAME
    }
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    type Token = S::Token;

    fn next_token(&mut self) -> Self::Token {
        (**self).next_token()
    }

    fn source_name(&self) -> &str {
        (**self).source_name()
    }
}

/// Owned token with the fields a lexer usually fills in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommonToken {
    pub token_type: i32,
    pub text: String,
    pub channel: u32,
    pub token_index: i32,
    pub start: i32,
    pub stop: i32,
}

impl CommonToken {
    #[must_use]
    pub fn new(token_type: i32, text: impl Into<String>) -> Self {
        Self {
            token_type,
            text: text.into(),
            channel: DEFAULT_CHANNEL,
            token_index: -1,
            start: -1,
            stop: -1,
        }
    }

    /// End-of-stream token with the conventional `<EOF>` text.
    #[must_use]
    pub fn eof() -> Self {
        Self::new(EOF, "<EOF>")
    }

    #[must_use]
    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    #[must_use]
    pub fn with_index(mut self, token_index: i32) -> Self {
        self.token_index = token_index;
        self
    }

    /// Character offsets `start..=stop` in the underlying char stream.
    #[must_use]
    pub fn with_span(mut self, start: i32, stop: i32) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }
}

impl Token for CommonToken {
    fn token_type(&self) -> i32 {
        self.token_type
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn channel(&self) -> u32 {
        self.channel
    }

    fn token_index(&self) -> i32 {
        self.token_index
    }

    fn start_index(&self) -> i32 {
        self.start
    }

    fn stop_index(&self) -> i32 {
        self.stop
    }
}

/// Debug dump in the form `[@index,start:stop='text',<type>]`, with
/// `,channel=n` appended for tokens off the default channel.
impl fmt::Display for CommonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[@{},{}:{}='", self.token_index, self.start, self.stop)?;
        for c in self.text.chars() {
            match c {
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{c}")?,
            }
        }
        write!(f, "',<{}>", self.token_type)?;
        if self.channel != DEFAULT_CHANNEL {
            write!(f, ",channel={}", self.channel)?;
        }
        f.write_str("]")
    }
}

/// Replays a fixed list of tokens, then produces EOF forever.
///
/// Token indices are stamped with the replay position. The synthesized EOF
/// token starts one character past the last token's stop offset.
#[derive(Debug, Clone)]
pub struct ListTokenSource {
    tokens: Vec<CommonToken>,
    next: usize,
    name: String,
}

impl ListTokenSource {
    #[must_use]
    pub fn new(tokens: Vec<CommonToken>) -> Self {
        Self::named(tokens, String::new())
    }

    #[must_use]
    pub fn named(tokens: Vec<CommonToken>, name: impl Into<String>) -> Self {
        Self {
            tokens,
            next: 0,
            name: name.into(),
        }
    }

    fn eof_token(&self) -> CommonToken {
        let index = i32::try_from(self.tokens.len()).unwrap_or(i32::MAX);
        let start = self.tokens.last().map_or(0, |t| t.stop.saturating_add(1));
        CommonToken::eof()
            .with_index(index)
            .with_span(start, start.saturating_sub(1))
    }
}

impl TokenSource for ListTokenSource {
    type Token = CommonToken;

    fn next_token(&mut self) -> CommonToken {
        // a listed EOF ends the replay early
        match self.tokens.get(self.next).filter(|t| !t.is_eof()) {
            Some(token) => {
                let index = i32::try_from(self.next).unwrap_or(i32::MAX);
                self.next += 1;
                token.clone().with_index(index)
            }
            None => self.eof_token(),
        }
    }

    fn source_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_SOURCE_NAME
        } else {
            &self.name
        }
    }
}
