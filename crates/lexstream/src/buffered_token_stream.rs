//! A lazily filled, never discarded cache of tokens with unbounded lookahead.
//!
//! Tokens are pulled from the upstream [`TokenSource`] only when a lookahead,
//! seek or text request needs them, appended strictly in source order, and
//! kept for the lifetime of the stream. Because nothing is ever dropped,
//! seeking backwards is always possible and `mark`/`release` are no-ops.
//!
//! Cursor states
//! - uninitialized: nothing fetched yet (`index()` reports 0)
//! - positioned: at least one token cached; at end of input the cursor pins
//!   to the EOF token in the last slot.
//!
//! Where the cursor lands after `consume` and `seek` is decided by a
//! [`SeekPolicy`]. The default, [`Unfiltered`], lands on the requested index;
//! [`OnChannel`] skips forward over tokens on other channels.

use alloc::{string::String, vec::Vec};
use core::fmt;

use tracing::{debug, trace};

use crate::{
    StreamError,
    int_stream::{EOF, SymbolStream},
    interval::Interval,
    options::TokenStreamOptions,
    token::{DEFAULT_CHANNEL, INVALID_TYPE, Token, TokenSource},
    token_stream::TokenStream,
};

/// The fetched tokens together with the source they came from.
pub struct TokenCache<S: TokenSource> {
    source: S,
    tokens: Vec<S::Token>,
    fetched_eof: bool,
}

impl<S: TokenSource> TokenCache<S> {
    fn new(source: S) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            fetched_eof: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn tokens(&self) -> &[S::Token] {
        &self.tokens
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&S::Token> {
        self.tokens.get(index)
    }

    /// Has the source's EOF token been appended?
    #[must_use]
    pub fn fetched_eof(&self) -> bool {
        self.fetched_eof
    }

    #[must_use]
    pub fn token_source(&self) -> &S {
        &self.source
    }

    /// Makes sure index `i` is cached. Returns `false` if the source ran out
    /// first.
    pub fn sync(&mut self, i: usize) -> bool {
        let missing = i.saturating_add(1).saturating_sub(self.tokens.len());
        if missing > 0 {
            return self.fetch(missing) >= missing;
        }
        true
    }

    /// Appends up to `n` tokens and returns how many were appended. Fewer
    /// than `n` means the EOF token was reached.
    pub fn fetch(&mut self, n: usize) -> usize {
        if self.fetched_eof {
            return 0;
        }
        for fetched in 1..=n {
            let token = self.source.next_token();
            let eof = token.is_eof();
            self.tokens.push(token);
            if eof {
                self.fetched_eof = true;
                debug!(
                    size = self.tokens.len(),
                    source = self.source.source_name(),
                    "token source exhausted"
                );
                return fetched;
            }
        }
        n
    }

    /// First index at or after `i` holding a token on `channel`, or the EOF
    /// token's index if none is.
    pub fn next_token_on_channel(&mut self, mut i: usize, channel: u32) -> usize {
        self.sync(i);
        loop {
            let Some(token) = self.tokens.get(i) else {
                return self.tokens.len().saturating_sub(1);
            };
            if token.channel() == channel || token.is_eof() {
                return i;
            }
            i += 1;
            self.sync(i);
        }
    }

    /// Last index at or before `i` holding a token on `channel` (or EOF).
    pub fn previous_token_on_channel(&mut self, i: usize, channel: u32) -> Option<usize> {
        self.sync(i);
        if i >= self.tokens.len() {
            return self.tokens.len().checked_sub(1);
        }
        (0..=i).rev().find(|&j| {
            let token = &self.tokens[j];
            token.is_eof() || token.channel() == channel
        })
    }

    fn filter_for_channel(&self, from: usize, to: usize, channel: Option<u32>) -> Vec<&S::Token> {
        self.tokens
            .get(from..=to)
            .unwrap_or_default()
            .iter()
            .filter(|t| match channel {
                Some(channel) => t.channel() == channel,
                None => t.channel() != DEFAULT_CHANNEL,
            })
            .collect()
    }
}

impl<S> fmt::Debug for TokenCache<S>
where
    S: TokenSource,
    S::Token: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("tokens", &self.tokens)
            .field("fetched_eof", &self.fetched_eof)
            .finish_non_exhaustive()
    }
}

/// Decides where the cursor lands when the stream moves to `index`.
///
/// The policy may fetch more tokens through `cache`. It must return an index
/// at or after `index`, or the index of the EOF token.
pub trait SeekPolicy<S: TokenSource> {
    fn adjust_seek_index(&mut self, cache: &mut TokenCache<S>, index: usize) -> usize;
}

/// Lands exactly where asked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unfiltered;

impl<S: TokenSource> SeekPolicy<S> for Unfiltered {
    fn adjust_seek_index(&mut self, _cache: &mut TokenCache<S>, index: usize) -> usize {
        index
    }
}

/// Skips forward to the next token on the given channel.
///
/// Only the cursor is filtered: `lt(k)` for `k > 1` still counts every
/// cached slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnChannel(pub u32);

impl Default for OnChannel {
    fn default() -> Self {
        OnChannel(DEFAULT_CHANNEL)
    }
}

impl<S: TokenSource> SeekPolicy<S> for OnChannel {
    fn adjust_seek_index(&mut self, cache: &mut TokenCache<S>, index: usize) -> usize {
        cache.next_token_on_channel(index, self.0)
    }
}

impl<S, F> SeekPolicy<S> for F
where
    S: TokenSource,
    F: FnMut(&mut TokenCache<S>, usize) -> usize,
{
    fn adjust_seek_index(&mut self, cache: &mut TokenCache<S>, index: usize) -> usize {
        self(cache, index)
    }
}

/// Buffers every token of a [`TokenSource`] for a parser with unbounded
/// lookahead.
///
/// ```rust
/// use lexstream::{BufferedTokenStream, CommonToken, ListTokenSource, TokenStream};
///
/// let source = ListTokenSource::new(vec![
///     CommonToken::new(1, "let"),
///     CommonToken::new(2, " "),
///     CommonToken::new(3, "x"),
/// ]);
/// let mut stream = BufferedTokenStream::new(source);
/// assert_eq!(stream.lt(3).unwrap().text, "x");
/// assert_eq!(stream.text(), "let x");
/// ```
pub struct BufferedTokenStream<S: TokenSource, P = Unfiltered> {
    cache: TokenCache<S>,
    p: Option<usize>,
    policy: P,
    options: TokenStreamOptions,
}

impl<S: TokenSource> BufferedTokenStream<S> {
    /// Stream with the default options and the identity seek policy. Nothing
    /// is fetched until the first lookahead.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_options(source, Unfiltered, TokenStreamOptions::default())
    }

    #[must_use]
    pub fn builder() -> TokenStreamBuilder<S> {
        TokenStreamBuilder::new()
    }
}

impl<S: TokenSource, P: SeekPolicy<S>> BufferedTokenStream<S, P> {
    #[must_use]
    pub fn with_policy(source: S, policy: P) -> Self {
        Self::with_options(source, policy, TokenStreamOptions::default())
    }

    #[must_use]
    pub fn with_options(source: S, policy: P, options: TokenStreamOptions) -> Self {
        Self {
            cache: TokenCache::new(source),
            p: None,
            policy,
            options,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &TokenCache<S> {
        &self.cache
    }

    /// Tokens fetched so far, in source order.
    #[must_use]
    pub fn tokens(&self) -> &[S::Token] {
        &self.cache.tokens
    }

    fn lazy_init(&mut self) -> usize {
        match self.p {
            Some(p) => p,
            None => self.setup(),
        }
    }

    fn setup(&mut self) -> usize {
        self.cache.sync(0);
        let p = self.policy.adjust_seek_index(&mut self.cache, 0);
        self.p = Some(p);
        p
    }

    /// See [`TokenCache::sync`].
    pub fn sync(&mut self, i: usize) -> bool {
        self.cache.sync(i)
    }

    /// See [`TokenCache::fetch`].
    pub fn fetch(&mut self, n: usize) -> usize {
        self.cache.fetch(n)
    }

    /// Pulls every remaining token from the source. Calling it again is a
    /// no-op.
    pub fn fill(&mut self) {
        self.lazy_init();
        let chunk = self.options.fill_chunk_size.max(1);
        loop {
            let fetched = self.cache.fetch(chunk);
            trace!(fetched, size = self.cache.len(), "fill round");
            if fetched < chunk {
                return;
            }
        }
    }

    /// The `k`-th token before the cursor, if one is cached.
    pub fn lb(&mut self, k: usize) -> Option<&S::Token> {
        let p = self.lazy_init();
        if k == 0 {
            return None;
        }
        p.checked_sub(k).and_then(|i| self.cache.tokens.get(i))
    }

    /// Cached tokens in `start..=stop`, cut short at EOF and clamped to the
    /// cache. `None` when either bound is negative.
    pub fn get_range(&mut self, start: isize, stop: isize) -> Option<Vec<&S::Token>> {
        let (Ok(start), Ok(stop)) = (usize::try_from(start), usize::try_from(stop)) else {
            return None;
        };
        self.lazy_init();
        let stop = stop.min(self.cache.len().checked_sub(1)?);
        let tokens = self.cache.tokens.get(start..=stop).unwrap_or_default();
        Some(tokens.iter().take_while(|t| !t.is_eof()).collect())
    }

    /// Cached tokens in `start..=stop` whose type is in `types` (all of them
    /// when `types` is `None`).
    ///
    /// # Errors
    ///
    /// [`StreamError::RangeOutOfRange`] if either bound falls outside the
    /// cache.
    pub fn get_tokens(
        &mut self,
        start: usize,
        stop: usize,
        types: Option<&[i32]>,
    ) -> Result<Vec<&S::Token>, StreamError> {
        self.lazy_init();
        let size = self.cache.len();
        if start >= size || stop >= size {
            return Err(StreamError::RangeOutOfRange { start, stop, size });
        }
        let tokens = self.cache.tokens.get(start..=stop).unwrap_or_default();
        Ok(tokens
            .iter()
            .filter(|t| types.is_none_or(|types| types.contains(&t.token_type())))
            .collect())
    }

    /// See [`TokenCache::next_token_on_channel`].
    pub fn next_token_on_channel(&mut self, i: usize, channel: u32) -> usize {
        self.cache.next_token_on_channel(i, channel)
    }

    /// See [`TokenCache::previous_token_on_channel`].
    pub fn previous_token_on_channel(&mut self, i: usize, channel: u32) -> Option<usize> {
        self.cache.previous_token_on_channel(i, channel)
    }

    /// Off-channel tokens between `index` and the next default-channel token.
    /// `channel: None` collects every non-default channel.
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfRange`] if `index` is not cached.
    pub fn hidden_tokens_to_right(
        &mut self,
        index: usize,
        channel: Option<u32>,
    ) -> Result<Vec<&S::Token>, StreamError> {
        self.lazy_init();
        self.check_cached(index)?;
        let to = self.cache.next_token_on_channel(index + 1, DEFAULT_CHANNEL);
        Ok(self.cache.filter_for_channel(index + 1, to, channel))
    }

    /// Off-channel tokens between the previous default-channel token and
    /// `index`.
    ///
    /// # Errors
    ///
    /// [`StreamError::IndexOutOfRange`] if `index` is not cached.
    pub fn hidden_tokens_to_left(
        &mut self,
        index: usize,
        channel: Option<u32>,
    ) -> Result<Vec<&S::Token>, StreamError> {
        self.lazy_init();
        self.check_cached(index)?;
        let Some(to) = index.checked_sub(1) else {
            return Ok(Vec::new());
        };
        let previous = self.cache.previous_token_on_channel(to, DEFAULT_CHANNEL);
        if previous == Some(to) {
            return Ok(Vec::new());
        }
        let from = previous.map_or(0, |p| p + 1);
        Ok(self.cache.filter_for_channel(from, to, channel))
    }

    fn check_cached(&self, index: usize) -> Result<(), StreamError> {
        let size = self.cache.len();
        if index >= size {
            return Err(StreamError::IndexOutOfRange {
                index: isize::try_from(index).unwrap_or(isize::MAX),
                size,
            });
        }
        Ok(())
    }
}

impl<S: TokenSource, P: SeekPolicy<S>> SymbolStream for BufferedTokenStream<S, P> {
    fn consume(&mut self) -> Result<(), StreamError> {
        let size = self.cache.len();
        let skip_eof_check = self.p.is_some_and(|p| {
            if self.cache.fetched_eof {
                p.saturating_add(1) < size
            } else {
                p < size
            }
        });
        if !skip_eof_check && self.la(1) == EOF {
            return Err(StreamError::ConsumeEof);
        }
        let next = self.lazy_init().saturating_add(1);
        if self.cache.sync(next) {
            self.p = Some(self.policy.adjust_seek_index(&mut self.cache, next));
        }
        Ok(())
    }

    fn la(&mut self, i: isize) -> i32 {
        self.lt(i).map_or(INVALID_TYPE, Token::token_type)
    }

    fn mark(&mut self) -> isize {
        0
    }

    fn release(&mut self, _marker: isize) {}

    fn index(&self) -> usize {
        self.p.unwrap_or(0)
    }

    fn seek(&mut self, index: usize) {
        self.lazy_init();
        self.p = Some(self.policy.adjust_seek_index(&mut self.cache, index));
    }

    /// Tokens cached so far; equals the source's token count after `fill`.
    fn size(&self) -> usize {
        self.cache.len()
    }

    fn source_name(&self) -> &str {
        self.cache.source.source_name()
    }
}

impl<S: TokenSource, P: SeekPolicy<S>> TokenStream for BufferedTokenStream<S, P> {
    type Source = S;
    type Token = S::Token;

    fn lt(&mut self, k: isize) -> Option<&S::Token> {
        let p = self.lazy_init();
        match k.signum() {
            0 => None,
            -1 => self.lb(k.unsigned_abs()),
            _ => {
                let i = p.saturating_add(k.unsigned_abs() - 1);
                self.cache.sync(i);
                // past the end: the last slot holds EOF
                self.cache.tokens.get(i).or_else(|| self.cache.tokens.last())
            }
        }
    }

    fn get(&self, index: isize) -> Result<&S::Token, StreamError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cache.tokens.get(i))
            .ok_or(StreamError::IndexOutOfRange {
                index,
                size: self.cache.len(),
            })
    }

    fn token_source(&self) -> &S {
        &self.cache.source
    }

    fn text(&mut self) -> String {
        self.fill();
        self.cache
            .tokens
            .iter()
            .take_while(|t| !t.is_eof())
            .map(|t| t.text())
            .collect()
    }

    fn get_text(&mut self, interval: &Interval) -> String {
        let (Ok(start), Ok(stop)) = (usize::try_from(interval.a), usize::try_from(interval.b))
        else {
            return String::new();
        };
        self.lazy_init();
        self.cache.sync(stop);
        let Some(last) = self.cache.len().checked_sub(1) else {
            return String::new();
        };
        self.cache
            .tokens
            .get(start..=stop.min(last))
            .unwrap_or_default()
            .iter()
            .take_while(|t| !t.is_eof())
            .map(|t| t.text())
            .collect()
    }
}

impl<S, P> fmt::Debug for BufferedTokenStream<S, P>
where
    S: TokenSource,
    S::Token: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedTokenStream")
            .field("cache", &self.cache)
            .field("p", &self.p)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Step-by-step construction of a [`BufferedTokenStream`].
#[derive(Debug, Clone)]
pub struct TokenStreamBuilder<S, P = Unfiltered> {
    source: Option<S>,
    policy: P,
    options: TokenStreamOptions,
}

impl<S: TokenSource> TokenStreamBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            policy: Unfiltered,
            options: TokenStreamOptions::default(),
        }
    }
}

impl<S: TokenSource> Default for TokenStreamBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TokenSource, P: SeekPolicy<S>> TokenStreamBuilder<S, P> {
    #[must_use]
    pub fn token_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn options(mut self, options: TokenStreamOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn policy<Q: SeekPolicy<S>>(self, policy: Q) -> TokenStreamBuilder<S, Q> {
        TokenStreamBuilder {
            source: self.source,
            policy,
            options: self.options,
        }
    }

    /// # Errors
    ///
    /// [`StreamError::MissingTokenSource`] if no source was supplied.
    pub fn build(self) -> Result<BufferedTokenStream<S, P>, StreamError> {
        let source = self.source.ok_or(StreamError::MissingTokenSource)?;
        Ok(BufferedTokenStream::with_options(
            source,
            self.policy,
            self.options,
        ))
    }
}
