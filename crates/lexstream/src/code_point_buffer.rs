//! Frozen buffers of decoded code points, stored at the narrowest width that
//! fits everything appended.
//!
//! A [`Builder`] accepts UTF-16 input in chunks and ratchets its backing
//! storage from bytes (`0..=0xFF`) to UTF-16 units (`0..=0xFFFF`, no high
//! surrogates) to full code points, never back. Surrogate pairs are merged
//! only at full width; a high surrogate seen at a narrower width jumps
//! straight there. Unpaired surrogates are kept verbatim as bare code points.
//!
//! Invariants
//! - Exactly one backing vector is live; promotion copies it into the wider
//!   one and drops it.
//! - A pending high surrogate only exists at [`CodePointType::Int`] width and
//!   survives across `append` calls, so pairs may straddle chunks.

use alloc::{collections::VecDeque, vec::Vec};
use core::mem;

use tracing::{debug, trace};

use crate::StreamError;

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

fn to_code_point(high: u16, low: u16) -> u32 {
    0x1_0000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
}

/// Width of the elements backing a [`CodePointBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePointType {
    /// One byte per code point, Latin-1 range.
    Byte,
    /// One UTF-16 unit per code point, basic multilingual plane.
    Char,
    /// One `u32` per code point, any plane.
    Int,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Storage {
    Byte(Vec<u8>),
    Char(Vec<u16>),
    Int(Vec<u32>),
}

impl Storage {
    pub(crate) fn code_point_type(&self) -> CodePointType {
        match self {
            Storage::Byte(_) => CodePointType::Byte,
            Storage::Char(_) => CodePointType::Char,
            Storage::Int(_) => CodePointType::Int,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Storage::Byte(v) => v.len(),
            Storage::Char(v) => v.len(),
            Storage::Int(v) => v.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Storage::Byte(v) => v.capacity(),
            Storage::Char(v) => v.capacity(),
            Storage::Int(v) => v.capacity(),
        }
    }

    fn reserve_exact(&mut self, additional: usize) {
        match self {
            Storage::Byte(v) => v.reserve_exact(additional),
            Storage::Char(v) => v.reserve_exact(additional),
            Storage::Int(v) => v.reserve_exact(additional),
        }
    }

    fn drain_front(&mut self, count: usize) {
        match self {
            Storage::Byte(v) => drop(v.drain(..count)),
            Storage::Char(v) => drop(v.drain(..count)),
            Storage::Int(v) => drop(v.drain(..count)),
        }
    }
}

fn widen<N: Copy, W: From<N>>(narrow: &[N], capacity: usize) -> Vec<W> {
    let mut wide = Vec::with_capacity(capacity.max(narrow.len()));
    wide.extend(narrow.iter().map(|&unit| W::from(unit)));
    wide
}

/// UTF-16 text that can be appended to a [`Builder`].
///
/// Only input exposing a single flat slice is supported; anything else makes
/// [`Builder::append`] fail with [`StreamError::NonContiguousInput`].
pub trait Utf16Input {
    fn as_contiguous(&self) -> Option<&[u16]>;
}

impl Utf16Input for [u16] {
    fn as_contiguous(&self) -> Option<&[u16]> {
        Some(self)
    }
}

impl<const N: usize> Utf16Input for [u16; N] {
    fn as_contiguous(&self) -> Option<&[u16]> {
        Some(self)
    }
}

impl Utf16Input for Vec<u16> {
    fn as_contiguous(&self) -> Option<&[u16]> {
        Some(self)
    }
}

impl Utf16Input for VecDeque<u16> {
    /// Contiguous only while the ring has not wrapped around.
    fn as_contiguous(&self) -> Option<&[u16]> {
        match self.as_slices() {
            (front, []) => Some(front),
            ([], back) => Some(back),
            _ => None,
        }
    }
}

impl<T: Utf16Input + ?Sized> Utf16Input for &T {
    fn as_contiguous(&self) -> Option<&[u16]> {
        (**self).as_contiguous()
    }
}

/// Decoded code points with a read position, produced by a [`Builder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePointBuffer {
    storage: Storage,
    position: usize,
}

impl CodePointBuffer {
    #[must_use]
    pub fn builder(initial_buffer_size: usize) -> Builder {
        Builder::new(initial_buffer_size)
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Moves the read position, clamped to the number of code points.
    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.storage.len());
    }

    /// Code points between the read position and the end.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.position
    }

    #[must_use]
    pub fn code_point_type(&self) -> CodePointType {
        self.storage.code_point_type()
    }

    #[must_use]
    pub fn byte_array(&self) -> Option<&[u8]> {
        match &self.storage {
            Storage::Byte(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn char_array(&self) -> Option<&[u16]> {
        match &self.storage {
            Storage::Char(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn int_array(&self) -> Option<&[u32]> {
        match &self.storage {
            Storage::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Hands the unread code points over to a stream.
    pub(crate) fn into_remaining(self) -> Storage {
        let mut storage = self.storage;
        storage.drain_front(self.position);
        storage
    }
}

/// Incremental, single-use constructor for a [`CodePointBuffer`].
#[derive(Debug)]
pub struct Builder {
    storage: Storage,
    pending_high: Option<u16>,
}

impl Builder {
    #[must_use]
    pub fn new(initial_buffer_size: usize) -> Self {
        Self {
            storage: Storage::Byte(Vec::with_capacity(initial_buffer_size)),
            pending_high: None,
        }
    }

    /// Width the builder is currently accumulating at.
    #[must_use]
    pub fn code_point_type(&self) -> CodePointType {
        self.storage.code_point_type()
    }

    /// Decodes one chunk of UTF-16 input.
    ///
    /// # Errors
    ///
    /// [`StreamError::NonContiguousInput`] if `input` is not one flat slice;
    /// the builder is left untouched in that case.
    pub fn append<I: Utf16Input + ?Sized>(&mut self, input: &I) -> Result<(), StreamError> {
        let units = input
            .as_contiguous()
            .ok_or(StreamError::NonContiguousInput)?;
        self.append_slice(units);
        Ok(())
    }

    pub(crate) fn append_slice(&mut self, units: &[u16]) {
        self.ensure_remaining(units.len());
        self.append_units(units);
    }

    /// Finalizes the buffer. A high surrogate still waiting for its partner
    /// is kept as a bare code point.
    #[must_use]
    pub fn build(mut self) -> CodePointBuffer {
        let dangling = self.pending_high.take();
        if let (Some(high), Storage::Int(out)) = (dangling, &mut self.storage) {
            out.push(u32::from(high));
        }
        debug!(
            width = ?self.storage.code_point_type(),
            size = self.storage.len(),
            dangling_surrogate = dangling.is_some(),
            "built code point buffer"
        );
        CodePointBuffer {
            storage: self.storage,
            position: 0,
        }
    }

    fn ensure_remaining(&mut self, needed: usize) {
        let len = self.storage.len();
        let capacity = self.storage.capacity();
        if capacity - len < needed {
            let wanted = capacity + needed;
            let target = wanted.checked_next_power_of_two().unwrap_or(wanted);
            self.storage.reserve_exact(target - len);
        }
    }

    fn append_units(&mut self, mut units: &[u16]) {
        loop {
            let wider = match &mut self.storage {
                Storage::Byte(out) => {
                    let before = out.len();
                    out.extend(units.iter().map_while(|&unit| u8::try_from(unit).ok()));
                    units = &units[out.len() - before..];
                    match units.first() {
                        None => return,
                        Some(&unit) if is_high_surrogate(unit) => CodePointType::Int,
                        Some(_) => CodePointType::Char,
                    }
                }
                Storage::Char(out) => {
                    let taken = units
                        .iter()
                        .position(|&unit| is_high_surrogate(unit))
                        .unwrap_or(units.len());
                    out.extend_from_slice(&units[..taken]);
                    units = &units[taken..];
                    if units.is_empty() {
                        return;
                    }
                    CodePointType::Int
                }
                Storage::Int(out) => {
                    append_int(out, &mut self.pending_high, units);
                    return;
                }
            };
            self.promote(wider, units.len());
        }
    }

    fn promote(&mut self, to: CodePointType, additional: usize) {
        let len = self.storage.len();
        trace!(from = ?self.storage.code_point_type(), to = ?to, len, "promoting code point buffer");
        let capacity = self.storage.capacity().max(len + additional);
        self.storage = match (mem::replace(&mut self.storage, Storage::Byte(Vec::new())), to) {
            (Storage::Byte(old), CodePointType::Char) => Storage::Char(widen(&old, capacity)),
            (Storage::Byte(old), CodePointType::Int) => Storage::Int(widen(&old, capacity)),
            (Storage::Char(old), CodePointType::Int) => Storage::Int(widen(&old, capacity)),
            (current, _) => current,
        };
    }
}

fn append_int(out: &mut Vec<u32>, pending_high: &mut Option<u16>, units: &[u16]) {
    for &unit in units {
        if let Some(high) = pending_high.take() {
            if is_low_surrogate(unit) {
                out.push(to_code_point(high, unit));
                continue;
            }
            // stale high surrogate, then `unit` starts over
            out.push(u32::from(high));
        }
        if is_high_surrogate(unit) {
            *pending_high = Some(unit);
        } else {
            out.push(u32::from(unit));
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use rstest::rstest;

    use super::*;

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn build(chunks: &[&[u16]]) -> CodePointBuffer {
        let mut builder = CodePointBuffer::builder(4);
        for chunk in chunks {
            builder.append(*chunk).unwrap();
        }
        builder.build()
    }

    #[rstest]
    #[case("plain ascii", CodePointType::Byte)]
    #[case("caf\u{e9} \u{ff}", CodePointType::Byte)]
    #[case("\u{3b1}\u{3b2}\u{3b3}", CodePointType::Char)]
    #[case("x\u{20ac}y", CodePointType::Char)]
    #[case("\u{1f600}", CodePointType::Int)]
    #[case("a\u{3b1}\u{1f600}", CodePointType::Int)]
    fn picks_narrowest_width(#[case] input: &str, #[case] expected: CodePointType) {
        let buffer = build(&[&utf16(input)]);
        assert_eq!(buffer.code_point_type(), expected);
        assert_eq!(buffer.remaining(), input.chars().count());
    }

    #[test]
    fn latin1_is_stored_as_bytes() {
        let buffer = build(&[&utf16("a\u{e9}")]);
        assert_eq!(buffer.byte_array(), Some(&[b'a', 0xE9][..]));
        assert_eq!(buffer.char_array(), None);
    }

    #[test]
    fn high_surrogate_skips_char_width() {
        let mut builder = CodePointBuffer::builder(8);
        builder.append(&utf16("ab")).unwrap();
        assert_eq!(builder.code_point_type(), CodePointType::Byte);
        builder.append(&utf16("\u{1f600}")).unwrap();
        assert_eq!(builder.code_point_type(), CodePointType::Int);
        let buffer = builder.build();
        assert_eq!(buffer.int_array(), Some(&[0x61, 0x62, 0x1F600][..]));
    }

    #[test]
    fn never_narrows_again() {
        let mut builder = CodePointBuffer::builder(2);
        builder.append(&utf16("\u{3b1}")).unwrap();
        builder.append(&utf16("plain")).unwrap();
        assert_eq!(builder.code_point_type(), CodePointType::Char);
        builder.append(&utf16("\u{10348}")).unwrap();
        builder.append(&utf16("z")).unwrap();
        let buffer = builder.build();
        assert_eq!(buffer.code_point_type(), CodePointType::Int);
        assert_eq!(buffer.int_array().unwrap().last(), Some(&u32::from('z')));
    }

    #[test]
    fn pair_split_across_chunks_is_merged() {
        let units = utf16("\u{1f600}");
        let buffer = build(&[&units[..1], &units[1..]]);
        assert_eq!(buffer.int_array(), Some(&[0x1F600][..]));
    }

    #[test]
    fn lone_low_surrogate_passes_through() {
        let buffer = build(&[&[0x41, 0xDC00]]);
        assert_eq!(buffer.code_point_type(), CodePointType::Char);
        assert_eq!(buffer.char_array(), Some(&[0x41, 0xDC00][..]));

        let buffer = build(&[&[0xD83D, 0xDE00, 0xDC00]]);
        assert_eq!(buffer.int_array(), Some(&[0x1F600, 0xDC00][..]));
    }

    #[test]
    fn stale_high_surrogate_is_emitted_verbatim() {
        let buffer = build(&[&[0xD800, 0x41]]);
        assert_eq!(buffer.int_array(), Some(&[0xD800, 0x41][..]));

        // second high surrogate starts a fresh pair
        let buffer = build(&[&[0xD800], &[0xD83D, 0xDE00]]);
        assert_eq!(buffer.int_array(), Some(&[0xD800, 0x1F600][..]));
    }

    #[test]
    fn dangling_high_surrogate_is_kept_at_build() {
        let buffer = build(&[&utf16("ok"), &[0xD83D]]);
        assert_eq!(buffer.int_array(), Some(&[0x6F, 0x6B, 0xD83D][..]));
    }

    #[test]
    fn wrapped_ring_is_rejected() {
        let mut ring: VecDeque<u16> = VecDeque::with_capacity(8);
        let capacity = u16::try_from(ring.capacity()).unwrap();
        ring.extend(0..capacity);
        ring.pop_front();
        ring.push_back(0x41);
        assert!(ring.as_contiguous().is_none());

        let mut builder = CodePointBuffer::builder(4);
        builder.append(&[0x61_u16]).unwrap();
        assert_eq!(builder.append(&ring), Err(StreamError::NonContiguousInput));
        assert_eq!(builder.build().byte_array(), Some(&b"a"[..]));
    }

    #[test]
    fn contiguous_ring_is_accepted() {
        let ring: VecDeque<u16> = utf16("hi").into_iter().collect();
        let mut builder = CodePointBuffer::builder(0);
        builder.append(&ring).unwrap();
        assert_eq!(builder.build().byte_array(), Some(&b"hi"[..]));
    }

    #[test]
    fn growth_rounds_up_to_a_power_of_two() {
        let mut builder = CodePointBuffer::builder(3);
        builder.append(&utf16("hello")).unwrap();
        assert_eq!((builder.storage.len(), builder.storage.capacity()), (5, 8));

        // fits in the spare room
        builder.append(&utf16("abc")).unwrap();
        assert_eq!((builder.storage.len(), builder.storage.capacity()), (8, 8));

        // 8 + 20 rounds up to 32
        builder.append(&utf16(&"a".repeat(20))).unwrap();
        assert_eq!((builder.storage.len(), builder.storage.capacity()), (28, 32));

        // promotion keeps the capacity already reserved
        builder.append(&utf16("\u{3b1}xy")).unwrap();
        assert_eq!(builder.code_point_type(), CodePointType::Char);
        assert_eq!((builder.storage.len(), builder.storage.capacity()), (31, 32));
    }

    #[test]
    fn position_tracks_remaining() {
        let mut buffer = build(&[&utf16("abcdef")]);
        assert_eq!((buffer.position(), buffer.remaining()), (0, 6));
        buffer.set_position(4);
        assert_eq!(buffer.remaining(), 2);
        buffer.set_position(100);
        assert_eq!((buffer.position(), buffer.remaining()), (6, 0));
        assert_eq!(buffer.clone().into_remaining(), Storage::Byte(vec![]));
    }
}
