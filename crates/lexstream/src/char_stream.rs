//! Character streams over a frozen [`CodePointBuffer`].
//!
//! The width chosen by the buffer builder is fixed for the lifetime of the
//! stream; lookahead and text extraction dispatch on it.

use alloc::string::String;
use core::{char::REPLACEMENT_CHARACTER, fmt, ops::Range};

use crate::{
    StreamError,
    code_point_buffer::{CodePointBuffer, CodePointType, Storage},
    int_stream::{CharStream, EOF, SymbolStream, UNKNOWN_SOURCE_NAME},
    interval::Interval,
};

/// An immutable, fully materialized stream of code points with a movable
/// cursor.
///
/// Mark and release are no-ops: [`SymbolStream::seek`] can already return to
/// any index. Seeking does not clamp; a cursor past the end simply reads
/// [`EOF`].
#[derive(Debug, Clone)]
pub struct CodePointCharStream {
    storage: Storage,
    position: usize,
    name: String,
}

impl CodePointCharStream {
    /// Wraps the unread part of `buffer`, taking ownership of its storage.
    #[must_use]
    pub fn from_buffer(buffer: CodePointBuffer, name: impl Into<String>) -> Self {
        Self {
            storage: buffer.into_remaining(),
            position: 0,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn code_point_type(&self) -> CodePointType {
        self.storage.code_point_type()
    }

    /// Relative lookahead without the `&mut` the shared contract asks for.
    #[must_use]
    pub fn la(&self, i: isize) -> i32 {
        let offset = match i.signum() {
            0 => return 0,
            1 => self.position.checked_add_signed(i - 1),
            _ => self.position.checked_add_signed(i),
        };
        offset.and_then(|o| self.symbol_at(o)).unwrap_or(EOF)
    }

    fn symbol_at(&self, offset: usize) -> Option<i32> {
        match &self.storage {
            Storage::Byte(v) => v.get(offset).map(|&b| i32::from(b)),
            Storage::Char(v) => v.get(offset).map(|&c| i32::from(c)),
            Storage::Int(v) => v.get(offset).and_then(|&cp| i32::try_from(cp).ok()),
        }
    }

    /// Unpaired surrogates have no `char` and come out as U+FFFD.
    fn text_in(&self, range: Range<usize>) -> String {
        match &self.storage {
            Storage::Byte(v) => v[range].iter().map(|&b| char::from(b)).collect(),
            Storage::Char(v) => char::decode_utf16(v[range].iter().copied())
                .map(|c| c.unwrap_or(REPLACEMENT_CHARACTER))
                .collect(),
            Storage::Int(v) => v[range]
                .iter()
                .map(|&cp| char::from_u32(cp).unwrap_or(REPLACEMENT_CHARACTER))
                .collect(),
        }
    }
}

impl SymbolStream for CodePointCharStream {
    fn consume(&mut self) -> Result<(), StreamError> {
        if self.position >= self.storage.len() {
            return Err(StreamError::ConsumeEof);
        }
        self.position += 1;
        Ok(())
    }

    fn la(&mut self, i: isize) -> i32 {
        CodePointCharStream::la(self, i)
    }

    fn mark(&mut self) -> isize {
        0
    }

    fn release(&mut self, _marker: isize) {}

    fn index(&self) -> usize {
        self.position
    }

    fn seek(&mut self, index: usize) {
        self.position = index;
    }

    fn size(&self) -> usize {
        self.storage.len()
    }

    fn source_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_SOURCE_NAME
        } else {
            &self.name
        }
    }
}

impl CharStream for CodePointCharStream {
    fn get_text(&self, interval: &Interval) -> String {
        let size = self.storage.len();
        let Ok(a) = usize::try_from(interval.a) else {
            return String::new();
        };
        let requested = i64::from(interval.b) - i64::from(interval.a) + 1;
        let Ok(requested) = usize::try_from(requested) else {
            return String::new();
        };
        let start = a.min(size);
        let length = requested.min(size - start);
        self.text_in(start..start + length)
    }
}

impl fmt::Display for CodePointCharStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text_in(0..self.storage.len()))
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};

    use rstest::rstest;

    use super::*;
    use crate::char_streams;

    fn whole(stream: &CodePointCharStream) -> Interval {
        Interval::new(0, i32::try_from(stream.size()).unwrap() - 1)
    }

    #[rstest]
    #[case::ascii("hello", CodePointType::Byte)]
    #[case::latin1("na\u{ef}ve", CodePointType::Byte)]
    #[case::bmp("\u{41f}\u{440}\u{438}\u{432}\u{435}\u{442}", CodePointType::Char)]
    #[case::supplementary("a\u{1f600}b\u{10348}", CodePointType::Int)]
    #[case::empty("", CodePointType::Byte)]
    fn full_range_text_round_trips(#[case] input: &str, #[case] width: CodePointType) {
        let stream = char_streams::from_string(input);
        assert_eq!(stream.code_point_type(), width);
        assert_eq!(stream.get_text(&whole(&stream)), input);
        assert_eq!(stream.to_string(), input);
    }

    #[test]
    fn surrogate_pair_then_ascii_goes_straight_to_int() {
        let mut input = "\u{1f600}".to_string();
        input.extend(core::iter::repeat_n('x', 300));
        let stream = char_streams::from_string(&input);
        assert_eq!(stream.code_point_type(), CodePointType::Int);
        assert_eq!(stream.size(), 301);
        assert_eq!(stream.la(1), 0x1F600);
        assert_eq!(stream.get_text(&whole(&stream)), input);
    }

    #[test]
    fn lookahead_follows_the_one_based_convention() {
        let mut stream = char_streams::from_string("abc");
        assert_eq!(stream.la(0), 0);
        assert_eq!(stream.la(1), i32::from(b'a'));
        assert_eq!(stream.la(3), i32::from(b'c'));
        assert_eq!(stream.la(4), EOF);
        assert_eq!(stream.la(-1), EOF);

        stream.consume().unwrap();
        stream.consume().unwrap();
        assert_eq!(stream.la(-1), i32::from(b'b'));
        assert_eq!(stream.la(-2), i32::from(b'a'));
        assert_eq!(stream.la(-3), EOF);
        assert_eq!(stream.la(1), i32::from(b'c'));
    }

    #[test]
    fn consume_stops_at_end() {
        let mut stream = char_streams::from_string("\u{3b1}\u{3b2}");
        stream.consume().unwrap();
        stream.consume().unwrap();
        assert_eq!(stream.index(), 2);
        assert_eq!(stream.la(1), EOF);
        assert_eq!(stream.consume(), Err(StreamError::ConsumeEof));
        assert_eq!(stream.index(), 2);
    }

    #[test]
    fn seek_past_end_reads_eof() {
        let mut stream = char_streams::from_string("abc");
        stream.seek(10);
        assert_eq!(stream.index(), 10);
        assert_eq!(stream.la(1), EOF);
        assert_eq!(stream.la(-1), EOF);
        assert_eq!(stream.consume(), Err(StreamError::ConsumeEof));
        stream.seek(1);
        assert_eq!(stream.la(1), i32::from(b'b'));
    }

    #[rstest]
    #[case(Interval::new(1, 3), "ell")]
    #[case(Interval::new(3, 100), "lo")]
    #[case(Interval::new(7, 9), "")]
    #[case(Interval::new(-1, 5), "")]
    #[case(Interval::new(4, 2), "")]
    fn text_is_clamped(#[case] interval: Interval, #[case] expected: &str) {
        let stream = char_streams::from_string("hello");
        assert_eq!(stream.get_text(&interval), expected);
    }

    #[test]
    fn pooled_intervals_work_as_arguments() {
        let stream = char_streams::from_string("x\u{1f600}y");
        assert_eq!(stream.get_text(&Interval::of(1, 1)), "\u{1f600}");
    }

    #[test]
    fn unpaired_surrogates_render_as_replacement() {
        let stream = char_streams::from_utf16(&[0x61_u16, 0xD800], &Default::default()).unwrap();
        assert_eq!(stream.code_point_type(), CodePointType::Int);
        assert_eq!(stream.la(2), 0xD800);
        assert_eq!(stream.to_string(), "a\u{fffd}");
    }

    #[test]
    fn mark_and_release_are_inert() {
        let mut stream = char_streams::from_string("ab");
        let marker = stream.mark();
        assert!(marker >= 0);
        stream.consume().unwrap();
        stream.release(marker);
        assert_eq!(stream.index(), 1);
    }

    #[test]
    fn unnamed_streams_report_unknown_source() {
        assert_eq!(char_streams::from_string("").source_name(), UNKNOWN_SOURCE_NAME);
        let buffer = {
            let mut builder = CodePointBuffer::builder(0);
            builder.append(&"ab".encode_utf16().collect::<Vec<_>>()).unwrap();
            builder.build()
        };
        assert_eq!(CodePointCharStream::from_buffer(buffer, "").source_name(), UNKNOWN_SOURCE_NAME);
    }

    #[test]
    fn from_buffer_starts_at_buffer_position() {
        let mut builder = CodePointBuffer::builder(0);
        builder.append(&"skip:keep".encode_utf16().collect::<Vec<_>>()).unwrap();
        let mut buffer = builder.build();
        buffer.set_position(5);
        let stream = CodePointCharStream::from_buffer(buffer, "tail");
        assert_eq!(stream.size(), 4);
        assert_eq!(stream.to_string(), "keep");
        assert_eq!(stream.source_name(), "tail");
    }
}
