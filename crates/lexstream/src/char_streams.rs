//! Factory functions that frame text into a [`CodePointCharStream`].

use alloc::vec::Vec;

use crate::{
    StreamError,
    char_stream::CodePointCharStream,
    code_point_buffer::{CodePointBuffer, Utf16Input},
    options::CharStreamOptions,
};

fn finish(buffer: CodePointBuffer, options: &CharStreamOptions) -> CodePointCharStream {
    CodePointCharStream::from_buffer(buffer, options.source_name.clone().unwrap_or_default())
}

/// Stream over `input` with an unknown source name.
#[must_use]
pub fn from_string(input: &str) -> CodePointCharStream {
    from_string_with(input, &CharStreamOptions::default())
}

#[must_use]
pub fn from_string_with(input: &str, options: &CharStreamOptions) -> CodePointCharStream {
    let units: Vec<u16> = input.encode_utf16().collect();
    let mut builder = CodePointBuffer::builder(options.initial_capacity.unwrap_or(units.len()));
    builder.append_slice(&units);
    finish(builder.build(), options)
}

/// Stream over one chunk of UTF-16 code units. Unpaired surrogates are kept.
///
/// # Errors
///
/// [`StreamError::NonContiguousInput`] when `input` is not one flat slice.
pub fn from_utf16<I: Utf16Input + ?Sized>(
    input: &I,
    options: &CharStreamOptions,
) -> Result<CodePointCharStream, StreamError> {
    from_utf16_chunks(core::iter::once(input), options)
}

/// Stream over several chunks of UTF-16 code units, decoded as if they were
/// one. A surrogate pair may straddle two chunks.
///
/// # Errors
///
/// [`StreamError::NonContiguousInput`] as soon as one chunk is not flat.
pub fn from_utf16_chunks<C, I>(
    chunks: I,
    options: &CharStreamOptions,
) -> Result<CodePointCharStream, StreamError>
where
    C: Utf16Input,
    I: IntoIterator<Item = C>,
{
    let mut builder = CodePointBuffer::builder(options.initial_capacity.unwrap_or_default());
    for chunk in chunks {
        builder.append(&chunk)?;
    }
    Ok(finish(builder.build(), options))
}

#[cfg(test)]
mod tests {
    use alloc::{collections::VecDeque, string::ToString, vec};

    use super::*;
    use crate::{CharStream, CodePointType, Interval, SymbolStream, UNKNOWN_SOURCE_NAME};

    #[test]
    fn options_name_the_stream() {
        let options = CharStreamOptions {
            source_name: Some("grammar.g4".to_string()),
            initial_capacity: Some(1),
        };
        let stream = from_string_with("rule: ID;", &options);
        assert_eq!(stream.source_name(), "grammar.g4");
        assert_eq!(stream.to_string(), "rule: ID;");

        let unnamed = from_string_with("x", &CharStreamOptions::default());
        assert_eq!(unnamed.source_name(), UNKNOWN_SOURCE_NAME);
    }

    #[test]
    fn chunks_decode_as_one_input() {
        let units: Vec<u16> = "ab\u{1f600}cd".encode_utf16().collect();
        let (left, right) = units.split_at(3);
        let stream =
            from_utf16_chunks([left.to_vec(), right.to_vec()], &CharStreamOptions::default()).unwrap();
        assert_eq!(stream.code_point_type(), CodePointType::Int);
        assert_eq!(stream.size(), 5);
        assert_eq!(stream.get_text(&Interval::of(2, 2)), "\u{1f600}");
    }

    #[test]
    fn non_contiguous_chunk_fails_fast() {
        let mut ring: VecDeque<u16> = VecDeque::with_capacity(4);
        let capacity = u16::try_from(ring.capacity()).unwrap();
        ring.extend(0x61..0x61 + capacity);
        ring.pop_front();
        ring.push_back(0x7A);

        let err = from_utf16_chunks(vec![VecDeque::from(vec![0x61]), ring], &CharStreamOptions::default())
            .unwrap_err();
        assert_eq!(err, StreamError::NonContiguousInput);
    }
}
