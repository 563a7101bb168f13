#![no_main]

use arbitrary::Arbitrary;
use lexstream::{CharStream, CharStreamOptions, EOF, Interval, SymbolStream, char_streams};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    units: Vec<u16>,
    /// Chunk lengths; the tail after the last one is appended as a final chunk.
    splits: Vec<u8>,
    seek: u16,
}

fuzz_target!(|input: Input| {
    let mut chunks = Vec::new();
    let mut rest = input.units.as_slice();
    for split in input.splits {
        let at = usize::from(split).min(rest.len());
        let (head, tail) = rest.split_at(at);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);

    let mut stream = char_streams::from_utf16_chunks(chunks, &CharStreamOptions::default())
        .expect("slices are contiguous");

    let expected: Vec<char> = char::decode_utf16(input.units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    assert_eq!(stream.size(), expected.len());

    let whole = Interval::new(0, i32::try_from(expected.len()).unwrap() - 1);
    assert_eq!(stream.get_text(&whole), expected.iter().collect::<String>());

    let seek = usize::from(input.seek);
    stream.seek(seek);
    let la = stream.la(1);
    match expected.get(seek) {
        Some(&c) if c != char::REPLACEMENT_CHARACTER => assert_eq!(la, c as i32),
        Some(_) => assert!(la >= 0),
        None => assert_eq!(la, EOF),
    }
});
