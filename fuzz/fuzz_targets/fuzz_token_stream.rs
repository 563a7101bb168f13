#![no_main]

use arbitrary::Arbitrary;
use lexstream::{
    BufferedTokenStream, CommonToken, EOF, ListTokenSource, OnChannel, SymbolStream, Token,
    TokenStream, TokenStreamOptions,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Consume,
    Seek(u8),
    Lt(i8),
    Fill,
    Text(i8, i8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    /// Channel of each token.
    channels: Vec<u8>,
    fill_chunk_size: u8,
    on_channel: bool,
    ops: Vec<Op>,
}

fn run<P>(mut stream: BufferedTokenStream<ListTokenSource, P>, ops: &[Op], len: usize)
where
    P: lexstream::SeekPolicy<ListTokenSource>,
{
    for op in ops {
        match *op {
            Op::Consume => {
                let at_eof = stream.la(1) == EOF;
                assert_eq!(stream.consume().is_err(), at_eof);
            }
            Op::Seek(i) => stream.seek(usize::from(i)),
            Op::Lt(k) => {
                if let Some(t) = stream.lt(isize::from(k)) {
                    let i = usize::try_from(t.token_index()).unwrap();
                    assert!(i <= len);
                    assert_eq!(t.is_eof(), i == len);
                }
            }
            Op::Fill => {
                stream.fill();
                assert_eq!(stream.size(), len + 1);
            }
            Op::Text(a, b) => {
                let text = stream.get_text(&lexstream::Interval::new(a.into(), b.into()));
                assert!(text.len() <= len);
            }
        }
        assert!(stream.size() <= len + 1);
    }
}

fuzz_target!(|input: Input| {
    let tokens: Vec<CommonToken> = input
        .channels
        .iter()
        .map(|&c| CommonToken::new(1, "x").with_channel(u32::from(c % 3)))
        .collect();
    let len = tokens.len();
    let options = TokenStreamOptions {
        fill_chunk_size: usize::from(input.fill_chunk_size),
    };
    let source = ListTokenSource::new(tokens);
    if input.on_channel {
        run(
            BufferedTokenStream::with_options(source, OnChannel(0), options),
            &input.ops,
            len,
        );
    } else {
        run(
            BufferedTokenStream::with_options(source, lexstream::Unfiltered, options),
            &input.ops,
            len,
        );
    }
});
