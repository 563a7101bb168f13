
use alloc::{format, vec::Vec};

use tracing_subscriber::EnvFilter;

use crate::{CommonToken, EOF, TokenSource};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Quickcheck budget: larger on CI, tiny under miri or `test-fast`.
pub(crate) fn property_tests() -> u64 {
    if cfg!(any(miri, feature = "test-fast")) {
        10
    } else if is_ci::cached() {
        10_000
    } else {
        1_000
    }
}

/// Produces `total` numbered tokens and then EOF, counting every pull.
#[derive(Debug)]
pub(crate) struct CountingSource {
    pub total: usize,
    pub pulled: usize,
}

impl CountingSource {
    pub(crate) fn new(total: usize) -> Self {
        Self { total, pulled: 0 }
    }

    /// Every token the source will produce, EOF included.
    pub(crate) fn expected(&self) -> Vec<CommonToken> {
        (0..=self.total).map(|i| self.token(i)).collect()
    }

    fn token(&self, i: usize) -> CommonToken {
        let index = i32::try_from(i).unwrap();
        if i == self.total {
            CommonToken::eof().with_index(index)
        } else {
            CommonToken::new(index + 1, format!("t{i} ")).with_index(index)
        }
    }
}

impl TokenSource for CountingSource {
    type Token = CommonToken;

    fn next_token(&mut self) -> CommonToken {
        let i = self.pulled.min(self.total);
        self.pulled += 1;
        self.token(i)
    }
}

#[test]
fn counting_source_ends_with_eof() {
    let mut source = CountingSource::new(2);
    let types: Vec<i32> = (0..4).map(|_| source.next_token().token_type).collect();
    assert_eq!(types, [1, 2, EOF, EOF]);
}
