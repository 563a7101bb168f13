//! Closed integer ranges `[a, b]` used to address symbols in a stream.
//!
//! Single-point intervals are by far the most common request (one token, one
//! character), so [`Interval::of`] hands out shared instances for every point
//! in `0..=INTERVAL_POOL_MAX_VALUE`. The pool is a process-wide table of
//! write-once slots: a slot is filled on first use and never overwritten, and
//! racing initializers agree on the value, so readers never lock.

use alloc::{borrow::Cow, boxed::Box};
use core::fmt;

use once_cell::race::OnceBox;

/// Largest single-point value served from the shared pool.
pub const INTERVAL_POOL_MAX_VALUE: i32 = 1000;

#[expect(clippy::cast_sign_loss)]
const POOL_LEN: usize = INTERVAL_POOL_MAX_VALUE as usize + 1;

static POOL: [OnceBox<Interval>; POOL_LEN] = [const { OnceBox::new() }; POOL_LEN];

/// An immutable closed range of integers. `a > b` denotes an empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub a: i32,
    pub b: i32,
}

impl Interval {
    /// The canonical empty interval.
    pub const INVALID: Interval = Interval { a: -1, b: -2 };

    /// Builds a fresh interval without consulting the pool.
    #[must_use]
    pub const fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Returns `[a, b]`, borrowed from the shared pool when `a == b` and `a`
    /// lies in `0..=INTERVAL_POOL_MAX_VALUE`, freshly allocated otherwise.
    ///
    /// ```rust
    /// use std::borrow::Cow;
    /// use lexstream::Interval;
    ///
    /// assert!(matches!(Interval::of(5, 5), Cow::Borrowed(_)));
    /// assert!(matches!(Interval::of(5, 9), Cow::Owned(_)));
    /// ```
    #[must_use]
    pub fn of(a: i32, b: i32) -> Cow<'static, Interval> {
        let slot = usize::try_from(a)
            .ok()
            .filter(|_| a == b)
            .and_then(|i| POOL.get(i));
        match slot {
            Some(slot) => Cow::Borrowed(slot.get_or_init(|| Box::new(Interval::new(a, a)))),
            None => Cow::Owned(Interval::new(a, b)),
        }
    }

    /// Number of integers covered; zero for empty ranges.
    #[must_use]
    pub fn length(&self) -> usize {
        if self.b < self.a {
            return 0;
        }
        usize::try_from(i64::from(self.b) - i64::from(self.a) + 1).unwrap_or(usize::MAX)
    }

    #[must_use]
    pub fn contains(&self, i: i32) -> bool {
        self.a <= i && i <= self.b
    }

    /// Does `self` start and end strictly before `other` starts?
    #[must_use]
    pub fn starts_before_disjoint(&self, other: &Interval) -> bool {
        self.a < other.a && self.b < other.a
    }

    /// Does `self` start strictly after `other` ends?
    #[must_use]
    pub fn starts_after_disjoint(&self, other: &Interval) -> bool {
        self.a > other.b
    }

    #[must_use]
    pub fn disjoint(&self, other: &Interval) -> bool {
        self.starts_before_disjoint(other) || self.starts_after_disjoint(other)
    }

    /// Are the two ranges back to back with no gap and no overlap?
    #[must_use]
    pub fn adjacent(&self, other: &Interval) -> bool {
        i64::from(self.a) == i64::from(other.b) + 1 || i64::from(self.b) == i64::from(other.a) - 1
    }

    #[must_use]
    pub fn properly_contains(&self, other: &Interval) -> bool {
        other.a >= self.a && other.b <= self.b
    }

    /// Smallest interval covering both ranges.
    #[must_use]
    pub fn union(&self, other: &Interval) -> Interval {
        Interval::new(self.a.min(other.a), self.b.max(other.b))
    }

    /// Overlap of both ranges, empty when they are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Interval) -> Interval {
        Interval::new(self.a.max(other.a), self.b.min(other.b))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.a, self.b)
    }
}
