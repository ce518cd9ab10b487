use std::marker::PhantomData;

use crate::{matches_impl, suffix_matches_impl, Matcher};

/// A parsed wildcard pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern<P, T> {
    pub flags: PatternFlags,
    pub pieces: P,
    piece_t: PhantomData<fn() -> T>,
}

impl<T, P: Pieces<T>> Pattern<P, T> {
    #[inline]
    pub const fn new(pieces: P, flags: PatternFlags) -> Self {
        Self {
            flags,
            pieces,
            piece_t: PhantomData,
        }
    }

    /// Match the whole pattern against `haystack`.
    ///
    /// Returns the part of the haystack after the last matched piece. For an
    /// end-anchored pattern the last piece must sit at the very end, so the
    /// returned rest is always empty.
    pub fn first_match<'h, M: Matcher<T>>(&self, matcher: M, haystack: &'h [T]) -> Option<&'h [T]> {
        let start_unanchored = self.flags.is_start_unanchored();
        if !self.flags.is_end_anchored() {
            return if start_unanchored {
                suffix_matches_impl(self.pieces.pieces(), &matcher, haystack)
            } else {
                matches_impl(self.pieces.pieces(), &matcher, haystack)
            };
        }

        let pieces: Vec<&[T]> = self.pieces.pieces().collect();
        let Some((last, init)) = pieces.split_last() else {
            // Only an empty pattern has no pieces and an end anchor.
            return haystack.is_empty().then_some(haystack);
        };

        let cut = haystack.len().checked_sub(last.len())?;
        let (head, tail) = haystack.split_at(cut);
        if !matcher.is_equal(last, tail) {
            return None;
        }
        let end = &haystack[haystack.len()..];

        if init.is_empty() {
            // A single piece anchored at both ends must cover the haystack.
            return (start_unanchored || head.is_empty()).then_some(end);
        }

        let prefix_match = if start_unanchored {
            suffix_matches_impl(init.iter().copied(), &matcher, head)
        } else {
            matches_impl(init.iter().copied(), &matcher, head)
        };
        prefix_match.map(|_| end)
    }

    /// Whether the pattern matches `haystack` as a whole
    pub fn is_match<M: Matcher<T>>(&self, matcher: M, haystack: &[T]) -> bool {
        self.first_match(matcher, haystack).is_some()
    }
}

impl<'a, T: 'a + PartialEq, P: FromIterator<&'a [T]>> Pattern<P, T> {
    /// Split `pattern` on `wildcard` into pieces.
    pub fn parse(pattern: &'a [T], wildcard: &T) -> Self {
        let mut flags = PatternFlags::empty();
        if pattern.first() == Some(wildcard) {
            flags = flags.with_start_unanchored();
        }
        if pattern.last() != Some(wildcard) {
            flags = flags.with_end_anchored();
        }

        Self {
            flags,
            pieces: pattern.split(move |t| t == wildcard).collect(),
            piece_t: PhantomData,
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternFlags(u8);

impl PatternFlags {
    const FLAG_START_UNANCHORED: u8 = 1 << 0;
    const FLAG_END_ANCHORED: u8 = 1 << 1;

    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    #[must_use]
    pub const fn is_start_unanchored(self) -> bool {
        (self.0 & Self::FLAG_START_UNANCHORED) != 0
    }

    #[inline]
    #[must_use = "`with_start_unanchored` returns without modifying the original value"]
    pub const fn with_start_unanchored(self) -> Self {
        Self(self.0 | Self::FLAG_START_UNANCHORED)
    }

    #[inline]
    #[must_use]
    pub const fn is_end_anchored(self) -> bool {
        (self.0 & Self::FLAG_END_ANCHORED) != 0
    }

    #[inline]
    #[must_use = "`with_end_anchored` returns without modifying the original value"]
    pub const fn with_end_anchored(self) -> Self {
        Self(self.0 | Self::FLAG_END_ANCHORED)
    }
}

/// Storage for the literal pieces of a pattern
pub trait Pieces<T> {
    type Iter<'a>: Iterator<Item = &'a [T]>
    where
        Self: 'a,
        T: 'a;

    fn pieces(&self) -> Self::Iter<'_>;
}

impl<T, P: Pieces<T>> Pieces<T> for &P {
    type Iter<'a>
        = P::Iter<'a>
    where
        Self: 'a,
        T: 'a;

    fn pieces(&self) -> Self::Iter<'_> {
        Pieces::pieces(*self)
    }
}
