#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Wildcard patterns over slices
//!
//! A pattern is a sequence of literal pieces separated by a wildcard element
//! that matches any run of elements. Comparison of a piece against a window
//! of the haystack is delegated to a [`Matcher`], so the same pattern can be
//! matched exactly, case-insensitively or as a path.

pub mod ignore;
mod pattern;
pub mod pieces;

pub use ignore::{Directive, IgnoreRules};
pub use pattern::{Pattern, PatternFlags, Pieces};
pub use pieces::U8Pieces;

/// Match `pattern` at the start of `haystack`, returning the unmatched rest.
///
/// The first piece is anchored; every later piece is found at its leftmost
/// position after the previous one. A pattern with no pieces only matches an
/// empty haystack.
pub fn matches<'a, P, M, T: 'a>(pattern: P, matcher: M, haystack: &[T]) -> Option<&[T]>
where
    P: IntoIterator<Item = &'a [T]>,
    M: Matcher<T>,
{
    matches_impl(pattern.into_iter(), &matcher, haystack)
}

/// Like [`matches`], but the first piece may start anywhere.
pub fn suffix_matches<'a, P, M, T: 'a>(pattern: P, matcher: M, haystack: &[T]) -> Option<&[T]>
where
    P: IntoIterator<Item = &'a [T]>,
    M: Matcher<T>,
{
    suffix_matches_impl(pattern.into_iter(), &matcher, haystack)
}

pub(crate) fn matches_impl<'a, 'h, P, M, T: 'a>(
    mut pattern: P,
    matcher: &M,
    haystack: &'h [T],
) -> Option<&'h [T]>
where
    P: Iterator<Item = &'a [T]>,
    M: Matcher<T>,
{
    let Some(first) = pattern.next() else {
        return haystack.is_empty().then_some(haystack);
    };
    let (window, rest) = haystack.split_at_checked(first.len())?;
    if !matcher.is_equal(first, window) {
        return None;
    }
    suffix_matches_impl(pattern, matcher, rest)
}

pub(crate) fn suffix_matches_impl<'a, 'h, P, M, T: 'a>(
    pattern: P,
    matcher: &M,
    mut haystack: &'h [T],
) -> Option<&'h [T]>
where
    P: Iterator<Item = &'a [T]>,
    M: Matcher<T>,
{
    for piece in pattern {
        let piece_len = piece.len();
        if piece_len == 0 {
            continue;
        }
        let offset = haystack
            .windows(piece_len)
            .position(|window| matcher.is_equal(piece, window))?;
        haystack = &haystack[offset + piece_len..];
    }
    Some(haystack)
}

/// Equality of two windows of the same length
pub trait Matcher<T> {
    fn is_equal(&self, a: &[T], b: &[T]) -> bool;
}

impl<T, M: Matcher<T>> Matcher<T> for &M {
    fn is_equal(&self, a: &[T], b: &[T]) -> bool {
        Matcher::is_equal(*self, a, b)
    }
}

/// Element-wise equality
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExactMatch;

impl<T: PartialEq> Matcher<T> for ExactMatch {
    fn is_equal(&self, a: &[T], b: &[T]) -> bool {
        a == b
    }
}

/// ASCII case-insensitive byte equality
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CaseInsensitive;

impl Matcher<u8> for CaseInsensitive {
    fn is_equal(&self, a: &[u8], b: &[u8]) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

/// ASCII case-insensitive byte equality that also treats `/` and `\` as the
/// same separator.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathMatch;

impl Matcher<u8> for PathMatch {
    fn is_equal(&self, a: &[u8], b: &[u8]) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(a, b)| {
                a.eq_ignore_ascii_case(b) || matches!((a, b), (b'/', b'\\') | (b'\\', b'/'))
            })
    }
}
