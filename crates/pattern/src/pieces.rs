//! Compact storage for byte pattern pieces

use std::fmt;

use crate::Pieces;

/// Byte pieces packed into one buffer
///
/// Empty pieces are never stored: a run of wildcards behaves like one.
#[derive(Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U8Pieces {
    bytes: Vec<u8>,
    ends: Vec<usize>,
}

impl U8Pieces {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            ends: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(pieces: usize, total_len: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(total_len),
            ends: Vec::with_capacity(pieces),
        }
    }

    pub fn push(&mut self, piece: &[u8]) {
        if !piece.is_empty() {
            self.bytes.extend_from_slice(piece);
            self.ends.push(self.bytes.len());
        }
    }

    /// Number of stored pieces
    #[must_use]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }
}

impl Pieces<u8> for U8Pieces {
    type Iter<'a> = U8PiecesIter<'a>;

    fn pieces(&self) -> Self::Iter<'_> {
        U8PiecesIter {
            bytes: &self.bytes,
            ends: self.ends.iter(),
            start: 0,
        }
    }
}

impl<'a> FromIterator<&'a [u8]> for U8Pieces {
    fn from_iter<I: IntoIterator<Item = &'a [u8]>>(iter: I) -> Self {
        let mut result = Self::new();
        for piece in iter {
            result.push(piece);
        }
        result
    }
}

impl<'a, const N: usize> From<[&'a [u8]; N]> for U8Pieces {
    fn from(value: [&'a [u8]; N]) -> Self {
        let total_len = value.iter().map(|piece| piece.len()).sum();
        let mut result = Self::with_capacity(N, total_len);
        for piece in value {
            result.push(piece);
        }
        result
    }
}

impl fmt::Debug for U8Pieces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.pieces().map(String::from_utf8_lossy))
            .finish()
    }
}

/// Iterator over the pieces of a [`U8Pieces`]
#[derive(Debug, Clone)]
pub struct U8PiecesIter<'a> {
    bytes: &'a [u8],
    ends: std::slice::Iter<'a, usize>,
    start: usize,
}

impl<'a> Iterator for U8PiecesIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let end = *self.ends.next()?;
        let piece = self.bytes.get(self.start..end)?;
        self.start = end;
        Some(piece)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ends.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iter_buf_pieces() {
        let pieces_array = [b"one".as_ref(), b"tour"];
        let pieces = U8Pieces::from(pieces_array);
        assert_eq!(pieces.len(), pieces_array.len());
        assert!(pieces.pieces().eq(pieces_array));
    }

    #[test]
    fn empty_pieces_are_skipped() {
        let pieces: U8Pieces = [b"".as_ref(), b"a", b"", b"bc"].into_iter().collect();
        assert_eq!(pieces.len(), 2);
        assert_eq!(format!("{pieces:?}"), r#"["a", "bc"]"#);
    }
}
