//! Space-delimited field splitting.

/// Up to `N` fields of a line, borrowed from it.
///
/// Only the space character separates fields; runs of spaces count as one
/// separator and leading spaces are skipped. Text after the `N`-th field is
/// ignored, so callers that must reject trailing fields ask for one more field
/// than they accept.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a, const N: usize> {
    items: [&'a str; N],
    len: usize,
}

impl<'a, const N: usize> Fields<'a, N> {
    /// Split `line` into at most `N` fields.
    pub fn split(line: &'a str) -> Self {
        let mut items = [""; N];
        let mut len = 0;
        for field in line.split(' ').filter(|f| !f.is_empty()).take(N) {
            items[len] = field;
            len += 1;
        }
        Fields { items, len }
    }

    /// Number of fields found.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn as_slice(&self) -> &[&'a str] {
        &self.items[..self.len]
    }
}

impl<'a, const N: usize> std::ops::Index<usize> for Fields<'a, N> {
    type Output = &'a str;

    fn index(&self, index: usize) -> &Self::Output {
        &self.as_slice()[index]
    }
}
