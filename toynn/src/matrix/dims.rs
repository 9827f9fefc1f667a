use std::fmt::{Display, Formatter, Write};

/// Shape of a matrix as `(rows, cols)`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Dim2(pub usize, pub usize);

impl Dim2 {
    #[inline]
    pub fn rows(&self) -> usize {
        self.0
    }
    #[inline]
    pub fn cols(&self) -> usize {
        self.1
    }
    #[inline]
    pub fn len(&self) -> usize {
        self.0 * self.1
    }
    #[inline]
    pub fn transposed(&self) -> Self {
        Dim2(self.1, self.0)
    }
}

impl Display for Dim2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('(')?;
        Display::fmt(&self.0, f)?;
        f.write_str(", ")?;
        Display::fmt(&self.1, f)?;
        f.write_char(')')
    }
}
