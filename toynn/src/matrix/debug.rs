use super::Matrix;
use crate::dtype::DType;
use std::fmt::{Debug, Formatter, Write};

fn fmt_separated<I, T>(
    iter: &mut I,
    f: &mut Formatter,
    sep: &str,
    fmt: &mut impl FnMut(T, &mut Formatter) -> std::fmt::Result,
    limit: usize,
) -> std::fmt::Result
where
    I: Iterator<Item = T>,
{
    let mut first = true;
    for el in iter.take(limit) {
        if first {
            first = false;
        } else {
            f.write_str(sep)?;
        }
        fmt(el, f)?;
    }
    Ok(())
}

fn fmt_separated_max<I, T>(
    mut iter: I,
    len: usize,
    max: usize,
    f: &mut Formatter,
    sep: &str,
    fmt: &mut impl FnMut(T, &mut Formatter) -> std::fmt::Result,
) -> std::fmt::Result
where
    I: Iterator<Item = T>,
{
    if len > max {
        let limit = max / 2;
        let to_skip = len - (limit * 2);
        fmt_separated(&mut iter, f, sep, fmt, limit)?;
        f.write_str(sep)?;
        write!(f, "...({to_skip} hidden)")?;
        f.write_str(sep)?;
        iter.nth(to_skip - 1);
        fmt_separated(&mut iter, f, sep, fmt, limit)
    } else {
        fmt_separated(&mut iter, f, sep, fmt, len)
    }
}

const DEBUG_LIMIT_ROWS: usize = 5;
const DEBUG_LIMIT_COLS: usize = 10;

impl<F: DType> Debug for Matrix<F> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str("[\n   ")?;
        fmt_separated_max(self.iter_rows(), self.rows(), DEBUG_LIMIT_ROWS, f, ",\n   ", &mut |row: &[F], f| {
            f.write_char('[')?;
            fmt_separated_max(row.iter(), row.len(), DEBUG_LIMIT_COLS, f, ", ", &mut |el, f| Debug::fmt(el, f))?;
            f.write_char(']')
        })?;
        write!(f, "\n] dtype={} dims={}", std::any::type_name::<F>(), self.dims())
    }
}
