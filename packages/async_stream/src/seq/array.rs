//! Index arithmetic for materialized sequences.
//!
//! Bounds follow the conventional array rules: a negative bound counts back
//! from the end, and every bound is clamped into `0..=len`.

/// Resolve a possibly negative bound against `len`.
pub(crate) fn relative(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs().min(len)
    }
}

pub(crate) fn slice<T>(mut values: Vec<T>, start: isize, end: isize) -> Vec<T> {
    let len = values.len();
    let (start, end) = (relative(start, len), relative(end, len));
    if start >= end {
        return Vec::new();
    }
    values.truncate(end);
    values.drain(..start);
    values
}

pub(crate) fn fill<T: Clone>(values: &mut [T], value: &T, start: isize, end: isize) {
    let len = values.len();
    let (start, end) = (relative(start, len), relative(end, len));
    if start < end {
        values[start..end].fill(value.clone());
    }
}

pub(crate) fn index_of<T: PartialEq>(values: &[T], target: &T, from: isize) -> Option<usize> {
    let start = relative(from, values.len());
    values[start..]
        .iter()
        .position(|v| v == target)
        .map(|offset| start + offset)
}

/// Search backwards from `from` (default: the last element).
pub(crate) fn last_index_of<T: PartialEq>(
    values: &[T],
    target: &T,
    from: Option<isize>,
) -> Option<usize> {
    let len = values.len();
    if len == 0 {
        return None;
    }
    let last = match from {
        None => len - 1,
        Some(from) if from < 0 => len.checked_sub(from.unsigned_abs())?,
        Some(from) => from.unsigned_abs().min(len - 1),
    };
    values[..=last].iter().rposition(|v| v == target)
}
