//! Width decomposition.
//!
//! A vector wider than the chosen register is processed as an ordered
//! sequence of register-width segments. Each operand advances by its own
//! segment length, so a data vector and a packed mask (one word per segment)
//! decompose side by side. Segment `i` of every operand is processed together
//! and written to segment `i` of the result.

use rayon::prelude::*;

fn segment_count(len: usize, segment: usize) -> usize {
    assert!(
        segment > 0 && len % segment == 0,
        "{len} elements do not split into segments of {segment}"
    );
    len / segment
}

fn check_counts(a: (usize, usize), b: (usize, usize), out: (usize, usize)) -> usize {
    let count = segment_count(a.0, a.1);
    assert_eq!(
        count,
        segment_count(b.0, b.1),
        "operands decompose into different segment counts"
    );
    assert_eq!(
        count,
        segment_count(out.0, out.1),
        "result decomposes into a different segment count"
    );
    count
}

/// Apply `f` to every segment triple in ascending order.
///
/// # Panics
///
/// Panics if an operand length is not a multiple of its segment length, or
/// if the operands decompose into different segment counts.
pub fn for_each_segment<A, B, R, F>(
    a: &[A],
    a_segment: usize,
    b: &[B],
    b_segment: usize,
    out: &mut [R],
    out_segment: usize,
    mut f: F,
) where
    F: FnMut(&[A], &[B], &mut [R]),
{
    check_counts(
        (a.len(), a_segment),
        (b.len(), b_segment),
        (out.len(), out_segment),
    );

    for ((sa, sb), so) in a
        .chunks_exact(a_segment)
        .zip(b.chunks_exact(b_segment))
        .zip(out.chunks_exact_mut(out_segment))
    {
        f(sa, sb, so);
    }
}

/// Parallel form of [`for_each_segment`].
///
/// Segments are independent, so the result is identical; only the order in
/// which `f` observes them is unspecified.
pub fn par_for_each_segment<A, B, R, F>(
    a: &[A],
    a_segment: usize,
    b: &[B],
    b_segment: usize,
    out: &mut [R],
    out_segment: usize,
    f: F,
) where
    A: Sync,
    B: Sync,
    R: Send,
    F: Fn(&[A], &[B], &mut [R]) + Sync + Send,
{
    check_counts(
        (a.len(), a_segment),
        (b.len(), b_segment),
        (out.len(), out_segment),
    );

    out.par_chunks_exact_mut(out_segment)
        .zip(a.par_chunks_exact(a_segment))
        .zip(b.par_chunks_exact(b_segment))
        .for_each(|((so, sa), sb)| f(sa, sb, so));
}
