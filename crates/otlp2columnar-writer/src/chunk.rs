use std::ops::Range;

/// Rows per insert request unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Split `len` rows into contiguous ranges of at most `chunk_size` rows.
///
/// Yields `ceil(len / chunk_size)` ranges in order; only the last may be
/// shorter. A chunk size of zero is treated as one.
pub fn chunk_ranges(len: usize, chunk_size: usize) -> impl Iterator<Item = Range<usize>> {
    let size = chunk_size.max(1);
    (0..len)
        .step_by(size)
        .map(move |start| start..(start + size).min(len))
}

/// Slice view of [`chunk_ranges`].
pub fn chunk_rows<T>(rows: &[T], chunk_size: usize) -> impl Iterator<Item = &[T]> {
    chunk_ranges(rows.len(), chunk_size).map(move |range| &rows[range])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_count_and_sizes() {
        for (len, size) in [(0, 3), (1, 3), (3, 3), (7, 3), (10_001, 10_000), (5, 1)] {
            let rows: Vec<usize> = (0..len).collect();
            let chunks: Vec<&[usize]> = chunk_rows(&rows, size).collect();

            assert_eq!(chunks.len(), len.div_ceil(size), "len={len} size={size}");
            assert!(chunks.iter().all(|chunk| chunk.len() <= size));
            assert!(chunks.iter().all(|chunk| !chunk.is_empty()));
            assert_eq!(chunks.concat(), rows);
        }
    }

    #[test]
    fn last_chunk_carries_remainder() {
        let ranges: Vec<_> = chunk_ranges(25_000, DEFAULT_CHUNK_SIZE).collect();
        assert_eq!(ranges, vec![0..10_000, 10_000..20_000, 20_000..25_000]);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        assert_eq!(chunk_ranges(3, 0).count(), 3);
    }
}
