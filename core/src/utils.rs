use crate::constants::KB;

/// Convert a KB knob into a byte count.
#[inline]
pub fn kb_to_bytes(kb: u32) -> usize {
    (kb as usize).saturating_mul(KB)
}

/// Next chunk size after an allocation failure.
///
/// Returns `None` once `current_kb` is already at or below `floor_kb`; the caller
/// must then give up. Otherwise halves, clamped to the floor.
pub fn halve_chunk_kb(current_kb: u32, floor_kb: u32) -> Option<u32> {
    if current_kb <= floor_kb {
        return None;
    }
    Some((current_kb / 2).max(floor_kb))
}

/// Split `input` into consecutive, non-overlapping slices of at most `chunk_len` bytes.
///
/// An empty input still yields one empty slice so the compressed artifact always
/// carries at least one frame.
pub fn chunks_of(input: &[u8], chunk_len: usize) -> impl Iterator<Item = &[u8]> {
    let chunk_len = chunk_len.max(1);
    let empty = input.is_empty();
    input
        .chunks(chunk_len)
        .chain(empty.then_some(&input[..0]))
}
