//! compression/scanner.rs
//! Frame boundary detection over a multi-frame archive.
//!
//! Design notes:
//! - Markers are matched at any alignment; frames have no fixed length.
//! - A non-empty buffer always starts a candidate frame at 0. With no marker at all
//!   the whole buffer is one candidate and the codec gets to report what is wrong.
//! - A marker-like byte run inside compressed data produces a bogus split. When the
//!   codec can measure its frames, `plan_frames` walks exact lengths and only scans
//!   what it cannot measure; bogus scanned splits are rejoined by the decompressor.

use std::ops::Range;

use crate::constants::FRAME_MAGIC;

/// Offsets at which candidate frames begin. Strictly increasing, `[]` for an empty
/// buffer, first element `0` otherwise.
pub fn find_frame_offsets(buffer: &[u8]) -> Vec<usize> {
    if buffer.is_empty() {
        return Vec::new();
    }

    let mut offsets = vec![0];
    let mut i = 0;
    while i + FRAME_MAGIC.len() <= buffer.len() {
        if buffer[i..i + FRAME_MAGIC.len()] == FRAME_MAGIC {
            if i != 0 {
                offsets.push(i);
            }
            // Magic has no self-overlap, so the next match starts after this one.
            i += FRAME_MAGIC.len();
        } else {
            i += 1;
        }
    }
    offsets
}

/// Byte ranges of the candidate frames, partitioning the buffer.
pub fn frame_ranges(buffer: &[u8]) -> Vec<Range<usize>> {
    let offsets = find_frame_offsets(buffer);
    offsets
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = offsets.get(i + 1).copied().unwrap_or(buffer.len());
            start..end
        })
        .collect()
}

/// Frame layout of an archive: measured frames first, scanned candidates after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePlan {
    pub ranges: Vec<Range<usize>>,
    /// Index of the first range that came from the marker scan.
    pub scanned_from: usize,
}

impl FramePlan {
    /// Whether the range at `index` is only a marker-scan guess.
    pub fn is_scanned(&self, index: usize) -> bool {
        index >= self.scanned_from
    }
}

/// Walk the buffer frame by frame using `frame_len`, then fall back to the marker
/// scan for whatever is left once a length cannot be determined.
pub fn plan_frames<F>(buffer: &[u8], frame_len: F) -> FramePlan
where
    F: Fn(&[u8]) -> Option<usize>,
{
    let mut ranges = Vec::new();
    let mut pos = 0;
    while pos < buffer.len() {
        match frame_len(&buffer[pos..]) {
            Some(n) if n > 0 && n <= buffer.len() - pos => {
                ranges.push(pos..pos + n);
                pos += n;
            }
            _ => break,
        }
    }

    let scanned_from = ranges.len();
    ranges.extend(
        frame_ranges(&buffer[pos..])
            .into_iter()
            .map(|r| r.start + pos..r.end + pos),
    );
    FramePlan { ranges, scanned_from }
}

#[inline]
pub fn count_frames(buffer: &[u8]) -> usize {
    find_frame_offsets(buffer).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_no_frames() {
        assert!(find_frame_offsets(&[]).is_empty());
        assert!(frame_ranges(&[]).is_empty());
    }

    #[test]
    fn no_marker_is_one_frame() {
        assert_eq!(find_frame_offsets(b"plain bytes"), vec![0]);
        assert_eq!(frame_ranges(b"abc"), vec![0..3]);
    }

    #[test]
    fn markers_at_any_alignment() {
        let mut buf = FRAME_MAGIC.to_vec();
        buf.extend_from_slice(&[1, 2, 3]);
        buf.extend_from_slice(&FRAME_MAGIC);
        buf.push(9);
        assert_eq!(find_frame_offsets(&buf), vec![0, 7]);
        assert_eq!(frame_ranges(&buf), vec![0..7, 7..12]);
    }

    #[test]
    fn leading_garbage_forms_its_own_candidate() {
        let mut buf = vec![0xAA, 0xBB];
        buf.extend_from_slice(&FRAME_MAGIC);
        assert_eq!(find_frame_offsets(&buf), vec![0, 2]);
    }

    #[test]
    fn truncated_marker_at_end_is_ignored() {
        let buf = [0x00, 0x28, 0xB5, 0x2F];
        assert_eq!(find_frame_offsets(&buf), vec![0]);
    }

    #[test]
    fn plan_without_lengths_is_the_scan() {
        let mut buf = FRAME_MAGIC.to_vec();
        buf.extend_from_slice(&[7; 5]);
        buf.extend_from_slice(&FRAME_MAGIC);
        let plan = plan_frames(&buf, |_| None);
        assert_eq!(plan.ranges, frame_ranges(&buf));
        assert_eq!(plan.scanned_from, 0);
        assert!(plan.is_scanned(0));
    }

    #[test]
    fn plan_skips_markers_inside_measured_frames() {
        // Two 10-byte "frames", the first carrying a marker in its body.
        let mut buf = FRAME_MAGIC.to_vec();
        buf.extend_from_slice(&[1, 2]);
        buf.extend_from_slice(&FRAME_MAGIC);
        buf.extend_from_slice(&FRAME_MAGIC);
        buf.extend_from_slice(&[3; 6]);
        let plan = plan_frames(&buf, |b| (b.len() >= 10).then_some(10));
        assert_eq!(plan.ranges, vec![0..10, 10..20]);
        assert_eq!(plan.scanned_from, 2);
    }

    #[test]
    fn plan_scans_the_unmeasurable_tail() {
        let mut buf = vec![0u8; 6];
        buf.extend_from_slice(&FRAME_MAGIC);
        buf.extend_from_slice(&[9, 9]);
        buf.extend_from_slice(&FRAME_MAGIC);
        // Only the first 6 bytes can be measured.
        let plan = plan_frames(&buf, |b| (b.len() == 16).then_some(6));
        assert_eq!(plan.ranges, vec![0..6, 6..12, 12..16]);
        assert_eq!(plan.scanned_from, 1);
        assert!(!plan.is_scanned(0));
        assert!(plan.is_scanned(1));
    }

    #[test]
    fn plan_ignores_impossible_lengths() {
        let plan = plan_frames(b"abcdef", |_| Some(100));
        assert_eq!(plan.ranges, vec![0..6]);
        assert_eq!(plan.scanned_from, 0);
    }
}
