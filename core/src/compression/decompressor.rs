//! compression/decompressor.rs
//! Split-aware decompression.
//!
//! Design notes:
//! - At or below the threshold the whole buffer goes to the codec in one call.
//! - Above it, or when that call runs out of memory, frames are located and decoded
//!   one at a time, outputs concatenated in order.
//! - Frames are measured by the codec when it can; the marker scan covers the rest.
//! - A scanned candidate that fails to decode is joined with the next one and tried
//!   again, since a marker can occur inside frame data. The error surfaces only when
//!   no candidates are left. Allocation failures are never retried here.
use tracing::{debug, warn};

use crate::compression::classify::is_allocation_error;
use crate::compression::handle::CodecHandle;
use crate::compression::scanner::plan_frames;
use crate::compression::types::CompressionError;
use crate::telemetry::{CallPath, Stage, TelemetryCounters, TelemetryTimer};
use crate::utils::kb_to_bytes;

pub struct AdaptiveDecompressor<'a> {
    codec: &'a CodecHandle,
}

impl<'a> AdaptiveDecompressor<'a> {
    pub fn new(codec: &'a CodecHandle) -> Self {
        Self { codec }
    }

    /// Decode a (possibly multi-frame) archive.
    ///
    /// An empty buffer decodes to an empty output without touching the codec.
    pub async fn decompress(
        &self,
        input: &[u8],
        threshold_kb: u32,
        counters: &mut TelemetryCounters,
        timer: &mut TelemetryTimer,
    ) -> Result<Vec<u8>, CompressionError> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let over_threshold = input.len() > kb_to_bytes(threshold_kb);
        if !over_threshold {
            counters.begin_attempt(CallPath::Fast, None);
            let result = {
                let _t = timer.stage(Stage::Decompress);
                self.codec.decompress(input).await
            };
            match result {
                Ok(out) => {
                    counters.add_frame(out.len());
                    return Ok(out);
                }
                Err(e) if is_allocation_error(&e) => {
                    counters.add_allocation_failure();
                    warn!(len = input.len(), error = %e, "whole-buffer decompression ran out of memory, splitting");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let codec = self.codec.codec().await?;
        let plan = {
            let _t = timer.stage(Stage::Scan);
            plan_frames(input, |rest| codec.frame_len(rest))
        };
        let ranges = &plan.ranges;

        if ranges.len() == 1 && !over_threshold {
            // Nothing to split; hand the single frame to the codec once more.
            counters.begin_attempt(CallPath::Fast, None);
            let out = {
                let _t = timer.stage(Stage::Decompress);
                self.codec.decompress(input).await?
            };
            counters.add_frame(out.len());
            return Ok(out);
        }

        debug!(
            len = input.len(),
            frames = ranges.len(),
            measured = plan.scanned_from,
            over_threshold,
            "decompressing frame by frame"
        );
        counters.begin_attempt(CallPath::Split, None);
        let mut out = Vec::new();
        let mut first = 0;
        while first < ranges.len() {
            let start = ranges[first].start;
            let mut last = first;
            let piece = loop {
                let result = {
                    let _t = timer.stage(Stage::Decompress);
                    self.codec.decompress(&input[start..ranges[last].end]).await
                };
                match result {
                    Ok(piece) => break piece,
                    Err(e)
                        if plan.is_scanned(first)
                            && last + 1 < ranges.len()
                            && !is_allocation_error(&e) =>
                    {
                        debug!(start, next = ranges[last + 1].start, error = %e, "candidate frame did not decode, joining with the next");
                        last += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            };
            counters.add_frame(piece.len());
            out.extend_from_slice(&piece);
            first = last + 1;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::codecs::ZstdCodec;
    use crate::compression::types::{Codec, CodecError};
    use crate::constants::FRAME_MAGIC;

    fn frame(codec: &ZstdCodec, data: &[u8]) -> Vec<u8> {
        pollster::block_on(codec.compress(data)).unwrap()
    }

    fn run(handle: &CodecHandle, input: &[u8], threshold_kb: u32) -> (Result<Vec<u8>, CompressionError>, TelemetryCounters) {
        let mut counters = TelemetryCounters::new(input.len());
        let mut timer = TelemetryTimer::new();
        let out = pollster::block_on(
            AdaptiveDecompressor::new(handle).decompress(input, threshold_kb, &mut counters, &mut timer),
        );
        (out, counters)
    }

    #[test]
    fn empty_archive_is_empty_output() {
        let handle = CodecHandle::new(ZstdCodec::default());
        let (out, counters) = run(&handle, &[], 1);
        assert!(out.unwrap().is_empty());
        assert_eq!(counters.attempts, 0);
    }

    #[test]
    fn over_threshold_decodes_each_frame() {
        let codec = ZstdCodec::default();
        let mut archive = frame(&codec, &[1u8; 3000]);
        archive.extend(frame(&codec, &[2u8; 3000]));
        let handle = CodecHandle::new(codec);

        // A 0 KB threshold is never valid config, but the raw decompressor accepts it.
        let (out, counters) = run(&handle, &archive, 0);
        let out = out.unwrap();
        assert_eq!(counters.path, Some(CallPath::Split));
        assert_eq!(counters.frames, 2);
        assert_eq!(&out[..3000], &[1u8; 3000][..]);
        assert_eq!(&out[3000..], &[2u8; 3000][..]);
    }

    /// zstd without frame measurement, so splitting relies on the marker scan alone.
    struct Unmeasured(ZstdCodec);

    #[async_trait::async_trait]
    impl Codec for Unmeasured {
        fn name(&self) -> &'static str {
            "unmeasured"
        }

        async fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
            self.0.compress(input).await
        }

        async fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
            self.0.decompress(input).await
        }
    }

    /// Incompressible bytes with a whole zstd frame embedded, so the compressed
    /// output carries the frame marker inside its data.
    fn archive_with_embedded_marker(codec: &ZstdCodec) -> (Vec<u8>, Vec<u8>) {
        let mut x: u32 = 0x9E37_79B9;
        let mut noise = |n: usize| -> Vec<u8> {
            (0..n)
                .map(|_| {
                    x ^= x << 13;
                    x ^= x >> 17;
                    x ^= x << 5;
                    x as u8
                })
                .collect()
        };
        let mut plain = noise(2048);
        plain.extend(frame(codec, &noise(512)));
        plain.extend(noise(2048));

        let mut archive = frame(codec, &plain);
        archive.extend(frame(codec, &[5u8; 1000]));
        plain.extend_from_slice(&[5u8; 1000]);
        (archive, plain)
    }

    #[test]
    fn measured_frames_ignore_markers_in_data() {
        let codec = ZstdCodec::default();
        let (archive, plain) = archive_with_embedded_marker(&codec);
        assert!(crate::compression::scanner::count_frames(&archive) > 2);

        let handle = CodecHandle::new(codec);
        let (out, counters) = run(&handle, &archive, 0);
        assert_eq!(out.unwrap(), plain);
        assert_eq!(counters.path, Some(CallPath::Split));
        assert_eq!(counters.frames, 2);
    }

    #[test]
    fn scanned_candidates_are_rejoined_until_they_decode() {
        let codec = ZstdCodec::default();
        let (archive, plain) = archive_with_embedded_marker(&codec);

        let handle = CodecHandle::new(Unmeasured(codec));
        let (out, counters) = run(&handle, &archive, 0);
        assert_eq!(out.unwrap(), plain);
        assert_eq!(counters.frames, 2);
    }

    #[test]
    fn corrupt_tail_still_fails_after_joining() {
        let codec = ZstdCodec::default();
        let mut archive = frame(&codec, &[1u8; 3000]);
        archive.extend_from_slice(&FRAME_MAGIC);
        archive.extend_from_slice(b"truncated");

        let handle = CodecHandle::new(Unmeasured(codec));
        let (out, _) = run(&handle, &archive, 0);
        assert!(matches!(out, Err(CompressionError::Codec(CodecError::ProcessFailed { .. }))));
    }

    #[test]
    fn corrupt_input_propagates_codec_error() {
        let handle = CodecHandle::new(ZstdCodec::default());
        let (out, _) = run(&handle, b"not a frame at all", 1024);
        match out {
            Err(CompressionError::Codec(CodecError::ProcessFailed { .. })) => {}
            other => panic!("expected codec error, got {other:?}"),
        }
    }
}
