//! Sample narrowing and queue backpressure.
//!
//! The host mixer produces 32-bit samples whose top 16 bits are the audible value. Both the
//! callback and the queue path narrow with the same saturating conversion.

/// Bytes per narrowed output sample.
pub const SAMPLE_BYTES: usize = std::mem::size_of::<i16>();

const MIN_WIDE: i32 = -32768 << 16;
const MAX_WIDE: i32 = 32767 << 16;

/// Clamp to the representable 16.16 range, then keep the integer half.
#[inline]
pub fn narrow_sample(sample: i32) -> i16 {
    (sample.clamp(MIN_WIDE, MAX_WIDE) >> 16) as i16
}

/// Narrow `src` into `dst` pairwise. Extra samples on either side are left untouched.
pub fn narrow_into(src: &[i32], dst: &mut [i16]) {
    for (out, &sample) in dst.iter_mut().zip(src) {
        *out = narrow_sample(sample);
    }
}

/// Bytes one cycle contributes to the output queue.
pub fn cycle_bytes(frames: usize, channels: usize) -> usize {
    frames * channels * SAMPLE_BYTES
}

/// Whether another cycle may be enqueued. The queue is saturated at two cycles' worth.
#[inline]
pub fn should_enqueue(queued_bytes: usize, cycle_bytes: usize) -> bool {
    queued_bytes < cycle_bytes.saturating_mul(2)
}
