//! Millisecond timestamps and wraparound-safe comparisons.
//!
//! Timestamps are `u64` milliseconds since boot, wide enough that real uptime
//! never approaches the wrap. Comparisons still go through signed wrapping
//! differences so a wrapped counter yields a short negative gap instead of a
//! huge positive one.

/// Milliseconds since boot.
pub type Millis = u64;

/// Signed time from `since` to `now`.
#[inline]
pub fn elapsed(now: Millis, since: Millis) -> i64 {
    now.wrapping_sub(since) as i64
}

/// `true` once `now` is at or past `deadline`.
#[inline]
pub fn reached(now: Millis, deadline: Millis) -> bool {
    elapsed(now, deadline) >= 0
}

/// `true` once at least `duration` has passed since `since`.
#[inline]
pub fn has_elapsed(now: Millis, since: Millis, duration: Millis) -> bool {
    elapsed(now, since) >= duration as i64
}
