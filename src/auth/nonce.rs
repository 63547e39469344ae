//! Nonce and timestamp generation for signed requests.
//!
//! Signed requests carry a millisecond `timestamp`; Web3-signed requests also
//! carry a microsecond `nonce` that must never repeat.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use time::OffsetDateTime;

/// Trait for providing nonces for Web3-signed requests.
pub trait NonceProvider: Send + Sync {
    /// Generate the next nonce value.
    ///
    /// This value must be greater than any previously returned value.
    fn next_nonce(&self) -> u64;
}

/// Strictly increasing nonces based on microseconds since the UNIX epoch.
///
/// Two requests in the same microsecond still get distinct values.
#[derive(Debug)]
pub struct IncreasingNonce {
    last_nonce: AtomicU64,
}

impl IncreasingNonce {
    pub fn new() -> Self {
        Self {
            last_nonce: AtomicU64::new(0),
        }
    }
}

impl Default for IncreasingNonce {
    fn default() -> Self {
        Self::new()
    }
}

impl NonceProvider for IncreasingNonce {
    fn next_nonce(&self) -> u64 {
        let time_nonce = now_micros();

        loop {
            let last = self.last_nonce.load(Ordering::SeqCst);
            let next = time_nonce.max(last + 1);

            if self
                .last_nonce
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return next;
            }
        }
    }
}

/// Milliseconds since the UNIX epoch, local clock.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Microseconds since the UNIX epoch, local clock.
pub fn now_micros() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000).max(0) as u64
}

/// Difference between the exchange clock and the local clock, in milliseconds.
///
/// Shared by all clones of a client; updated by `sync_server_time`.
#[derive(Debug, Default)]
pub struct TimeOffset {
    offset_ms: AtomicI64,
}

impl TimeOffset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset (server - local).
    pub fn get(&self) -> i64 {
        self.offset_ms.load(Ordering::Relaxed)
    }

    pub fn set(&self, offset_ms: i64) {
        self.offset_ms.store(offset_ms, Ordering::Relaxed);
    }

    /// Record an offset from a server time sample taken at `local_ms`.
    pub fn observe(&self, server_ms: i64, local_ms: i64) -> i64 {
        let offset = server_ms - local_ms;
        self.set(offset);
        offset
    }

    /// Local time adjusted to the server clock, in milliseconds.
    pub fn timestamp_millis(&self) -> i64 {
        now_millis() + self.get()
    }
}
