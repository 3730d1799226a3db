//! SOCKS5 stream isolation: each search request, and at proactive/
//! reactive rotation points, gets a caller-invisible fresh Tor-style
//! circuit by varying the proxy username/password.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically-increasing process-wide stream id. Every SOCKS5 auth
/// prompt receives `stream-<id>` as both username and password, which is
/// how Tor-style proxies key circuit isolation.
pub struct StreamIsolation {
    counter: AtomicU64,
    rotate_every: u32,
    requests_since_rotation: AtomicU64,
}

impl StreamIsolation {
    #[must_use]
    pub fn new(rotate_every: u32) -> Self {
        Self { counter: AtomicU64::new(1), rotate_every: rotate_every.max(1), requests_since_rotation: AtomicU64::new(0) }
    }

    /// Credentials for the next proxied request. Bumps the per-request
    /// counter and rotates proactively every `rotate_every` requests.
    pub fn credentials(&self) -> (String, String) {
        let since = self.requests_since_rotation.fetch_add(1, Ordering::SeqCst) + 1;
        if since % u64::from(self.rotate_every) == 0 {
            self.rotate();
        }
        let id = self.counter.load(Ordering::SeqCst);
        let stream = format!("stream-{id}");
        (stream.clone(), stream)
    }

    /// Forces a new circuit immediately; used reactively when a live
    /// search returns zero results and retry-on-empty is enabled.
    pub fn rotate(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn current_id(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proactively_rotates_every_n_requests() {
        let isolation = StreamIsolation::new(3);
        let first = isolation.current_id();
        isolation.credentials();
        isolation.credentials();
        assert_eq!(isolation.current_id(), first);
        isolation.credentials();
        assert_eq!(isolation.current_id(), first + 1);
    }

    #[test]
    fn rotate_forces_a_new_stream_id() {
        let isolation = StreamIsolation::new(100);
        let first = isolation.current_id();
        let rotated = isolation.rotate();
        assert_eq!(rotated, first + 1);
        assert_eq!(isolation.current_id(), rotated);
    }
}
