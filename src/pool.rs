//! Pooled byte buffers.
//!
//! [`BufferPool::acquire`] hands out a [`PooledBuffer`] of an exact length.
//! The buffer is a move-only owner: dropping it (or calling
//! [`PooledBuffer::release`]) zeroes the storage and returns it to the pool,
//! so release happens exactly once on every exit path, error paths included.
//!
//! Acquire never blocks on an empty pool; it falls back to a fresh
//! allocation. The pool is safe to share across threads and a buffer may be
//! released from a different thread than the one that acquired it.

// Rust guideline compliant 2026-02

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use zeroize::Zeroize;

/// Retention limits for a [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of idle buffers kept for reuse.
    pub max_buffers: usize,
    /// Buffers with a larger capacity are freed instead of retained.
    pub max_buffer_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_buffers: 64,
            max_buffer_capacity: 64 * 1024,
        }
    }
}

#[derive(Debug)]
struct PoolShared {
    free: Mutex<Vec<Vec<u8>>>,
    outstanding: AtomicUsize,
    config: PoolConfig,
}

impl PoolShared {
    fn give_back(&self, mut storage: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);

        // Clears len; capacity is kept and wiped too.
        storage.zeroize();

        if storage.capacity() == 0 || storage.capacity() > self.config.max_buffer_capacity {
            return;
        }

        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.config.max_buffers {
            free.push(storage);
        }
    }
}

/// Thread-safe pool of reusable byte buffers.
///
/// Cloning is cheap and yields a handle to the same pool.
#[derive(Debug, Clone)]
pub struct BufferPool {
    shared: Arc<PoolShared>,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl BufferPool {
    /// Create an empty pool with the given retention limits.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                free: Mutex::new(Vec::new()),
                outstanding: AtomicUsize::new(0),
                config,
            }),
        }
    }

    /// Process-wide pool used by the default encryption and signing paths.
    pub fn shared() -> &'static BufferPool {
        static SHARED: OnceLock<BufferPool> = OnceLock::new();
        SHARED.get_or_init(BufferPool::default)
    }

    /// Borrow a zero-filled buffer of exactly `len` bytes.
    pub fn acquire(&self, len: usize) -> PooledBuffer {
        let reused = {
            let mut free = self.shared.free.lock().unwrap_or_else(PoisonError::into_inner);
            free.iter()
                .position(|buf| buf.capacity() >= len)
                .map(|idx| free.swap_remove(idx))
        };

        let mut storage = reused.unwrap_or_else(|| Vec::with_capacity(len));
        storage.resize(len, 0);

        self.shared.outstanding.fetch_add(1, Ordering::AcqRel);

        PooledBuffer {
            storage,
            pool: Arc::clone(&self.shared),
        }
    }

    /// Number of buffers currently handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::Acquire)
    }

    /// Number of idle buffers waiting for reuse.
    pub fn idle(&self) -> usize {
        self.shared.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Fixed-length byte buffer borrowed from a [`BufferPool`].
///
/// Dereferences to `[u8]`. The length never changes after acquisition.
pub struct PooledBuffer {
    storage: Vec<u8>,
    pool: Arc<PoolShared>,
}

impl PooledBuffer {
    /// Return the buffer to its pool.
    ///
    /// Equivalent to dropping it; provided so release points read explicitly.
    pub fn release(self) {
        drop(self);
    }

    /// Read-only view of the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    /// Mutable view of the buffer contents.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.storage));
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.storage
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }
}

impl AsRef<[u8]> for PooledBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.storage
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.storage.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_returns_exact_zeroed_length() {
        let pool = BufferPool::default();
        let buf = pool.acquire(37);
        assert_eq!(buf.len(), 37);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_release_returns_storage_to_pool() {
        let pool = BufferPool::default();
        let mut buf = pool.acquire(16);
        buf.copy_from_slice(&[0xAB; 16]);
        assert_eq!(pool.outstanding(), 1);
        assert_eq!(pool.idle(), 0);

        buf.release();
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 1);

        // Reused storage must not leak the previous contents
        let again = pool.acquire(16);
        assert_eq!(pool.idle(), 0);
        assert!(again.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reuse_shrinks_to_requested_length() {
        let pool = BufferPool::default();
        drop(pool.acquire(128));
        let small = pool.acquire(8);
        assert_eq!(small.len(), 8);
    }

    #[test]
    fn test_retention_limits() {
        let pool = BufferPool::new(PoolConfig {
            max_buffers: 1,
            max_buffer_capacity: 32,
        });

        let a = pool.acquire(8);
        let b = pool.acquire(8);
        let big = pool.acquire(64);
        drop(a);
        drop(b);
        drop(big);

        assert_eq!(pool.idle(), 1, "only one buffer retained, oversized one freed");
        assert_eq!(pool.outstanding(), 0);
    }

    #[test]
    fn test_release_from_other_thread() {
        let pool = BufferPool::default();
        let buf = pool.acquire(24);

        std::thread::spawn(move || buf.release())
            .join()
            .unwrap();

        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = BufferPool::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for n in 0..100 {
                        let mut buf = pool.acquire(n + i);
                        buf.fill(0xFF);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.outstanding(), 0);
    }
}
