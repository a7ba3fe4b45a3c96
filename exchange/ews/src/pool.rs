/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

use std::{
    ops::{Deref, DerefMut},
    sync::{Mutex, PoisonError},
};

pub const DEFAULT_BUFFER_CAPACITY: usize = 512;
pub const DEFAULT_MAX_IDLE: usize = 16;

/// A pool of reusable byte buffers for serializing requests.
///
/// Buffers are handed out through [`PooledBuffer`] guards and come back
/// empty when the guard is dropped, whether or not the request succeeded.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
    max_idle: usize,
}

impl BufferPool {
    /// Creates a pool whose fresh buffers have `capacity` bytes reserved and
    /// which keeps at most `max_idle` buffers around between uses.
    pub fn new(capacity: usize, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
            max_idle,
        }
    }

    pub fn get(&self) -> PooledBuffer<'_> {
        let buffer = self
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.capacity));

        PooledBuffer {
            pool: self,
            buffer,
        }
    }

    /// The number of buffers waiting to be reused.
    pub fn idle_count(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock can't leave the list inconsistent, so a
    // poisoned lock is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, mut buffer: Vec<u8>) {
        buffer.clear();

        let mut idle = self.lock();
        if idle.len() < self.max_idle {
            idle.push(buffer);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_IDLE)
    }
}

/// A buffer checked out of a [`BufferPool`].
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buffer: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::{BufferPool, DEFAULT_BUFFER_CAPACITY};

    #[test]
    fn test_buffers_are_reused_empty() {
        let pool = BufferPool::default();

        {
            let mut buffer = pool.get();
            assert!(buffer.capacity() >= DEFAULT_BUFFER_CAPACITY);
            buffer.extend_from_slice(b"<soap:Envelope/>");
        }

        assert_eq!(pool.idle_count(), 1);

        let buffer = pool.get();
        assert!(buffer.is_empty());
        assert!(buffer.capacity() >= DEFAULT_BUFFER_CAPACITY);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_idle_buffers_are_capped() {
        let pool = BufferPool::new(16, 2);

        let buffers: Vec<_> = (0..4).map(|_| pool.get()).collect();
        drop(buffers);

        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_concurrent_checkouts_are_isolated() {
        let pool = Arc::new(BufferPool::default());

        let handles: Vec<_> = (0..8u8)
            .map(|n| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let mut buffer = pool.get();
                        assert!(buffer.is_empty());

                        buffer.extend(std::iter::repeat(n).take(64));
                        assert!(buffer.iter().all(|byte| *byte == n));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(pool.idle_count() <= 8);
    }
}
