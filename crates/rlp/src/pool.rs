//! Reusable encode buffers.

use crate::EncodeBuffer;
use core::{
    fmt,
    ops::{Deref, DerefMut},
};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::trace;

static GLOBAL: Lazy<BufferPool> = Lazy::new(BufferPool::new);

/// A pool of [`EncodeBuffer`]s.
///
/// [`acquire`](Self::acquire) hands out a [`PooledBuffer`] guard that owns its
/// buffer exclusively. Dropping the guard resets the buffer and returns it.
pub struct BufferPool {
    free: Mutex<Vec<EncodeBuffer>>,
    max_retained: usize,
}

impl BufferPool {
    /// Number of idle buffers a pool keeps by default.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Creates a pool retaining up to [`DEFAULT_CAPACITY`](Self::DEFAULT_CAPACITY) buffers.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a pool retaining up to `max_retained` idle buffers.
    pub const fn with_capacity(max_retained: usize) -> Self {
        Self { free: parking_lot::const_mutex(Vec::new()), max_retained }
    }

    /// Returns the process-wide pool used by [`encode`](crate::encode).
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Takes an empty buffer from the pool, allocating one if none is idle.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = self.free.lock().pop().unwrap_or_default();
        PooledBuffer { buf, pool: self }
    }

    /// Returns the number of idle buffers.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut buf: EncodeBuffer) {
        buf.reset();
        let mut free = self.free.lock();
        if free.len() < self.max_retained {
            free.push(buf);
        } else {
            trace!(max_retained = self.max_retained, "encode buffer pool full, dropping buffer");
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("idle", &self.idle())
            .field("max_retained", &self.max_retained)
            .finish()
    }
}

/// An [`EncodeBuffer`] on loan from a [`BufferPool`].
#[must_use = "dropping the guard returns the buffer to the pool immediately"]
pub struct PooledBuffer<'a> {
    buf: EncodeBuffer,
    pool: &'a BufferPool,
}

impl PooledBuffer<'_> {
    /// Detaches the buffer from the pool.
    pub fn into_inner(mut self) -> EncodeBuffer {
        let buf = core::mem::take(&mut self.buf);
        core::mem::forget(self);
        buf
    }
}

impl fmt::Debug for PooledBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PooledBuffer").field(&self.buf).finish()
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = EncodeBuffer;

    #[inline]
    fn deref(&self) -> &EncodeBuffer {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut EncodeBuffer {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(core::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_buffers_are_reset_and_reused() {
        let pool = BufferPool::with_capacity(4);
        {
            let mut buf = pool.acquire();
            buf.write_uint64(1024);
            let list = buf.list_start();
            buf.list_end(list);
            assert_eq!(buf.len(), 4);
        }
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn retention_is_bounded() {
        let pool = BufferPool::with_capacity(1);
        let a = pool.acquire();
        let b = pool.acquire();
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn detached_buffers_do_not_return() {
        let pool = BufferPool::with_capacity(4);
        let mut buf = pool.acquire();
        buf.write_bool(true);
        let inner = buf.into_inner();
        assert_eq!(inner.to_bytes(), [0x01]);
        assert_eq!(pool.idle(), 0);
    }
}
