//! Reusable scratch buffers for key ordering.
//!
//! A [`ScratchPool`] can be shared between threads that deduplicate
//! different documents. Each checkout hands out an empty buffer and the
//! guard returns it on drop, so a buffer is released on every exit path,
//! early `?` returns included.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// `(key digest, entry index)` pairs sorted while hashing a mapping.
pub type KeyOrder = Vec<(u64, usize)>;

const DEFAULT_MAX_POOLED: usize = 64;
const INITIAL_CAPACITY: usize = 16;

#[derive(Debug)]
pub struct ScratchPool {
    free: Mutex<Vec<KeyOrder>>,
    max_pooled: usize,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::with_max_pooled(DEFAULT_MAX_POOLED)
    }

    /// Pool that keeps at most `max_pooled` idle buffers.
    pub fn with_max_pooled(max_pooled: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_pooled,
        }
    }

    pub fn checkout(&self) -> ScratchGuard<'_> {
        let mut buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_CAPACITY));
        buf.clear();
        ScratchGuard { pool: self, buf }
    }

    /// Idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn give_back(&self, mut buf: KeyOrder) {
        buf.clear();
        let mut free = self.free.lock();
        if free.len() < self.max_pooled {
            free.push(buf);
        }
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed buffer, returned to its pool on drop.
pub struct ScratchGuard<'a> {
    pool: &'a ScratchPool,
    buf: KeyOrder,
}

impl Deref for ScratchGuard<'_> {
    type Target = KeyOrder;

    fn deref(&self) -> &KeyOrder {
        &self.buf
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut KeyOrder {
        &mut self.buf
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.pool.give_back(std::mem::take(&mut self.buf));
    }
}
