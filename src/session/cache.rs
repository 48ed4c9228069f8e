use std::collections::{HashMap, VecDeque};

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::bitmap::buffer::BitmapBuffer;
use crate::foundation::error::EaselResult;

const XXH3_SEED: u64 = 0x5eed_ea5e_1b17_3a9c;

/// Decoded-bitmap cache owned by one editor session.
///
/// Keyed by an `xxh3` hash of the encoded bytes, evicted least-recently-used.
#[derive(Debug)]
pub struct BitmapCache {
    bitmaps: HashMap<u64, BitmapBuffer>,
    lru: VecDeque<u64>,
    capacity: usize,
    decodes: u64,
}

impl BitmapCache {
    /// Cache holding at most `capacity` bitmaps. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            bitmaps: HashMap::new(),
            lru: VecDeque::new(),
            capacity,
            decodes: 0,
        }
    }

    /// Cached bitmaps.
    pub fn len(&self) -> usize {
        self.bitmaps.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.bitmaps.is_empty()
    }

    /// How many times bytes were actually decoded.
    pub fn decodes(&self) -> u64 {
        self.decodes
    }

    /// Decode `encoded`, or return the cached copy.
    pub fn decode(&mut self, encoded: &[u8]) -> EaselResult<BitmapBuffer> {
        let key = xxh3_64_with_seed(encoded, XXH3_SEED);
        if let Some(bitmap) = self.bitmaps.get(&key).cloned() {
            self.touch(key);
            return Ok(bitmap);
        }

        let bitmap = BitmapBuffer::decode(encoded)?;
        self.decodes += 1;
        if self.capacity > 0 {
            self.insert(key, bitmap.clone());
        }
        Ok(bitmap)
    }

    fn insert(&mut self, key: u64, bitmap: BitmapBuffer) {
        self.bitmaps.insert(key, bitmap);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.bitmaps.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }

    /// Drop every cached bitmap.
    pub fn clear(&mut self) {
        self.bitmaps.clear();
        self.lru.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/cache.rs"]
mod tests;
