use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::frame::Raster;

/// Identifies one rendered preview tile.
///
/// Preview pixels sit on a lattice `phase + k * step` of the source
/// raster; tiles are fixed blocks of lattice indices, so the same key
/// always denotes the same source pixels regardless of which viewport
/// asked for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub phase_x: usize,
    pub phase_y: usize,
    pub step: usize,
    pub col: usize,
    pub row: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of times the cache was cleared because parameters changed
    /// or the host asked for it.
    pub invalidations: u64,
}

/// Memoized preview tiles, valid for exactly one parameter fingerprint.
///
/// Any lookup with a different fingerprint drops every tile first. Least
/// recently used tiles are evicted beyond `capacity`; a capacity of zero
/// disables memoization.
pub struct TileCache {
    capacity: usize,
    fingerprint: Option<u64>,
    tiles: HashMap<TileKey, Arc<Raster>>,
    /// Recency order, oldest first. `touch` scans it linearly, which stays
    /// cheap for capacities of a few dozen tiles (default 64).
    lru: VecDeque<TileKey>,
    stats: TileCacheStats,
}

impl TileCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            fingerprint: None,
            tiles: HashMap::new(),
            lru: VecDeque::new(),
            stats: TileCacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn stats(&self) -> TileCacheStats {
        self.stats
    }

    /// Drop every tile.
    pub fn invalidate(&mut self) {
        if !self.tiles.is_empty() {
            debug!(tiles = self.tiles.len(), "Invalidating preview tile cache");
        }
        self.tiles.clear();
        self.lru.clear();
        self.fingerprint = None;
        self.stats.invalidations += 1;
    }

    /// Bind the cache to `fingerprint`, clearing it if it was produced
    /// under different parameters.
    pub fn bind(&mut self, fingerprint: u64) {
        if self.fingerprint != Some(fingerprint) {
            if self.fingerprint.is_some() {
                self.invalidate();
            }
            self.fingerprint = Some(fingerprint);
        }
    }

    pub fn get(&mut self, fingerprint: u64, key: &TileKey) -> Option<Arc<Raster>> {
        self.bind(fingerprint);
        match self.tiles.get(key).cloned() {
            Some(tile) => {
                self.stats.hits += 1;
                self.touch(*key);
                Some(tile)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, fingerprint: u64, key: TileKey, tile: Arc<Raster>) {
        if self.capacity == 0 {
            return;
        }
        self.bind(fingerprint);
        self.tiles.insert(key, tile);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.tiles.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: TileKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}
