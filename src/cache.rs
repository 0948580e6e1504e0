//! The chunk section cache: a fixed-size, hash-indexed table of recently
//! built sections, with LRU-within-probe-window eviction. Bounding every
//! probe to a fixed window keeps lookup, insert, and invalidation cost
//! independent of the cache's overall size, unlike a linked-list global LRU.

use crate::hash::floor_div;
use crate::section::SectionData;

/// Every probe (lookup, insert, invalidate) scans at most this many slots
/// linearly from the hash home slot.
pub const MAX_PROBE_DISTANCE: usize = 32;

struct Slot {
  cx: i32,
  cy: i32,
  cz: i32,
  biome: u8,
  valid: bool,
  lru: u16,
  data: SectionData,
}

impl Slot {
  fn empty() -> Slot {
    Slot { cx: 0, cy: 0, cz: 0, biome: 0, valid: false, lru: 0, data: [0; 4096] }
  }
}

/// A fixed-capacity cache of built chunk sections.
pub struct SectionCache {
  slots: Vec<Slot>,
  lru_clock: u16,
}

fn home_slot(cx: i32, cy: i32, cz: i32, capacity: usize) -> usize {
  let h = (cx.wrapping_mul(73_856_093) ^ cy.wrapping_mul(19_349_663) ^ cz.wrapping_mul(83_492_791)) as u32;
  (h as usize) % capacity
}

impl SectionCache {
  /// Creates a cache with the given number of slots. `capacity` must be
  /// nonzero; the collaborator picks a size appropriate to the host (e.g. 64
  /// on constrained hosts, 4096 on a host with plenty of free memory).
  pub fn new(capacity: usize) -> SectionCache {
    assert!(capacity > 0, "cache capacity must be nonzero");
    log::debug!("allocating chunk section cache with {capacity} slots");
    let mut slots = Vec::with_capacity(capacity);
    slots.resize_with(capacity, Slot::empty);
    SectionCache { slots, lru_clock: 0 }
  }

  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  fn window(&self, cx: i32, cy: i32, cz: i32) -> impl Iterator<Item = usize> {
    let capacity = self.slots.len();
    let home = home_slot(cx, cy, cz, capacity);
    (0..capacity.min(MAX_PROBE_DISTANCE)).map(move |i| (home + i) % capacity)
  }

  /// Looks up the section at `(cx, cy, cz)`. On a hit, copies the cached
  /// bytes into `out`, bumps the LRU clock, and returns the cached biome.
  pub fn find(&mut self, cx: i32, cy: i32, cz: i32, out: &mut SectionData) -> Option<u8> {
    for i in self.window(cx, cy, cz) {
      let slot = &self.slots[i];
      if slot.valid && slot.cx == cx && slot.cy == cy && slot.cz == cz {
        out.copy_from_slice(&slot.data);
        let biome = slot.biome;
        self.lru_clock = self.lru_clock.wrapping_add(1);
        self.slots[i].lru = self.lru_clock;
        return Some(biome);
      }
    }
    None
  }

  /// Inserts or overwrites the slot for `(cx, cy, cz)` with `data`/`biome`.
  /// Prefers an empty slot in the probe window; if none is free, evicts the
  /// slot with the oldest `lru` stamp in that same window.
  pub fn insert(&mut self, cx: i32, cy: i32, cz: i32, biome: u8, data: &SectionData) {
    self.lru_clock = self.lru_clock.wrapping_add(1);
    let lru = self.lru_clock;

    let mut victim = None;
    let mut oldest_age = 0u16;
    for i in self.window(cx, cy, cz) {
      if !self.slots[i].valid {
        victim = Some(i);
        break;
      }
      // Wrapping subtraction makes ages comparable across `lru_clock` wraparound.
      let age = lru.wrapping_sub(self.slots[i].lru);
      if victim.is_none() || age > oldest_age {
        victim = Some(i);
        oldest_age = age;
      }
    }

    let i = victim.expect("probe window is never empty");
    let slot = &mut self.slots[i];
    slot.cx = cx;
    slot.cy = cy;
    slot.cz = cz;
    slot.biome = biome;
    slot.valid = true;
    slot.lru = lru;
    slot.data.copy_from_slice(data);
  }

  /// Invalidates the section containing world block `(x, y, z)`, if cached.
  pub fn invalidate(&mut self, x: i32, y: i32, z: i32) {
    let cx = floor_div(x, 16) * 16;
    let cy = floor_div(y, 16) * 16;
    let cz = floor_div(z, 16) * 16;
    for i in self.window(cx, cy, cz) {
      let slot = &mut self.slots[i];
      if slot.valid && slot.cx == cx && slot.cy == cy && slot.cz == cz {
        slot.valid = false;
        return;
      }
    }
  }

  /// Marks every slot invalid. Used on seed change.
  pub fn clear(&mut self) {
    log::info!("clearing chunk section cache ({} slots)", self.slots.len());
    for slot in &mut self.slots {
      slot.valid = false;
    }
  }
}
