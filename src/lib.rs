//! A deterministic procedural world generator: given a 32-bit seed and
//! integer block coordinates, synthesizes block ids on demand, with a
//! chunk-section cache to avoid resynthesizing hot sections and a sparse
//! overlay so players can override individual blocks.
//!
//! Everything here is owned by one [`Generator`]; there is no process-global
//! state. Construct one per world.

pub mod anchor;
pub mod biome;
pub mod blocks;
pub mod cache;
pub mod feature;
pub mod hash;
pub mod overlay;
pub mod section;
pub mod terrain;

use anchor::{height_at_from_anchor, Anchor, CHUNK_SIZE};
use cache::SectionCache;
use feature::feature_from_anchor;
use hash::floor_div;
use overlay::Overlay;
use section::SectionData;

pub use biome::Biome;
pub use overlay::{OverlayFull, MAX_BLOCK_CHANGES};
pub use terrain::HEIGHT_CAP;

/// Owns the world seed, the block-change overlay, the chunk-section cache,
/// and a scratch buffer reused across [`Generator::build_section`] calls.
pub struct Generator {
  seed: u32,
  overlay: Overlay,
  cache: SectionCache,
  scratch: SectionData,
}

impl Generator {
  /// Creates a generator for `seed` with a section cache of `cache_capacity`
  /// slots. A few hundred slots are enough to keep a single player's visible
  /// radius warm; pick something much larger for a multi-player host.
  pub fn init(seed: u32, cache_capacity: usize) -> Generator {
    log::info!("initializing world generator, seed={seed:#010x}, cache_capacity={cache_capacity}");
    Generator { seed, overlay: Overlay::new(), cache: SectionCache::new(cache_capacity), scratch: [0; 4096] }
  }

  /// Returns the block id at `(x, y, z)`. Checks the overlay first; falls
  /// back to terrain synthesis on a miss.
  pub fn block_at(&self, x: i32, y: i32, z: i32) -> u8 {
    if let Some(block) = self.overlay.lookup(x, y, z) {
      return block;
    }

    let chunk_x = floor_div(x, CHUNK_SIZE);
    let chunk_z = floor_div(z, CHUNK_SIZE);
    let rx = hash::floor_mod(x, CHUNK_SIZE);
    let rz = hash::floor_mod(z, CHUNK_SIZE);
    let anchor = Anchor::at(chunk_x, chunk_z, self.seed);
    let height = height_at_from_anchor(rx, rz, &anchor, self.seed);
    let feature = feature_from_anchor(&anchor, self.seed);
    terrain::block_at(x, y, z, &anchor, &feature, height)
  }

  /// Builds, or returns a cached copy of, the section at `(cx, cy, cz)`
  /// (each a multiple of 16). The returned slice borrows the generator's
  /// internal scratch buffer and is valid until the next call to
  /// `build_section` or `put_block`.
  pub fn build_section(&mut self, cx: i32, cy: i32, cz: i32) -> (u8, &SectionData) {
    let biome = match self.cache.find(cx, cy, cz, &mut self.scratch) {
      Some(biome) => biome,
      None => {
        let biome = section::synthesize(cx, cy, cz, self.seed, &mut self.scratch);
        self.cache.insert(cx, cy, cz, biome, &self.scratch);
        biome
      }
    };
    section::apply_overlay(cx, cy, cz, &self.overlay, &mut self.scratch);
    (biome, &self.scratch)
  }

  /// Writes an override at `(x, y, z)`. `block == 0xFF` deletes any existing
  /// override. Invalidates the enclosing section in the cache so the next
  /// `build_section` call picks up the change.
  pub fn put_block(&mut self, x: i32, y: i32, z: i32, block: u8) -> Result<(), OverlayFull> {
    self.overlay.put(x, y, z, block)?;
    self.cache.invalidate(x, y, z);
    Ok(())
  }

  /// Clears every override. Does not touch the cache; cached sections still
  /// reflect pre-overlay terrain, which is what this restores.
  pub fn clear_overlay(&mut self) {
    log::info!("clearing block-change overlay");
    self.overlay.clear();
  }

  /// Invalidates every cached section. Callers typically do this on seed
  /// change; the generator itself never changes its own seed.
  pub fn clear_cache(&mut self) {
    self.cache.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use blocks::{AIR, BEDROCK};

  #[test]
  fn s1_below_zero_is_bedrock() {
    let gen = Generator::init(splitmix64_seed(), 64);
    assert_eq!(gen.block_at(0, -1, 0), BEDROCK);
  }

  #[test]
  fn s2_far_above_cap_is_air() {
    let gen = Generator::init(splitmix64_seed(), 64);
    assert_eq!(gen.block_at(0, 200, 0), AIR);
  }

  #[test]
  fn s4_put_block_lands_at_documented_index() {
    let mut gen = Generator::init(splitmix64_seed(), 64);
    gen.put_block(8, 8, 8, blocks::DIAMOND_BLOCK).unwrap();
    let (_, section) = gen.build_section(0, 0, 0);
    assert_eq!(section[section::interleaved_index(8, 8, 8)], blocks::DIAMOND_BLOCK);
  }

  #[test]
  fn s5_delete_restores_synthesized_value() {
    let mut gen = Generator::init(splitmix64_seed(), 64);
    let original = gen.block_at(100, 64, 100);
    gen.put_block(100, 64, 100, AIR).unwrap();
    assert_eq!(gen.block_at(100, 64, 100), AIR);
    gen.put_block(100, 64, 100, blocks::TOMBSTONE).unwrap();
    assert_eq!(gen.block_at(100, 64, 100), original);
  }

  #[test]
  fn s6_full_overlay_rejects_new_entries() {
    let mut gen = Generator::init(splitmix64_seed(), 64);
    for i in 0..MAX_BLOCK_CHANGES as i32 {
      gen.put_block(i, 0, 0, blocks::STONE).unwrap();
    }
    assert_eq!(gen.put_block(MAX_BLOCK_CHANGES as i32, 0, 0, blocks::STONE), Err(OverlayFull));
  }

  #[test]
  fn build_section_is_deterministic_across_cache_states() {
    let mut gen = Generator::init(splitmix64_seed(), 64);
    let (biome_a, data_a) = gen.build_section(0, 0, 0);
    let data_a = *data_a;
    gen.clear_cache();
    let (biome_b, data_b) = gen.build_section(0, 0, 0);
    assert_eq!(biome_a, biome_b);
    assert_eq!(data_a, *data_b);
  }

  #[test]
  fn cache_invalidation_makes_overlay_visible_in_next_build() {
    let mut gen = Generator::init(splitmix64_seed(), 64);
    let _ = gen.build_section(0, 0, 0); // warm the cache
    gen.put_block(8, 8, 8, blocks::DIAMOND_BLOCK).unwrap();
    let (_, section) = gen.build_section(0, 0, 0);
    assert_eq!(section[section::interleaved_index(8, 8, 8)], blocks::DIAMOND_BLOCK);
  }

  fn splitmix64_seed() -> u32 {
    hash::splitmix64(0xA103DE6C) as u32
  }
}
