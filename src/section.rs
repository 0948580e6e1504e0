//! The 4096-byte chunk section and the builder that fills it.
//!
//! The storage order inside a section is an on-wire protocol contract, not
//! an internal choice: the low 3 bits of the X axis are reversed within each
//! run of 8. Callers must not transpose it after the fact; the builder
//! produces wire-ready bytes directly.

use crate::anchor::{height_at_from_hash, Anchor, CHUNK_SIZE};
use crate::biome::Biome;
use crate::blocks::{CHEST, TOMBSTONE, TORCH};
use crate::feature::feature_from_anchor;
use crate::hash::floor_div;
use crate::overlay::Overlay;
use crate::terrain::block_at;

/// One 16x16x16 chunk section, laid out in the interleaved byte order.
pub type SectionData = [u8; 4096];

/// Maps an in-section coordinate to its storage index.
///
/// `address = dx + (dz << 4) + (dy << 8)` is the natural (non-interleaved)
/// index; the low 3 bits of `address` (which come entirely from `dx`, since
/// `dx < 16` contributes bits 0..=3) are bit-reversed within each run of 8.
pub fn interleaved_index(dx: u8, dy: u8, dz: u8) -> usize {
  let address = dx as usize + ((dz as usize) << 4) + ((dy as usize) << 8);
  (address & !7) | (7 - (address & 7))
}

fn is_bake_excluded(block: u8) -> bool {
  block == TOMBSTONE || block == TORCH || block == CHEST
}

/// Synthesizes the section at `(cx, cy, cz)` (each a multiple of 16) into
/// `out`, with no overlay applied. Returns the origin biome.
///
/// This is the form the section cache stores: overlay deltas are re-applied
/// separately on every cache hit and miss, since they can change between
/// accesses without invalidating the cached terrain.
///
/// Synthesis cannot fail: out-of-range Y sections are still fully defined
/// (bedrock below Y=0, air above the height cap).
pub fn synthesize(cx: i32, cy: i32, cz: i32, seed: u32, out: &mut SectionData) -> u8 {
  let chunk_x = floor_div(cx, CHUNK_SIZE);
  let chunk_z = floor_div(cz, CHUNK_SIZE);

  // 2x2 anchor grid: origin plus the east/south/south-east neighbors needed
  // for bilinear interpolation.
  let origin = Anchor::at(chunk_x, chunk_z, seed);
  let feature = feature_from_anchor(&origin, seed);

  let mut heights = [[0i32; 16]; 16];
  for (rx, row) in heights.iter_mut().enumerate() {
    for (rz, h) in row.iter_mut().enumerate() {
      *h = height_at_from_hash(rx as i32, rz as i32, chunk_x, chunk_z, origin.hash, origin.biome, seed);
    }
  }

  for dy in 0u8..16 {
    let y = cy + dy as i32;
    for dz in 0u8..16 {
      let z = cz + dz as i32;
      for dx in 0u8..16 {
        let x = cx + dx as i32;
        let height = heights[dx as usize][dz as usize];
        let block = block_at(x, y, z, &origin, &feature, height);
        out[interleaved_index(dx, dy, dz)] = block;
      }
    }
  }

  origin.biome.id()
}

/// Applies `overlay`'s live entries inside the section at `(cx, cy, cz)` to
/// `out`, if any are present. Exposed separately from [`synthesize`] so the
/// cache layer can store pre-overlay terrain and re-apply deltas on each
/// access.
pub fn apply_overlay(cx: i32, cy: i32, cz: i32, overlay: &Overlay, out: &mut SectionData) {
  if !overlay.is_empty() {
    overlay.bulk_apply_within(cx, cy, cz, out, interleaved_index, is_bake_excluded);
  }
}

/// Builds the section at `(cx, cy, cz)` (each a multiple of 16) into `out`,
/// applying any overlapping overlay entries. Returns the origin biome.
///
/// Equivalent to [`synthesize`] followed by [`apply_overlay`]; kept as a
/// single call for callers (and tests) that don't need the cache's split.
pub fn build_section(cx: i32, cy: i32, cz: i32, seed: u32, overlay: &Overlay, out: &mut SectionData) -> u8 {
  let biome = synthesize(cx, cy, cz, seed, out);
  apply_overlay(cx, cy, cz, overlay, out);
  biome
}
