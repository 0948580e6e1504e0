//! Chunk anchors and the height field interpolated over them.
//!
//! An anchor is the (hash, biome) pair recomputed at will for any chunk
//! column corner; nothing here is stored between calls. The height field is a
//! bilinear interpolation over the four anchors surrounding an in-chunk
//! coordinate.

use crate::biome::{biome_at, Biome};
use crate::hash::{chunk_hash, floor_div, floor_mod};

/// Sea level, and the height every corner height is built outward from.
pub const TERRAIN_BASE_HEIGHT: i32 = 64;
/// The lattice unit that heights are interpolated over. In this build it is
/// equal to one full chunk, so one anchor quad spans exactly one column.
pub const CHUNK_SIZE: i32 = 16;

/// The (hash, biome) pair at one chunk column corner.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
  pub x: i32,
  pub z: i32,
  pub hash: u32,
  pub biome: Biome,
}

impl Anchor {
  pub fn at(cx: i32, cz: i32, seed: u32) -> Anchor {
    Anchor { x: cx, z: cz, hash: chunk_hash(cx as i16, cz as i16, seed), biome: biome_at(cx, cz, seed) }
  }
}

/// Derives an absolute terrain height for a chunk corner from its hash and
/// biome. Each biome sums a handful of low hash bit-fields to get a gentle,
/// stable distribution while still allowing occasional larger variance.
pub fn corner_height(hash: u32, biome: Biome) -> i32 {
  let mut height = TERRAIN_BASE_HEIGHT;
  match biome {
    Biome::MangroveSwamp => {
      height += ((hash % 3) + ((hash >> 4) % 3) + ((hash >> 8) % 3) + ((hash >> 12) % 3)) as i32;
      if height < 64 {
        height -= ((hash >> 24) & 3) as i32;
      }
    }
    Biome::Plains => {
      height += ((hash & 3) + ((hash >> 4) & 3) + ((hash >> 8) & 3) + ((hash >> 12) & 3)) as i32;
    }
    Biome::Desert => {
      height += 4 + ((hash & 3) + ((hash >> 4) & 3)) as i32;
    }
    Biome::Beach => {
      height = 62 - ((hash & 3) + ((hash >> 4) & 3) + ((hash >> 8) & 3)) as i32;
    }
    Biome::SnowyPlains => {
      height += ((hash & 7) + ((hash >> 4) & 7)) as i32;
    }
  }
  height
}

fn interpolate(a: i32, b: i32, c: i32, d: i32, rx: i32, rz: i32) -> i32 {
  let top = a * (CHUNK_SIZE - rx) + b * rx;
  let bottom = c * (CHUNK_SIZE - rx) + d * rx;
  (top * (CHUNK_SIZE - rz) + bottom * rz) / (CHUNK_SIZE * CHUNK_SIZE)
}

/// Height at in-chunk coordinate `(rx, rz)`, given the origin anchor's
/// `(chunk_x, chunk_z)` so that the three neighboring corners can be derived.
pub fn height_at_from_hash(rx: i32, rz: i32, chunk_x: i32, chunk_z: i32, hash: u32, biome: Biome, seed: u32) -> i32 {
  if rx == 0 && rz == 0 {
    let h = corner_height(hash, biome);
    if h > 67 {
      return h - 1;
    }
  }
  let east = Anchor::at(chunk_x + 1, chunk_z, seed);
  let south = Anchor::at(chunk_x, chunk_z + 1, seed);
  let south_east = Anchor::at(chunk_x + 1, chunk_z + 1, seed);
  interpolate(
    corner_height(hash, biome),
    corner_height(east.hash, east.biome),
    corner_height(south.hash, south.biome),
    corner_height(south_east.hash, south_east.biome),
    rx,
    rz,
  )
}

/// Height at `(rx, rz)` given a full anchor (computes its own neighbors).
pub fn height_at_from_anchor(rx: i32, rz: i32, anchor: &Anchor, seed: u32) -> i32 {
  height_at_from_hash(rx, rz, anchor.x, anchor.z, anchor.hash, anchor.biome, seed)
}

/// Terrain height at an arbitrary world `(x, z)`, without accounting for any
/// overlay entries.
pub fn height_at(x: i32, z: i32, seed: u32) -> i32 {
  let chunk_x = floor_div(x, CHUNK_SIZE);
  let chunk_z = floor_div(z, CHUNK_SIZE);
  let rx = floor_mod(x, CHUNK_SIZE);
  let rz = floor_mod(z, CHUNK_SIZE);
  let anchor = Anchor::at(chunk_x, chunk_z, seed);
  height_at_from_anchor(rx, rz, &anchor, seed)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plains_height_is_within_documented_range() {
    for hash in 0u32..=0xFFFF {
      let h = corner_height(hash, Biome::Plains) - TERRAIN_BASE_HEIGHT;
      assert!((0..=12).contains(&h), "plains delta {h} out of range");
    }
  }

  #[test]
  fn desert_never_floods() {
    for hash in 0u32..=0xFFFF {
      let h = corner_height(hash, Biome::Desert);
      assert!(h >= TERRAIN_BASE_HEIGHT + 4);
    }
  }

  #[test]
  fn beach_is_always_at_or_below_sea_level() {
    for hash in 0u32..=0xFFFF {
      assert!(corner_height(hash, Biome::Beach) <= 62);
    }
  }

  #[test]
  fn seam_rule_only_applies_at_chunk_origin() {
    let hash = 0xFFFF_FFFF;
    let biome = Biome::SnowyPlains;
    let base = corner_height(hash, biome);
    assert!(base > 67);
    let seed = 1;
    let h_origin = height_at_from_hash(0, 0, 0, 0, hash, biome, seed);
    assert_eq!(h_origin, base - 1);
  }

  #[test]
  fn height_is_deterministic() {
    let seed = 0xA103DE6C;
    for (x, z) in [(0, 0), (15, 15), (-1, -1), (1000, -1000)] {
      assert_eq!(height_at(x, z, seed), height_at(x, z, seed));
    }
  }
}
