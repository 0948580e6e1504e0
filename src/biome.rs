//! Biome assignment: a pure function of chunk column and world seed.
//!
//! Biomes are laid out as concentric circular islands tiled on a
//! [`BIOME_SIZE`] grid, with a ring of beach separating each island from its
//! neighbors. There is no noise map involved; the whole thing falls out of
//! integer distance checks against the seed-derived tiling.

use crate::hash::floor_div;

/// Size, in chunks, of one biome island tile (including its beach ring).
pub const BIOME_SIZE: i32 = 16;
/// Radius, in chunks, of the island at the center of each tile.
pub const BIOME_RADIUS: i32 = 8;

/// A biome id, matching the fixed 3-bit enum from the external interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Biome {
  Plains = 0,
  Desert = 1,
  MangroveSwamp = 2,
  SnowyPlains = 3,
  Beach = 4,
}

impl Biome {
  pub fn id(self) -> u8 {
    self as u8
  }

  /// Maps a 2-bit index (as pulled from the seed) onto one of the four
  /// "island" biomes. Beach is never produced here; it is assigned directly
  /// by [`biome_at`] once a chunk is found to be outside every island radius.
  fn from_seed_index(index: u32) -> Biome {
    match index & 3 {
      0 => Biome::Plains,
      1 => Biome::Desert,
      2 => Biome::MangroveSwamp,
      _ => Biome::SnowyPlains,
    }
  }
}

fn mod_abs(a: i32, m: i32) -> i32 {
  (a % m).abs()
}

/// Returns the biome for the chunk column `(cx, cz)` under `seed`.
pub fn biome_at(cx: i32, cz: i32, seed: u32) -> Biome {
  let x = cx + BIOME_RADIUS;
  let z = cz + BIOME_RADIUS;

  let dx = BIOME_RADIUS - mod_abs(x, BIOME_SIZE);
  let dz = BIOME_RADIUS - mod_abs(z, BIOME_SIZE);
  if dx * dx + dz * dz > BIOME_RADIUS * BIOME_RADIUS {
    return Biome::Beach;
  }

  let biome_x = floor_div(x, BIOME_SIZE);
  let biome_z = floor_div(z, BIOME_SIZE);
  let index = ((biome_x & 3) + ((biome_z * 4) & 15)).unsigned_abs();
  // `index` runs up to 18, so `index * 2` can reach 36 - mask to the low 5
  // bits so this matches a hardware-masked 32-bit shift instead of panicking.
  Biome::from_seed_index(seed >> ((index * 2) & 31))
}
