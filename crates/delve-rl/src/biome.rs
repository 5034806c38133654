//! Height-banded terrain classification for overworlds.

use delve_core::{Dice, Level, Offset, Tile};
use rand::Rng;

use crate::heightmap::{Heightmap, HeightmapError};

/// Terrain for one height band.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Biome<T> {
    /// Heights strictly below this belong to the band, unless a lower band
    /// claims them first.
    pub boundary: f64,
    pub pass_tiles: Vec<T>,
    pub impass_tiles: Vec<T>,
    /// Chance that a cell is passable.
    pub pass_chance: f64,
    /// Whether impassable cells let light through.
    pub impass_lite: bool,
}

impl<T: Clone> Biome<T> {
    /// Roll one tile. Falls back on the other pool when the rolled one is
    /// empty; `None` only if both are.
    pub fn generate<R: Rng>(&self, offset: Offset, dice: &mut Dice<R>) -> Option<Tile<T>> {
        let pass = if self.pass_tiles.is_empty() {
            false
        } else if self.impass_tiles.is_empty() {
            true
        } else {
            dice.chance(self.pass_chance)
        };
        if pass {
            let data = dice.choose(&self.pass_tiles)?.clone();
            Some(Tile::new(offset, data))
        } else {
            let data = dice.choose(&self.impass_tiles)?.clone();
            Some(
                Tile::new(offset, data)
                    .with_pass(false)
                    .with_lite(self.impass_lite),
            )
        }
    }

    fn is_empty(&self) -> bool {
        self.pass_tiles.is_empty() && self.impass_tiles.is_empty()
    }
}

/// Biomes sorted by boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Biomes<T> {
    biomes: Vec<Biome<T>>,
    fallback: T,
}

impl<T: Clone> Biomes<T> {
    /// Validate and sort a biome table.
    pub fn new(mut biomes: Vec<Biome<T>>) -> Result<Self, HeightmapError> {
        if let Some(index) = biomes.iter().position(Biome::is_empty) {
            return Err(HeightmapError::EmptyBiome { index });
        }
        biomes.sort_by(|a, b| a.boundary.total_cmp(&b.boundary));
        let fallback = biomes
            .iter()
            .find_map(|b| b.impass_tiles.first().or(b.pass_tiles.first()))
            .cloned()
            .ok_or(HeightmapError::NoBiomes)?;
        Ok(Self { biomes, fallback })
    }

    /// The band with the smallest boundary above `height`, or the highest
    /// band if none is.
    pub fn select(&self, height: f64) -> Option<&Biome<T>> {
        self.biomes
            .iter()
            .find(|b| height < b.boundary)
            .or(self.biomes.last())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Biome<T>> {
        self.biomes.iter()
    }

    /// Classify one cell.
    pub fn generate<R: Rng>(&self, offset: Offset, height: f64, dice: &mut Dice<R>) -> Tile<T> {
        self.select(height)
            .and_then(|biome| biome.generate(offset, dice))
            .unwrap_or_else(|| Tile::new(offset, self.fallback.clone()).with_pass(false))
    }

    /// Classify every cell of `heightmap` into a fully connected level.
    pub fn overworld<R: Rng>(&self, heightmap: &Heightmap, dice: &mut Dice<R>) -> Level<T> {
        let level = heightmap.apply(|off, height| self.generate(off, height, dice));
        log::debug!(
            "overworld: {}x{} cells, {} passable",
            heightmap.cols(),
            heightmap.rows(),
            level.tiles.iter().filter(|(_, t)| t.pass).count()
        );
        level
    }
}
