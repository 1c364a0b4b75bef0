//! Layered tile grid
//!
//! The map is owned by the level loader; the simulation only reads it through
//! [`TileQuery`].

use serde::{Deserialize, Serialize};

/// Identifier of a tile layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl LayerId {
    /// Wall layer
    pub const WALLS: Self = Self(0);
    /// Door layer
    pub const DOORS: Self = Self(1);
}

/// Read access to a tile grid.
///
/// Tile ID 0 means empty. Coordinates outside `width` x `height` (including
/// negative ones) are reported as empty; callers that need fail-closed
/// behavior check [`TileQuery::in_bounds`] first.
pub trait TileQuery {
    /// Grid width in tiles
    fn width(&self) -> i32;

    /// Grid height in tiles
    fn height(&self) -> i32;

    /// Tile ID at a position on a layer
    fn tile(&self, layer: LayerId, x: i32, y: i32) -> u32;

    /// Check if a tile coordinate lies inside the grid
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }
}

/// A simple in-memory layered tile map
#[derive(Debug, Clone)]
pub struct TileMap {
    width: i32,
    height: i32,
    /// One row-major tile buffer per layer, indexed by `LayerId.0`
    layers: Vec<Vec<u32>>,
}

impl TileMap {
    /// Create an empty map with the given number of layers
    #[must_use]
    pub fn new(width: usize, height: usize, layer_count: usize) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let cells = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width,
            height,
            layers: vec![vec![0; cells]; layer_count.max(1)],
        }
    }

    /// Build a two-layer map (walls, doors) from ASCII rows.
    ///
    /// `#` is a wall, `D` a door, anything else is empty. Rows shorter than
    /// the longest row are padded with empty tiles.
    #[must_use]
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut map = Self::new(width, rows.len(), 2);

        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let (x, y) = (x as i32, y as i32);
                match ch {
                    '#' => map.set_tile(LayerId::WALLS, x, y, 1),
                    'D' => map.set_tile(LayerId::DOORS, x, y, 1),
                    _ => {}
                }
            }
        }

        map
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| (y as usize) * (self.width as usize) + (x as usize))
    }

    /// Set a tile ID. Out-of-range layers or coordinates are ignored.
    pub fn set_tile(&mut self, layer: LayerId, x: i32, y: i32, id: u32) {
        if let Some(index) = self.index(x, y)
            && let Some(cells) = self.layers.get_mut(layer.0 as usize)
        {
            cells[index] = id;
        }
    }

    /// Check if a tile holds a wall on the given layer
    #[must_use]
    pub fn is_wall(&self, layer: LayerId, x: i32, y: i32) -> bool {
        self.tile(layer, x, y) > 0
    }

    /// Iterate over all non-empty tiles of a layer as `(x, y, id)`
    pub fn occupied(&self, layer: LayerId) -> impl Iterator<Item = (i32, i32, u32)> + '_ {
        let width = self.width.max(1);
        self.layers
            .get(layer.0 as usize)
            .into_iter()
            .flat_map(|cells| cells.iter().enumerate())
            .filter(|(_, id)| **id > 0)
            .map(move |(i, id)| ((i as i32) % width, (i as i32) / width, *id))
    }
}

impl TileQuery for TileMap {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn tile(&self, layer: LayerId, x: i32, y: i32) -> u32 {
        self.index(x, y)
            .and_then(|i| self.layers.get(layer.0 as usize).map(|cells| cells[i]))
            .unwrap_or(0)
    }
}
