//! Tile map collision grid
//!
//! Only what the simulation needs from a map: its size (the world bounds) and
//! which tiles are solid. Each layer says whether it also blocks enemies;
//! every solid layer blocks the player and projectiles.

use std::ops::RangeInclusive;

use glam::Vec2;
use serde::Deserialize;

use super::collision::{Rect, circle_rect_overlap, circle_rect_penetration};
use crate::error::Error;

/// Tiled stores flip/rotation flags in the top bits of each gid
const GID_MASK: u32 = 0x0FFF_FFFF;

/// Who is asking about a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    Player,
    Enemy,
    Projectile,
}

/// One layer of solid tiles
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    /// Row-major, `cols * rows` entries
    pub solid: Vec<bool>,
    /// Enemies can't walk through this layer
    pub blocks_enemies: bool,
}

impl TileLayer {
    fn blocks(&self, who: Blocker) -> bool {
        match who {
            Blocker::Enemy => self.blocks_enemies,
            Blocker::Player | Blocker::Projectile => true,
        }
    }
}

/// Collision view of a scaled tile map
#[derive(Debug, Clone)]
pub struct TileMap {
    pub cols: u32,
    pub rows: u32,
    /// World-space tile size (already scaled)
    pub tile_size: Vec2,
    pub layers: Vec<TileLayer>,
}

impl TileMap {
    /// Map with no solid tiles
    pub fn open(cols: u32, rows: u32, tile_size: f32) -> Self {
        Self {
            cols,
            rows,
            tile_size: Vec2::splat(tile_size),
            layers: Vec::new(),
        }
    }

    /// Add an empty collision layer, returning its index
    pub fn add_layer(&mut self, name: impl Into<String>, blocks_enemies: bool) -> usize {
        self.layers.push(TileLayer {
            name: name.into(),
            solid: vec![false; (self.cols * self.rows) as usize],
            blocks_enemies,
        });
        self.layers.len() - 1
    }

    /// Mark a tile solid (out-of-range coordinates are ignored)
    pub fn set_solid(&mut self, layer: usize, col: u32, row: u32) {
        if col >= self.cols || row >= self.rows {
            return;
        }
        let idx = (row * self.cols + col) as usize;
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.solid[idx] = true;
        }
    }

    pub fn width(&self) -> f32 {
        self.cols as f32 * self.tile_size.x
    }

    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size.y
    }

    pub fn world_bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width() / 2.0, self.height() / 2.0)
    }

    fn tile_rect(&self, col: u32, row: u32) -> Rect {
        let min = Vec2::new(col as f32 * self.tile_size.x, row as f32 * self.tile_size.y);
        Rect::new(min, min + self.tile_size)
    }

    /// Tile columns and rows a circle's bounding box covers, if any
    fn tiles_under(&self, center: Vec2, radius: f32) -> Option<(RangeInclusive<u32>, RangeInclusive<u32>)> {
        if self.layers.is_empty() {
            return None;
        }
        let bounds = Rect::around_circle(center, radius);
        let col_lo = (bounds.min.x / self.tile_size.x).floor().max(0.0) as u32;
        let row_lo = (bounds.min.y / self.tile_size.y).floor().max(0.0) as u32;
        let col_hi = ((bounds.max.x / self.tile_size.x).floor().max(0.0) as u32).min(self.cols.saturating_sub(1));
        let row_hi = ((bounds.max.y / self.tile_size.y).floor().max(0.0) as u32).min(self.rows.saturating_sub(1));
        if col_lo >= self.cols || row_lo >= self.rows {
            return None;
        }
        Some((col_lo..=col_hi, row_lo..=row_hi))
    }

    /// Does a circle overlap any tile solid to `who`?
    pub fn circle_hits(&self, center: Vec2, radius: f32, who: Blocker) -> bool {
        let Some((cols, rows)) = self.tiles_under(center, radius) else {
            return false;
        };
        for layer in self.layers.iter().filter(|l| l.blocks(who)) {
            for row in rows.clone() {
                for col in cols.clone() {
                    if layer.solid[(row * self.cols + col) as usize]
                        && circle_rect_overlap(center, radius, &self.tile_rect(col, row))
                    {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Deepest overlap between a circle and the tiles solid to `who`
    /// (0 when it touches none)
    pub fn penetration(&self, center: Vec2, radius: f32, who: Blocker) -> f32 {
        let Some((cols, rows)) = self.tiles_under(center, radius) else {
            return 0.0;
        };
        let mut deepest = 0.0f32;
        for layer in self.layers.iter().filter(|l| l.blocks(who)) {
            for row in rows.clone() {
                for col in cols.clone() {
                    if layer.solid[(row * self.cols + col) as usize] {
                        let depth = circle_rect_penetration(center, radius, &self.tile_rect(col, row));
                        deepest = deepest.max(depth);
                    }
                }
            }
        }
        deepest
    }

    /// Build the collision grid from a Tiled JSON export.
    ///
    /// A tile is solid when its tileset entry has a truthy `collides` (or
    /// `colider`) property. A layer blocks enemies when it has a truthy
    /// `enemy_solid` property. Only tile layers with plain CSV/array data are
    /// read; other layer types are skipped.
    pub fn from_tiled_json(json: &str, scale: f32) -> Result<Self, Error> {
        let tiled: TiledMap = serde_json::from_str(json)?;
        if tiled.width == 0 || tiled.height == 0 {
            return Err(Error::InvalidMap("map has no tiles".into()));
        }
        if tiled.tilewidth == 0 || tiled.tileheight == 0 {
            return Err(Error::InvalidMap(format!(
                "tile size must be positive, got {}x{}",
                tiled.tilewidth, tiled.tileheight
            )));
        }
        if !(scale > 0.0) {
            return Err(Error::InvalidMap(format!("scale must be positive, got {scale}")));
        }

        if let Some(ts) = tiled.tilesets.iter().find(|ts| ts.source.is_some() && ts.tiles.is_empty()) {
            return Err(Error::InvalidMap(format!(
                "tileset {} (firstgid {}) is external; embed it so its collision properties can be read",
                ts.source.as_deref().unwrap_or_default(),
                ts.firstgid
            )));
        }

        let colliding_gids: Vec<u32> = tiled
            .tilesets
            .iter()
            .flat_map(|ts| {
                ts.tiles
                    .iter()
                    .filter(|t| has_truthy(&t.properties, &["collides", "colider"]))
                    .map(move |t| ts.firstgid + t.id)
            })
            .collect();

        let mut map = TileMap {
            cols: tiled.width,
            rows: tiled.height,
            tile_size: Vec2::new(tiled.tilewidth as f32, tiled.tileheight as f32) * scale,
            layers: Vec::new(),
        };

        let expected = (tiled.width * tiled.height) as usize;
        for layer in tiled.layers.into_iter().filter(|l| l.kind == "tilelayer") {
            let encoded = layer.encoding.as_deref().is_some_and(|e| e != "csv");
            let data = match layer.data {
                TiledData::Tiles(data) if !encoded => data,
                TiledData::Tiles(_) => {
                    return Err(Error::InvalidMap(format!(
                        "layer '{}' uses encoded data; export with CSV layer format",
                        layer.name
                    )));
                }
                TiledData::Encoded(payload) => {
                    return Err(Error::InvalidMap(format!(
                        "layer '{}' holds {} bytes of encoded data; export with CSV layer format",
                        layer.name,
                        payload.len()
                    )));
                }
            };
            if data.len() != expected {
                return Err(Error::InvalidMap(format!(
                    "layer '{}' has {} tiles, expected {}",
                    layer.name,
                    data.len(),
                    expected
                )));
            }

            let solid: Vec<bool> = data
                .iter()
                .map(|gid| {
                    let gid = gid & GID_MASK;
                    gid != 0 && colliding_gids.contains(&gid)
                })
                .collect();
            if !solid.iter().any(|s| *s) {
                continue;
            }

            let blocks_enemies = has_truthy(&layer.properties, &["enemy_solid"]);
            log::debug!(
                "Collision layer '{}' ({} solid tiles, blocks enemies: {})",
                layer.name,
                solid.iter().filter(|s| **s).count(),
                blocks_enemies
            );
            map.layers.push(TileLayer {
                name: layer.name,
                solid,
                blocks_enemies,
            });
        }

        Ok(map)
    }

    /// Read a Tiled JSON export from disk
    pub fn from_tiled_file(path: impl AsRef<std::path::Path>, scale: f32) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path.display().to_string(), e))?;
        let map = Self::from_tiled_json(&json, scale)?;
        log::info!(
            "Loaded map {} ({}x{} tiles, {} collision layers)",
            path.display(),
            map.cols,
            map.rows,
            map.layers.len()
        );
        Ok(map)
    }
}

fn has_truthy(properties: &[TiledProperty], names: &[&str]) -> bool {
    properties
        .iter()
        .any(|p| names.contains(&p.name.as_str()) && p.value.as_bool().unwrap_or(false))
}

#[derive(Debug, Deserialize)]
struct TiledMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    layers: Vec<TiledLayer>,
    #[serde(default)]
    tilesets: Vec<TiledTileset>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: TiledData,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    properties: Vec<TiledProperty>,
}

/// Layer tiles: a gid array, or a base64 string when the layer is encoded
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TiledData {
    Tiles(Vec<u32>),
    Encoded(String),
}

impl Default for TiledData {
    fn default() -> Self {
        TiledData::Tiles(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct TiledTileset {
    firstgid: u32,
    /// Set when the tileset lives in its own file
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    tiles: Vec<TiledTile>,
}

#[derive(Debug, Deserialize)]
struct TiledTile {
    id: u32,
    #[serde(default)]
    properties: Vec<TiledProperty>,
}

#[derive(Debug, Deserialize)]
struct TiledProperty {
    name: String,
    value: serde_json::Value,
}
