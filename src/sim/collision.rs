//! Overlap tests for circular bodies, tiles and the world rectangle
//!
//! Every body in the game is a circle. Tiles and the world are axis-aligned
//! rectangles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from the origin with the given size
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// Bounding box of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self::new(center - Vec2::splat(radius), center + Vec2::splat(radius))
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Rectangles overlap (touching edges count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Clamp a circle's center so the whole circle stays inside
    pub fn clamp_circle(&self, center: Vec2, radius: f32) -> Vec2 {
        let lo = self.min + Vec2::splat(radius);
        let hi = (self.max - Vec2::splat(radius)).max(lo);
        center.clamp(lo, hi)
    }
}

/// Result of a world-bounds clamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsContact {
    pub pos: Vec2,
    /// Which axes were pushed back inside
    pub hit_x: bool,
    pub hit_y: bool,
}

/// Keep a circle inside `bounds`, reporting which axes touched a wall
pub fn clamp_to_bounds(bounds: &Rect, center: Vec2, radius: f32) -> BoundsContact {
    let pos = bounds.clamp_circle(center, radius);
    BoundsContact {
        pos,
        hit_x: pos.x != center.x,
        hit_y: pos.y != center.y,
    }
}

/// Two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// A circle overlaps a rectangle
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = center.clamp(rect.min, rect.max);
    center.distance_squared(closest) < radius * radius
}

/// How deep a circle sits in a rectangle (0 when they don't overlap).
/// A center inside the rectangle adds its distance to the nearest edge.
pub fn circle_rect_penetration(center: Vec2, radius: f32, rect: &Rect) -> f32 {
    if rect.contains(center) {
        let to_edge = (center.x - rect.min.x)
            .min(rect.max.x - center.x)
            .min(center.y - rect.min.y)
            .min(rect.max.y - center.y);
        return radius + to_edge;
    }
    let closest = center.clamp(rect.min, rect.max);
    (radius - center.distance(closest)).max(0.0)
}

/// Whether any part of a circle's bounding box is still inside `bounds`
pub fn circle_in_bounds(bounds: &Rect, center: Vec2, radius: f32) -> bool {
    bounds.overlaps(&Rect::around_circle(center, radius))
}
