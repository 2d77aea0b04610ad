//! Toroidal spatial model shared by every system.
//!
//! All distance and direction computations in the simulation go through
//! [`Torus::delta`] so that behaviour stays continuous across the seams of the
//! wrap-around map.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default world width measured in world units.
pub const DEFAULT_WORLD_WIDTH: f32 = 6_000.0;
/// Default world height measured in world units.
pub const DEFAULT_WORLD_HEIGHT: f32 = 6_000.0;

/// Wrap-around rectangle that hosts every entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    width: f32,
    height: f32,
}

impl Torus {
    /// Creates a torus with the provided extents.
    ///
    /// Returns `None` when either extent is not a finite positive number.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Option<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self { width, height })
    }

    /// Horizontal extent of the map.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the map.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre of the map, used as the player's spawn point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Folds a point into `[0, width) × [0, height)`.
    ///
    /// Non-finite coordinates collapse to zero rather than poisoning state.
    #[must_use]
    pub fn wrap(&self, point: Vec2) -> Vec2 {
        Vec2::new(fold(point.x, self.width), fold(point.y, self.height))
    }

    /// Translates `point` by `offset` and folds the result back onto the map.
    #[must_use]
    pub fn offset(&self, point: Vec2, offset: Vec2) -> Vec2 {
        self.wrap(point + offset)
    }

    /// Minimal signed vector leading from `from` to `to` across the seams.
    #[must_use]
    pub fn delta(&self, from: Vec2, to: Vec2) -> Vec2 {
        Vec2::new(
            shortest(to.x - from.x, self.width),
            shortest(to.y - from.y, self.height),
        )
    }

    /// Length of the shortest path between two points.
    #[must_use]
    pub fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        self.delta(a, b).length()
    }

    /// Unit vector pointing from `from` toward `to`, or zero when they coincide.
    #[must_use]
    pub fn direction(&self, from: Vec2, to: Vec2) -> Vec2 {
        self.delta(from, to).normalize_or_zero()
    }

    /// Heading in radians from `from` toward `to`.
    #[must_use]
    pub fn angle_to(&self, from: Vec2, to: Vec2) -> f32 {
        let delta = self.delta(from, to);
        delta.y.atan2(delta.x)
    }

    /// Largest distance two points can be apart on this torus.
    #[must_use]
    pub fn max_distance(&self) -> f32 {
        Vec2::new(self.width * 0.5, self.height * 0.5).length()
    }
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

/// Unit vector for the provided heading in radians.
#[must_use]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

fn fold(value: f32, extent: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let folded = value.rem_euclid(extent);
    // rem_euclid rounds tiny negative inputs up to `extent` itself.
    if folded >= extent {
        0.0
    } else {
        folded
    }
}

fn shortest(raw: f32, extent: f32) -> f32 {
    if !raw.is_finite() {
        return 0.0;
    }
    let half = extent * 0.5;
    let mut value = raw.rem_euclid(extent);
    if value > half {
        value -= extent;
    }
    value
}
