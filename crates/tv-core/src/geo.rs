//! Screen-space geometry shared by the pattern factory and the layout engine.
//!
//! Coordinates are single-precision pixels in a top-left-origin viewport,
//! stored as [`glam::Vec2`].  At canvas scale `f32` is far more precision
//! than any renderer can show.

use glam::Vec2;

/// The drawable area nodes are laid out in.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width:  f32,
    pub height: f32,
    /// Inset from every edge inside which nodes are kept.
    pub padding: f32,
}

impl Viewport {
    #[inline]
    pub fn new(width: f32, height: f32, padding: f32) -> Self {
        Self { width, height, padding }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }

    /// Top-left corner of the padded region.
    #[inline]
    pub fn inner_min(&self) -> Vec2 {
        Vec2::splat(self.padding)
    }

    /// Bottom-right corner of the padded region.
    #[inline]
    pub fn inner_max(&self) -> Vec2 {
        Vec2::new(self.width - self.padding, self.height - self.padding)
    }

    /// `true` if `p` lies inside the padded region (edges inclusive).
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        let (lo, hi) = (self.inner_min(), self.inner_max());
        p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y
    }

    /// Clamp `p` into the padded region.
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.inner_min(), self.inner_max())
    }

    /// The radius that keeps a centred circle comfortably inside the canvas.
    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.center().min_element()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 100.0)
    }
}

/// Where a node is drawn now, and where it is heading.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub position: Vec2,
    pub target:   Vec2,
}

impl Placement {
    /// A node at rest: target equals position.
    #[inline]
    pub fn at(position: Vec2) -> Self {
        Self { position, target: position }
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }
}

/// Point at `angle` radians on a circle of `radius` around `center`.
#[inline]
pub fn on_circle(center: Vec2, radius: f32, angle: f32) -> Vec2 {
    center + Vec2::new(angle.cos(), angle.sin()) * radius
}
