use super::value::Rect4;
use serde::Serialize;

/// Design size assumed when a section has no usable main picture, and the
/// target size of design-mode builds.
pub const DEFAULT_DESIGN_SIZE: [u32; 2] = [800, 600];

/// Independent X/Y factors from design space to target space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// A zero design dimension falls back to the default design size on that
    /// axis.
    pub fn between(design: [u32; 2], target: [u32; 2]) -> Self {
        let axis = |i: usize| {
            let d = if design[i] == 0 {
                DEFAULT_DESIGN_SIZE[i]
            } else {
                design[i]
            };
            target[i] as f32 / d as f32
        };
        Self {
            x: axis(0),
            y: axis(1),
        }
    }

    #[inline(always)]
    pub fn point(self, p: [f32; 2]) -> [f32; 2] {
        [p[0] * self.x, p[1] * self.y]
    }

    #[inline(always)]
    pub fn size(self, w: u32, h: u32) -> [f32; 2] {
        [w as f32 * self.x, h as f32 * self.y]
    }

    pub fn rect(self, r: Rect4) -> ScaledRect {
        ScaledRect {
            min: self.point([r.min_x as f32, r.min_y as f32]),
            max: self.point([r.max_x as f32, r.max_y as f32]),
        }
    }
}

/// Rectangle in target space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledRect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl ScaledRect {
    #[inline(always)]
    pub fn size(&self) -> [f32; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }

    #[inline(always)]
    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    pub fn translate(self, by: [f32; 2]) -> Self {
        Self {
            min: [self.min[0] + by[0], self.min[1] + by[1]],
            max: [self.max[0] + by[0], self.max[1] + by[1]],
        }
    }
}
