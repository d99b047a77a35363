use crate::iface::key::FeatureKey;
use crate::iface::map::Inheritance;
use serde::Serialize;

/// One built component: what to draw plus which feature it edits.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Component {
    pub key: FeatureKey,
    pub inheritance: Inheritance,
    pub enabled: bool,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(key: FeatureKey, inheritance: Inheritance, kind: ComponentKind) -> Self {
        Self {
            key,
            inheritance,
            enabled: true,
            kind,
        }
    }

    #[inline(always)]
    pub fn pos(&self) -> [f32; 2] {
        self.kind.pos()
    }

    /// Quad-shaped extent; text reports none since its box is the overlay's.
    pub fn size(&self) -> Option<[f32; 2]> {
        match &self.kind {
            ComponentKind::Quad { size, .. }
            | ComponentKind::Animation { size, .. }
            | ComponentKind::Primitive { size, .. } => Some(*size),
            ComponentKind::Addressable(quad) => Some(quad.size),
            ComponentKind::Text { .. } => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        match &self.kind {
            ComponentKind::Quad { texture, .. } => texture == PLACEHOLDER_TEXTURE,
            ComponentKind::Addressable(quad) => quad.texture == PLACEHOLDER_TEXTURE,
            _ => false,
        }
    }
}

/// Texture handle the renderer substitutes for missing art.
pub const PLACEHOLDER_TEXTURE: &str = "__unknown";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ComponentKind {
    /// Static picture; `pos` is the quad center.
    Quad {
        pos: [f32; 2],
        size: [f32; 2],
        texture: String,
        tint: [f32; 4],
    },
    /// Multi-frame picture; `pos` is the quad center.
    Animation {
        pos: [f32; 2],
        size: [f32; 2],
        frames: Vec<String>,
        fps: f32,
    },
    Addressable(AddressableQuad),
    /// Text box content, centered on `pos`.
    Text {
        pos: [f32; 2],
        content: String,
        cell: [f32; 2],
        scale: f32,
    },
    /// Visual-only outline tracking a text box.
    Primitive {
        pos: [f32; 2],
        size: [f32; 2],
        color: [f32; 4],
    },
}

impl ComponentKind {
    pub fn pos(&self) -> [f32; 2] {
        match self {
            Self::Quad { pos, .. }
            | Self::Animation { pos, .. }
            | Self::Text { pos, .. }
            | Self::Primitive { pos, .. } => *pos,
            Self::Addressable(quad) => quad.pos,
        }
    }
}

/// A quad whose top-left corner walks a grid of `step`-spaced cells between
/// `pos` and `max_pos`, one cell per tick, wrapping around.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddressableQuad {
    pub pos: [f32; 2],
    pub size: [f32; 2],
    pub max_pos: [f32; 2],
    pub step: [f32; 2],
    pub texture: String,
    pub tint: [f32; 4],
    pub steps_per_second: f32,
}

impl AddressableQuad {
    /// Cells along one axis; a zero step means the axis does not move.
    fn cells(&self, axis: usize) -> u64 {
        let step = self.step[axis].abs();
        if step <= f32::EPSILON {
            return 1;
        }
        let room = self.max_pos[axis] - self.pos[axis] - self.size[axis];
        if room <= 0.0 {
            return 1;
        }
        ((room / step).floor() as u64).saturating_add(1)
    }

    /// Number of distinct positions before the cycle repeats.
    pub fn period(&self) -> u64 {
        self.cells(0).saturating_mul(self.cells(1))
    }

    /// Position for `tick`, visiting cells row-major. Negative steps start
    /// from the far edge.
    pub fn position_at(&self, tick: u64) -> [f32; 2] {
        let nx = self.cells(0);
        let idx = tick % self.period();
        let cell = [idx % nx, idx / nx];
        let mut out = self.pos;
        for axis in 0..2 {
            let step = self.step[axis];
            if step < 0.0 {
                let far = self.pos[axis] + (self.cells(axis) - 1) as f32 * -step;
                out[axis] = far + cell[axis] as f32 * step;
            } else {
                out[axis] = self.pos[axis] + cell[axis] as f32 * step;
            }
        }
        out
    }

    /// Position after `seconds` of animation; negative time reads as zero.
    pub fn position_at_time(&self, seconds: f32) -> [f32; 2] {
        let ticks = (seconds.max(0.0) * self.steps_per_second).floor();
        self.position_at(ticks as u64)
    }
}
