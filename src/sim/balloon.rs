//! Balloon entity

use glam::{Vec2, Vec3};

use crate::consts::{KNOT_OFFSET_FACTOR, KNOT_RADIUS_FACTOR};
use crate::scene::RenderableId;

/// Registry-assigned balloon identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BalloonId(pub u32);

/// Cosmetic balloon color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalloonColor {
    Red,
    Blue,
    Green,
    Yellow,
    Pink,
}

impl BalloonColor {
    pub const ALL: [BalloonColor; 5] = [
        BalloonColor::Red,
        BalloonColor::Blue,
        BalloonColor::Green,
        BalloonColor::Yellow,
        BalloonColor::Pink,
    ];

    /// 0xRRGGBB
    pub fn hex(self) -> u32 {
        match self {
            BalloonColor::Red => 0xff0000,
            BalloonColor::Blue => 0x0000ff,
            BalloonColor::Green => 0x00ff00,
            BalloonColor::Yellow => 0xffff00,
            BalloonColor::Pink => 0xffc0cb,
        }
    }

    /// Knot is a darker shade of the body
    pub fn knot_hex(self) -> u32 {
        let hex = self.hex();
        let r = ((hex >> 16) & 0xff) * 3 / 5;
        let g = ((hex >> 8) & 0xff) * 3 / 5;
        let b = (hex & 0xff) * 3 / 5;
        (r << 16) | (g << 8) | b
    }
}

/// Renderables making up one balloon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalloonVisual {
    pub body: RenderableId,
    pub knot: RenderableId,
}

impl BalloonVisual {
    pub fn parts(&self) -> [RenderableId; 2] {
        [self.body, self.knot]
    }
}

/// A live balloon
#[derive(Debug, Clone)]
pub struct Balloon {
    pub id: BalloonId,
    /// Body center
    pub pos: Vec3,
    /// Lateral velocity per tick (x, z), fixed at spawn
    pub drift: Vec2,
    pub radius: f32,
    pub color: BalloonColor,
    pub visual: BalloonVisual,
}

impl Balloon {
    /// Move by one tick of rise plus drift
    #[inline]
    pub fn advance(&mut self, vertical_speed: f32) {
        self.pos.y += vertical_speed;
        self.pos.x += self.drift.x;
        self.pos.z += self.drift.y;
    }

    #[inline]
    pub fn knot_radius(&self) -> f32 {
        self.radius * KNOT_RADIUS_FACTOR
    }

    #[inline]
    pub fn knot_position(&self) -> Vec3 {
        self.pos - Vec3::Y * (self.radius * KNOT_OFFSET_FACTOR)
    }
}
