//! Balloon Pop - A 3D balloon popping arcade game
//!
//! Core modules:
//! - `sim`: Balloon simulation (registry, kinematics, hit resolution, game state)
//! - `game`: Frame loop and event routing between the simulation and its collaborators
//! - `scene`: Rendering collaborator seam and the CPU scene graph
//! - `renderer`: WebGPU rendering pipeline
//! - `ui`: UI collaborator seam and HUD text
//! - `config`: Data-driven game tuning

pub mod config;
pub mod error;
pub mod game;
pub mod renderer;
pub mod scene;
pub mod sim;
pub mod ui;

pub use config::GameConfig;
pub use error::{ConfigError, StartupError};
pub use game::{Game, PointerEvent};
pub use scene::{Scene, SceneGraph};
pub use ui::GameObserver;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Knot sits just under the body sphere
    pub const KNOT_RADIUS_FACTOR: f32 = 0.16;
    pub const KNOT_OFFSET_FACTOR: f32 = 1.1;

    /// Camera defaults
    pub const CAMERA_FOV_DEGREES: f32 = 75.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;
    pub const CAMERA_DISTANCE: f32 = 15.0;

    /// Largest frame delta fed to the fixed-step accumulator (ms)
    pub const MAX_FRAME_DELTA_MS: f64 = 100.0;
    /// Spawns that may fire in one frame after a long stall
    pub const MAX_SPAWNS_PER_FRAME: u32 = 4;
}

/// Screen size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }
}

/// Convert screen coordinates (origin top-left, y down) to normalized device
/// coordinates in [-1, 1] with y up.
#[inline]
pub fn screen_to_ndc(screen: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        (screen.x / viewport.width) * 2.0 - 1.0,
        -(screen.y / viewport.height) * 2.0 + 1.0,
    )
}

/// Inverse of [`screen_to_ndc`]
#[inline]
pub fn ndc_to_screen(ndc: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

/// Convert a 0xRRGGBB color to linear-ish RGBA floats
#[inline]
pub fn rgb_hex_to_rgba(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        1.0,
    ]
}
