//! Balloon simulation
//!
//! All gameplay logic lives here and stays free of rendering and platform code:
//! - Fixed-step kinematics only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - Scene access only through the `Scene` trait

pub mod balloon;
pub mod hit;
pub mod intersect;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use balloon::{Balloon, BalloonColor, BalloonId, BalloonVisual};
pub use hit::{POP_POINTS, pick, pop, resolve_click};
pub use intersect::{Ray, ray_sphere};
pub use registry::BalloonRegistry;
pub use scheduler::{SpawnScheduler, SpawnTaskId};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::tick;
