//! Hit resolution
//!
//! Turns a pointer position into the balloon under it and pops it.

use glam::Vec2;

use super::balloon::BalloonId;
use super::registry::BalloonRegistry;
use super::state::GameState;
use crate::scene::Scene;
use crate::{Viewport, screen_to_ndc};

/// Score awarded per popped balloon
pub const POP_POINTS: u32 = 1;

/// Nearest live balloon under a picking ray through `ndc`
pub fn pick<S: Scene + ?Sized>(registry: &BalloonRegistry, scene: &S, ndc: Vec2) -> Option<BalloonId> {
    let candidates = registry.renderables();
    if candidates.is_empty() {
        return None;
    }
    scene
        .cast_ray(ndc, &candidates)
        .into_iter()
        .find_map(|hit| registry.owner_of(hit.renderable))
}

/// Remove a balloon and score it. Returns false if the game is not running
/// or the balloon is already gone.
pub fn pop<S: Scene + ?Sized>(
    state: &mut GameState,
    registry: &mut BalloonRegistry,
    scene: &mut S,
    id: BalloonId,
) -> bool {
    if !state.is_running() {
        return false;
    }
    if !registry.remove_one(id, scene) {
        return false;
    }
    state.report_score(POP_POINTS);
    true
}

/// Pop the balloon under a screen-space click, if any
pub fn resolve_click<S: Scene + ?Sized>(
    state: &mut GameState,
    registry: &mut BalloonRegistry,
    scene: &mut S,
    screen: Vec2,
    viewport: Viewport,
) -> Option<BalloonId> {
    if !state.is_running() {
        return None;
    }
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return None;
    }
    let ndc = screen_to_ndc(screen, viewport);
    let id = pick(registry, scene, ndc)?;
    if pop(state, registry, scene, id) {
        log::debug!("Popped balloon {} (score {})", id.0, state.score());
        Some(id)
    } else {
        None
    }
}
