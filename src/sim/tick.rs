//! Kinematics tick
//!
//! Advances every live balloon by one fixed step and retires the ones that
//! floated past the despawn height as misses.

use super::registry::BalloonRegistry;
use super::state::GameState;
use crate::config::GameConfig;
use crate::scene::Scene;

/// Advance all balloons by one tick. Returns the number of misses reported.
///
/// Does nothing unless the game is running. Every balloon past the despawn
/// height is removed; once a miss ends the game the rest leave unreported.
pub fn tick<S: Scene + ?Sized>(
    state: &mut GameState,
    registry: &mut BalloonRegistry,
    scene: &mut S,
    config: &GameConfig,
) -> u32 {
    if !state.is_running() {
        return 0;
    }

    let mut escaped = Vec::new();
    for balloon in registry.balloons_mut() {
        balloon.advance(config.vertical_speed);
        scene.set_position(balloon.visual.body, balloon.pos);
        scene.set_position(balloon.visual.knot, balloon.knot_position());
        if balloon.pos.y > config.despawn_y {
            escaped.push(balloon.id);
        }
    }

    let mut misses = 0;
    for id in escaped {
        if !registry.remove_one(id, scene) {
            continue;
        }
        if state.report_miss() {
            misses += 1;
            log::debug!("Balloon {} missed ({}/{})", id.0, state.missed(), state.miss_limit());
        }
    }
    misses
}
