//! Balloon registry
//!
//! Owns every live balloon together with its renderables. A balloon enters
//! and leaves the scene in the same call that adds or removes it here, and
//! every renderable is tagged with its owning balloon so picking resolves
//! straight to an entity.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use rand::Rng;

use super::balloon::{Balloon, BalloonColor, BalloonId, BalloonVisual};
use super::state::GameState;
use crate::config::{DriftRange, GameConfig};
use crate::scene::{Renderable, RenderableId, Scene};

/// The set of live balloons
#[derive(Debug)]
pub struct BalloonRegistry {
    /// Live balloons in spawn (id) order
    balloons: Vec<Balloon>,
    /// Renderable → owning balloon
    owners: HashMap<RenderableId, BalloonId>,
    next_id: u32,
}

impl Default for BalloonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BalloonRegistry {
    pub fn new() -> Self {
        Self {
            balloons: Vec::new(),
            owners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Spawn a balloon below the view. Does nothing unless the game is running.
    pub fn spawn_one<S, R>(
        &mut self,
        state: &GameState,
        config: &GameConfig,
        scene: &mut S,
        rng: &mut R,
    ) -> Option<BalloonId>
    where
        S: Scene + ?Sized,
        R: Rng,
    {
        if !state.is_running() {
            return None;
        }

        let area = config.spawn_area;
        let pos = Vec3::new(
            sample_centered(rng, area.width),
            config.spawn_height(),
            sample_centered(rng, area.depth),
        );
        let drift = Vec2::new(sample_range(rng, config.drift_x), sample_range(rng, config.drift_z));
        let color = BalloonColor::ALL[rng.random_range(0..BalloonColor::ALL.len())];

        let id = BalloonId(self.next_id);
        self.next_id += 1;

        let mut balloon = Balloon {
            id,
            pos,
            drift,
            radius: config.balloon_radius,
            color,
            // Placeholder until the scene assigns ids below
            visual: BalloonVisual {
                body: RenderableId(0),
                knot: RenderableId(0),
            },
        };
        let body = scene.add_renderable(Renderable {
            position: balloon.pos,
            radius: balloon.radius,
            color: color.hex(),
        });
        let knot = scene.add_renderable(Renderable {
            position: balloon.knot_position(),
            radius: balloon.knot_radius(),
            color: color.knot_hex(),
        });
        balloon.visual = BalloonVisual { body, knot };

        self.owners.insert(body, id);
        self.owners.insert(knot, id);
        self.balloons.push(balloon);

        log::debug!(
            "Spawned balloon {} at ({:.2}, {:.2}, {:.2}) drift ({:.4}, {:.4})",
            id.0,
            pos.x,
            pos.y,
            pos.z,
            drift.x,
            drift.y
        );
        Some(id)
    }

    /// Remove a balloon and its renderables. Returns false if it was not live.
    pub fn remove_one<S: Scene + ?Sized>(&mut self, id: BalloonId, scene: &mut S) -> bool {
        let Some(index) = self.balloons.iter().position(|b| b.id == id) else {
            return false;
        };
        let balloon = self.balloons.remove(index);
        for part in balloon.visual.parts() {
            scene.remove_renderable(part);
            self.owners.remove(&part);
        }
        true
    }

    /// Remove every live balloon. Returns how many were removed.
    pub fn remove_all<S: Scene + ?Sized>(&mut self, scene: &mut S) -> usize {
        let count = self.balloons.len();
        for balloon in self.balloons.drain(..) {
            for part in balloon.visual.parts() {
                scene.remove_renderable(part);
            }
        }
        self.owners.clear();
        if count > 0 {
            log::debug!("Cleared {} balloons", count);
        }
        count
    }

    /// Live balloons in spawn order
    pub fn live_balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn get(&self, id: BalloonId) -> Option<&Balloon> {
        self.balloons.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: BalloonId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.balloons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balloons.is_empty()
    }

    /// Balloon owning a renderable
    pub fn owner_of(&self, renderable: RenderableId) -> Option<BalloonId> {
        self.owners.get(&renderable).copied()
    }

    /// Every renderable of every live balloon, as picking candidates
    pub fn renderables(&self) -> Vec<RenderableId> {
        self.balloons.iter().flat_map(|b| b.visual.parts()).collect()
    }

    pub(crate) fn balloons_mut(&mut self) -> &mut [Balloon] {
        &mut self.balloons
    }
}

/// Uniform in [-extent/2, extent/2]
fn sample_centered<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    let half = extent / 2.0;
    rng.random_range(-half..=half)
}

fn sample_range<R: Rng>(rng: &mut R, range: DriftRange) -> f32 {
    rng.random_range(range.min..=range.max)
}
