//! Rendering collaborator seam
//!
//! The simulation never draws anything itself. It registers renderables
//! with a [`Scene`], keeps their positions in sync, and asks it to cast
//! picking rays. [`SceneGraph`] is the CPU implementation used natively,
//! in tests, and as the backing store of the browser's GPU scene.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use crate::Viewport;
use crate::renderer::Camera;
use crate::sim::intersect::ray_sphere;

/// Scene-assigned identity of a renderable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderableId(pub u32);

/// A sphere to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    pub position: Vec3,
    pub radius: f32,
    /// 0xRRGGBB
    pub color: u32,
}

/// One intersection reported by [`Scene::cast_ray`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub renderable: RenderableId,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Everything the core needs from a 3D engine
pub trait Scene {
    fn add_renderable(&mut self, renderable: Renderable) -> RenderableId;

    /// Unknown ids are ignored
    fn remove_renderable(&mut self, id: RenderableId);

    fn set_position(&mut self, id: RenderableId, position: Vec3);

    /// Intersect a picking ray through `ndc` with `candidates`, nearest first
    fn cast_ray(&self, ndc: Vec2, candidates: &[RenderableId]) -> Vec<RayHit>;

    /// Draw the current scene. Called every frame regardless of game phase.
    fn render(&mut self);

    fn resize(&mut self, width: u32, height: u32);
}

/// In-memory scene with analytic ray casting
#[derive(Debug, Clone)]
pub struct SceneGraph {
    renderables: BTreeMap<RenderableId, Renderable>,
    camera: Camera,
    next_id: u32,
    frames_rendered: u64,
}

impl SceneGraph {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            renderables: BTreeMap::new(),
            camera: Camera::new(viewport),
            next_id: 1,
            frames_rendered: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    pub fn contains(&self, id: RenderableId) -> bool {
        self.renderables.contains_key(&id)
    }

    pub fn get(&self, id: RenderableId) -> Option<&Renderable> {
        self.renderables.get(&id)
    }

    /// Renderables in id order
    pub fn iter(&self) -> impl Iterator<Item = (RenderableId, &Renderable)> {
        self.renderables.iter().map(|(id, r)| (*id, r))
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Scene for SceneGraph {
    fn add_renderable(&mut self, renderable: Renderable) -> RenderableId {
        let id = RenderableId(self.next_id);
        self.next_id += 1;
        self.renderables.insert(id, renderable);
        id
    }

    fn remove_renderable(&mut self, id: RenderableId) {
        self.renderables.remove(&id);
    }

    fn set_position(&mut self, id: RenderableId, position: Vec3) {
        if let Some(r) = self.renderables.get_mut(&id) {
            r.position = position;
        }
    }

    fn cast_ray(&self, ndc: Vec2, candidates: &[RenderableId]) -> Vec<RayHit> {
        let ray = self.camera.ray_from_ndc(ndc);
        let mut hits: Vec<RayHit> = candidates
            .iter()
            .filter_map(|id| {
                let r = self.renderables.get(id)?;
                ray_sphere(&ray, r.position, r.radius).map(|distance| RayHit {
                    renderable: *id,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }

    fn render(&mut self) {
        self.frames_rendered += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }
}
