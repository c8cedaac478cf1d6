//! WebGPU rendering module
//!
//! Balloons are spheres, ray-traced per pixel in the fragment shader.

pub mod camera;
pub mod sphere_pipeline;

pub use camera::Camera;
pub use sphere_pipeline::SphereRenderer;
