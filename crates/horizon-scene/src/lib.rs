//! Horizon scene crate.
//!
//! Procedural night landscape drawn in five fixed layers (skybox, sun, stars,
//! mountains, grid) around a free-flying camera.
//!
//! The generators, camera and orchestration are plain Rust and testable
//! without a GPU; `gpu` implements the draw and compile seams over wgpu, and
//! `app` wires everything to the engine runtime.

pub mod camera;
pub mod config;
pub mod layer;
pub mod mountains;
pub mod noise;
pub mod orchestrator;
pub mod params;
pub mod shader;
pub mod stars;

pub mod gpu;

mod app;

pub use app::SceneApp;
pub use config::SceneConfig;
