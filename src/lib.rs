//! Mass-spring cloth simulation with Verlet integration and obstacle projection.
//!
//! `drape` models a cloth as a rectangular grid of point masses joined by
//! structural and shear springs, steps it with Störmer–Verlet, and resolves
//! collisions by projecting nodes out of rigid obstacles. Rendering, input and
//! UI live outside the crate: they read [`ClothGrid::positions`] each frame and
//! tune the grid's public parameters.
//!
//! # Features
//!
//! - **8-connected springs**: axis-aligned and diagonal neighbours, rest lengths
//!   fixed at construction
//! - **Quadratic drag** and constant gravity along -z
//! - **Snapshot stepping**: every node reads the pre-step state
//! - **Obstacles**: sphere and half-space, open to new shapes via [`Obstacle`]
//! - **Pinning**: optional corner / first-row / per-node pins
//! - **Observable**: monitor steps via the [`StepObserver`] trait or `tracing`
//! - **`no_std` compatible**: needs only `alloc`
//!
//! # Example
//! ```
//! use drape::{ClothGrid, SphereObstacle, Vec3};
//!
//! let mut cloth: ClothGrid<f32> = ClothGrid::new(20, 20, 0.1).unwrap();
//! let sphere = SphereObstacle::new(Vec3::new(0.0, 0.0, -3.0), 2.0).shared();
//! cloth.add_obstacle(&sphere);
//!
//! for _ in 0..100 {
//!     cloth.step(0.001);
//! }
//! sphere.borrow_mut().center.x += 0.5;
//! cloth.step(0.001);
//! assert_eq!(cloth.positions().len(), 400);
//! ```

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod obstacle;
pub mod grid;
pub mod mesh;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::Vec3;
pub use obstacle::{Obstacle, SharedObstacle, SphereObstacle, PlaneObstacle};
pub use grid::ClothGrid;
pub use config::{ClothConfig, Pinning};
pub use observer::{StepObserver, NoOpStepObserver, TracingStepObserver};
pub use error::ClothError;
