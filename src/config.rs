//! Configuration types for the cloth grid.

use crate::float::Float;

/// Which nodes are held fixed when a grid is built.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pinning {
    /// Every node is free (open boundary on all sides).
    #[default]
    Free,
    /// The four corner nodes are fixed.
    Corners,
    /// Every node in row `y == 0` is fixed.
    FirstRow,
}

/// Physical parameters and stepping options for a [`ClothGrid`](crate::ClothGrid).
///
/// # Builder Pattern
/// ```
/// use drape::config::{ClothConfig, Pinning};
///
/// let config: ClothConfig<f32> = ClothConfig::new()
///     .with_point_mass(0.2)
///     .with_gravity_constant(9.81)
///     .with_spring_constant(40.0)
///     .with_air_resistance(0.02)
///     .with_pinning(Pinning::FirstRow)
///     .with_sub_steps(100);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClothConfig<F: Float> {
    /// Mass of every node. Must be non-zero. Default: 0.1.
    pub point_mass: F,
    /// Downward (-z) gravitational acceleration. Default: 3.0.
    pub gravity_constant: F,
    /// Hookean stiffness shared by all springs. Default: 15.0.
    pub spring_constant: F,
    /// Quadratic drag coefficient. Default: 0.015.
    pub air_resistance: F,
    /// Nodes fixed at construction. Default: [`Pinning::Free`].
    pub pinning: Pinning,
    /// Number of `step` calls per `advance`. Default: 1.
    pub sub_steps: usize,
}

impl<F: Float> ClothConfig<F> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        ClothConfig {
            point_mass: F::from_f64(0.1),
            gravity_constant: F::from_f64(3.0),
            spring_constant: F::from_f64(15.0),
            air_resistance: F::from_f64(0.015),
            pinning: Pinning::Free,
            sub_steps: 1,
        }
    }

    /// Set the per-node mass.
    pub fn with_point_mass(mut self, point_mass: F) -> Self {
        self.point_mass = point_mass;
        self
    }

    /// Set the gravity constant.
    pub fn with_gravity_constant(mut self, gravity_constant: F) -> Self {
        self.gravity_constant = gravity_constant;
        self
    }

    /// Set the spring constant.
    pub fn with_spring_constant(mut self, spring_constant: F) -> Self {
        self.spring_constant = spring_constant;
        self
    }

    /// Set the drag coefficient.
    pub fn with_air_resistance(mut self, air_resistance: F) -> Self {
        self.air_resistance = air_resistance;
        self
    }

    /// Set which nodes start pinned.
    pub fn with_pinning(mut self, pinning: Pinning) -> Self {
        self.pinning = pinning;
        self
    }

    /// Set the number of sub-steps per `advance`.
    pub fn with_sub_steps(mut self, sub_steps: usize) -> Self {
        self.sub_steps = sub_steps.max(1);
        self
    }
}

impl<F: Float> Default for ClothConfig<F> {
    fn default() -> Self {
        Self::new()
    }
}
