//! Mass-spring cloth grid integrated with Störmer–Verlet.

use crate::config::{ClothConfig, Pinning};
use crate::error::ClothError;
use crate::float::Float;
use crate::obstacle::{Obstacle, SharedObstacle};
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::vec::Vec3;
use alloc::rc::{Rc, Weak};
use alloc::vec;
use alloc::vec::Vec as AllocVec;
use core::cell::{Ref, RefCell};

/// Offsets of the 8-connected spring stencil: axis-aligned, then diagonal.
const STENCIL: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// A sheet of point masses joined by structural and shear springs.
///
/// Node `(x, y)` lives at index `x + y * width` in every per-node array.
/// Rest lengths come from the construction layout and never change.
pub struct ClothGrid<F: Float> {
    width: usize,
    height: usize,
    point_mass: F,
    /// Downward (-z) gravitational acceleration.
    pub gravity_constant: F,
    /// Hookean stiffness shared by all springs.
    pub spring_constant: F,
    /// Quadratic drag coefficient.
    pub air_resistance: F,
    sub_steps: usize,
    position: AllocVec<Vec3<F>>,
    prev_position: AllocVec<Vec3<F>>,
    init_position: AllocVec<Vec3<F>>,
    velocity: AllocVec<Vec3<F>>,
    accel: AllocVec<Vec3<F>>,
    pinned: AllocVec<bool>,
    obstacles: AllocVec<Weak<RefCell<dyn Obstacle<F>>>>,
    // Written during a step, committed once every node has been computed.
    next_position: AllocVec<Vec3<F>>,
    next_accel: AllocVec<Vec3<F>>,
}

impl<F: Float> ClothGrid<F> {
    /// Create a `width` x `height` grid with default parameters and the
    /// given per-node mass.
    pub fn new(width: usize, height: usize, point_mass: F) -> Result<Self, ClothError> {
        Self::with_config(width, height, &ClothConfig::new().with_point_mass(point_mass))
    }

    /// Create a grid from a full configuration.
    ///
    /// Nodes start in a flat sheet in the z = 0 plane, 0.5 apart, centred
    /// near the origin: node `(x, y)` sits at
    /// `((x - width/2) / 2, (y - height/2) / 2, 0)` with integer halving.
    pub fn with_config(
        width: usize,
        height: usize,
        config: &ClothConfig<F>,
    ) -> Result<Self, ClothError> {
        if width == 0 || height == 0 {
            return Err(ClothError::InvalidGridDimensions { width, height });
        }
        validate_mass(config.point_mass)?;

        let count = width
            .checked_mul(height)
            .ok_or(ClothError::InvalidGridDimensions { width, height })?;
        let mut layout = AllocVec::with_capacity(count);
        for y in 0..height {
            for x in 0..width {
                layout.push(layout_position(width, height, x, y));
            }
        }

        let mut grid = ClothGrid {
            width,
            height,
            point_mass: config.point_mass,
            gravity_constant: config.gravity_constant,
            spring_constant: config.spring_constant,
            air_resistance: config.air_resistance,
            sub_steps: config.sub_steps.max(1),
            position: layout.clone(),
            prev_position: layout.clone(),
            init_position: layout,
            velocity: vec![Vec3::zero(); count],
            accel: vec![Vec3::zero(); count],
            pinned: vec![false; count],
            obstacles: AllocVec::new(),
            next_position: vec![Vec3::zero(); count],
            next_accel: vec![Vec3::zero(); count],
        };
        grid.apply_pinning(config.pinning);

        tracing::debug!(
            width,
            height,
            point_mass = ?config.point_mass,
            pinning = ?config.pinning,
            "cloth grid created"
        );
        Ok(grid)
    }

    fn apply_pinning(&mut self, pinning: Pinning) {
        let (w, h) = (self.width, self.height);
        match pinning {
            Pinning::Free => {}
            Pinning::Corners => {
                for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
                    let i = self.index(x, y);
                    self.pinned[i] = true;
                }
            }
            Pinning::FirstRow => {
                for x in 0..w {
                    self.pinned[x] = true;
                }
            }
        }
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    fn checked_index(&self, x: usize, y: usize) -> Result<usize, ClothError> {
        if x < self.width && y < self.height {
            Ok(self.index(x, y))
        } else {
            Err(ClothError::NodeOutOfBounds { x, y, width: self.width, height: self.height })
        }
    }

    fn neighbor(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<usize> {
        let nx = x.checked_add_signed(dx).filter(|&nx| nx < self.width)?;
        let ny = y.checked_add_signed(dy).filter(|&ny| ny < self.height)?;
        Some(self.index(nx, ny))
    }

    // ----------------------------------------------------------------------
    // Forces
    // ----------------------------------------------------------------------

    /// Hookean force the spring between nodes `a` and `b` exerts on `a`.
    ///
    /// Positive extension pulls `a` toward `b`. Coincident nodes yield zero.
    pub fn spring_force(
        &self,
        a: (usize, usize),
        b: (usize, usize),
    ) -> Result<Vec3<F>, ClothError> {
        let ia = self.checked_index(a.0, a.1)?;
        let ib = self.checked_index(b.0, b.1)?;
        Ok(self.spring_between(ia, ib))
    }

    fn spring_between(&self, a: usize, b: usize) -> Vec3<F> {
        let diff = self.position[b] - self.position[a];
        let rest = self.init_position[b].distance(self.init_position[a]);
        let extension = diff.length() - rest;
        diff.normalize().scale(self.spring_constant * extension)
    }

    /// Gravity, 8-connected springs and quadratic drag on one node, from the
    /// current (pre-step) state.
    fn net_force(&self, x: usize, y: usize) -> Vec3<F> {
        let i = self.index(x, y);
        let mut force = Vec3::new(F::zero(), F::zero(), -self.gravity_constant * self.point_mass);

        for (dx, dy) in STENCIL {
            if let Some(j) = self.neighbor(x, y, dx, dy) {
                force += self.spring_between(i, j);
            }
        }

        let v = self.velocity[i];
        let speed = v.length();
        force -= v.normalize().scale(self.air_resistance * speed * speed);
        force
    }

    // ----------------------------------------------------------------------
    // Stepping
    // ----------------------------------------------------------------------

    /// Advance the simulation by `dt` against the attached obstacles.
    ///
    /// An obstacle the caller holds mutably borrowed is skipped for this
    /// step and reported with `tracing::warn!`.
    pub fn step(&mut self, dt: F) {
        self.step_observed(dt, &mut NoOpStepObserver);
    }

    /// Like [`step`](Self::step), reporting progress to `observer`.
    ///
    /// Collision indices passed to the observer count only the obstacles
    /// that took part in this step.
    pub fn step_observed<O: StepObserver>(&mut self, dt: F, observer: &mut O) {
        let live: AllocVec<SharedObstacle<F>> =
            self.obstacles.iter().filter_map(Weak::upgrade).collect();
        let guards: AllocVec<Ref<'_, dyn Obstacle<F>>> = live
            .iter()
            .enumerate()
            .filter_map(|(k, o)| match o.try_borrow() {
                Ok(guard) => Some(guard),
                Err(_) => {
                    tracing::warn!(obstacle = k, "obstacle is mutably borrowed, skipped for this step");
                    None
                }
            })
            .collect();
        let views: AllocVec<&dyn Obstacle<F>> = guards.iter().map(|g| &**g).collect();
        self.integrate(dt, &views, observer);
    }

    /// Advance by `dt` against `obstacles` instead of the attached list.
    pub fn step_with(&mut self, dt: F, obstacles: &[&dyn Obstacle<F>]) {
        self.integrate(dt, obstacles, &mut NoOpStepObserver);
    }

    /// Advance one frame of `frame_dt` as `sub_steps` equal steps.
    pub fn advance(&mut self, frame_dt: F) {
        let sub_dt = frame_dt / F::from_f32(self.sub_steps as f32);
        for _ in 0..self.sub_steps {
            self.step(sub_dt);
        }
    }

    fn integrate<O: StepObserver>(
        &mut self,
        dt: F,
        obstacles: &[&dyn Obstacle<F>],
        observer: &mut O,
    ) {
        let dt_sq = dt * dt;
        let inv_mass = F::one() / self.point_mass;

        for y in 0..self.height {
            for x in 0..self.width {
                let i = self.index(x, y);
                if self.pinned[i] {
                    continue;
                }

                let a = self.net_force(x, y).scale(inv_mass);
                let mut p = self.position[i].scale(F::two()) - self.prev_position[i] + a.scale(dt_sq);

                for (k, obstacle) in obstacles.iter().enumerate() {
                    if obstacle.is_inside(p) {
                        p = obstacle.project(p);
                        observer.on_collision(i, k);
                    }
                }

                self.next_position[i] = p;
                self.next_accel[i] = a;
            }
        }
        observer.on_integrate();

        let mut non_finite = 0usize;
        for i in 0..self.position.len() {
            if self.pinned[i] {
                continue;
            }
            self.prev_position[i] = self.position[i];
            self.position[i] = self.next_position[i];
            self.velocity[i] += self.next_accel[i].scale(dt);
            self.accel[i] = self.next_accel[i];
            if !self.position[i].is_finite() {
                non_finite += 1;
            }
        }

        if non_finite > 0 {
            tracing::warn!(
                non_finite,
                point_mass = ?self.point_mass,
                spring_constant = ?self.spring_constant,
                "cloth state is no longer finite"
            );
        }
        tracing::trace!(dt = ?dt, obstacles = obstacles.len(), "cloth stepped");
        observer.on_step_complete();
    }

    /// Put every node back in the construction layout, at rest.
    ///
    /// Rest lengths, parameters, pins and obstacles are kept.
    pub fn reset(&mut self) {
        self.position.copy_from_slice(&self.init_position);
        self.prev_position.copy_from_slice(&self.init_position);
        self.velocity.fill(Vec3::zero());
        self.accel.fill(Vec3::zero());
        tracing::debug!(width = self.width, height = self.height, "cloth reset");
    }

    // ----------------------------------------------------------------------
    // Obstacles
    // ----------------------------------------------------------------------

    /// Append an obstacle. The grid keeps only a weak handle; the caller
    /// owns it and may move it between steps.
    pub fn add_obstacle<O: Obstacle<F> + 'static>(&mut self, obstacle: &Rc<RefCell<O>>) {
        let shared: SharedObstacle<F> = obstacle.clone();
        self.add_shared_obstacle(&shared);
    }

    /// Append an already type-erased obstacle handle.
    pub fn add_shared_obstacle(&mut self, obstacle: &SharedObstacle<F>) {
        self.obstacles.push(Rc::downgrade(obstacle));
    }

    /// Attached obstacles whose owner still holds them.
    pub fn obstacle_count(&self) -> usize {
        self.obstacles.iter().filter(|o| o.strong_count() > 0).count()
    }

    // ----------------------------------------------------------------------
    // Pinning
    // ----------------------------------------------------------------------

    /// Hold node `(x, y)` fixed at its current position.
    pub fn pin(&mut self, x: usize, y: usize) -> Result<(), ClothError> {
        let i = self.checked_index(x, y)?;
        self.pinned[i] = true;
        self.prev_position[i] = self.position[i];
        self.velocity[i] = Vec3::zero();
        self.accel[i] = Vec3::zero();
        Ok(())
    }

    pub fn unpin(&mut self, x: usize, y: usize) -> Result<(), ClothError> {
        let i = self.checked_index(x, y)?;
        self.pinned[i] = false;
        Ok(())
    }

    /// `false` for out-of-range coordinates.
    pub fn is_pinned(&self, x: usize, y: usize) -> bool {
        self.checked_index(x, y).map_or(false, |i| self.pinned[i])
    }

    /// Teleport node `(x, y)` to `pos` at rest. Rest lengths are unaffected,
    /// so this is how a stretched configuration is set up.
    pub fn place_node(&mut self, x: usize, y: usize, pos: Vec3<F>) -> Result<(), ClothError> {
        let i = self.checked_index(x, y)?;
        self.position[i] = pos;
        self.prev_position[i] = pos;
        self.velocity[i] = Vec3::zero();
        self.accel[i] = Vec3::zero();
        Ok(())
    }

    // ----------------------------------------------------------------------
    // Parameters
    // ----------------------------------------------------------------------

    pub fn point_mass(&self) -> F {
        self.point_mass
    }

    /// Change the per-node mass. Zero and non-finite masses are rejected.
    pub fn set_point_mass(&mut self, point_mass: F) -> Result<(), ClothError> {
        validate_mass(point_mass)?;
        self.point_mass = point_mass;
        Ok(())
    }

    pub fn sub_steps(&self) -> usize {
        self.sub_steps
    }

    pub fn set_sub_steps(&mut self, sub_steps: usize) {
        self.sub_steps = sub_steps.max(1);
    }

    // ----------------------------------------------------------------------
    // Read surface
    // ----------------------------------------------------------------------

    /// Current node positions in `x + y * width` order.
    pub fn positions(&self) -> &[Vec3<F>] { &self.position }
    pub fn prev_positions(&self) -> &[Vec3<F>] { &self.prev_position }
    pub fn init_positions(&self) -> &[Vec3<F>] { &self.init_position }
    pub fn velocities(&self) -> &[Vec3<F>] { &self.velocity }
    /// Acceleration computed by the last step (diagnostics only).
    pub fn accelerations(&self) -> &[Vec3<F>] { &self.accel }

    pub fn position_at(&self, x: usize, y: usize) -> Result<Vec3<F>, ClothError> {
        Ok(self.position[self.checked_index(x, y)?])
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn node_count(&self) -> usize { self.position.len() }
}

fn validate_mass<F: Float>(point_mass: F) -> Result<(), ClothError> {
    if point_mass == F::zero() || !point_mass.is_finite() {
        return Err(ClothError::InvalidMass);
    }
    Ok(())
}

fn layout_position<F: Float>(width: usize, height: usize, x: usize, y: usize) -> Vec3<F> {
    let dx = x as isize - (width / 2) as isize;
    let dy = y as isize - (height / 2) as isize;
    Vec3::new(F::from_isize(dx) * F::half(), F::from_isize(dy) * F::half(), F::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_config() -> ClothConfig<f64> {
        ClothConfig::new()
            .with_point_mass(1.0)
            .with_gravity_constant(0.0)
            .with_spring_constant(10.0)
            .with_air_resistance(0.0)
    }

    #[test]
    fn arrays_sized_to_grid() {
        let grid: ClothGrid<f32> = ClothGrid::new(4, 3, 0.1).unwrap();
        assert_eq!(grid.node_count(), 12);
        assert_eq!(grid.velocities().len(), 12);
        assert_eq!(grid.accelerations().len(), 12);
        assert_eq!(grid.init_positions().len(), 12);
    }

    #[test]
    fn layout_uses_integer_halving() {
        let grid: ClothGrid<f64> = ClothGrid::new(5, 4, 0.1).unwrap();
        // width/2 = 2, height/2 = 2
        assert_eq!(grid.position_at(0, 0).unwrap(), Vec3::new(-1.0, -1.0, 0.0));
        assert_eq!(grid.position_at(4, 3).unwrap(), Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(grid.position_at(2, 2).unwrap(), Vec3::zero());
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            ClothGrid::<f32>::new(0, 3, 0.1).err(),
            Some(ClothError::InvalidGridDimensions { width: 0, height: 3 })
        );
        assert!(ClothGrid::<f32>::new(3, 0, 0.1).is_err());
    }

    #[test]
    fn overflowing_dimensions_rejected() {
        assert_eq!(
            ClothGrid::<f32>::new(usize::MAX, 2, 0.1).err(),
            Some(ClothError::InvalidGridDimensions { width: usize::MAX, height: 2 })
        );
    }

    #[test]
    fn spring_at_rest_is_zero() {
        let grid = ClothGrid::with_config(3, 3, &still_config()).unwrap();
        assert_eq!(grid.spring_force((1, 1), (2, 2)).unwrap().length(), 0.0);
    }

    #[test]
    fn stretched_spring_pulls_toward_neighbor() {
        let mut grid = ClothGrid::with_config(2, 1, &still_config()).unwrap();
        // nodes at x = -0.5 and x = 0.0, rest 0.5
        grid.place_node(1, 0, Vec3::new(0.5, 0.0, 0.0)).unwrap();
        let f = grid.spring_force((0, 0), (1, 0)).unwrap();
        assert!((f.x - 5.0).abs() < 1e-12, "f = {:?}", f);
        assert_eq!(f.y, 0.0);
        let back = grid.spring_force((1, 0), (0, 0)).unwrap();
        assert!((back.x + 5.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_nodes_give_zero_force() {
        let mut grid = ClothGrid::with_config(2, 1, &still_config()).unwrap();
        grid.place_node(1, 0, Vec3::new(-0.5, 0.0, 0.0)).unwrap();
        let f = grid.spring_force((0, 0), (1, 0)).unwrap();
        assert_eq!(f, Vec3::zero());
    }

    #[test]
    fn spring_force_bounds_checked() {
        let grid: ClothGrid<f32> = ClothGrid::new(2, 2, 0.1).unwrap();
        assert_eq!(
            grid.spring_force((0, 0), (2, 0)).err(),
            Some(ClothError::NodeOutOfBounds { x: 2, y: 0, width: 2, height: 2 })
        );
    }

    #[test]
    fn stencil_skips_missing_neighbors() {
        let grid: ClothGrid<f32> = ClothGrid::new(3, 3, 0.1).unwrap();
        let count = |x, y| STENCIL.iter().filter(|(dx, dy)| grid.neighbor(x, y, *dx, *dy).is_some()).count();
        assert_eq!(count(0, 0), 3);
        assert_eq!(count(1, 0), 5);
        assert_eq!(count(1, 1), 8);
    }

    #[test]
    fn corner_pinning() {
        let config: ClothConfig<f32> = ClothConfig::new().with_pinning(Pinning::Corners);
        let grid = ClothGrid::with_config(3, 4, &config).unwrap();
        assert!(grid.is_pinned(0, 0));
        assert!(grid.is_pinned(2, 0));
        assert!(grid.is_pinned(0, 3));
        assert!(grid.is_pinned(2, 3));
        assert!(!grid.is_pinned(1, 1));
        assert!(!grid.is_pinned(7, 7));
    }

    #[test]
    fn mass_mutation_guarded() {
        let mut grid: ClothGrid<f32> = ClothGrid::new(2, 2, 0.1).unwrap();
        assert_eq!(grid.set_point_mass(0.0), Err(ClothError::InvalidMass));
        assert_eq!(grid.set_point_mass(f32::NAN), Err(ClothError::InvalidMass));
        assert!((grid.point_mass() - 0.1).abs() < 1e-9);
        grid.set_point_mass(2.0).unwrap();
        assert_eq!(grid.point_mass(), 2.0);
    }
}
