//! Celestial body definitions and trajectory sampling

pub mod names;

use crate::constants::STEP_S;
use nalgebra::Vector3;
use std::ops::Sub;

/// Position and velocity of a body at one instant
///
/// Positions are in meters and velocities in meters per second, already
/// converted to the viewer's axis convention (see [`crate::data::records`]).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    /// TDB Julian date of the sample
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl State {
    /// Create a new state
    pub fn new(time: f64, position: [f64; 3], velocity: [f64; 3]) -> Self {
        Self {
            time,
            x: position[0],
            y: position[1],
            z: position[2],
            vx: velocity[0],
            vy: velocity[1],
            vz: velocity[2],
        }
    }

    /// Position vector in meters
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Velocity vector in meters per second
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.vx, self.vy, self.vz)
    }

    /// Linear interpolation towards `other`, each component independently
    pub fn lerp(&self, other: &State, t: f64) -> State {
        let mix = |a: f64, b: f64| a + t * (b - a);
        State {
            time: mix(self.time, other.time),
            x: mix(self.x, other.x),
            y: mix(self.y, other.y),
            z: mix(self.z, other.z),
            vx: mix(self.vx, other.vx),
            vy: mix(self.vy, other.vy),
            vz: mix(self.vz, other.vz),
        }
    }
}

// Subtraction acts on the kinematic components; the time of the left operand is kept.
impl Sub for State {
    type Output = State;

    fn sub(self, rhs: State) -> State {
        State {
            time: self.time,
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
            vx: self.vx - rhs.vx,
            vy: self.vy - rhs.vy,
            vz: self.vz - rhs.vz,
        }
    }
}

/// Metadata category a body is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyCategory {
    /// A massive body with a usable gravitational parameter
    Celestial,
    /// Minor body without a reliable gravitational parameter
    Comet,
    /// A system barycenter, drawn without a sphere
    Barycenter,
}

impl BodyCategory {
    /// Key of this category in the metadata document
    pub fn key(&self) -> &'static str {
        match self {
            BodyCategory::Celestial => "celestial",
            BodyCategory::Comet => "comet",
            BodyCategory::Barycenter => "barycenter",
        }
    }
}

/// Sample a uniformly spaced trajectory at `secs` seconds after its first sample
///
/// Queries before the first sample return it unchanged, queries past the last
/// sample return the last one. Otherwise the bounding pair is found by direct
/// index computation and interpolated linearly.
pub fn sample_trajectory(trajectory: &[State], secs: f64) -> State {
    let (Some(first), Some(last)) = (trajectory.first(), trajectory.last()) else {
        return State::default();
    };

    if secs <= 0.0 {
        return *first;
    }
    let span = (trajectory.len() - 1) as f64 * STEP_S;
    if secs >= span {
        return *last;
    }

    let steps = secs / STEP_S;
    let i = steps.floor() as usize;
    trajectory[i].lerp(&trajectory[i + 1], steps - i as f64)
}

/// Per-index difference `trajectory[i] - reference[i]`
///
/// Both sequences are expected to be index aligned; the result is as long as
/// the shorter of the two.
pub fn relative_trajectory(trajectory: &[State], reference: &[State]) -> Vec<State> {
    trajectory
        .iter()
        .zip(reference.iter())
        .map(|(s, r)| *s - *r)
        .collect()
}

/// A tracked solar system body and its sampled motion
#[derive(Debug, Clone)]
pub struct Body {
    /// Horizons identifier, e.g. `399`
    pub id: String,
    /// Display name
    pub name: String,
    /// Free text header from the Horizons response
    pub desc: String,
    /// Gravitational parameter in m^3/s^2, 0 when unknown
    pub gm: f64,
    /// Tri-axial radius in meters; negative means "not drawn"
    pub radius: Vector3<f64>,
    /// Samples spaced [`STEP_S`] apart in the barycentric frame
    pub trajectory: Vec<State>,
    /// `trajectory` relative to the current center body
    pub relative: Vec<State>,
}

impl Body {
    /// Create a body with an empty trajectory
    pub fn new(id: &str, name: &str, desc: &str, gm: f64, radius: Vector3<f64>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            desc: desc.to_string(),
            gm,
            radius,
            trajectory: Vec::new(),
            relative: Vec::new(),
        }
    }

    /// Builder method to attach a trajectory
    pub fn with_trajectory(mut self, trajectory: Vec<State>) -> Self {
        self.trajectory = trajectory;
        self
    }

    /// Whether the body should be drawn as a sphere
    pub fn has_size(&self) -> bool {
        self.radius.x > 0.0
    }

    /// Interpolated state `secs` seconds after the start of the trajectory
    pub fn state_at(&self, secs: f64) -> State {
        sample_trajectory(&self.trajectory, secs)
    }

    /// Interpolated state relative to the current center body
    pub fn relative_state_at(&self, secs: f64) -> State {
        sample_trajectory(&self.relative, secs)
    }

    /// Recompute the relative trajectory against a reference trajectory
    pub fn update_relative(&mut self, reference: &[State]) {
        self.relative = relative_trajectory(&self.trajectory, reference);
    }
}

/// Recompute every body's relative trajectory against `bodies[center]`
pub fn update_relative_trajectories(bodies: &mut [Body], center: usize) {
    let Some(reference) = bodies.get(center).map(|b| b.trajectory.clone()) else {
        return;
    };
    for body in bodies.iter_mut() {
        body.update_relative(&reference);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform(n: usize) -> Vec<State> {
        (0..n)
            .map(|i| {
                let v = i as f64;
                State::new(v, [v, v, v], [v, v, v])
            })
            .collect()
    }

    #[test]
    fn test_sample_boundaries() {
        let traj = uniform(4);

        assert_eq!(sample_trajectory(&traj, 0.0), traj[0]);
        assert_eq!(sample_trajectory(&traj, -10.0), traj[0]);
        assert_eq!(sample_trajectory(&traj, 3.0 * STEP_S), traj[3]);
        assert_eq!(sample_trajectory(&traj, 1e9), traj[3]);
    }

    #[test]
    fn test_sample_midpoint() {
        let traj = uniform(2);
        let s = sample_trajectory(&traj, 30.0);

        for c in [s.x, s.y, s.z, s.vx, s.vy, s.vz] {
            assert_relative_eq!(c, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sample_inside_later_interval() {
        let traj = uniform(5);
        let s = sample_trajectory(&traj, 2.0 * STEP_S + 15.0);
        assert_relative_eq!(s.x, 2.25, epsilon = 1e-12);
        assert_relative_eq!(s.time, 2.25, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_empty() {
        assert_eq!(sample_trajectory(&[], 10.0), State::default());
    }

    #[test]
    fn test_relative_trajectories() {
        let earth = Body::new("399", "Earth", "", 3.986e14, Vector3::new(6.4e6, 6.4e6, 6.4e6))
            .with_trajectory(vec![
                State::new(0.0, [10.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
                State::new(1.0, [11.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ]);
        let sun = Body::new("10", "Sun", "", 1.327e20, Vector3::new(7e8, 7e8, 7e8))
            .with_trajectory(vec![
                State::new(0.0, [1.0, 0.0, 0.0], [0.0, 0.5, 0.0]),
                State::new(1.0, [1.0, 2.0, 0.0], [0.0, 0.5, 0.0]),
            ]);
        let mut bodies = vec![earth, sun];

        update_relative_trajectories(&mut bodies, 1);

        assert_eq!(bodies[0].relative.len(), 2);
        assert_eq!(bodies[0].relative[1].x, 10.0);
        assert_eq!(bodies[0].relative[1].y, -2.0);
        assert_eq!(bodies[0].relative[0].vy, 0.5);
        assert!(bodies[1].relative.iter().all(|s| s.x == 0.0 && s.y == 0.0));
    }

    #[test]
    fn test_has_size() {
        let bary = Body::new("0", "SSB", "", 0.0, Vector3::new(-1.0, -1.0, -1.0));
        assert!(!bary.has_size());
    }
}
