//! Viewer state: the loaded bodies plus the chosen center and focus
//!
//! Center and focus are indices into the body list, which the context owns.

use crate::celestial::{update_relative_trajectories, Body, State};
use crate::{Result, UnisimError};
use log::info;
use nalgebra::Vector3;

/// Camera distance before any body with a size has been focused
pub const DEFAULT_CAMERA_DISTANCE: f64 = 100.0;

/// Identifier centered and focused on startup when it is loaded (the Sun)
pub const DEFAULT_CENTER_ID: &str = "10";

/// What the presentation layer needs to know about one body at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct BodySnapshot {
    pub id: String,
    pub name: String,
    /// Interpolated barycentric state
    pub state: State,
    /// Interpolated state relative to the center body
    pub relative: State,
    /// Whether the body is drawn as a sphere
    pub drawn: bool,
}

/// All bodies at one instant, plus the camera anchors
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub bodies: Vec<BodySnapshot>,
    /// Position the camera looks at (the focus body)
    pub look_at: Option<Vector3<f64>>,
    /// Position of the center body, added to relative trajectory lines
    pub trajectory_offset: Option<Vector3<f64>>,
}

/// Application context
#[derive(Debug, Clone)]
pub struct App {
    bodies: Vec<Body>,
    center: Option<usize>,
    focus: Option<usize>,
    camera_distance: f64,
}

impl App {
    /// Create a context, centering and focusing [`DEFAULT_CENTER_ID`] if present
    pub fn new(bodies: Vec<Body>) -> Self {
        let mut app = Self {
            bodies,
            center: None,
            focus: None,
            camera_distance: DEFAULT_CAMERA_DISTANCE,
        };
        if let Some(index) = app.index_of(DEFAULT_CENTER_ID) {
            app.apply_center(index);
            app.apply_focus(index);
        }
        app
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Position of the body with identifier `id`
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.id == id)
    }

    pub fn center(&self) -> Option<&Body> {
        self.center.and_then(|i| self.bodies.get(i))
    }

    pub fn focus(&self) -> Option<&Body> {
        self.focus.and_then(|i| self.bodies.get(i))
    }

    pub fn camera_distance(&self) -> f64 {
        self.camera_distance
    }

    /// Make `bodies[index]` the center and recompute relative trajectories
    pub fn set_center(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.apply_center(index);
        Ok(())
    }

    /// Make `bodies[index]` the focus, moving the camera close to it if it has a size
    pub fn set_focus(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.apply_focus(index);
        Ok(())
    }

    /// Center and focus bodies by identifier
    ///
    /// The focus follows the center unless given separately. Identifiers left
    /// out keep the current choice.
    pub fn select(&mut self, center: Option<&str>, focus: Option<&str>) -> Result<()> {
        if let Some(id) = center {
            let index = self.require(id)?;
            self.set_center(index)?;
        }
        if let Some(id) = focus.or(center) {
            let index = self.require(id)?;
            self.set_focus(index)?;
        }
        Ok(())
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.index_of(id)
            .ok_or_else(|| UnisimError::NotFound(format!("Body {} is not loaded", id)))
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.bodies.len() {
            Ok(())
        } else {
            Err(UnisimError::NotFound(format!(
                "No body at index {} ({} loaded)",
                index,
                self.bodies.len()
            )))
        }
    }

    fn apply_center(&mut self, index: usize) {
        self.center = Some(index);
        update_relative_trajectories(&mut self.bodies, index);
        info!("center {}", self.bodies[index].name);
    }

    fn apply_focus(&mut self, index: usize) {
        self.focus = Some(index);
        let body = &self.bodies[index];
        if body.has_size() {
            self.camera_distance = body.radius.x * 5.0;
        }
        info!("focus {}", body.name);
    }

    /// Sample every body `view_secs` seconds after the start of the trajectories
    pub fn frame(&self, view_secs: f64) -> Frame {
        let bodies = self
            .bodies
            .iter()
            .map(|body| BodySnapshot {
                id: body.id.clone(),
                name: body.name.clone(),
                state: body.state_at(view_secs),
                relative: body.relative_state_at(view_secs),
                drawn: body.has_size(),
            })
            .collect();

        Frame {
            bodies,
            look_at: self.focus().map(|b| b.state_at(view_secs).position()),
            trajectory_offset: self.center().map(|b| b.state_at(view_secs).position()),
        }
    }

    /// Line segments along every relative trajectory, one per `stride` samples
    pub fn trajectory_segments(&self, stride: usize) -> Vec<[Vector3<f64>; 2]> {
        let stride = stride.max(1);
        let mut segments = Vec::new();
        for body in &self.bodies {
            let n = body.relative.len();
            let mut i = 0;
            while i + stride < n {
                segments.push([
                    body.relative[i].position(),
                    body.relative[i + stride].position(),
                ]);
                i += stride;
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(offset: f64, n: usize) -> Vec<State> {
        (0..n)
            .map(|i| {
                let v = offset + i as f64;
                State::new(i as f64, [v, 0.0, 0.0], [1.0, 0.0, 0.0])
            })
            .collect()
    }

    fn bodies() -> Vec<Body> {
        vec![
            Body::new("399", "Earth", "", 3.986e14, Vector3::new(6.4e6, 6.4e6, 6.3e6))
                .with_trajectory(line(100.0, 21)),
            Body::new("10", "Sun", "", 1.327e20, Vector3::new(7.0e8, 7.0e8, 7.0e8))
                .with_trajectory(line(10.0, 21)),
            Body::new("3", "Earth-Moon Barycenter", "", 0.0, Vector3::new(-1.0, -1.0, -1.0))
                .with_trajectory(line(99.0, 21)),
        ]
    }

    #[test]
    fn test_defaults_to_sun() {
        let app = App::new(bodies());

        assert_eq!(app.center().unwrap().id, "10");
        assert_eq!(app.focus().unwrap().id, "10");
        assert_relative_eq!(app.camera_distance(), 3.5e9);
        assert_relative_eq!(app.bodies()[0].relative[0].x, 90.0);
    }

    #[test]
    fn test_without_sun() {
        let mut list = bodies();
        list.remove(1);
        let app = App::new(list);

        assert!(app.center().is_none());
        assert!(app.focus().is_none());
        assert_eq!(app.camera_distance(), DEFAULT_CAMERA_DISTANCE);
        assert!(app.bodies()[0].relative.is_empty());
    }

    #[test]
    fn test_select_without_sun_keeps_defaults() {
        let mut list = bodies();
        list.remove(1);
        let mut app = App::new(list);

        app.select(None, None).unwrap();
        assert!(app.center().is_none());
        assert!(app.focus().is_none());
        assert!(matches!(
            app.select(Some("10"), None),
            Err(UnisimError::NotFound(_))
        ));
    }

    #[test]
    fn test_select_focus_follows_center() {
        let mut app = App::new(bodies());

        app.select(Some("399"), None).unwrap();
        assert_eq!(app.center().unwrap().id, "399");
        assert_eq!(app.focus().unwrap().id, "399");

        app.select(None, Some("3")).unwrap();
        assert_eq!(app.center().unwrap().id, "399");
        assert_eq!(app.focus().unwrap().id, "3");
    }

    #[test]
    fn test_set_center_recomputes() {
        let mut app = App::new(bodies());
        app.set_center(0).unwrap();

        assert_eq!(app.center().unwrap().id, "399");
        assert_relative_eq!(app.bodies()[1].relative[5].x, -90.0);
        assert_relative_eq!(app.bodies()[0].relative[5].x, 0.0);
        assert!(app.set_center(3).is_err());
    }

    #[test]
    fn test_focus_on_barycenter_keeps_distance() {
        let mut app = App::new(bodies());
        app.set_focus(2).unwrap();

        assert_eq!(app.focus().unwrap().id, "3");
        assert_relative_eq!(app.camera_distance(), 3.5e9);

        app.set_focus(0).unwrap();
        assert_relative_eq!(app.camera_distance(), 3.2e7);
    }

    #[test]
    fn test_frame() {
        let mut app = App::new(bodies());
        app.set_focus(0).unwrap();
        let frame = app.frame(90.0);

        assert_eq!(frame.bodies.len(), 3);
        assert_relative_eq!(frame.bodies[0].state.x, 101.5);
        assert_relative_eq!(frame.bodies[0].relative.x, 90.0);
        assert!(!frame.bodies[2].drawn);
        assert_relative_eq!(frame.look_at.unwrap().x, 101.5);
        assert_relative_eq!(frame.trajectory_offset.unwrap().x, 11.5);
    }

    #[test]
    fn test_trajectory_segments() {
        let app = App::new(bodies());
        let segments = app.trajectory_segments(10);

        // 21 samples give segments 0-10 and 10-20 per body
        assert_eq!(segments.len(), 6);
        assert_relative_eq!(segments[1][0].x, 90.0);
        assert_eq!(segments[1][1], segments[1][0]);
        assert!(App::new(Vec::new()).trajectory_segments(10).is_empty());
    }
}
