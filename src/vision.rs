//! Target tracking on top of a host-provided detector.
//!
//! The detector only reports where a target image sits relative to the
//! camera. Knowing where the image is on the field and where the camera is on
//! the robot, each listener back-solves the robot's field location:
//!
//! `field_from_robot = field_from_target * camera_from_target⁻¹ * robot_from_camera⁻¹`

use alloc::vec::Vec;

use crate::{
    field::{CameraMount, Landmark},
    transform::Transform,
};

/// A recognised image with a fixed location on the field.
pub trait Trackable {
    fn name(&self) -> &str;
    /// Whether the target was seen in the most recent frame.
    fn is_visible(&self) -> bool;
    /// The robot location computed from the most recent sighting, or `None`
    /// if nothing new has been seen since the last call.
    fn updated_robot_location(&mut self) -> Option<Transform>;
}

/// Per-frame camera-relative poses of the targets, supplied by the vision
/// backend. `index` follows [`crate::field::skystone_landmarks`] order.
pub trait TargetDetector {
    /// Called once before the targets of a new frame are queried.
    fn begin_frame(&mut self) {}
    fn camera_from_target(&mut self, index: usize) -> Option<Transform>;
}

#[derive(Clone, Debug)]
pub struct TrackableListener {
    landmark: Landmark,
    camera_from_robot: Transform,
    visible: bool,
    pending: Option<Transform>,
}

impl TrackableListener {
    pub fn new(landmark: Landmark, robot_from_camera: Transform) -> Self {
        Self {
            landmark,
            camera_from_robot: robot_from_camera.inverse(),
            visible: false,
            pending: None,
        }
    }

    /// Records one frame's detection result for this target.
    pub fn observe(&mut self, camera_from_target: Option<Transform>) {
        self.visible = camera_from_target.is_some();
        if let Some(pose) = camera_from_target {
            let field_from_camera = self.landmark.location * pose.inverse();
            self.pending = Some(field_from_camera * self.camera_from_robot);
        }
    }
}

impl Trackable for TrackableListener {
    fn name(&self) -> &str {
        self.landmark.name
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn updated_robot_location(&mut self) -> Option<Transform> {
        if !self.visible {
            self.pending = None;
            return None;
        }
        self.pending.take()
    }
}

/// The ordered set of field targets. Tracking starts inactive.
pub struct Targets {
    listeners: Vec<TrackableListener>,
    active: bool,
}

impl Targets {
    pub fn new(landmarks: &[Landmark], mount: &CameraMount) -> Self {
        let robot_from_camera = mount.robot_from_camera();
        let listeners = landmarks
            .iter()
            .map(|l| TrackableListener::new(*l, robot_from_camera))
            .collect();
        Self {
            listeners,
            active: false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        for l in self.listeners.iter_mut() {
            l.observe(None);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feeds one camera frame to every listener. Does nothing while inactive.
    pub fn process_frame(&mut self, detector: &mut dyn TargetDetector) {
        if !self.active {
            return;
        }
        detector.begin_frame();
        for (i, l) in self.listeners.iter_mut().enumerate() {
            l.observe(detector.camera_from_target(i));
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn listeners(&self) -> &[TrackableListener] {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut [TrackableListener] {
        &mut self.listeners
    }
}
