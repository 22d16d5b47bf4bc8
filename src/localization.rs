//! Last known robot location from the first visible field target.

use alloc::string::{String, ToString};
use core::fmt;

use num_traits::Float;

use crate::{
    telemetry::Telemetry,
    transform::{AngleUnit, Transform, orientation},
    utils::units::mm_to_inches,
    vision::Trackable,
};

/// The most recent location fix and how many scans ago it was refreshed.
#[derive(Clone, Debug, PartialEq)]
pub enum Fix {
    NoFix,
    HasFix {
        location: Transform,
        source: String,
        age: u32,
    },
}

/// A fix converted to display units: inches and degrees.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationReport {
    pub x_in: f32,
    pub y_in: f32,
    pub z_in: f32,
    pub roll: f32,
    pub pitch: f32,
    pub heading: f32,
    pub age: u32,
    pub source: String,
}

impl LocationReport {
    pub fn new(location: &Transform, source: &str, age: u32) -> Self {
        let t = location.translation.vector;
        let o = orientation(location, AngleUnit::Degrees);
        Self {
            x_in: mm_to_inches(t.x),
            y_in: mm_to_inches(t.y),
            z_in: mm_to_inches(t.z),
            roll: o.roll,
            pitch: o.pitch,
            heading: o.heading,
            age,
            source: source.to_string(),
        }
    }
}

struct Position<'a>(&'a LocationReport);

impl fmt::Display for Position<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X {:6.1}  Y {:6.1}  Z {:6.1}",
            self.0.x_in, self.0.y_in, self.0.z_in
        )
    }
}

struct Rotation<'a>(&'a LocationReport);

/// Rounds for display so a tiny negative angle never prints as `-0`.
fn whole(degrees: f32) -> f32 {
    degrees.round() + 0.0
}

impl fmt::Display for Rotation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Roll {:6.0}°, Pitch {:6.0}°, Heading {:6.0}°",
            whole(self.0.roll),
            whole(self.0.pitch),
            whole(self.0.heading)
        )
    }
}

pub struct Localizer {
    fix: Fix,
    visible: Option<String>,
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer {
    pub fn new() -> Self {
        Self {
            fix: Fix::NoFix,
            visible: None,
        }
    }

    pub fn fix(&self) -> &Fix {
        &self.fix
    }

    /// Name of the target that won this cycle's scan.
    pub fn visible_target(&self) -> Option<&str> {
        self.visible.as_deref()
    }

    /// Checks targets in order and takes the first visible one. A fresh
    /// location from it replaces the fix; otherwise the fix ages by one scan.
    pub fn scan<T: Trackable>(&mut self, targets: &mut [T]) {
        self.visible = None;
        let mut updated = None;
        if let Some(target) = targets.iter_mut().find(|t| t.is_visible()) {
            self.visible = Some(target.name().to_string());
            updated = target
                .updated_robot_location()
                .map(|location| (location, target.name().to_string()));
        }

        match (updated, &mut self.fix) {
            (Some((location, source)), fix) => {
                log::debug!("localization: fix from {source}");
                *fix = Fix::HasFix {
                    location,
                    source,
                    age: 0,
                };
            }
            (None, Fix::HasFix { age, .. }) => *age = age.saturating_add(1),
            (None, Fix::NoFix) => {}
        }
    }

    pub fn report(&self) -> Option<LocationReport> {
        match &self.fix {
            Fix::HasFix {
                location,
                source,
                age,
            } => Some(LocationReport::new(location, source, *age)),
            Fix::NoFix => None,
        }
    }

    /// Adds this cycle's location lines. The caller publishes with `update`.
    pub fn publish(&self, telemetry: &mut dyn Telemetry) {
        if let Some(name) = &self.visible {
            telemetry.add_data("Visible Target", name);
        }
        match self.report() {
            Some(report) => {
                telemetry.add_data("Pos (in)", &Position(&report));
                telemetry.add_data("Rotation", &Rotation(&report));
                telemetry.add_data(
                    "Fix age",
                    &format_args!("{} cycles ({})", report.age, report.source),
                );
            }
            None => telemetry.add_data("I see target", &"nothing."),
        }
    }
}
