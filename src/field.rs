//! SkyStone field landmarks and where the camera sits on the robot.
//!
//! Field frame, standing in the red alliance station looking at the field:
//! +X runs to the right, +Y runs towards the blue alliance station and +Z
//! points up. The origin is the centre of the field floor. Before it is
//! placed, every target image lies at the origin facing up.

use serde::{Deserialize, Serialize};

use crate::{
    transform::{AngleUnit, AxesOrder, AxesReference, Transform, rotation, translation},
    utils::units::inches,
};

pub const MM_PER_INCH: f32 = crate::utils::units::MM_PER_INCH;
pub const FIELD_WIDTH_MM: f32 = 72.0 * MM_PER_INCH;

/// Height of the centre of a perimeter image above the floor.
pub const TARGET_HEIGHT_MM: f32 = 6.0 * MM_PER_INCH;
pub const STONE_Z_MM: f32 = 2.0 * MM_PER_INCH;

pub const BRIDGE_Z_MM: f32 = 6.42 * MM_PER_INCH;
pub const BRIDGE_Y_MM: f32 = 23.0 * MM_PER_INCH;
pub const BRIDGE_X_MM: f32 = 5.18 * MM_PER_INCH;
pub const BRIDGE_ROT_Y_DEG: f32 = 59.0;
pub const BRIDGE_ROT_Z_DEG: f32 = 180.0;

pub const HALF_FIELD_MM: f32 = 72.0 * MM_PER_INCH;
pub const QUAD_FIELD_MM: f32 = 36.0 * MM_PER_INCH;

/// A target image with a fixed location on the field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Landmark {
    pub name: &'static str,
    pub location: Transform,
}

fn placed(x: f32, y: f32, z: f32, rx: f32, ry: f32, rz: f32) -> Transform {
    translation(x, y, z)
        * rotation(
            AxesReference::Extrinsic,
            AxesOrder::XYZ,
            AngleUnit::Degrees,
            rx,
            ry,
            rz,
        )
}

/// The thirteen SkyStone targets, in the order the tracker reports them.
///
/// The stone moves during a match, so it is assumed to sit at the origin,
/// turned to face forward and raised onto the floor.
pub fn skystone_landmarks() -> [Landmark; 13] {
    let (bx, by, bz) = (BRIDGE_X_MM, BRIDGE_Y_MM, BRIDGE_Z_MM);
    let (half, quad, h) = (HALF_FIELD_MM, QUAD_FIELD_MM, TARGET_HEIGHT_MM);
    [
        Landmark {
            name: "Stone Target",
            location: placed(0.0, 0.0, STONE_Z_MM, 90.0, 0.0, -90.0),
        },
        Landmark {
            name: "Blue Rear Bridge",
            location: placed(-bx, by, bz, 0.0, -BRIDGE_ROT_Y_DEG, BRIDGE_ROT_Z_DEG),
        },
        Landmark {
            name: "Red Rear Bridge",
            location: placed(bx, -by, bz, 0.0, BRIDGE_ROT_Y_DEG, 0.0),
        },
        Landmark {
            name: "Red Front Bridge",
            location: placed(-bx, -by, bz, 0.0, -BRIDGE_ROT_Y_DEG, 0.0),
        },
        Landmark {
            name: "Blue Front Bridge",
            location: placed(-bx, by, bz, 0.0, BRIDGE_ROT_Y_DEG, BRIDGE_ROT_Z_DEG),
        },
        Landmark {
            name: "Red Perimeter 1",
            location: placed(quad, -half, h, 90.0, 0.0, 180.0),
        },
        Landmark {
            name: "Red Perimeter 2",
            location: placed(-quad, -half, h, 90.0, 0.0, 180.0),
        },
        Landmark {
            name: "Front Perimeter 1",
            location: placed(-half, -quad, h, 90.0, 0.0, 90.0),
        },
        Landmark {
            name: "Front Perimeter 2",
            location: placed(-half, quad, h, 90.0, 0.0, 90.0),
        },
        Landmark {
            name: "Blue Perimeter 1",
            location: placed(-quad, half, h, 90.0, 0.0, 0.0),
        },
        Landmark {
            name: "Blue Perimeter 2",
            location: placed(quad, half, h, 90.0, 0.0, 0.0),
        },
        Landmark {
            name: "Rear Perimeter 1",
            location: placed(half, quad, h, 90.0, 0.0, -90.0),
        },
        Landmark {
            name: "Rear Perimeter 2",
            location: placed(half, -quad, h, 90.0, 0.0, -90.0),
        },
    ]
}

/// Which side of the phone the camera looks out of. `Front` is the screen side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraDirection {
    Back,
    Front,
}

/// Placement of the camera on the robot.
///
/// The robot frame matches the field frame: forward is +X, left is +Y, up is
/// +Z. The phone starts flat, screen up, with its top pointing to the robot's
/// left, and is turned about its long axis so the chosen camera faces forward.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraMount {
    pub direction: CameraDirection,
    pub portrait: bool,
    pub forward_in: f32,
    pub left_in: f32,
    pub vertical_in: f32,
}

impl Default for CameraMount {
    fn default() -> Self {
        Self {
            direction: CameraDirection::Back,
            portrait: false,
            forward_in: 4.0,
            left_in: 0.0,
            vertical_in: 8.0,
        }
    }
}

impl CameraMount {
    pub fn robot_from_camera(&self) -> Transform {
        let y_rotate = match self.direction {
            CameraDirection::Back => -90.0,
            CameraDirection::Front => 90.0,
        };
        let x_rotate = if self.portrait { 90.0 } else { 0.0 };
        let z_rotate = 0.0;
        translation(
            inches(self.forward_in),
            inches(self.left_in),
            inches(self.vertical_in),
        ) * rotation(
            AxesReference::Extrinsic,
            AxesOrder::YZX,
            AngleUnit::Degrees,
            y_rotate,
            z_rotate,
            x_rotate,
        )
    }
}
