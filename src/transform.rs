//! Rigid transforms for field localization.
//!
//! Every location is an [`Isometry3`] whose translation is in millimetres.
//! Composition reads right to left: `a_from_c = a_from_b * b_from_c`.

use nalgebra::{Isometry3, Translation3, Unit, UnitQuaternion, Vector3};

pub type Transform = Isometry3<f32>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AxesReference {
    /// Rotations about the fixed frame's axes.
    Extrinsic,
    /// Rotations about the axes of the frame being rotated.
    Intrinsic,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AxesOrder {
    XYZ,
    XZY,
    YXZ,
    YZX,
    ZXY,
    ZYX,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl AxesOrder {
    fn axes(self) -> [Axis; 3] {
        match self {
            AxesOrder::XYZ => [Axis::X, Axis::Y, Axis::Z],
            AxesOrder::XZY => [Axis::X, Axis::Z, Axis::Y],
            AxesOrder::YXZ => [Axis::Y, Axis::X, Axis::Z],
            AxesOrder::YZX => [Axis::Y, Axis::Z, Axis::X],
            AxesOrder::ZXY => [Axis::Z, Axis::X, Axis::Y],
            AxesOrder::ZYX => [Axis::Z, Axis::Y, Axis::X],
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AngleUnit {
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn to_radians(self, angle: f32) -> f32 {
        match self {
            AngleUnit::Degrees => angle.to_radians(),
            AngleUnit::Radians => angle,
        }
    }
    pub fn from_radians(self, radians: f32) -> f32 {
        match self {
            AngleUnit::Degrees => radians.to_degrees(),
            AngleUnit::Radians => radians,
        }
    }
}

/// Extrinsic XYZ angles of a rotation: roll about X, then pitch about Y, then
/// heading about Z, all about the fixed field axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orientation {
    pub unit: AngleUnit,
    pub roll: f32,
    pub pitch: f32,
    pub heading: f32,
}

pub fn translation(x: f32, y: f32, z: f32) -> Transform {
    Isometry3::translation(x, y, z)
}

fn axis_rotation(axis: Axis, radians: f32) -> UnitQuaternion<f32> {
    let axis: Unit<Vector3<f32>> = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };
    UnitQuaternion::from_axis_angle(&axis, radians)
}

/// Builds a pure rotation from three angles applied in `order`.
///
/// Extrinsic `XYZ` with angles `(a, b, c)` is `Rz(c) * Ry(b) * Rx(a)`; the
/// intrinsic form of the same order is `Rx(a) * Ry(b) * Rz(c)`.
pub fn rotation(
    reference: AxesReference,
    order: AxesOrder,
    unit: AngleUnit,
    first: f32,
    second: f32,
    third: f32,
) -> Transform {
    let [a1, a2, a3] = order.axes();
    let r1 = axis_rotation(a1, unit.to_radians(first));
    let r2 = axis_rotation(a2, unit.to_radians(second));
    let r3 = axis_rotation(a3, unit.to_radians(third));
    let q = match reference {
        AxesReference::Extrinsic => r3 * r2 * r1,
        AxesReference::Intrinsic => r1 * r2 * r3,
    };
    Isometry3::from_parts(Translation3::identity(), q)
}

/// Decomposes the rotation part of `transform` into extrinsic XYZ angles.
pub fn orientation(transform: &Transform, unit: AngleUnit) -> Orientation {
    let (roll, pitch, yaw) = transform.rotation.euler_angles();
    Orientation {
        unit,
        roll: unit.from_radians(roll),
        pitch: unit.from_radians(pitch),
        heading: unit.from_radians(yaw),
    }
}
