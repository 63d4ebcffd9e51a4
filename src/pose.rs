use nalgebra::{Isometry3, Translation3, UnitQuaternion};

use crate::element::{parse_floats, Element, ParseValue};
use crate::error::Errors;

/// Rigid transform: translation plus rotation, no scale or shear.
pub type Pose = Isometry3<f64>;

/// Build a pose from `x y z` and extrinsic roll/pitch/yaw in radians.
pub fn pose_from_xyz_rpy(xyz: [f64; 3], rpy: [f64; 3]) -> Pose {
    Isometry3::from_parts(
        Translation3::new(xyz[0], xyz[1], xyz[2]),
        UnitQuaternion::from_euler_angles(rpy[0], rpy[1], rpy[2]),
    )
}

impl ParseValue for Pose {
    fn parse_value(text: &str) -> Option<Self> {
        let [x, y, z, roll, pitch, yaw] = parse_floats::<6>(text)?;
        Some(pose_from_xyz_rpy([x, y, z], [roll, pitch, yaw]))
    }
}

/// Read the optional `<pose relative_to="...">` child of `elem`.
///
/// A missing pose is the identity with an empty relative-to name; an
/// unreadable one is recorded and replaced by the identity.
pub(crate) fn load_pose(elem: &Element, errors: &mut Errors) -> (Pose, String) {
    let Some(pose_elem) = elem.element("pose") else {
        return (Pose::identity(), String::new());
    };
    let pose = match pose_elem.value::<Pose>() {
        Ok(pose) => pose.unwrap_or_else(Pose::identity),
        Err(err) => {
            errors.push(err);
            Pose::identity()
        }
    };
    let relative_to = pose_elem
        .attribute("relative_to")
        .unwrap_or_default()
        .to_owned();
    (pose, relative_to)
}
