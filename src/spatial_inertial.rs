use nalgebra::{Matrix3, Matrix6, Vector3};

use crate::element::Element;
use crate::error::Errors;
use crate::pose::{load_pose, Pose};
use crate::utils::get_or_record;

/// Adjoint of a rigid transform acting on `(angular, linear)` twists.
pub(crate) fn adjoint(pose: &Pose) -> Matrix6<f64> {
    let r = pose.rotation.to_rotation_matrix().into_inner();
    let p = pose.translation.vector.cross_matrix();
    let mut adj = Matrix6::zeros();
    adj.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    adj.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
    adj.fixed_view_mut::<3, 3>(3, 0).copy_from(&(p * r));
    adj
}

/// Spatial inertia in the link frame, given the inertia tensor and mass
/// expressed in `inertia_frame` (the inertia frame's pose in the link).
pub(crate) fn to_local_spatial_inertial(
    inertia_frame: &Pose,
    inertia: &Matrix3<f64>,
    mass: f64,
) -> Matrix6<f64> {
    let mut i_b = Matrix6::from_diagonal_element(mass);
    i_b.fixed_view_mut::<3, 3>(0, 0).copy_from(inertia);
    let adj_b_t_a = adjoint(&inertia_frame.inverse());
    adj_b_t_a.transpose() * i_b * adj_b_t_a
}

/// Mass properties of a link.
#[derive(Debug, Clone, PartialEq)]
pub struct Inertial {
    pub mass: f64,
    /// ixx, iyy, izz
    pub diagonal: Vector3<f64>,
    /// ixy, ixz, iyz
    pub off_diagonal: Vector3<f64>,
    /// Pose of the inertia frame in the link frame.
    pub pose: Pose,
}

impl Default for Inertial {
    fn default() -> Self {
        Self {
            mass: 1.0,
            diagonal: Vector3::repeat(1.0),
            off_diagonal: Vector3::zeros(),
            pose: Pose::identity(),
        }
    }
}

impl Inertial {
    /// Read an `<inertial>` element; bad values fall back to defaults.
    pub(crate) fn load(elem: &Element, errors: &mut Errors) -> Self {
        let mut inertial = Self::default();
        inertial.pose = load_pose(elem, errors).0;
        inertial.mass = get_or_record(elem, "mass", 1.0, errors);
        if let Some(inertia) = elem.element("inertia") {
            inertial.diagonal = Vector3::new(
                get_or_record(&inertia, "ixx", 1.0, errors),
                get_or_record(&inertia, "iyy", 1.0, errors),
                get_or_record(&inertia, "izz", 1.0, errors),
            );
            inertial.off_diagonal = Vector3::new(
                get_or_record(&inertia, "ixy", 0.0, errors),
                get_or_record(&inertia, "ixz", 0.0, errors),
                get_or_record(&inertia, "iyz", 0.0, errors),
            );
        }
        inertial
    }

    pub fn inertia_matrix(&self) -> Matrix3<f64> {
        let d = &self.diagonal;
        let o = &self.off_diagonal;
        Matrix3::new(d.x, o.x, o.y, o.x, d.y, o.z, o.y, o.z, d.z)
    }

    /// Eigenvalues of the inertia tensor, ascending.
    pub fn principal_moments(&self) -> Vector3<f64> {
        let mut moments = self.inertia_matrix().symmetric_eigenvalues();
        moments.as_mut_slice().sort_by(f64::total_cmp);
        moments
    }

    /// Positive mass, positive principal moments obeying the triangle
    /// inequality.
    pub fn is_valid(&self) -> bool {
        const TOLERANCE: f64 = 1e-6;
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return false;
        }
        let m = self.principal_moments();
        let slack = TOLERANCE * m.max().abs().max(1.0);
        m.iter().all(|v| v.is_finite() && *v > 0.0)
            && m[0] + m[1] + slack >= m[2]
            && m[1] + m[2] + slack >= m[0]
            && m[2] + m[0] + slack >= m[1]
    }

    /// 6x6 spatial inertia about the link origin, angular part first.
    pub fn spatial_inertia(&self) -> Matrix6<f64> {
        to_local_spatial_inertial(&self.pose, &self.inertia_matrix(), self.mass)
    }
}

#[cfg(test)]
mod tests {
    use roxmltree::Document;

    use super::*;
    use crate::pose::pose_from_xyz_rpy;

    #[test]
    fn to_local_spatial_inertial_test() {
        let inertia_frame = pose_from_xyz_rpy([1., 0., 0.], [0.; 3]);
        let inertia = Matrix3::from_diagonal_element(4.);
        let mass = 5.0;
        let spatial = to_local_spatial_inertial(&inertia_frame, &inertia, mass);
        // parallel axis theorem on the rotational block
        let rotational = spatial.fixed_view::<3, 3>(0, 0).into_owned();
        let expected = Matrix3::from_diagonal(&Vector3::new(4.0, 9.0, 9.0));
        assert!((rotational - expected).abs().max() < 1e-12);
        let linear = spatial.fixed_view::<3, 3>(3, 3).into_owned();
        assert!((linear - Matrix3::from_diagonal_element(5.0)).abs().max() < 1e-12);
        assert!((spatial - spatial.transpose()).abs().max() < 1e-12);
    }

    #[test]
    fn centred_inertial_is_block_diagonal() {
        let inertial = Inertial::default();
        assert!(inertial.is_valid());
        assert_eq!(inertial.spatial_inertia(), Matrix6::identity());
    }

    #[test]
    fn validity_rules() {
        let mut inertial = Inertial::default();
        inertial.mass = 0.0;
        assert!(!inertial.is_valid());

        let mut inertial = Inertial::default();
        inertial.diagonal = Vector3::new(1.0, 1.0, 3.0);
        assert!(!inertial.is_valid(), "triangle inequality");

        let mut inertial = Inertial::default();
        inertial.diagonal = Vector3::new(-1.0, 1.0, 1.0);
        assert!(!inertial.is_valid());
    }

    #[test]
    fn load_inertial() {
        let doc = Document::parse(
            r#"<inertial>
                <mass>2.5</mass>
                <pose>0 0 0.5 0 0 0</pose>
                <inertia><ixx>2</ixx><iyy>3</iyy><izz>4</izz><ixy>0.1</ixy></inertia>
            </inertial>"#,
        )
        .unwrap();
        let mut errors = Errors::new();
        let inertial = Inertial::load(&Element::from(doc.root_element()), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(inertial.mass, 2.5);
        assert_eq!(inertial.diagonal, Vector3::new(2.0, 3.0, 4.0));
        assert_eq!(inertial.off_diagonal, Vector3::new(0.1, 0.0, 0.0));
        assert_eq!(inertial.inertia_matrix()[(1, 0)], 0.1);
        assert!((inertial.pose.translation.vector.z - 0.5).abs() < 1e-12);
        assert!(inertial.is_valid());
    }
}
