/// 3D transformation matrices: translate, rotate, scale and the normal matrix
use nalgebra::{Matrix3, Matrix4, Unit, Vector3};

/// Transform builder for 3D transformations.
///
/// Angles are in degrees. Products compose right to left, so
/// `parent * local` applies `local` first.
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a rotation of `angle_deg` degrees about `axis`.
    ///
    /// The axis does not need to be normalized. A zero axis yields identity.
    pub fn rotation(angle_deg: f32, axis: &Vector3<f32>) -> Matrix4<f32> {
        match Unit::try_new(*axis, f32::EPSILON) {
            Some(axis) => Matrix4::from_axis_angle(&axis, angle_deg.to_radians()),
            None => Matrix4::identity(),
        }
    }

    /// Create a non-uniform scale matrix
    pub fn scale(factors: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(factors)
    }

    /// Rotation about `pivot` instead of the local origin:
    /// `translate(pivot) * rotate(angle, axis) * translate(-pivot)`.
    pub fn rotation_about(angle_deg: f32, axis: &Vector3<f32>, pivot: &Vector3<f32>) -> Matrix4<f32> {
        Self::translation(pivot) * Self::rotation(angle_deg, axis) * Self::translation(&-pivot)
    }

    /// Matrix that keeps normals perpendicular to surfaces under `view * model`.
    ///
    /// Transpose of the inverse of the upper-left 3x3 block. `None` when the
    /// block is singular.
    pub fn normal_matrix(model: &Matrix4<f32>, view: &Matrix4<f32>) -> Option<Matrix3<f32>> {
        let model_view = view * model;
        let linear: Matrix3<f32> = model_view.fixed_view::<3, 3>(0, 0).into_owned();
        linear.try_inverse().map(|inverse| inverse.transpose())
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_zero_rotation_is_identity() {
        let matrix = Transform::rotation(0.0, &Vector3::y());
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_uses_degrees() {
        let quarter = Transform::rotation(90.0, &Vector3::z());
        let p = quarter.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_negated_axis_flips_direction() {
        let a = Transform::rotation(-30.0, &-Vector3::z());
        let b = Transform::rotation(30.0, &Vector3::z());
        assert!((a - b).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_about_keeps_pivot_fixed() {
        let pivot = Vector3::new(0.0, 2.0, 0.0);
        let m = Transform::rotation_about(45.0, &Vector3::z(), &pivot);
        let p = m.transform_point(&Point3::from(pivot));
        assert!((p.coords - pivot).norm() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_of_rigid_motion_is_rotation() {
        let view = Matrix4::identity();
        let model = Transform::translation(&Vector3::new(1.0, 2.0, 3.0))
            * Transform::rotation(30.0, &Vector3::x());
        let normal = Transform::normal_matrix(&model, &view).unwrap();
        let rotation: Matrix3<f32> = model.fixed_view::<3, 3>(0, 0).into_owned();
        assert!((normal - rotation).norm() < 1e-5);
    }

    #[test]
    fn test_normal_matrix_under_non_uniform_scale() {
        let model = Transform::scale(&Vector3::new(2.0, 1.0, 1.0));
        let normal = Transform::normal_matrix(&model, &Matrix4::identity()).unwrap();
        // A 45 degree face normal must be bent towards the unscaled axis.
        let n = (normal * Vector3::new(1.0, 1.0, 0.0)).normalize();
        assert!(n.y > n.x);
    }

    #[test]
    fn test_mvp_applies_model_first() {
        let model = Transform::translation(&Vector3::new(1.0, 0.0, 0.0));
        let view = Transform::rotation(90.0, &Vector3::z());
        let projection = Transform::scale(&Vector3::new(2.0, 2.0, 2.0));
        let mvp = Transform::mvp_matrix(&model, &view, &projection);
        // (0,0,0) -> (1,0,0) -> (0,1,0) -> (0,2,0)
        let p = mvp.transform_point(&Point3::origin());
        assert!((p - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_singular_normal_matrix() {
        let model = Transform::scale(&Vector3::new(0.0, 1.0, 1.0));
        assert!(Transform::normal_matrix(&model, &Matrix4::identity()).is_none());
    }
}
