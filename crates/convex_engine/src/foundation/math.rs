//! Math utilities and types
//!
//! Provides the fundamental math types used by the physics core, plus the
//! world placement [`Transform`] that collaborators hand to every hull query.

pub use nalgebra::{
    Vector3,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
///
/// Hulls are always stored in object space; a transform is supplied by the
/// owning rigid body on every query and is never retained by the core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Set the scale factors
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Inverse of [`Self::to_matrix`], built analytically as `S⁻¹ · Rᵀ · T⁻¹`
    ///
    /// A zero scale component produces non-finite entries; scale is expected
    /// to be strictly non-zero on every axis.
    pub fn inverse_matrix(&self) -> Mat4 {
        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        Mat4::new_nonuniform_scaling(&inv_scale)
            * self.rotation.inverse().to_homogeneous()
            * Mat4::new_translation(&-self.position)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Apply this transform to a direction (no translation)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(vector)
    }

    /// Transform a surface normal and renormalize it
    ///
    /// Normals follow the inverse-transpose of the linear part, which for a
    /// TRS transform is `R · S⁻¹`.
    pub fn transform_normal(&self, normal: &Vec3) -> Vec3 {
        let scaled = Vec3::new(
            normal.x / self.scale.x,
            normal.y / self.scale.y,
            normal.z / self.scale.z,
        );
        (self.rotation * scaled).normalize()
    }

    /// Map a world-space point back into object space
    pub fn inverse_transform_point(&self, point: &Vec3) -> Vec3 {
        let local = self.rotation.inverse() * (point - self.position);
        Vec3::new(
            local.x / self.scale.x,
            local.y / self.scale.y,
            local.z / self.scale.z,
        )
    }

    /// Largest absolute scale factor, used to grow object-space radii
    pub fn max_scale(&self) -> f32 {
        self.scale.x.abs().max(self.scale.y.abs()).max(self.scale.z.abs())
    }
}
