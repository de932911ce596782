//! Polyhedral mass properties
//!
//! Closed-form volume, center of mass and inertia tensor of a solid bounded
//! by a triangle mesh (Mirtich, "Fast and Accurate Computation of Polyhedral
//! Mass Properties", in the compact form given by Eberly). Ten surface
//! integrals are accumulated per triangle; no volumetric sampling is needed.
//!
//! The mesh must be closed, non-self-intersecting and wound counter-clockwise
//! as seen from outside. This is not validated: a malformed mesh silently
//! produces wrong numbers. Hull faces fan-triangulated by
//! [`ConvexHull::triangulate`] always satisfy it.

use nalgebra::{Matrix3, Vector3};

use super::collision::half_edge::ConvexHull;
use super::collision::primitives::Triangle;
use crate::foundation::math::{Mat3, Vec3};

/// Mass, center of mass, and inertia tensor for a rigid body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Total mass (equals volume at unit density)
    pub mass: f32,
    /// Center of mass in object space
    pub center_of_mass: Vec3,
    /// Symmetric inertia tensor about the center of mass
    pub inertia_tensor: Mat3,
}

impl MassProperties {
    /// Zero mass properties
    pub fn zero() -> Self {
        Self {
            mass: 0.0,
            center_of_mass: Vec3::zeros(),
            inertia_tensor: Mat3::zeros(),
        }
    }

    /// Scale for a uniform density; the center of mass is unchanged
    pub fn with_density(self, density: f32) -> Self {
        Self {
            mass: self.mass * density,
            center_of_mass: self.center_of_mass,
            inertia_tensor: self.inertia_tensor * density,
        }
    }

    /// Reciprocal mass, zero for massless or static bodies
    pub fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Inverse inertia tensor, zero when the tensor is singular
    pub fn inverse_inertia(&self) -> Mat3 {
        self.inertia_tensor.try_inverse().unwrap_or_else(Mat3::zeros)
    }
}

/// Per-axis subexpressions of the surface integrals
struct Subexpressions {
    f1: f64,
    f2: f64,
    f3: f64,
    g0: f64,
    g1: f64,
    g2: f64,
}

impl Subexpressions {
    fn new(w0: f64, w1: f64, w2: f64) -> Self {
        let temp0 = w0 + w1;
        let f1 = temp0 + w2;
        let temp1 = w0 * w0;
        let temp2 = temp1 + w1 * temp0;
        let f2 = temp2 + w2 * f1;
        let f3 = w0 * temp1 + w1 * temp2 + w2 * f2;
        Self {
            f1,
            f2,
            f3,
            g0: f2 + w0 * (f1 + w0),
            g1: f2 + w1 * (f1 + w1),
            g2: f2 + w2 * (f1 + w2),
        }
    }
}

/// Integral multipliers: 1, x, y, z, x², y², z², xy, yz, zx
const MULTIPLIERS: [f64; 10] = [
    1.0 / 6.0,
    1.0 / 24.0,
    1.0 / 24.0,
    1.0 / 24.0,
    1.0 / 60.0,
    1.0 / 60.0,
    1.0 / 60.0,
    1.0 / 120.0,
    1.0 / 120.0,
    1.0 / 120.0,
];

/// Mass properties at unit density of the solid bounded by `triangles`
///
/// Accumulates in `f64`. An empty or zero-volume input yields
/// [`MassProperties::zero`].
pub fn compute_mass_properties(triangles: &[Triangle]) -> MassProperties {
    let mut integrals = [0.0f64; 10];

    for triangle in triangles {
        let p0: Vector3<f64> = triangle.v0.cast();
        let p1: Vector3<f64> = triangle.v1.cast();
        let p2: Vector3<f64> = triangle.v2.cast();

        // Unnormalized normal (twice the area vector)
        let delta = (p1 - p0).cross(&(p2 - p0));

        let x = Subexpressions::new(p0.x, p1.x, p2.x);
        let y = Subexpressions::new(p0.y, p1.y, p2.y);
        let z = Subexpressions::new(p0.z, p1.z, p2.z);

        integrals[0] += delta.x * x.f1;
        integrals[1] += delta.x * x.f2;
        integrals[2] += delta.y * y.f2;
        integrals[3] += delta.z * z.f2;
        integrals[4] += delta.x * x.f3;
        integrals[5] += delta.y * y.f3;
        integrals[6] += delta.z * z.f3;
        integrals[7] += delta.x * (p0.y * x.g0 + p1.y * x.g1 + p2.y * x.g2);
        integrals[8] += delta.y * (p0.z * y.g0 + p1.z * y.g1 + p2.z * y.g2);
        integrals[9] += delta.z * (p0.x * z.g0 + p1.x * z.g1 + p2.x * z.g2);
    }

    for (integral, multiplier) in integrals.iter_mut().zip(MULTIPLIERS) {
        *integral *= multiplier;
    }

    let mass = integrals[0];
    if mass.abs() <= f64::EPSILON {
        return MassProperties::zero();
    }

    let center = Vector3::new(integrals[1], integrals[2], integrals[3]) / mass;

    // Second moments about the center of mass
    let xx = integrals[5] + integrals[6] - mass * (center.y * center.y + center.z * center.z);
    let yy = integrals[4] + integrals[6] - mass * (center.z * center.z + center.x * center.x);
    let zz = integrals[4] + integrals[5] - mass * (center.x * center.x + center.y * center.y);
    let xy = -(integrals[7] - mass * center.x * center.y);
    let yz = -(integrals[8] - mass * center.y * center.z);
    let xz = -(integrals[9] - mass * center.z * center.x);

    let inertia = Matrix3::new(
        xx, xy, xz,
        xy, yy, yz,
        xz, yz, zz,
    );

    MassProperties {
        mass: mass as f32,
        center_of_mass: center.cast(),
        inertia_tensor: inertia.cast(),
    }
}

impl ConvexHull {
    /// Mass properties at unit density from the fan-triangulated faces
    ///
    /// Only meaningful for a closed hull.
    pub fn mass_properties(&self) -> MassProperties {
        compute_mass_properties(&self.triangulate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::tests::fixtures::{box_hull, box_mesh, tetrahedron_mesh};
    use approx::assert_relative_eq;

    fn mesh_triangles(vertices: &[Vec3], indices: &[[u16; 3]]) -> Vec<Triangle> {
        indices
            .iter()
            .map(|&[a, b, c]| {
                Triangle::new(
                    vertices[usize::from(a)],
                    vertices[usize::from(b)],
                    vertices[usize::from(c)],
                )
            })
            .collect()
    }

    #[test]
    fn test_unit_cube_mass_properties() {
        let props = box_hull(Vec3::new(0.5, 0.5, 0.5)).mass_properties();

        assert_relative_eq!(props.mass, 1.0, max_relative = 1e-4);
        assert_relative_eq!(props.center_of_mass, Vec3::zeros(), epsilon = 1e-5);
        // Solid box: m/12 * (b² + c²) with all sides 1
        let expected = Mat3::from_diagonal_element(1.0 / 6.0);
        assert_relative_eq!(props.inertia_tensor, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_offset_box_center_and_inertia() {
        let (mut vertices, indices) = box_mesh(Vec3::new(1.0, 2.0, 3.0));
        let offset = Vec3::new(5.0, -1.0, 2.0);
        for vertex in &mut vertices {
            *vertex += offset;
        }
        let props = compute_mass_properties(&mesh_triangles(&vertices, &indices));

        let (w, h, d) = (2.0f32, 4.0f32, 6.0f32);
        let mass = w * h * d;
        assert_relative_eq!(props.mass, mass, max_relative = 1e-4);
        assert_relative_eq!(props.center_of_mass, offset, epsilon = 1e-4);

        let expected = Mat3::from_diagonal(&Vec3::new(
            mass / 12.0 * (h * h + d * d),
            mass / 12.0 * (w * w + d * d),
            mass / 12.0 * (w * w + h * h),
        ));
        assert_relative_eq!(props.inertia_tensor, expected, max_relative = 1e-4, epsilon = 1e-3);
    }

    #[test]
    fn test_tetrahedron_products_of_inertia() {
        // Corner tetrahedron (0,0,0), (1,0,0), (0,1,0), (0,0,1)
        let (vertices, indices) = tetrahedron_mesh();
        let props = compute_mass_properties(&mesh_triangles(&vertices, &indices));

        assert_relative_eq!(props.mass, 1.0 / 6.0, max_relative = 1e-5);
        assert_relative_eq!(props.center_of_mass, Vec3::new(0.25, 0.25, 0.25), epsilon = 1e-6);

        // About the centroid: diagonal 1/80, products of inertia +1/480
        // once negated into the tensor
        let diagonal = 1.0 / 80.0;
        let product = 1.0 / 480.0;
        let expected = Mat3::new(
            diagonal, product, product,
            product, diagonal, product,
            product, product, diagonal,
        );
        assert_relative_eq!(props.inertia_tensor, expected, epsilon = 1e-6);
        assert_relative_eq!(props.inertia_tensor, props.inertia_tensor.transpose());
    }

    #[test]
    fn test_density_scaling_and_inverses() {
        let props = box_hull(Vec3::new(0.5, 0.5, 0.5)).mass_properties().with_density(4.0);
        assert_relative_eq!(props.mass, 4.0, max_relative = 1e-4);
        assert_relative_eq!(props.inverse_mass(), 0.25, max_relative = 1e-4);
        assert_relative_eq!(
            props.inverse_inertia(),
            Mat3::from_diagonal_element(1.5),
            max_relative = 1e-3
        );
    }

    #[test]
    fn test_empty_input_is_massless() {
        let props = compute_mass_properties(&[]);
        assert_eq!(props, MassProperties::zero());
        assert_eq!(props.inverse_mass(), 0.0);
        assert_eq!(props.inverse_inertia(), Mat3::zeros());
    }
}
