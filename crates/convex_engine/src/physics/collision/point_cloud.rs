//! Convex hulls from raw point clouds
//!
//! Beneath-beyond insertion: start from the widest tetrahedron the cloud
//! contains, then add the remaining points one at a time. Each point that
//! lies outside the current hull removes the faces it can see and stitches
//! its horizon to a fan of new triangles. Points inside (or within the
//! tolerance of) the hull never become vertices.
//!
//! The resulting triangles go through [`HullBuilder::build`], so the
//! coplanar merge turns a cube's twelve triangles back into six quads.

use std::collections::{HashMap, HashSet};

use super::half_edge::{ConvexHull, HullBuildError, HullBuilder, VertexIndex, MAX_ELEMENTS};
use crate::foundation::math::Vec3;

#[derive(Debug, Clone, Copy)]
struct CloudFace {
    vertices: [usize; 3],
    normal: Vec3,
    offset: f32,
}

impl CloudFace {
    /// Triangle `a, b, c` wound so its normal points away from `interior`
    fn facing_away(points: &[Vec3], [a, b, c]: [usize; 3], interior: &Vec3) -> Self {
        let face = Self::new(points, [a, b, c]);
        if face.distance(interior) > 0.0 {
            Self::new(points, [a, c, b])
        } else {
            face
        }
    }

    fn new(points: &[Vec3], vertices: [usize; 3]) -> Self {
        let [a, b, c] = vertices.map(|index| points[index]);
        let normal = (b - a).cross(&(c - a)).try_normalize(0.0).unwrap_or_else(Vec3::zeros);
        Self { vertices, normal, offset: normal.dot(&a) }
    }

    fn distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }

    fn directed_edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Four affinely independent points spanning as much volume as possible
fn initial_simplex(points: &[Vec3], tolerance: f32) -> Option<[usize; 4]> {
    let farthest = |score: &dyn Fn(&Vec3) -> f32| {
        points
            .iter()
            .enumerate()
            .map(|(index, point)| (index, score(point)))
            .max_by(|lhs, rhs| lhs.1.total_cmp(&rhs.1))
    };

    let (i0, _) = farthest(&|p: &Vec3| -p.x)?;
    let p0 = points[i0];
    let (i1, spread) = farthest(&|p: &Vec3| (p - p0).norm())?;
    if spread <= tolerance {
        return None;
    }

    let axis = (points[i1] - p0) / spread;
    let (i2, offset) = farthest(&|p: &Vec3| (p - p0).cross(&axis).norm())?;
    if offset <= tolerance {
        return None;
    }

    let normal = (points[i1] - p0).cross(&(points[i2] - p0)).normalize();
    let (i3, height) = farthest(&|p: &Vec3| normal.dot(&(p - p0)).abs())?;
    if height <= tolerance {
        return None;
    }
    Some([i0, i1, i2, i3])
}

/// Outward-wound triangles of the convex hull of `points`
///
/// Returns the hull vertices (only the points that ended up on the hull) and
/// triangles indexing into them.
fn hull_triangles(
    points: &[Vec3],
    relative_tolerance: f32,
) -> Result<(Vec<Vec3>, Vec<[VertexIndex; 3]>), HullBuildError> {
    if points.is_empty() {
        return Err(HullBuildError::Empty);
    }

    let (min, max) = points.iter().fold((points[0], points[0]), |(min, max), point| {
        (min.inf(point), max.sup(point))
    });
    let tolerance = relative_tolerance * (max - min).max();
    let flat = HullBuildError::FlatPointCloud { count: points.len() };

    let simplex = initial_simplex(points, tolerance).ok_or(flat)?;
    let interior = simplex.iter().map(|&index| points[index]).sum::<Vec3>() / 4.0;
    let [i0, i1, i2, i3] = simplex;
    let mut faces: Vec<CloudFace> = [[i0, i1, i2], [i0, i1, i3], [i0, i2, i3], [i1, i2, i3]]
        .into_iter()
        .map(|corners| CloudFace::facing_away(points, corners, &interior))
        .collect();

    for (index, point) in points.iter().enumerate() {
        if simplex.contains(&index) {
            continue;
        }

        let (visible, hidden): (Vec<CloudFace>, Vec<CloudFace>) =
            faces.into_iter().partition(|face| face.distance(point) > tolerance);
        faces = hidden;
        if visible.is_empty() {
            continue;
        }

        // An edge is on the horizon when its reverse does not belong to a visible face
        let visible_edges: HashSet<(usize, usize)> =
            visible.iter().flat_map(CloudFace::directed_edges).collect();
        let horizon = visible_edges.iter().filter(|&&(from, to)| !visible_edges.contains(&(to, from)));
        faces.extend(horizon.map(|&(from, to)| CloudFace::new(points, [from, to, index])));
    }

    let (vertices, triangles) = index_hull_vertices(points, &faces)?;

    log::trace!(
        "Point cloud hull: {} points -> {} hull vertices, {} triangles",
        points.len(),
        vertices.len(),
        triangles.len()
    );
    Ok((vertices, triangles))
}

/// Renumber the points used by `faces` densely, in first-use order
fn index_hull_vertices(
    points: &[Vec3],
    faces: &[CloudFace],
) -> Result<(Vec<Vec3>, Vec<[VertexIndex; 3]>), HullBuildError> {
    let mut remap: HashMap<usize, VertexIndex> = HashMap::new();
    let mut used = Vec::new();
    for face in faces {
        for &point_index in &face.vertices {
            if !remap.contains_key(&point_index) {
                remap.insert(point_index, 0);
                used.push(point_index);
            }
        }
    }
    if used.len() > MAX_ELEMENTS {
        return Err(HullBuildError::TooManyElements { kind: "vertices", count: used.len() });
    }

    for (vertex, point_index) in used.iter().enumerate() {
        remap.insert(*point_index, vertex as VertexIndex);
    }
    let vertices = used.iter().map(|&point_index| points[point_index]).collect();
    let triangles = faces
        .iter()
        .map(|face| face.vertices.map(|point_index| remap[&point_index]))
        .collect();
    Ok((vertices, triangles))
}

impl HullBuilder {
    /// Build the convex hull of a point cloud
    ///
    /// Interior and duplicate points are discarded. Clouds whose points are
    /// all collinear or coplanar are rejected with
    /// [`HullBuildError::FlatPointCloud`].
    pub fn build_from_points(&self, points: &[Vec3]) -> Result<ConvexHull, HullBuildError> {
        let (vertices, triangles) = hull_triangles(points, self.config().point_cloud_epsilon)?;
        self.build(&vertices, &triangles)
    }
}

impl ConvexHull {
    /// Build the convex hull of a point cloud with the default tolerances
    pub fn from_points(points: &[Vec3]) -> Result<Self, HullBuildError> {
        HullBuilder::new().build_from_points(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::tests::fixtures::box_mesh;
    use approx::assert_relative_eq;

    /// Points spread evenly over the unit sphere
    fn fibonacci_sphere(count: usize) -> Vec<Vec3> {
        let golden = std::f32::consts::PI * (3.0 - 5.0f32.sqrt());
        (0..count)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
                let radius = (1.0 - y * y).sqrt();
                let theta = golden * i as f32;
                Vec3::new(radius * theta.cos(), y, radius * theta.sin())
            })
            .collect()
    }

    #[test]
    fn test_cube_corners_with_interior_points() {
        let (mut points, _) = box_mesh(Vec3::new(1.0, 1.0, 1.0));
        points.extend([
            Vec3::zeros(),
            Vec3::new(0.5, -0.25, 0.75),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(1.0, 1.0, 0.0),
        ]);

        let hull = ConvexHull::from_points(&points).unwrap();

        assert_eq!(hull.faces().len(), 6);
        assert_eq!(hull.vertices().len(), 8);
        assert!(hull.is_closed());
        assert!(hull.faces().iter().all(|face| face.len() == 4));
    }

    #[test]
    fn test_duplicate_points_are_ignored() {
        let (corners, _) = box_mesh(Vec3::new(2.0, 1.0, 0.5));
        let points: Vec<Vec3> = corners.iter().chain(&corners).copied().collect();

        let hull = ConvexHull::from_points(&points).unwrap();
        assert_eq!(hull.vertices().len(), 8);
        assert_eq!(hull.faces().len(), 6);
    }

    #[test]
    fn test_sphere_samples_all_on_hull() {
        let points = fibonacci_sphere(64);
        let hull = ConvexHull::from_points(&points).unwrap();

        assert_eq!(hull.vertices().len(), 64);
        assert!(hull.is_closed());
        let v = hull.vertices().len() as i64;
        let e = hull.edges().len() as i64 / 2;
        let f = hull.faces().len() as i64;
        assert_eq!(v - e + f, 2);

        for index in 0..hull.faces().len() {
            let plane = hull.face_plane(index as u16);
            for point in &points {
                assert!(plane.signed_distance(point) < 1e-4);
            }
        }
    }

    #[test]
    fn test_tetrahedron_from_four_points() {
        let points = [Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::z()];
        let hull = ConvexHull::from_points(&points).unwrap();

        assert_eq!(hull.faces().len(), 4);
        assert_eq!(hull.edges().len(), 12);
        assert_relative_eq!(hull.mass_properties().mass, 1.0 / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_flat_clouds_are_rejected() {
        let square = [Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::new(1.0, 1.0, 0.0)];
        assert_eq!(
            ConvexHull::from_points(&square).unwrap_err(),
            HullBuildError::FlatPointCloud { count: 4 }
        );

        let line: Vec<Vec3> = (0..5).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        assert_eq!(
            ConvexHull::from_points(&line).unwrap_err(),
            HullBuildError::FlatPointCloud { count: 5 }
        );

        let point = [Vec3::new(1.0, 2.0, 3.0); 3];
        assert_eq!(
            ConvexHull::from_points(&point).unwrap_err(),
            HullBuildError::FlatPointCloud { count: 3 }
        );

        assert_eq!(ConvexHull::from_points(&[]).unwrap_err(), HullBuildError::Empty);
    }

    #[test]
    fn test_vertex_overflow_reports_hull_vertex_count() {
        let face_count = MAX_ELEMENTS / 3 + 1;
        let points = vec![Vec3::zeros(); face_count * 3];
        let faces: Vec<CloudFace> = (0..face_count)
            .map(|i| CloudFace {
                vertices: [3 * i, 3 * i + 1, 3 * i + 2],
                normal: Vec3::z(),
                offset: 0.0,
            })
            .collect();

        assert_eq!(
            index_hull_vertices(&points, &faces).unwrap_err(),
            HullBuildError::TooManyElements { kind: "vertices", count: face_count * 3 }
        );
    }

    #[test]
    fn test_shared_points_are_indexed_once() {
        let points = [Vec3::zeros(), Vec3::x(), Vec3::y(), Vec3::z(), Vec3::new(5.0, 5.0, 5.0)];
        let faces = [
            CloudFace { vertices: [3, 1, 2], normal: Vec3::z(), offset: 0.0 },
            CloudFace { vertices: [1, 3, 0], normal: Vec3::z(), offset: 0.0 },
        ];

        let (vertices, triangles) = index_hull_vertices(&points, &faces).unwrap();
        assert_eq!(vertices, vec![Vec3::z(), Vec3::x(), Vec3::y(), Vec3::zeros()]);
        assert_eq!(triangles, vec![[0, 1, 2], [1, 0, 3]]);
    }

    #[test]
    fn test_tolerance_absorbs_near_planar_points() {
        let (mut points, _) = box_mesh(Vec3::new(1.0, 1.0, 1.0));
        // Barely above the +z face
        points.push(Vec3::new(0.2, 0.3, 1.0 + 1e-7));

        let hull = ConvexHull::from_points(&points).unwrap();
        assert_eq!(hull.vertices().len(), 8);
    }
}
