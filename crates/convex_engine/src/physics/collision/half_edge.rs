//! Half-edge convex hull representation
//!
//! A [`ConvexHull`] is an immutable boundary representation built once from a
//! triangle soup by [`HullBuilder`]. Neighbouring triangles that lie in the
//! same plane are merged into a single convex polygon face, so a box built
//! from 12 triangles ends up with 6 quad faces. Fewer, larger faces keep the
//! SAT face tests cheap and the contact manifolds stable.
//!
//! # Index width
//!
//! Vertices, half-edges and faces are addressed with `u16`, which caps a hull
//! at 65 535 of each. Inputs above the limit are rejected at build time.
//!
//! # Build pipeline
//!
//! 1. Copy vertices verbatim.
//! 2. Emit three half-edges per triangle, `next_edge` forming a 3-cycle.
//! 3. Resolve twins by directed vertex pair (`a→b` pairs with `b→a`).
//! 4. Merge coplanar neighbours, tombstoning absorbed faces and edges.
//! 5. Compact, so consumers only ever see a dense hull.

use std::collections::HashMap;

use approx::AbsDiffEq;
use thiserror::Error;

use super::primitives::{Aabb, BoundingSphere, Plane, Segment, Triangle};
use crate::core::config::HullBuildConfig;
use crate::foundation::math::Vec3;

/// Index of a vertex inside a hull
pub type VertexIndex = u16;
/// Index of a half-edge inside a hull
pub type EdgeIndex = u16;
/// Index of a face inside a hull
pub type FaceIndex = u16;

/// Largest number of vertices, half-edges or faces a hull can hold
pub const MAX_ELEMENTS: usize = u16::MAX as usize;

/// Directed edge record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// Next half-edge around the owning face (counter-clockwise)
    pub next_edge: EdgeIndex,
    /// Opposing half-edge on the adjacent face, `None` on an open boundary
    pub twin_edge: Option<EdgeIndex>,
    /// Owning face
    pub face: FaceIndex,
    /// Vertex this half-edge starts from
    pub origin_vertex: VertexIndex,
}

/// Planar convex polygon face
///
/// `edges[i]` starts at `vertices[i]`, and following `next_edge` from
/// `edges[i]` yields `edges[(i + 1) % len]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Vertex loop, counter-clockwise seen from outside the hull
    pub vertices: Vec<VertexIndex>,
    /// Half-edges bounding the face, in loop order
    pub edges: Vec<EdgeIndex>,
    /// Unit outward normal
    pub normal: Vec3,
}

impl Face {
    /// Number of vertices (and half-edges) on the face
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the face has no vertices (never true for a built hull)
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Errors raised while building a hull from a triangle soup or point cloud
///
/// A failed build never yields a partial hull.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HullBuildError {
    /// No triangles or fewer than three vertices
    #[error("hull needs at least one triangle over three vertices")]
    Empty,

    /// Input exceeds the 16-bit index range
    #[error("too many {kind}: {count} exceeds the limit of {MAX_ELEMENTS}")]
    TooManyElements {
        /// What overflowed ("vertices", "half-edges")
        kind: &'static str,
        /// Requested count
        count: usize,
    },

    /// A triangle references a vertex that does not exist
    #[error("triangle {triangle} references vertex {index} but only {vertex_count} vertices exist")]
    VertexOutOfRange {
        /// Offending triangle
        triangle: usize,
        /// Offending vertex index
        index: VertexIndex,
        /// Number of vertices supplied
        vertex_count: usize,
    },

    /// A triangle repeats a vertex or has zero area
    #[error("triangle {triangle} is degenerate")]
    DegenerateTriangle {
        /// Offending triangle
        triangle: usize,
    },

    /// The same directed edge appears twice: more than two faces share the
    /// edge, or neighbouring triangles disagree on winding
    #[error("edge {from} -> {to} is used twice in the same direction")]
    NonManifoldEdge {
        /// Origin vertex of the repeated edge
        from: VertexIndex,
        /// Destination vertex of the repeated edge
        to: VertexIndex,
    },

    /// A point cloud whose points are all collinear or coplanar
    #[error("point cloud of {count} points does not enclose a volume")]
    FlatPointCloud {
        /// Number of points supplied
        count: usize,
    },
}

/// Immutable half-edge convex hull in object space
#[derive(Debug, Clone)]
pub struct ConvexHull {
    vertices: Vec<Vec3>,
    edges: Vec<HalfEdge>,
    faces: Vec<Face>,
    bounds: Aabb,
    bounding_sphere: BoundingSphere,
    centroid: Vec3,
}

impl ConvexHull {
    /// Build a hull with the default configuration
    ///
    /// Shorthand for `HullBuilder::new().build(vertices, triangles)`.
    pub fn from_triangles(vertices: &[Vec3], triangles: &[[VertexIndex; 3]]) -> Result<Self, HullBuildError> {
        HullBuilder::new().build(vertices, triangles)
    }

    /// All vertices, in input order
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// All half-edges
    pub fn edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    /// All faces
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Vertex position by index
    pub fn vertex(&self, index: VertexIndex) -> Vec3 {
        self.vertices[usize::from(index)]
    }

    /// Half-edge by index
    pub fn edge(&self, index: EdgeIndex) -> &HalfEdge {
        &self.edges[usize::from(index)]
    }

    /// Face by index
    pub fn face(&self, index: FaceIndex) -> &Face {
        &self.faces[usize::from(index)]
    }

    /// Vertex a half-edge points to
    pub fn edge_destination(&self, index: EdgeIndex) -> VertexIndex {
        self.edge(self.edge(index).next_edge).origin_vertex
    }

    /// Vector from a half-edge's origin to its destination
    pub fn edge_direction(&self, index: EdgeIndex) -> Vec3 {
        self.vertex(self.edge_destination(index)) - self.vertex(self.edge(index).origin_vertex)
    }

    /// Half-edge as a segment
    pub fn edge_segment(&self, index: EdgeIndex) -> Segment {
        Segment::new(
            self.vertex(self.edge(index).origin_vertex),
            self.vertex(self.edge_destination(index)),
        )
    }

    /// One half-edge per undirected edge
    ///
    /// Boundary edges are always included; of a twin pair only the lower
    /// index is yielded.
    pub fn unique_edges(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.edges.iter().enumerate().filter_map(|(index, edge)| {
            let index = index as EdgeIndex;
            match edge.twin_edge {
                Some(twin) if twin < index => None,
                _ => Some(index),
            }
        })
    }

    /// Supporting plane of a face, normal pointing out of the hull
    pub fn face_plane(&self, index: FaceIndex) -> Plane {
        let face = self.face(index);
        Plane::from_point_normal(self.vertex(face.vertices[0]), face.normal)
    }

    /// Average of a face's vertices
    pub fn face_centroid(&self, index: FaceIndex) -> Vec3 {
        let face = self.face(index);
        let sum: Vec3 = face.vertices.iter().map(|&v| self.vertex(v)).sum();
        sum / face.len() as f32
    }

    /// Shoelace area of a face accumulated in the clockwise sense
    ///
    /// Sums `vᵢ₊₁ × vᵢ` around the loop and projects onto the face normal, so
    /// a face wound counter-clockwise as seen from outside gives a negative
    /// value whose magnitude is the polygon area.
    pub fn face_signed_area(&self, index: FaceIndex) -> f32 {
        let face = self.face(index);
        let origin = self.vertex(face.vertices[0]);
        let accumulated: Vec3 = (0..face.len())
            .map(|i| {
                let current = self.vertex(face.vertices[i]) - origin;
                let next = self.vertex(face.vertices[(i + 1) % face.len()]) - origin;
                next.cross(&current)
            })
            .sum();
        0.5 * accumulated.dot(&face.normal)
    }

    /// Fan-triangulate every face, keeping the outward winding
    pub fn triangulate(&self) -> Vec<Triangle> {
        let mut triangles = Vec::with_capacity(self.edges.len().saturating_sub(2 * self.faces.len()));
        for face in &self.faces {
            let anchor = self.vertex(face.vertices[0]);
            for pair in face.vertices[1..].windows(2) {
                triangles.push(Triangle::new(anchor, self.vertex(pair[0]), self.vertex(pair[1])));
            }
        }
        triangles
    }

    /// Vertex with the largest projection onto `direction`
    pub fn support_point(&self, direction: &Vec3) -> Vec3 {
        self.vertices
            .iter()
            .copied()
            .max_by(|a, b| a.dot(direction).total_cmp(&b.dot(direction)))
            .unwrap_or_else(Vec3::zeros)
    }

    /// Object-space bounding box
    pub fn local_aabb(&self) -> Aabb {
        self.bounds
    }

    /// Object-space bounding sphere
    pub fn local_bounding_sphere(&self) -> BoundingSphere {
        self.bounding_sphere
    }

    /// Average of all vertices; an interior point for a closed convex hull
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Whether every half-edge has a twin (no open boundary)
    pub fn is_closed(&self) -> bool {
        self.edges.iter().all(|edge| edge.twin_edge.is_some())
    }
}

/// Builds [`ConvexHull`]s from triangle soups
#[derive(Debug, Clone, Default)]
pub struct HullBuilder {
    config: HullBuildConfig,
}

impl HullBuilder {
    /// Builder with the default tolerances
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with explicit tolerances
    pub fn with_config(config: HullBuildConfig) -> Self {
        Self { config }
    }

    /// Tolerances this builder applies
    pub fn config(&self) -> &HullBuildConfig {
        &self.config
    }

    /// Build a hull from vertex positions and counter-clockwise triangles
    pub fn build(&self, vertices: &[Vec3], triangles: &[[VertexIndex; 3]]) -> Result<ConvexHull, HullBuildError> {
        if triangles.is_empty() || vertices.len() < 3 {
            return Err(HullBuildError::Empty);
        }
        if vertices.len() > MAX_ELEMENTS {
            return Err(HullBuildError::TooManyElements { kind: "vertices", count: vertices.len() });
        }
        let edge_count = triangles.len() * 3;
        if edge_count > MAX_ELEMENTS {
            return Err(HullBuildError::TooManyElements { kind: "half-edges", count: edge_count });
        }

        let mut soup = TriangleSoup::new(vertices, triangles)?;
        soup.resolve_twins()?;
        let merges = soup.merge_coplanar_faces(self.config.coplanar_epsilon);
        let hull = soup.compact();

        log::debug!(
            "Built convex hull: {} triangles -> {} faces, {} half-edges, {} vertices ({} coplanar merges)",
            triangles.len(),
            hull.faces.len(),
            hull.edges.len(),
            hull.vertices.len(),
            merges
        );
        debug_assert!(hull_topology_is_consistent(&hull));
        Ok(hull)
    }
}

/// Working state of the builder: arena of half-edges and faces with
/// liveness flags. Indices stay stable until [`TriangleSoup::compact`].
struct TriangleSoup<'a> {
    vertices: &'a [Vec3],
    edges: Vec<HalfEdge>,
    edge_alive: Vec<bool>,
    face_alive: Vec<bool>,
    /// Any live half-edge of each face, the entry point for loop walks
    face_entry: Vec<EdgeIndex>,
    normals: Vec<Vec3>,
}

impl<'a> TriangleSoup<'a> {
    fn new(vertices: &'a [Vec3], triangles: &[[VertexIndex; 3]]) -> Result<Self, HullBuildError> {
        let mut edges = Vec::with_capacity(triangles.len() * 3);
        let mut normals = Vec::with_capacity(triangles.len());
        let mut face_entry = Vec::with_capacity(triangles.len());

        for (triangle, &indices) in triangles.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| usize::from(i) >= vertices.len()) {
                return Err(HullBuildError::VertexOutOfRange {
                    triangle,
                    index,
                    vertex_count: vertices.len(),
                });
            }
            let [a, b, c] = indices;
            if a == b || b == c || c == a {
                return Err(HullBuildError::DegenerateTriangle { triangle });
            }

            // Unit normal from the first two edge vectors (CCW winding)
            let p = indices.map(|i| vertices[usize::from(i)]);
            let normal = (p[1] - p[0])
                .cross(&(p[2] - p[1]))
                .try_normalize(f32::EPSILON)
                .ok_or(HullBuildError::DegenerateTriangle { triangle })?;

            let face = triangle as FaceIndex;
            let base = edges.len() as EdgeIndex;
            for (corner, &origin_vertex) in indices.iter().enumerate() {
                edges.push(HalfEdge {
                    next_edge: base + ((corner as EdgeIndex + 1) % 3),
                    twin_edge: None,
                    face,
                    origin_vertex,
                });
            }
            normals.push(normal);
            face_entry.push(base);
        }

        Ok(Self {
            vertices,
            edge_alive: vec![true; edges.len()],
            face_alive: vec![true; triangles.len()],
            edges,
            face_entry,
            normals,
        })
    }

    fn destination(&self, edge: EdgeIndex) -> VertexIndex {
        self.edges[usize::from(self.edges[usize::from(edge)].next_edge)].origin_vertex
    }

    /// Pair every `a→b` with its `b→a`; a repeated `a→b` is non-manifold
    fn resolve_twins(&mut self) -> Result<(), HullBuildError> {
        let mut directed: HashMap<(VertexIndex, VertexIndex), EdgeIndex> = HashMap::with_capacity(self.edges.len());
        for index in 0..self.edges.len() {
            let edge = index as EdgeIndex;
            let key = (self.edges[index].origin_vertex, self.destination(edge));
            if directed.insert(key, edge).is_some() {
                return Err(HullBuildError::NonManifoldEdge { from: key.0, to: key.1 });
            }
        }

        for index in 0..self.edges.len() {
            let edge = index as EdgeIndex;
            let reverse = (self.destination(edge), self.edges[index].origin_vertex);
            self.edges[index].twin_edge = directed.get(&reverse).copied();
        }

        let open = self.edges.iter().filter(|edge| edge.twin_edge.is_none()).count();
        if open > 0 {
            log::debug!("Hull input has {} open boundary half-edges", open);
        }
        Ok(())
    }

    /// Walk a face loop starting at `start`, bounded by the arena size
    fn face_loop(&self, start: EdgeIndex) -> Vec<EdgeIndex> {
        let mut loop_edges = vec![start];
        let mut current = self.edges[usize::from(start)].next_edge;
        while current != start && loop_edges.len() <= self.edges.len() {
            loop_edges.push(current);
            current = self.edges[usize::from(current)].next_edge;
        }
        loop_edges
    }

    fn previous(&self, edge: EdgeIndex) -> EdgeIndex {
        let mut current = edge;
        loop {
            let next = self.edges[usize::from(current)].next_edge;
            if next == edge {
                return current;
            }
            current = next;
        }
    }

    /// Merge neighbouring faces with equal normals until none remain;
    /// returns the number of merges performed
    fn merge_coplanar_faces(&mut self, epsilon: f32) -> usize {
        let mut merges = 0;
        loop {
            let mut merged_this_pass = false;
            for index in 0..self.edges.len() {
                if !self.edge_alive[index] {
                    continue;
                }
                let Some(twin) = self.edges[index].twin_edge else {
                    continue;
                };
                if !self.edge_alive[usize::from(twin)] {
                    continue;
                }
                let face = self.edges[index].face;
                let other = self.edges[usize::from(twin)].face;
                if face == other {
                    continue;
                }
                let (normal, other_normal) = (self.normals[usize::from(face)], self.normals[usize::from(other)]);
                if !normal.abs_diff_eq(&other_normal, epsilon) {
                    continue;
                }

                self.absorb_face(index as EdgeIndex, twin);
                merges += 1;
                merged_this_pass = true;
            }
            if !merged_this_pass {
                return merges;
            }
        }
    }

    /// Splice the face across `twin` into the face of `edge` and drop the
    /// shared edge pair
    fn absorb_face(&mut self, edge: EdgeIndex, twin: EdgeIndex) {
        let face = self.edges[usize::from(edge)].face;
        let absorbed = self.edges[usize::from(twin)].face;

        for member in self.face_loop(twin) {
            self.edges[usize::from(member)].face = face;
        }

        let edge_prev = self.previous(edge);
        let edge_next = self.edges[usize::from(edge)].next_edge;
        let twin_prev = self.previous(twin);
        let twin_next = self.edges[usize::from(twin)].next_edge;
        self.edges[usize::from(edge_prev)].next_edge = twin_next;
        self.edges[usize::from(twin_prev)].next_edge = edge_next;

        self.edge_alive[usize::from(edge)] = false;
        self.edge_alive[usize::from(twin)] = false;
        self.face_alive[usize::from(absorbed)] = false;
        self.face_entry[usize::from(face)] = edge_next;

        self.remove_antennas(face);
    }

    /// Remove `a→b, b→a` spikes left when two faces shared more than one
    /// consecutive edge (e.g. a fan closing around an interior vertex)
    fn remove_antennas(&mut self, face: FaceIndex) {
        'scan: loop {
            let members = self.face_loop(self.face_entry[usize::from(face)]);
            if members.len() < 3 {
                return;
            }
            for &member in &members {
                let next = self.edges[usize::from(member)].next_edge;
                if self.edges[usize::from(member)].twin_edge != Some(next) {
                    continue;
                }
                let prev = self.previous(member);
                let after = self.edges[usize::from(next)].next_edge;
                self.edges[usize::from(prev)].next_edge = after;
                self.edge_alive[usize::from(member)] = false;
                self.edge_alive[usize::from(next)] = false;
                self.face_entry[usize::from(face)] = prev;
                continue 'scan;
            }
            return;
        }
    }

    /// Drop tombstones and renumber into a dense hull
    fn compact(self) -> ConvexHull {
        let mut edge_map: Vec<Option<EdgeIndex>> = vec![None; self.edges.len()];
        let mut loops: Vec<(FaceIndex, Vec<EdgeIndex>)> = Vec::new();
        let mut next_index: EdgeIndex = 0;

        for (face, &alive) in self.face_alive.iter().enumerate() {
            if !alive {
                continue;
            }
            let members = self.face_loop(self.face_entry[face]);
            if members.len() < 3 {
                log::warn!("Dropping face {} left with {} edges after merging", face, members.len());
                continue;
            }
            for &member in &members {
                edge_map[usize::from(member)] = Some(next_index);
                next_index += 1;
            }
            loops.push((face as FaceIndex, members));
        }

        let mut edges = Vec::with_capacity(loops.iter().map(|(_, members)| members.len()).sum());
        let mut faces = Vec::with_capacity(loops.len());
        for (new_face, (old_face, members)) in loops.iter().enumerate() {
            let mut face = Face {
                vertices: Vec::with_capacity(members.len()),
                edges: Vec::with_capacity(members.len()),
                normal: self.normals[usize::from(*old_face)],
            };
            for &member in members {
                let old = self.edges[usize::from(member)];
                face.vertices.push(old.origin_vertex);
                face.edges.push(edges.len() as EdgeIndex);
                edges.push(HalfEdge {
                    next_edge: edge_map[usize::from(old.next_edge)].unwrap_or_default(),
                    twin_edge: old.twin_edge.and_then(|twin| edge_map[usize::from(twin)]),
                    face: new_face as FaceIndex,
                    origin_vertex: old.origin_vertex,
                });
            }
            faces.push(face);
        }

        let vertices = self.vertices.to_vec();
        let bounds = Aabb::from_points(&vertices).unwrap_or(Aabb::new(Vec3::zeros(), Vec3::zeros()));
        let bounding_sphere = BoundingSphere::from_points(&vertices).unwrap_or(BoundingSphere::new(Vec3::zeros(), 0.0));
        let centroid = vertices.iter().sum::<Vec3>() / vertices.len().max(1) as f32;

        ConvexHull {
            vertices,
            edges,
            faces,
            bounds,
            bounding_sphere,
            centroid,
        }
    }
}

/// Loop closure and twin symmetry, checked after every debug build
fn hull_topology_is_consistent(hull: &ConvexHull) -> bool {
    let twins_symmetric = hull.edges.iter().enumerate().all(|(index, edge)| {
        edge.twin_edge
            .map_or(true, |twin| hull.edge(twin).twin_edge == Some(index as EdgeIndex))
    });
    let loops_closed = hull.faces.iter().enumerate().all(|(face_index, face)| {
        face.edges.iter().enumerate().all(|(i, &edge)| {
            let record = hull.edge(edge);
            record.face == face_index as FaceIndex
                && record.origin_vertex == face.vertices[i]
                && record.next_edge == face.edges[(i + 1) % face.len()]
        })
    });
    twins_symmetric && loops_closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::tests::fixtures::{box_mesh, unit_square};
    use approx::assert_relative_eq;

    #[test]
    fn test_square_merges_into_single_quad() {
        let (vertices, triangles) = unit_square();
        let hull = ConvexHull::from_triangles(&vertices, &triangles).unwrap();

        assert_eq!(hull.faces().len(), 1);
        assert_eq!(hull.edges().len(), 4);
        assert_eq!(hull.vertices().len(), 4);
        assert!(!hull.is_closed());
        assert_relative_eq!(hull.face(0).normal, Vec3::z());
        assert_relative_eq!(hull.face_signed_area(0), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cube_merges_into_six_quads() {
        let (vertices, triangles) = box_mesh(Vec3::new(1.0, 1.0, 1.0));
        let hull = ConvexHull::from_triangles(&vertices, &triangles).unwrap();

        assert_eq!(hull.faces().len(), 6);
        assert_eq!(hull.edges().len(), 24);
        assert_eq!(hull.vertices().len(), 8);
        assert!(hull.is_closed());
        assert!(hull.faces().iter().all(|face| face.len() == 4));
        assert_eq!(hull.unique_edges().count(), 12);
    }

    #[test]
    fn test_coplanar_epsilon_controls_merging() {
        // Square folded slightly along its diagonal
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.01),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let triangles = [[0, 1, 2], [0, 2, 3]];
        let hull = HullBuilder::with_config(HullBuildConfig::default())
            .build(&vertices, &triangles)
            .unwrap();
        assert_eq!(hull.faces().len(), 2);
        assert_eq!(hull.edges().len(), 6);

        let loose = HullBuilder::with_config(HullBuildConfig::default().with_coplanar_epsilon(0.1))
            .build(&vertices, &triangles)
            .unwrap();
        assert_eq!(loose.faces().len(), 1);
    }

    #[test]
    fn test_fan_around_interior_vertex_collapses() {
        // Square split into four triangles around its center point
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
        ];
        let triangles = [[4, 0, 1], [4, 1, 2], [4, 2, 3], [4, 3, 0]];
        let hull = ConvexHull::from_triangles(&vertices, &triangles).unwrap();

        assert_eq!(hull.faces().len(), 1);
        let face = hull.face(0);
        assert_eq!(face.len(), 4);
        assert!(!face.vertices.contains(&4));
        assert_relative_eq!(hull.face_signed_area(0), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_out_of_range_vertex() {
        let (vertices, _) = unit_square();
        let result = ConvexHull::from_triangles(&vertices, &[[0, 1, 9]]);
        assert_eq!(
            result.unwrap_err(),
            HullBuildError::VertexOutOfRange { triangle: 0, index: 9, vertex_count: 4 }
        );
    }

    #[test]
    fn test_rejects_degenerate_triangles() {
        let (vertices, _) = unit_square();
        assert_eq!(
            ConvexHull::from_triangles(&vertices, &[[0, 1, 2], [1, 1, 2]]).unwrap_err(),
            HullBuildError::DegenerateTriangle { triangle: 1 }
        );

        let collinear = vec![Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0];
        assert_eq!(
            ConvexHull::from_triangles(&collinear, &[[0, 1, 2]]).unwrap_err(),
            HullBuildError::DegenerateTriangle { triangle: 0 }
        );
    }

    #[test]
    fn test_rejects_edge_shared_by_three_faces() {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        // 0→1 appears in the first and third triangle
        let triangles = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        assert_eq!(
            ConvexHull::from_triangles(&vertices, &triangles).unwrap_err(),
            HullBuildError::NonManifoldEdge { from: 0, to: 1 }
        );
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(ConvexHull::from_triangles(&[], &[]).unwrap_err(), HullBuildError::Empty);
    }

    #[test]
    fn test_triangulate_preserves_area_and_winding() {
        let (vertices, triangles) = box_mesh(Vec3::new(1.0, 2.0, 3.0));
        let hull = ConvexHull::from_triangles(&vertices, &triangles).unwrap();
        let fan = hull.triangulate();

        assert_eq!(fan.len(), 12);
        let area: f32 = fan.iter().map(|t| t.scaled_normal().norm() * 0.5).sum();
        // 2 * (2*4 + 2*6 + 4*6)
        assert_relative_eq!(area, 88.0, epsilon = 1e-4);
        for triangle in &fan {
            assert!(triangle.normal().dot(&(triangle.centroid() - hull.centroid())) > 0.0);
        }
    }

    #[test]
    fn test_bounds_and_support() {
        let (vertices, triangles) = box_mesh(Vec3::new(1.0, 2.0, 3.0));
        let hull = ConvexHull::from_triangles(&vertices, &triangles).unwrap();

        assert_relative_eq!(hull.local_aabb().max, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(hull.centroid(), Vec3::zeros());
        assert_relative_eq!(hull.local_bounding_sphere().radius, 14.0f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(hull.support_point(&Vec3::new(1.0, 1.0, 1.0)), Vec3::new(1.0, 2.0, 3.0));
    }
}
