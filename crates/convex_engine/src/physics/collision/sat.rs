//! Separating-axis test between convex hulls
//!
//! Follows Gregorius' formulation ("The Separating Axis Test between Convex
//! Polyhedra", GDC 2013):
//!
//! 1. Face normals of A, then of B. Any positive separation ends the test.
//! 2. Cross products of edge pairs, but only for pairs whose Gauss-map arcs
//!    intersect (the pair builds a face of the Minkowski difference). All
//!    other pairs cannot realise the minimum distance.
//! 3. The axis of least penetration picks the contact type. Face contacts
//!    are preferred within [`SatConfig::edge_bias`], and A's face within
//!    [`SatConfig::face_bias`], so the manifold does not flip between frames.
//!
//! Face contacts clip the most anti-parallel incident face against the side
//! planes of the reference face (Sutherland-Hodgman). Edge contacts report
//! the midpoint of the closest points of the two edges.
//!
//! Hulls stay in object space; world-space vertices and face normals are
//! computed once per query from each hull's [`Transform`].

use bitflags::bitflags;

use super::half_edge::{ConvexHull, EdgeIndex, FaceIndex, VertexIndex};
use super::primitives::{Plane, Segment};
use crate::core::config::SatConfig;
use crate::foundation::math::{Transform, Vec3};

bitflags! {
    /// Kind of contact found by the SAT; empty when the hulls are apart
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CollisionType: u8 {
        /// Edge against edge
        const EDGE = 1 << 0;
        /// Face against any feature
        const FACE = 1 << 1;
        /// Either kind of contact
        const ANY = Self::EDGE.bits() | Self::FACE.bits();
    }
}

/// Which hull supplied the reference feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReferenceHull {
    /// First hull passed to the query
    #[default]
    A,
    /// Second hull passed to the query
    B,
}

/// Topological feature of a hull
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureId {
    /// Vertex index
    Vertex(VertexIndex),
    /// Half-edge index
    Edge(EdgeIndex),
    /// Face index
    Face(FaceIndex),
}

/// Features of the reference and incident hull that produced a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactFeature {
    /// Feature on the reference hull
    pub reference: FeatureId,
    /// Feature on the incident hull
    pub incident: FeatureId,
}

/// Single contact point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// World-space position on the incident hull's surface (edge contacts use
    /// the midpoint between both edges)
    pub position: Vec3,
    /// Penetration along the manifold normal, positive when overlapping
    pub depth: f32,
    /// Features that generated the point, stable across frames
    pub feature: ContactFeature,
}

/// Number of candidate axes evaluated by one query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SatStats {
    /// Face normals tested, over both hulls
    pub face_axes_tested: usize,
    /// Edge-pair axes tested after Minkowski-face culling
    pub edge_axes_tested: usize,
}

/// Result of a SAT query between two hulls
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactManifold {
    /// Empty when the hulls are separated
    pub collision_type: CollisionType,
    /// World-space unit normal pointing from the reference hull to the other
    pub normal: Vec3,
    /// Overlap along the normal, positive when colliding
    pub penetration: f32,
    /// Contact points, empty when separated
    pub contacts: Vec<ContactPoint>,
    /// Hull that owns the reference feature
    pub reference: ReferenceHull,
    /// Axes evaluated to reach the result
    pub stats: SatStats,
}

impl ContactManifold {
    fn separated(stats: SatStats) -> Self {
        Self {
            stats,
            ..Self::default()
        }
    }

    /// Whether the hulls overlap
    pub fn is_colliding(&self) -> bool {
        self.collision_type.intersects(CollisionType::ANY)
    }

    /// Normal expressed from hull A toward hull B, whichever was reference
    pub fn normal_from_a(&self) -> Vec3 {
        match self.reference {
            ReferenceHull::A => self.normal,
            ReferenceHull::B => -self.normal,
        }
    }

    /// Deepest contact, or zero without contacts
    pub fn max_depth(&self) -> f32 {
        self.contacts.iter().map(|c| c.depth).fold(0.0, f32::max)
    }
}

/// SAT query with the default tolerances
pub fn intersect_convex_hulls_sat(
    hull_a: &ConvexHull,
    transform_a: &Transform,
    hull_b: &ConvexHull,
    transform_b: &Transform,
) -> ContactManifold {
    intersect_convex_hulls_sat_with_config(hull_a, transform_a, hull_b, transform_b, &SatConfig::default())
}

/// SAT query between two placed hulls
///
/// Both hulls must be closed and convex for the edge tests to be exact.
pub fn intersect_convex_hulls_sat_with_config(
    hull_a: &ConvexHull,
    transform_a: &Transform,
    hull_b: &ConvexHull,
    transform_b: &Transform,
    config: &SatConfig,
) -> ContactManifold {
    let a = WorldHull::new(hull_a, transform_a);
    let b = WorldHull::new(hull_b, transform_b);
    let mut stats = SatStats::default();

    let face_a = query_face_directions(&a, &b, &mut stats);
    if face_a.separation > 0.0 {
        return ContactManifold::separated(stats);
    }

    let face_b = query_face_directions(&b, &a, &mut stats);
    if face_b.separation > 0.0 {
        return ContactManifold::separated(stats);
    }

    let edge = query_edge_directions(&a, &b, config, &mut stats);
    if edge.as_ref().is_some_and(|edge| edge.separation > 0.0) {
        return ContactManifold::separated(stats);
    }

    let best_face_separation = face_a.separation.max(face_b.separation);
    match edge {
        Some(edge) if edge.separation > best_face_separation + config.edge_bias => {
            edge_contact(&a, &b, &edge, stats)
        }
        _ if face_b.separation > face_a.separation + config.face_bias => {
            face_contact(&b, &a, &face_b, ReferenceHull::B, config, stats)
        }
        _ => face_contact(&a, &b, &face_a, ReferenceHull::A, config, stats),
    }
}

/// Hull with its vertices and face normals moved into world space
struct WorldHull<'a> {
    hull: &'a ConvexHull,
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    centroid: Vec3,
}

impl<'a> WorldHull<'a> {
    fn new(hull: &'a ConvexHull, transform: &Transform) -> Self {
        Self {
            hull,
            vertices: hull.vertices().iter().map(|v| transform.transform_point(v)).collect(),
            normals: hull.faces().iter().map(|f| transform.transform_normal(&f.normal)).collect(),
            centroid: transform.transform_point(&hull.centroid()),
        }
    }

    fn vertex(&self, index: VertexIndex) -> Vec3 {
        self.vertices[usize::from(index)]
    }

    fn normal(&self, face: FaceIndex) -> Vec3 {
        self.normals[usize::from(face)]
    }

    fn face_plane(&self, face: FaceIndex) -> Plane {
        let anchor = self.hull.face(face).vertices[0];
        Plane::from_point_normal(self.vertex(anchor), self.normal(face))
    }

    fn edge_origin(&self, edge: EdgeIndex) -> Vec3 {
        self.vertex(self.hull.edge(edge).origin_vertex)
    }

    fn edge_segment(&self, edge: EdgeIndex) -> Segment {
        Segment::new(self.edge_origin(edge), self.vertex(self.hull.edge_destination(edge)))
    }

    /// Smallest projection of any vertex onto `direction`
    fn min_projection(&self, direction: &Vec3) -> f32 {
        self.vertices
            .iter()
            .map(|v| v.dot(direction))
            .fold(f32::INFINITY, f32::min)
    }
}

struct FaceQuery {
    face: FaceIndex,
    separation: f32,
}

struct EdgeQuery {
    edge_a: EdgeIndex,
    edge_b: EdgeIndex,
    axis: Vec3,
    separation: f32,
}

/// Largest separation of `other` along the face normals of `reference`
///
/// Returns as soon as a separating face is found.
fn query_face_directions(reference: &WorldHull, other: &WorldHull, stats: &mut SatStats) -> FaceQuery {
    let mut best = FaceQuery {
        face: 0,
        separation: f32::NEG_INFINITY,
    };

    for face in 0..reference.normals.len() {
        let face = face as FaceIndex;
        stats.face_axes_tested += 1;

        let plane = reference.face_plane(face);
        let separation = other.min_projection(&plane.normal) - plane.distance;
        if separation > best.separation {
            best = FaceQuery { face, separation };
            if separation > 0.0 {
                break;
            }
        }
    }
    best
}

/// Largest separation along cross products of Minkowski-face edge pairs
///
/// Boundary edges are skipped, they have no Gauss-map arc.
fn query_edge_directions(
    a: &WorldHull,
    b: &WorldHull,
    config: &SatConfig,
    stats: &mut SatStats,
) -> Option<EdgeQuery> {
    let mut best: Option<EdgeQuery> = None;

    for edge_a in a.hull.unique_edges() {
        let Some(twin_a) = a.hull.edge(edge_a).twin_edge else {
            continue;
        };
        let normal_a1 = a.normal(a.hull.edge(edge_a).face);
        let normal_a2 = a.normal(a.hull.edge(twin_a).face);
        let segment_a = a.edge_segment(edge_a);
        let direction_a = segment_a.end - segment_a.start;

        for edge_b in b.hull.unique_edges() {
            let Some(twin_b) = b.hull.edge(edge_b).twin_edge else {
                continue;
            };
            let normal_b1 = b.normal(b.hull.edge(edge_b).face);
            let normal_b2 = b.normal(b.hull.edge(twin_b).face);

            if !is_minkowski_face(&normal_a1, &normal_a2, &-normal_b1, &-normal_b2) {
                continue;
            }

            let segment_b = b.edge_segment(edge_b);
            let direction_b = segment_b.end - segment_b.start;

            let axis = direction_a.cross(&direction_b);
            let length_squared = axis.norm_squared();
            // Parallel edges: the face tests already cover this direction
            if length_squared < config.parallel_epsilon * direction_a.norm_squared() * direction_b.norm_squared() {
                continue;
            }
            stats.edge_axes_tested += 1;

            let mut axis = axis / length_squared.sqrt();
            if axis.dot(&(segment_a.start - a.centroid)) < 0.0 {
                axis = -axis;
            }

            let separation = axis.dot(&(segment_b.start - segment_a.start));
            if best.as_ref().map_or(true, |best| separation > best.separation) {
                best = Some(EdgeQuery { edge_a, edge_b, axis, separation });
                if separation > 0.0 {
                    return best;
                }
            }
        }
    }
    best
}

/// Whether the arcs `a-b` and `c-d` on the unit sphere intersect
///
/// `a`, `b` are the normals adjacent to an edge of A; `c`, `d` the negated
/// normals adjacent to an edge of B.
fn is_minkowski_face(a: &Vec3, b: &Vec3, c: &Vec3, d: &Vec3) -> bool {
    let b_x_a = b.cross(a);
    let d_x_c = d.cross(c);

    let cba = c.dot(&b_x_a);
    let dba = d.dot(&b_x_a);
    let adc = a.dot(&d_x_c);
    let bdc = b.dot(&d_x_c);

    cba * dba < 0.0 && adc * bdc < 0.0 && cba * bdc > 0.0
}

#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    position: Vec3,
    feature: ContactFeature,
}

fn face_contact(
    reference: &WorldHull,
    incident: &WorldHull,
    query: &FaceQuery,
    which: ReferenceHull,
    config: &SatConfig,
    stats: SatStats,
) -> ContactManifold {
    let reference_plane = reference.face_plane(query.face);
    let reference_normal = reference_plane.normal;

    // Most anti-parallel face of the incident hull
    let incident_face = (0..incident.normals.len())
        .map(|face| face as FaceIndex)
        .min_by(|&x, &y| {
            incident
                .normal(x)
                .dot(&reference_normal)
                .total_cmp(&incident.normal(y).dot(&reference_normal))
        })
        .unwrap_or_default();

    let mut polygon: Vec<ClipVertex> = incident
        .hull
        .face(incident_face)
        .vertices
        .iter()
        .map(|&vertex| ClipVertex {
            position: incident.vertex(vertex),
            feature: ContactFeature {
                reference: FeatureId::Face(query.face),
                incident: FeatureId::Vertex(vertex),
            },
        })
        .collect();

    for &edge in &reference.hull.face(query.face).edges {
        let side_plane = match reference.hull.edge(edge).twin_edge {
            Some(twin) => reference.face_plane(reference.hull.edge(twin).face),
            None => {
                let segment = reference.edge_segment(edge);
                let outward = (segment.end - segment.start).cross(&reference_normal).normalize();
                Plane::from_point_normal(segment.start, outward)
            }
        };
        polygon = clip_polygon(&polygon, &side_plane, edge, incident_face);
        if polygon.is_empty() {
            break;
        }
    }

    let contacts: Vec<ContactPoint> = polygon
        .into_iter()
        .filter_map(|vertex| {
            let distance = reference_plane.signed_distance(&vertex.position);
            (distance <= config.contact_tolerance).then_some(ContactPoint {
                position: vertex.position,
                depth: -distance,
                feature: vertex.feature,
            })
        })
        .collect();

    if contacts.is_empty() {
        log::trace!("Face contact on face {} clipped away every incident point", query.face);
    }

    ContactManifold {
        collision_type: CollisionType::FACE,
        normal: reference_normal,
        penetration: -query.separation,
        contacts,
        reference: which,
        stats,
    }
}

/// Sutherland-Hodgman step keeping the part of `polygon` behind `plane`
fn clip_polygon(
    polygon: &[ClipVertex],
    plane: &Plane,
    clip_edge: EdgeIndex,
    incident_face: FaceIndex,
) -> Vec<ClipVertex> {
    let mut output = Vec::with_capacity(polygon.len() + 1);

    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let current_distance = plane.signed_distance(&current.position);
        let next_distance = plane.signed_distance(&next.position);

        if current_distance <= 0.0 {
            output.push(*current);
        }
        if (current_distance <= 0.0) != (next_distance <= 0.0) {
            let fraction = current_distance / (current_distance - next_distance);
            output.push(ClipVertex {
                position: current.position + (next.position - current.position) * fraction,
                feature: ContactFeature {
                    reference: FeatureId::Edge(clip_edge),
                    incident: FeatureId::Face(incident_face),
                },
            });
        }
    }
    output
}

fn edge_contact(a: &WorldHull, b: &WorldHull, query: &EdgeQuery, stats: SatStats) -> ContactManifold {
    let (on_a, on_b) = a
        .edge_segment(query.edge_a)
        .closest_points(&b.edge_segment(query.edge_b));

    ContactManifold {
        collision_type: CollisionType::EDGE,
        normal: query.axis,
        penetration: -query.separation,
        contacts: vec![ContactPoint {
            position: (on_a + on_b) * 0.5,
            depth: -query.separation,
            feature: ContactFeature {
                reference: FeatureId::Edge(query.edge_a),
                incident: FeatureId::Edge(query.edge_b),
            },
        }],
        reference: ReferenceHull::A,
        stats,
    }
}
