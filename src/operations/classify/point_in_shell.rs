use tracing::{debug, error, instrument, warn};

use crate::error::{InvariantViolation, Result};
use crate::math::{LinePlaneRelation, PlaneEquation, Point3, Tolerance, Vector3};
use crate::topology::{FaceUseId, Model, Orientation, ShellId};

use super::point_in_face::classify_point_in_face;
use super::Classification;

/// Probe directions for the parity ray cast, tried in order.
///
/// The first two avoid the coordinate axes and diagonals that boxy models
/// tend to line up with.
static PROBE_DIRECTIONS: [[f64; 3]; 10] = [
    [3.0, 2.0, 1.0],
    [-3.0, -2.0, -1.0],
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [-1.0, 0.0, 0.0],
    [0.0, -1.0, 0.0],
    [0.0, 0.0, -1.0],
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, -1.0],
];

/// Number of probe directions, and so of ray cast attempts.
pub const PROBE_COUNT: usize = PROBE_DIRECTIONS.len();

fn probe_direction(index: usize) -> Vector3 {
    let [x, y, z] = PROBE_DIRECTIONS[index % PROBE_COUNT];
    Vector3::new(x, y, z).normalize()
}

/// Options for [`classify_point_in_shell_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RayCastOptions {
    /// Index of the first probe direction to try; later attempts continue
    /// from there and wrap around.
    pub first_direction: usize,
}

impl RayCastOptions {
    /// Starts the ray cast at the given probe direction.
    #[must_use]
    pub fn starting_at(first_direction: usize) -> Self {
        Self { first_direction }
    }
}

/// Classifies a point against the volume a shell encloses.
///
/// # Errors
///
/// Returns [`InvariantViolation::RayUnresolved`] if every probe direction
/// grazes an edge or lies in a face, and other errors if the topology is
/// corrupt.
pub fn classify_point_in_shell(
    model: &Model,
    point: &Point3,
    shell: ShellId,
    tol: &Tolerance,
) -> Result<Classification> {
    classify_point_in_shell_with(model, point, shell, tol, &RayCastOptions::default())
}

/// [`classify_point_in_shell`] with explicit ray cast options.
///
/// A point on any outward face is `OnShared`. Otherwise a ray is cast and
/// the faces it crosses are counted: odd is `Inside`, even `Outside`.
/// Faces not enclosing volume are left out of the count.
///
/// # Errors
///
/// See [`classify_point_in_shell`].
#[instrument(skip(model, point, tol, options), fields(x = point.x, y = point.y, z = point.z))]
pub fn classify_point_in_shell_with(
    model: &Model,
    point: &Point3,
    shell: ShellId,
    tol: &Tolerance,
    options: &RayCastOptions,
) -> Result<Classification> {
    let data = model.shell(shell)?;
    if !data.bbox.contains(point, tol) {
        debug!("outside shell bounds");
        return Ok(Classification::Outside);
    }

    let mut faces = Vec::with_capacity(data.face_uses.len() / 2);
    for &fu in &data.face_uses {
        if model.face_use(fu)?.orientation != Orientation::Same {
            continue;
        }
        let plane = model.face_use_plane(fu)?;
        if plane.distance(point).abs() <= tol.dist() {
            let class = classify_point_in_face(model, point, fu, tol)?;
            if matches!(class, Classification::Inside | Classification::OnShared) {
                debug!(?fu, "point lies on a face");
                return Ok(Classification::OnShared);
            }
        }
        if model.is_dangling(fu)? {
            debug!(?fu, "dangling face left out of ray cast");
            continue;
        }
        faces.push((fu, plane));
    }

    ray_parity(model, point, &faces, data.bbox.diagonal(), options.first_direction, tol)
}

/// Casts rays from `point` over the probe table, starting at `first`,
/// until one crosses `faces` without grazing any of them.
fn ray_parity(
    model: &Model,
    point: &Point3,
    faces: &[(FaceUseId, PlaneEquation)],
    region: f64,
    first: usize,
    tol: &Tolerance,
) -> Result<Classification> {
    for attempt in 0..PROBE_COUNT {
        let index = (first + attempt) % PROBE_COUNT;
        let dir = probe_direction(index);
        match cast_ray(model, point, &dir, faces, region, tol)? {
            RayHits::Count(hits) => {
                let class = if hits % 2 == 1 {
                    Classification::Inside
                } else {
                    Classification::Outside
                };
                debug!(index, hits, %class, "ray cast");
                return Ok(class);
            }
            RayHits::Grazed(fu) => {
                warn!(index, ?fu, "ray grazed the boundary, trying next direction");
            }
        }
    }

    error!(attempts = PROBE_COUNT, "no probe direction gave a clean ray");
    Err(InvariantViolation::RayUnresolved {
        point: *point,
        attempts: PROBE_COUNT,
    }
    .into())
}

enum RayHits {
    Count(usize),
    Grazed(FaceUseId),
}

fn cast_ray(
    model: &Model,
    origin: &Point3,
    dir: &Vector3,
    faces: &[(FaceUseId, PlaneEquation)],
    region: f64,
    tol: &Tolerance,
) -> Result<RayHits> {
    let mut hits = 0;
    for &(fu, ref plane) in faces {
        match plane.intersect_line(origin, dir, tol) {
            LinePlaneRelation::Parallel => {}
            LinePlaneRelation::OnPlane => return Ok(RayHits::Grazed(fu)),
            LinePlaneRelation::Point { point, t } => {
                if t < 0.0 || t > region {
                    continue;
                }
                match classify_point_in_face(model, &point, fu, tol)? {
                    Classification::Inside => hits += 1,
                    Classification::OnShared => return Ok(RayHits::Grazed(fu)),
                    Classification::Outside | Classification::OnAnti => {}
                }
            }
        }
    }
    Ok(RayHits::Count(hits))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClassifyError;
    use crate::operations::creation::fixtures::{p, tetrahedron, unit_cube, vertices};
    use crate::operations::creation::MakeFace;
    use approx::assert_relative_eq;

    #[test]
    fn probe_table_is_unit_length() {
        for i in 0..PROBE_COUNT {
            assert_relative_eq!(probe_direction(i).norm(), 1.0);
        }
        assert_relative_eq!(probe_direction(PROBE_COUNT).x, probe_direction(0).x);
    }

    #[test]
    fn unit_cube_scenario() {
        let mut model = Model::new();
        let (shell, _) = unit_cube(&mut model);
        let tol = Tolerance::default();
        let classify = |q: Point3| classify_point_in_shell(&model, &q, shell, &tol).unwrap();

        assert_eq!(classify(p(0.5, 0.5, 0.5)), Classification::Inside);
        assert_eq!(classify(p(2.0, 0.5, 0.5)), Classification::Outside);
        assert_eq!(classify(p(0.0, 0.5, 0.5)), Classification::OnShared);
    }

    #[test]
    fn vertices_are_on_the_shell() {
        let mut model = Model::new();
        let (shell, cube) = unit_cube(&mut model);
        let tol = Tolerance::default();
        for &v in &cube.corners {
            let point = model.vertex(v).unwrap().point;
            assert_eq!(
                classify_point_in_shell(&model, &point, shell, &tol).unwrap(),
                Classification::OnShared
            );
        }
    }

    #[test]
    fn points_inside_the_bounds_but_outside_the_volume() {
        let mut model = Model::new();
        let shell = tetrahedron(&mut model);
        let tol = Tolerance::default();
        for q in [p(0.6, 0.6, 0.6), p(0.9, 0.9, 0.1), p(0.1, 0.45, 0.9)] {
            assert_eq!(
                classify_point_in_shell(&model, &q, shell, &tol).unwrap(),
                Classification::Outside,
                "{q:?}"
            );
        }
        assert_eq!(
            classify_point_in_shell(&model, &p(0.2, 0.2, 0.2), shell, &tol).unwrap(),
            Classification::Inside
        );
    }

    #[test]
    fn parity_does_not_depend_on_first_direction() {
        let mut model = Model::new();
        let (cube, _) = unit_cube(&mut model);
        let tetra = tetrahedron(&mut model);
        let tol = Tolerance::default();

        for first in 0..PROBE_COUNT {
            let options = RayCastOptions::starting_at(first);
            let inside =
                classify_point_in_shell_with(&model, &p(0.5, 0.5, 0.5), cube, &tol, &options)
                    .unwrap();
            assert_eq!(inside, Classification::Inside, "start {first}");
            let outside =
                classify_point_in_shell_with(&model, &p(0.6, 0.6, 0.6), tetra, &tol, &options)
                    .unwrap();
            assert_eq!(outside, Classification::Outside, "start {first}");
        }
    }

    #[test]
    fn dangling_faces_are_not_counted() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let c = vertices(
            &mut model,
            &[
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(1.0, 1.0, 0.0),
                p(0.0, 0.0, 1.0),
                p(1.0, 0.0, 1.0),
                p(0.0, 1.0, 1.0),
                p(1.0, 1.0, 1.0),
            ],
        );
        // a box without its top
        for outline in [[0, 2, 3, 1], [0, 1, 5, 4], [2, 6, 7, 3], [0, 4, 6, 2], [1, 3, 7, 5]] {
            MakeFace::new(shell, outline.iter().map(|&i| c[i]).collect())
                .execute(&mut model)
                .unwrap();
        }
        let tol = Tolerance::default();

        assert_eq!(
            classify_point_in_shell(&model, &p(0.5, 0.5, 0.5), shell, &tol).unwrap(),
            Classification::Outside
        );
        assert_eq!(
            classify_point_in_shell(&model, &p(1.0, 0.5, 0.5), shell, &tol).unwrap(),
            Classification::OnShared
        );
    }

    #[test]
    fn grazing_every_direction_is_unresolved() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let origin = p(0.0, 0.0, 0.0);
        // one triangle per direction, lying in a plane through its ray
        let mut faces = Vec::with_capacity(PROBE_COUNT);
        for i in 0..PROBE_COUNT {
            let dir = probe_direction(i);
            let side = if dir.z.abs() > 0.9 { Vector3::x() } else { Vector3::z() };
            let across = dir.cross(&side).normalize();
            let corners = vertices(
                &mut model,
                &[origin + dir * 2.0, origin + dir * 3.0, origin + dir * 2.0 + across],
            );
            let fu = MakeFace::new(shell, corners).execute(&mut model).unwrap();
            faces.push((fu, model.face_use_plane(fu).unwrap()));
        }
        let tol = Tolerance::default();

        for i in 0..PROBE_COUNT {
            let hits = cast_ray(&model, &origin, &probe_direction(i), &faces, 10.0, &tol).unwrap();
            assert!(matches!(hits, RayHits::Grazed(_)), "direction {i}");
        }
        let err = ray_parity(&model, &origin, &faces, 10.0, 3, &tol).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Invariant(InvariantViolation::RayUnresolved {
                attempts: PROBE_COUNT,
                ..
            })
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn empty_shell_is_outside() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let class = classify_point_in_shell(&model, &p(0.0, 0.0, 0.0), shell, &Tolerance::default());
        assert_eq!(class.unwrap(), Classification::Outside);
        assert!(matches!(
            classify_point_in_shell(&model, &p(0.0, 0.0, 0.0), ShellId::default(), &Tolerance::default()),
            Err(ClassifyError::Topology(_))
        ));
    }
}
