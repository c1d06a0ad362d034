use tracing::{debug, error, warn};

use crate::error::{
    ClassifyError, GeometryError, InvariantViolation, PreconditionError, Result, TopologyError,
};
use crate::math::{point_segment_proximity, Point3, Tolerance, ZERO_LENGTH};
use crate::topology::{
    EdgeUseId, FaceUseId, LoopChildren, LoopUseId, Model, Orientation, VertexUseId,
};

use super::Classification;

/// The boundary feature nearest to the query point so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Feature {
    Edge(EdgeUseId),
    Vertex(VertexUseId),
}

/// Closest-approach record carried through one face-local search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Neighbor {
    pub(crate) feature: Option<Feature>,
    pub(crate) dist: f64,
    pub(crate) class: Classification,
}

impl Neighbor {
    pub(crate) fn new() -> Self {
        Self {
            feature: None,
            dist: f64::MAX,
            class: Classification::Outside,
        }
    }
}

/// Classifies a point lying in the plane of a face against the area the
/// face encloses.
///
/// Returns `Inside`, `OnShared` (on a boundary edge or same-sense vertex
/// loop) or `Outside`. A point off the plane is logged and the search runs
/// anyway.
///
/// # Errors
///
/// Returns an error if the topology is corrupt or the loops around a
/// boundary edge disagree in orientation.
pub fn classify_point_in_face(
    model: &Model,
    point: &Point3,
    face_use: FaceUseId,
    tol: &Tolerance,
) -> Result<Classification> {
    classify_point_in_face_except(model, point, face_use, None, tol)
}

/// Like [`classify_point_in_face`], ignoring one loop and its mate.
///
/// # Errors
///
/// See [`classify_point_in_face`].
pub fn classify_point_in_face_except(
    model: &Model,
    point: &Point3,
    face_use: FaceUseId,
    ignore: Option<LoopUseId>,
    tol: &Tolerance,
) -> Result<Classification> {
    let mut closest = Neighbor::new();
    class_pt_face(model, point, face_use, ignore, &mut closest, tol)?;
    debug!(?face_use, class = %closest.class, feature = ?closest.feature, "point vs face");
    Ok(closest.class)
}

/// Classifies a point against a single face loop.
///
/// # Errors
///
/// Returns a precondition error if the loop does not bound a face or the
/// point is off the face plane, and an invariant violation if the
/// topology near the point is inconsistent.
pub fn classify_point_in_loop(
    model: &Model,
    point: &Point3,
    loop_use: LoopUseId,
    tol: &Tolerance,
) -> Result<Classification> {
    let face_use = model
        .face_use_of_loop(loop_use)?
        .ok_or(PreconditionError::NotFaceLoop(loop_use))?;
    let distance = model.face_use_plane(face_use)?.distance(point);
    if distance.abs() > tol.dist() {
        let err = PreconditionError::PointOffPlane {
            point: *point,
            face_use,
            distance,
        };
        warn!(%err, "point vs loop");
        return Err(err.into());
    }
    let mut closest = Neighbor::new();
    class_pt_loop(model, point, loop_use, &mut closest, tol)?;
    debug!(?loop_use, class = %closest.class, "point vs loop");
    Ok(closest.class)
}

/// Runs the face search into `closest`, so callers can share one record
/// across several queries.
pub(crate) fn class_pt_face(
    model: &Model,
    point: &Point3,
    face_use: FaceUseId,
    ignore: Option<LoopUseId>,
    closest: &mut Neighbor,
    tol: &Tolerance,
) -> Result<()> {
    let distance = model.face_use_plane(face_use)?.distance(point);
    if distance.abs() > tol.dist() {
        let err = PreconditionError::PointOffPlane {
            point: *point,
            face_use,
            distance,
        };
        warn!(%err, "classifying anyway");
    }

    let ignored = match ignore {
        Some(lu) => Some((lu, model.loop_use(lu)?.mate)),
        None => None,
    };
    for &lu in &model.face_use(face_use)?.loops {
        if ignored.is_some_and(|(a, b)| lu == a || lu == b) {
            continue;
        }
        class_pt_loop(model, point, lu, closest, tol)?;
        if closest.class == Classification::OnShared {
            break;
        }
    }
    Ok(())
}

/// Updates `closest` with the features of one face loop.
pub(crate) fn class_pt_loop(
    model: &Model,
    point: &Point3,
    loop_use: LoopUseId,
    closest: &mut Neighbor,
    tol: &Tolerance,
) -> Result<()> {
    let lu = model.loop_use(loop_use)?;
    if model.face_use_of_loop(loop_use)?.is_none() {
        return Ok(());
    }
    if !model.loop_data(lu.lp)?.bbox.contains(point, tol) {
        debug!(?loop_use, "point outside loop bounds");
        return Ok(());
    }

    match &lu.children {
        LoopChildren::Edges(edges) => {
            for &eu in edges {
                class_pt_edge(model, point, eu, closest, tol)?;
                if closest.class == Classification::OnShared {
                    break;
                }
            }
        }
        LoopChildren::Vertex(vu) => {
            let dist = (point - model.vertex_use_point(*vu)?).norm();
            if dist < closest.dist {
                closest.class = match lu.orientation {
                    Orientation::Same => Classification::OnShared,
                    Orientation::Opposite => Classification::Outside,
                    Orientation::Unspecified => {
                        error!(?loop_use, "vertex loop without orientation");
                        return Err(
                            InvariantViolation::BadOrientation(loop_use, lu.orientation).into()
                        );
                    }
                };
                closest.dist = dist;
                closest.feature = Some(Feature::Vertex(*vu));
            }
        }
    }
    Ok(())
}

/// Updates `closest` if `eu` is at least as near to the point.
fn class_pt_edge(
    model: &Model,
    point: &Point3,
    eu: EdgeUseId,
    closest: &mut Neighbor,
    tol: &Tolerance,
) -> Result<()> {
    let (start, end) = model.edge_use_points(eu)?;
    let prox = point_segment_proximity(point, &start, &end, &tol.strict());

    if prox.dist >= closest.dist + tol.dist() {
        return Ok(());
    }
    if prox.dist >= closest.dist - tol.dist()
        && matches!(
            closest.class,
            Classification::Inside | Classification::OnShared
        )
    {
        // tie with a prior inside verdict from a touching loop
        return Ok(());
    }

    if prox.is_on() {
        closest.class = joint_hitmiss(model, eu)?;
        closest.dist = 0.0;
        closest.feature = Some(Feature::Edge(eu));
        debug!(?eu, kind = ?prox.kind, class = %closest.class, "point on edge");
        return Ok(());
    }

    let left = model.left_vector(eu)?;
    let to_point = (point - prox.pca)
        .try_normalize(ZERO_LENGTH)
        .ok_or(GeometryError::ZeroVector)?;
    let dot = left.dot(&to_point);
    if dot.abs() < tol.perp() {
        // on the edge's line beyond its ends; a neighbouring edge decides
        return Ok(());
    }
    closest.class = if dot >= 0.0 {
        Classification::Inside
    } else {
        Classification::Outside
    };
    closest.dist = prox.dist;
    closest.feature = Some(Feature::Edge(eu));
    Ok(())
}

/// Resolves a point lying on an edge by comparing the loop orientation of
/// `eu` with that of the next face use around the edge.
fn joint_hitmiss(model: &Model, eu: EdgeUseId) -> Result<Classification> {
    let eur = model.face_radial(eu)?;
    if eur == eu {
        return Err(ClassifyError::Topology(TopologyError::InvalidTopology(
            "edge use is its own face radial".into(),
        )));
    }
    let this = loop_orientation(model, eu)?;
    let other = loop_orientation(model, eur)?;
    if this == other && this != Orientation::Unspecified {
        return Ok(Classification::OnShared);
    }
    error!(?eu, ?eur, %this, %other, "unable to resolve ray/edge hit");
    Err(InvariantViolation::RadialOrientation {
        edge_use: eu,
        radial: eur,
        this,
        other,
    }
    .into())
}

fn loop_orientation(model: &Model, eu: EdgeUseId) -> Result<Orientation> {
    let lu = model
        .loop_use_of(eu)?
        .ok_or_else(|| TopologyError::InvalidTopology("face edge use outside a loop".into()))?;
    Ok(model.loop_use(lu)?.orientation)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::fixtures::{holed_square, p, tetrahedron, unit_cube, vertices};
    use crate::operations::creation::{MakeFace, MakeFaceLoop};

    #[test]
    fn hole_wins_over_outer_loop() {
        let mut model = Model::new();
        let (_, fu) = holed_square(&mut model);
        let tol = Tolerance::default();

        let in_hole = classify_point_in_face(&model, &p(2.0, 1.5, 0.0), fu, &tol).unwrap();
        assert_eq!(in_hole, Classification::Outside);
        let between = classify_point_in_face(&model, &p(0.5, 3.0, 0.0), fu, &tol).unwrap();
        assert_eq!(between, Classification::Inside);
        let beyond = classify_point_in_face(&model, &p(5.0, 2.0, 0.0), fu, &tol).unwrap();
        assert_eq!(beyond, Classification::Outside);
    }

    #[test]
    fn boundary_points_are_on() {
        let mut model = Model::new();
        let (_, fu) = holed_square(&mut model);
        let tol = Tolerance::default();

        for q in [p(2.0, 0.0, 0.0), p(4.0, 4.0, 0.0), p(2.0, 1.0, 0.0), p(3.0, 1.0, 0.0)] {
            assert_eq!(
                classify_point_in_face(&model, &q, fu, &tol).unwrap(),
                Classification::OnShared,
                "{q:?}"
            );
        }
    }

    #[test]
    fn hole_edge_against_outer_loop_is_fatal() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let outer = vertices(
            &mut model,
            &[p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 4.0, 0.0), p(0.0, 4.0, 0.0)],
        );
        let fu = MakeFace::new(shell, outer).execute(&mut model).unwrap();
        let hole = vertices(&mut model, &[p(1.0, 1.0, 0.0), p(3.0, 1.0, 0.0), p(2.0, 3.0, 0.0)]);
        MakeFaceLoop::new(fu, hole.clone()).execute(&mut model).unwrap();
        // a wall standing on one hole edge, bounded by a Same outer loop
        let other = model.add_shell();
        let apex = model.add_vertex(p(2.0, 1.0, 2.0));
        MakeFace::new(other, vec![hole[0], hole[1], apex])
            .execute(&mut model)
            .unwrap();
        let tol = Tolerance::default();

        let err = classify_point_in_face(&model, &p(2.0, 1.0, 0.0), fu, &tol).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Invariant(InvariantViolation::RadialOrientation {
                this: Orientation::Opposite,
                other: Orientation::Same,
                ..
            })
        ));
        assert!(err.is_fatal());

        let inside = classify_point_in_face(&model, &p(0.5, 3.0, 0.0), fu, &tol).unwrap();
        assert_eq!(inside, Classification::Inside);
    }

    #[test]
    fn ignoring_the_hole() {
        let mut model = Model::new();
        let (_, fu) = holed_square(&mut model);
        let tol = Tolerance::default();
        let hole = model.face_use(fu).unwrap().loops[1];
        let hole_mate = model.loop_use(hole).unwrap().mate;

        let class =
            classify_point_in_face_except(&model, &p(2.0, 1.5, 0.0), fu, Some(hole_mate), &tol)
                .unwrap();
        assert_eq!(class, Classification::Inside);
    }

    #[test]
    fn opposite_face_use_agrees() {
        let mut model = Model::new();
        let (_, fu) = holed_square(&mut model);
        let tol = Tolerance::default();
        let mate = model.face_use(fu).unwrap().mate;

        assert_eq!(
            classify_point_in_face(&model, &p(0.5, 3.0, 0.0), mate, &tol).unwrap(),
            Classification::Inside
        );
        assert_eq!(
            classify_point_in_face(&model, &p(2.0, 1.5, 0.0), mate, &tol).unwrap(),
            Classification::Outside
        );
    }

    #[test]
    fn cube_face_classification() {
        let mut model = Model::new();
        let (_, cube) = unit_cube(&mut model);
        let tol = Tolerance::default();
        let right = cube.faces[5];

        let inside = classify_point_in_face(&model, &p(1.0, 0.8, 0.7), right, &tol).unwrap();
        assert_eq!(inside, Classification::Inside);
        let corner = classify_point_in_face(&model, &p(1.0, 1.0, 1.0), right, &tol).unwrap();
        assert_eq!(corner, Classification::OnShared);
        let outside = classify_point_in_face(&model, &p(1.0, 1.5, -0.5), right, &tol).unwrap();
        assert_eq!(outside, Classification::Outside);
    }

    #[test]
    fn vertex_loop_sense() {
        let mut model = Model::new();
        let shell = model.add_shell();
        let outer = vertices(
            &mut model,
            &[p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(4.0, 4.0, 0.0), p(0.0, 4.0, 0.0)],
        );
        let fu = MakeFace::new(shell, outer).execute(&mut model).unwrap();
        let dot = model.add_vertex(p(2.0, 2.0, 0.0));
        let lu = MakeFaceLoop::new(fu, vec![dot])
            .with_orientation(Orientation::Same)
            .execute(&mut model)
            .unwrap();
        let tol = Tolerance::default();

        let near = classify_point_in_face(&model, &p(2.0002, 2.0, 0.0), fu, &tol).unwrap();
        assert_eq!(near, Classification::OnShared);
        let alone = classify_point_in_loop(&model, &p(2.0, 2.0, 0.0), lu, &tol).unwrap();
        assert_eq!(alone, Classification::OnShared);
    }

    #[test]
    fn loop_query_preconditions() {
        let mut model = Model::new();
        let (_, fu) = holed_square(&mut model);
        let tol = Tolerance::default();
        let outer = model.face_use(fu).unwrap().loops[0];

        let err = classify_point_in_loop(&model, &p(1.0, 1.0, 0.5), outer, &tol).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Precondition(PreconditionError::PointOffPlane { .. })
        ));
        assert!(!err.is_fatal());

        // the outer loop alone does not see the hole
        let class = classify_point_in_loop(&model, &p(2.0, 1.5, 0.0), outer, &tol).unwrap();
        assert_eq!(class, Classification::Inside);
    }

    #[test]
    fn off_plane_point_still_classifies() {
        let mut model = Model::new();
        let shell = tetrahedron(&mut model);
        let tol = Tolerance::default();
        let slanted = model.shell(shell).unwrap().face_uses[6];

        let class = classify_point_in_face(&model, &p(0.3, 0.3, 0.3), slanted, &tol).unwrap();
        assert_eq!(class, Classification::Inside);
    }
}
