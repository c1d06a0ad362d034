use tracing::{debug, error};

use crate::error::{InvariantViolation, Result, TopologyError};
use crate::topology::{EdgeUseId, LoopChildren, LoopUseId, Model};

/// How two loops sharing an edge relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopIdentity {
    /// The loops visit different vertices.
    NotIdentical,
    /// Same vertex cycle, and the faces point the same way.
    Shared,
    /// Same vertex cycle, and the faces point opposite ways.
    AntiShared,
    /// Same vertex cycle, but at least one loop bounds no face.
    Wire,
}

/// Decides whether the loops holding `eu1` and `eu2` run through the same
/// cycle of vertices, and if so how their faces are oriented.
///
/// Only the raw face orientations count. Faces on one plane record are
/// compared by their flip flags; otherwise the face normals are compared.
///
/// # Errors
///
/// Returns an invariant violation if the uses are on different edges or
/// do not share end vertices, and a topology error if either use is not
/// in a loop.
pub fn loops_identical(model: &Model, eu1: EdgeUseId, eu2: EdgeUseId) -> Result<LoopIdentity> {
    if model.edge_use(eu1)?.edge != model.edge_use(eu2)?.edge {
        error!(?eu1, ?eu2, "loop identity asked about different edges");
        return Err(InvariantViolation::DifferingEdges(eu1, eu2).into());
    }

    let start = model.edge_use_start(eu1)?;
    let mut eu2 = eu2;
    if model.edge_use_start(eu2)? != start {
        eu2 = model.mate(eu2)?;
        if model.edge_use_start(eu2)? != start {
            error!(?eu1, ?eu2, "radial edge uses do not share vertices");
            return Err(InvariantViolation::RadialVertexMismatch(eu1, eu2).into());
        }
    }

    let lu1 = parent_loop(model, eu1)?;
    let lu2 = parent_loop(model, eu2)?;
    let len = loop_len(model, lu1)?;
    if len != loop_len(model, lu2)? {
        return Ok(LoopIdentity::NotIdentical);
    }
    let (mut a, mut b) = (eu1, eu2);
    for _ in 0..len {
        if model.edge_use_start(a)? != model.edge_use_start(b)? {
            return Ok(LoopIdentity::NotIdentical);
        }
        a = model.next_in_loop(a)?;
        b = model.next_in_loop(b)?;
    }

    let (Some(fu1), Some(fu2)) = (model.face_use_of_loop(lu1)?, model.face_use_of_loop(lu2)?)
    else {
        return Ok(LoopIdentity::Wire);
    };
    let f1 = model.face_use(fu1)?.face;
    let f2 = model.face_use(fu2)?.face;
    let (face1, face2) = (model.face(f1)?, model.face(f2)?);

    let identity = if face1.geometry == face2.geometry {
        if face1.flip == face2.flip {
            LoopIdentity::Shared
        } else {
            LoopIdentity::AntiShared
        }
    } else {
        debug!(?lu1, ?lu2, "identical loops on separate plane records");
        if model.face_normal(f1)?.dot(&model.face_normal(f2)?) < 0.0 {
            LoopIdentity::AntiShared
        } else {
            LoopIdentity::Shared
        }
    };
    debug!(?lu1, ?lu2, ?identity, "loops identical");
    Ok(identity)
}

fn parent_loop(model: &Model, eu: EdgeUseId) -> Result<LoopUseId> {
    Ok(model
        .loop_use_of(eu)?
        .ok_or_else(|| TopologyError::InvalidTopology("wire edge has no loop".into()))?)
}

fn loop_len(model: &Model, lu: LoopUseId) -> Result<usize> {
    match &model.loop_use(lu)?.children {
        LoopChildren::Edges(edges) => Ok(edges.len()),
        LoopChildren::Vertex(_) => Err(TopologyError::InvalidTopology(
            "edge use parent loop holds a vertex".into(),
        )
        .into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ClassifyError;
    use crate::operations::creation::fixtures::{cube_with_pyramid, glued_cubes, p, unit_cube, vertices};
    use crate::operations::creation::{MakeFace, MakeWireLoop};
    use crate::topology::FaceUseId;

    fn first_edge_use(model: &Model, fu: FaceUseId) -> EdgeUseId {
        let lu = model.face_use(fu).unwrap().loops[0];
        let LoopChildren::Edges(edges) = &model.loop_use(lu).unwrap().children else {
            panic!("expected an edge loop");
        };
        edges[0]
    }

    #[test]
    fn glued_faces_are_anti_shared() {
        let mut model = Model::new();
        let (_, left, b, right) = glued_cubes(&mut model);
        let eu = first_edge_use(&model, left.faces[5]);
        let edge = model.edge_use(eu).unwrap().edge;
        let glued = model.face_use(right.faces[4]).unwrap().face;

        let uses = model.edge(edge).unwrap().uses.clone();
        for other in uses {
            if model.shell_of_edge_use(other).unwrap() != b {
                continue;
            }
            let identity = loops_identical(&model, eu, other).unwrap();
            let fu = model.face_use_of(other).unwrap().unwrap();
            if model.face_use(fu).unwrap().face == glued {
                assert_eq!(identity, LoopIdentity::AntiShared);
            } else {
                assert_eq!(identity, LoopIdentity::NotIdentical);
            }
        }
    }

    #[test]
    fn shared_plane_record_compares_flip() {
        let mut model = Model::new();
        let (cube, _, base) = cube_with_pyramid(&mut model);
        let eu = first_edge_use(&model, base);
        let edge = model.edge_use(eu).unwrap().edge;

        let uses = model.edge(edge).unwrap().uses.clone();
        let mut seen = Vec::new();
        for other in uses {
            if model.shell_of_edge_use(other).unwrap() != cube {
                continue;
            }
            seen.push(loops_identical(&model, eu, other).unwrap());
        }
        assert!(seen.contains(&LoopIdentity::Shared));
        assert!(seen.contains(&LoopIdentity::NotIdentical));
        assert!(!seen.contains(&LoopIdentity::AntiShared));
    }

    #[test]
    fn flipped_plane_record_is_anti_shared() {
        let mut model = Model::new();
        let a = model.add_shell();
        let b = model.add_shell();
        let verts = vertices(
            &mut model,
            &[p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)],
        );
        let fa = MakeFace::new(a, verts.clone()).execute(&mut model).unwrap();
        let geometry = model.face(model.face_use(fa).unwrap().face).unwrap().geometry;
        MakeFace::new(b, verts)
            .on_geometry(geometry, true)
            .execute(&mut model)
            .unwrap();

        let eu = first_edge_use(&model, fa);
        let edge = model.edge_use(eu).unwrap().edge;
        let other = model
            .edge(edge)
            .unwrap()
            .uses
            .iter()
            .copied()
            .find(|&u| model.shell_of_edge_use(u).unwrap() == b)
            .unwrap();
        let identity = loops_identical(&model, eu, other).unwrap();
        assert_eq!(identity, LoopIdentity::AntiShared);
    }

    #[test]
    fn wire_loop_over_a_face() {
        let mut model = Model::new();
        let a = model.add_shell();
        let b = model.add_shell();
        let verts = vertices(&mut model, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)]);
        let fu = MakeFace::new(a, verts.clone()).execute(&mut model).unwrap();
        let wire = MakeWireLoop::new(b, verts).execute(&mut model).unwrap();
        let LoopChildren::Edges(edges) = &model.loop_use(wire).unwrap().children else {
            panic!("expected an edge loop");
        };

        let identity = loops_identical(&model, first_edge_use(&model, fu), edges[0]).unwrap();
        assert_eq!(identity, LoopIdentity::Wire);
    }

    #[test]
    fn differing_edges_are_fatal() {
        let mut model = Model::new();
        let (_, cube) = unit_cube(&mut model);
        let lu = model.face_use(cube.faces[0]).unwrap().loops[0];
        let LoopChildren::Edges(edges) = model.loop_use(lu).unwrap().children.clone() else {
            panic!("expected an edge loop");
        };

        let err = loops_identical(&model, edges[0], edges[1]).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::Invariant(InvariantViolation::DifferingEdges(..))
        ));
        assert!(err.is_fatal());
    }
}
