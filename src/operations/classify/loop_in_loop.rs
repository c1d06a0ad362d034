use tracing::debug;

use crate::error::{PreconditionError, Result};
use crate::math::Tolerance;
use crate::topology::{FaceUseId, LoopChildren, LoopUseId, Model, Orientation, VertexId};

use super::point_in_face::{class_pt_loop, Neighbor};
use super::Classification;

/// Classifies loop `lu1` against the area bounded by loop `lu2` of the same
/// face.
///
/// Loops running through the same vertices, in either direction, are
/// `OnShared`. Otherwise the vertices of `lu1` are tested in turn and the
/// first one not on `lu2` decides.
///
/// # Errors
///
/// Returns a precondition error if either loop bounds no face or the loops
/// lie in different faces.
pub fn classify_loop_in_loop(
    model: &Model,
    lu1: LoopUseId,
    lu2: LoopUseId,
    tol: &Tolerance,
) -> Result<Classification> {
    if lu1 == lu2 || lu1 == model.loop_use(lu2)?.mate {
        return Ok(Classification::OnShared);
    }
    let fu1 = face_use(model, lu1)?;
    let fu2 = face_use(model, lu2)?;
    if model.face_use(fu1)?.face != model.face_use(fu2)?.face {
        return Err(PreconditionError::LoopsInDifferentFaces(lu1, lu2).into());
    }

    let c1 = &model.loop_use(lu1)?.children;
    let c2 = &model.loop_use(lu2)?.children;
    match (c1, c2) {
        (LoopChildren::Vertex(a), LoopChildren::Vertex(b)) => {
            let same = model.vertex_use(*a)?.vertex == model.vertex_use(*b)?.vertex;
            return Ok(if same {
                Classification::OnShared
            } else {
                Classification::Outside
            });
        }
        (LoopChildren::Vertex(vu), _) => {
            let mut closest = Neighbor::new();
            class_pt_loop(model, &model.vertex_use_point(*vu)?, lu2, &mut closest, tol)?;
            return Ok(closest.class);
        }
        (LoopChildren::Edges(_), LoopChildren::Edges(_)) => {
            let cycle1 = loop_vertices(model, lu1)?;
            let cycle2 = loop_vertices(model, lu2)?;
            if same_cycle(&cycle1, &cycle2) {
                debug!(?lu1, ?lu2, "loops share every vertex");
                return Ok(Classification::OnShared);
            }
        }
        (LoopChildren::Edges(_), LoopChildren::Vertex(_)) => {}
    }

    for v in loop_vertices(model, lu1)? {
        let mut closest = Neighbor::new();
        class_pt_loop(model, &model.vertex(v)?.point, lu2, &mut closest, tol)?;
        if closest.class != Classification::OnShared {
            return Ok(closest.class);
        }
    }
    Ok(Classification::OnShared)
}

/// Classifies a loop against the area bounded by the other loops of its
/// face.
///
/// Loops with neither `Same` nor `Opposite` orientation are skipped. A
/// vertex of `lu` found on another loop says nothing, so the next vertex is
/// tried; a loop lying wholly on the others is `OnShared`.
///
/// # Errors
///
/// Returns [`PreconditionError::NotFaceLoop`] if `lu` bounds no face.
pub fn classify_loop_in_face(model: &Model, lu: LoopUseId, tol: &Tolerance) -> Result<Classification> {
    let fu = face_use(model, lu)?;
    let mate = model.loop_use(lu)?.mate;
    let others: Vec<LoopUseId> = model
        .face_use(fu)?
        .loops
        .iter()
        .copied()
        .filter(|&other| other != lu && other != mate)
        .collect();

    let mut class = Classification::Outside;
    'vertices: for v in loop_vertices(model, lu)? {
        let point = model.vertex(v)?.point;
        let mut closest = Neighbor::new();
        for &other in &others {
            let orientation = model.loop_use(other)?.orientation;
            if !matches!(orientation, Orientation::Same | Orientation::Opposite) {
                debug!(?lu, ?other, %orientation, "skipping loop");
                continue;
            }
            class_pt_loop(model, &point, other, &mut closest, tol)?;
            if closest.class == Classification::OnShared {
                class = Classification::OnShared;
                continue 'vertices;
            }
        }
        class = closest.class;
        break;
    }
    debug!(?lu, ?fu, %class, "loop vs face");
    Ok(class)
}

fn face_use(model: &Model, lu: LoopUseId) -> Result<FaceUseId> {
    Ok(model
        .face_use_of_loop(lu)?
        .ok_or(PreconditionError::NotFaceLoop(lu))?)
}

fn loop_vertices(model: &Model, lu: LoopUseId) -> Result<Vec<VertexId>> {
    match &model.loop_use(lu)?.children {
        LoopChildren::Vertex(vu) => Ok(vec![model.vertex_use(*vu)?.vertex]),
        LoopChildren::Edges(edges) => {
            let mut out = Vec::with_capacity(edges.len());
            for &eu in edges {
                out.push(model.edge_use_start(eu)?);
            }
            Ok(out)
        }
    }
}

/// Whether two vertex cycles match, forwards or backwards, from any start.
fn same_cycle(a: &[VertexId], b: &[VertexId]) -> bool {
    if a.len() != b.len() || a.is_empty() {
        return false;
    }
    let Some(offset) = b.iter().position(|&v| v == a[0]) else {
        return false;
    };
    let len = b.len();
    let forward = (0..len).all(|i| a[i] == b[(offset + i) % len]);
    let backward = (0..len).all(|i| a[i] == b[(offset + len - i) % len]);
    forward || backward
}
