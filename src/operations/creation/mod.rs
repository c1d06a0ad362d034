mod make_box;
mod make_face;
mod make_wire;

pub use make_box::{BoxShell, MakeBox};
pub use make_face::{MakeFace, MakeFaceLoop};
pub use make_wire::{MakeLoneVertex, MakeWireEdge, MakeWireLoop};
