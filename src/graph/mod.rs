mod candidates;
mod disjoint_set;
mod obstruction;
mod spanning;

pub use candidates::{CandidateGraph, CandidateMode, Edge};
pub use disjoint_set::DisjointSet;
pub use obstruction::{is_clear, ObstructionQuery, ShapeObstruction};
pub use spanning::SpanningForest;
