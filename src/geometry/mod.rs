mod circle;
mod corridor;
mod quad;
mod room;
mod shape;

pub use circle::Circle;
pub use corridor::{Corridor, Endpoint};
pub use quad::Quad;
pub use room::{Room, RoomId, RoomShape};
pub use shape::Shape;
