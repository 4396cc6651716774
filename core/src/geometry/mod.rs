pub mod bounds;
pub mod position;

pub use bounds::Bounds;
pub use position::Position;
