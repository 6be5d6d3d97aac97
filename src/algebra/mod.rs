//! Id collections used by the graph: [`Set`] and [`Map`]. Plain `Vec` serves as a sequence.

mod map;
mod set;

pub use map::Map;
pub use set::Set;
