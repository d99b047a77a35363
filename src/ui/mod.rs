pub mod actors;
pub mod color;
pub mod compose;
