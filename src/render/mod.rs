pub mod animator;
pub mod color;
pub mod visibility;
