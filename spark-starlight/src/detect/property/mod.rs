pub mod direction;
pub mod distance;
