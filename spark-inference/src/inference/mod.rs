pub mod depth;
pub mod detect;
pub mod replay;
