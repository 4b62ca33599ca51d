pub mod predict;
pub mod simulate;
