pub mod score;
pub mod select;
