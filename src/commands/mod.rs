pub mod extract;
pub mod quiz;
