pub mod quiz;
pub mod serve;
