pub mod detection;
pub mod results;
