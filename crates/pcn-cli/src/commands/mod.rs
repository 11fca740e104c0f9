pub mod algorithms;
pub mod analyze;
