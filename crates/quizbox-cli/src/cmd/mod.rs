pub mod results;
pub mod serve;
