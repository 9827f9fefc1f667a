pub mod activation;
pub mod classifier;
pub mod dtype;
pub mod error;
pub mod loss;
pub mod matrix;
pub mod net;
pub mod persist;
pub mod scoring;
pub mod util;
