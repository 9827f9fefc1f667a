pub mod doodles;
