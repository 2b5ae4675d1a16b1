pub mod config;
pub mod stats;
pub mod steps;
pub mod timer;
