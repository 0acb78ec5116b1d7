pub mod agent;
pub mod memory;
pub mod report;
pub mod simulator;
pub mod state;
pub mod utils;
