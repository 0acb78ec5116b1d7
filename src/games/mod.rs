pub mod game;
pub mod market;
pub mod nash;
