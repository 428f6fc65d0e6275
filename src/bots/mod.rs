mod arranger;
mod bot;
mod fish;
mod manager;
mod strategy;

pub use arranger::*;
pub use bot::*;
pub use fish::*;
pub use manager::*;
pub use strategy::*;
