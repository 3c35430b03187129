//! A grid-based Pac-Man game driven by a lock-counted cooperative scheduler.

pub mod components;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod level;
pub mod map;
pub mod objects;
pub mod player;
pub mod scheduler;
