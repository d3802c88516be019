//! Headless driver for the dot evasion engine: cursor bots, session runner,
//! dataset/telemetry writers, and a parallel metrics sweep.

pub mod cursors;
pub mod dataset;
pub mod runner;
pub mod strategies;
pub mod sweep;
