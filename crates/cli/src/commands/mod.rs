//! CLI command implementations

pub mod config;
pub mod doctor;
pub mod publish;
pub mod run;
pub mod schedule;
