pub mod catalog;
pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod plan;
pub mod render;

pub use error::PlanError;
