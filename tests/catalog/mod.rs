pub mod definitions;
pub mod dependencies;
