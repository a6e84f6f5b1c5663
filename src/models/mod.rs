// Re-export all model types from submodules
mod share;

pub use share::*;
