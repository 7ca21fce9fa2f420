pub mod cache;
pub mod composer;
pub mod config;
pub mod error;
pub mod headline;
pub mod io;
pub mod markup;
pub mod metadata;
pub mod paths;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod selector;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Result, VigilError};
