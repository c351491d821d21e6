pub mod config;
pub mod dag;
pub mod dataset;
pub mod error;
pub mod load;

pub use config::PipelineConfig;
pub use error::PipelineError;
