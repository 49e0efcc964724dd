pub mod config;
pub mod error;
pub mod join;
pub mod media;
pub mod pipeline;
pub mod segment;
pub mod silence;
pub mod speed;
pub mod workspace;

pub use config::Config;
pub use error::{JumpcutError, Result};
pub use media::{Ffmpeg, MediaTool};
pub use pipeline::{print_summary, JumpcutJob, Pipeline, PipelineResult, PipelineStats, Stage};
pub use workspace::Workspace;
