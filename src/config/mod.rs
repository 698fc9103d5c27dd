//! Configuration objects passed explicitly into the pipeline.

pub mod options;
pub use options::{
    CoarseningOptions, LgmresOptions, PipelineConfig, PowerOptions, SvdOptions, ThreadConfig,
    ZeroRowPolicy,
};
