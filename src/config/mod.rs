//! Configuration for the inference pipeline

mod pipeline;

pub use pipeline::{
    default_model_path, IntensityWeights, PipelineConfig, MODEL_PATH_ENV,
};
