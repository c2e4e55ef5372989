use std::path::PathBuf;
use thiserror::Error;

use super::worker_status::WorkerStatus;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not open results store because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Results store is missing the base directory {0}")]
    MissingDirectory(String),
    #[error("Results store failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Renderer failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Renderer failed due to drawing error: {0}")]
    DrawError(String),
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for RenderError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::DrawError(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("HierarchyWalker failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("HierarchyWalker failed due to Renderer error: {0}")]
    RenderError(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum MosaicError {
    #[error("GridCompositor failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("GridCompositor failed due to drawing error: {0}")]
    DrawError(String),
    #[error("GridCompositor failed due to Renderer error: {0}")]
    RenderError(#[from] RenderError),
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for MosaicError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::DrawError(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("SummaryAggregator failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("SummaryAggregator failed to format the date stamp: {0}")]
    DateFormatError(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to results store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Processor failed due to HierarchyWalker error: {0}")]
    WalkError(#[from] WalkError),
    #[error("Processor failed due to GridCompositor error: {0}")]
    MosaicError(#[from] MosaicError),
    #[error("Processor failed due to SummaryAggregator error: {0}")]
    SummaryError(#[from] SummaryError),
    #[error("Processor failed due to Send error: {0}")]
    SendError(#[from] std::sync::mpsc::SendError<WorkerStatus>),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}
