//! Data module - CSV loading and the typed education dataset

mod loader;
mod model;

pub use loader::DATASET_CACHE;
pub use model::{Dataset, EducationRecord, Metric};

#[cfg(test)]
pub(crate) use model::record;
