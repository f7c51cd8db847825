//! Anomaly classification
//!
//! - **bins**: validated, strictly ascending bin edges with half-open classes
//! - **anomaly**: normalized anomaly, binning and land-cover masking

mod anomaly;
mod bins;

pub use anomaly::{
    classify_anomaly, normalized_anomaly, AnomalyClassifier, AnomalyParams, ClassifiedGrid,
    CLASS_NODATA,
};
pub use bins::BinEdges;
