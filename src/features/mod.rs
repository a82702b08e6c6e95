//! Feature schema and request normalization.

pub mod normalize;
pub mod schema;

pub use normalize::{Coerced, FeatureValue, NormalizedRecord, RawRequest, normalize};
pub use schema::{FEATURE_COUNT, Feature, FeatureKind};
