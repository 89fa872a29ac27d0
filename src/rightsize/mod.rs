//! Right-sizing: optimizer recommendations applied to Deployment manifests.

pub mod patch;
pub mod quantity;
pub mod recommendation;

pub use patch::{DEFAULT_LABEL_SUFFIX, PatchEngine, PatchOutcome};
pub use quantity::{Quantity, QuantityFormat, parse_cpu, parse_memory};
pub use recommendation::{
    ContainerRecommendation, Recommendation, load_recommendations, parse_recommendations,
};
