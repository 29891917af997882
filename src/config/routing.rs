//! Routing configuration

use serde::{Deserialize, Serialize};

pub use crate::health::RankOrder;

/// Routing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// How healthy candidates are ordered before the fallback walk.
    pub order: RankOrder,
}
