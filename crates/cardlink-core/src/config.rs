//! Tunable connector settings.

use crate::color::SerializableColor;
use crate::connector::ConnectionStyle;
use serde::{Deserialize, Serialize};

/// Maximum pointer-to-endpoint distance (logical px) at which a drag snaps.
pub const SNAP_RADIUS: f64 = 24.0;

/// Radius (logical px) around an endpoint that starts a drawing on pointer-down.
pub const HIT_RADIUS: f64 = 10.0;

/// Distance (logical px) from a committed line that still counts as a hit.
pub const LINE_HIT_TOLERANCE: f64 = 6.0;

/// Gap (fraction of edge length) above which an edge is subdivided.
pub const GAP_THRESHOLD: f64 = 0.15;

/// Minimum spacing (fraction of edge length) between endpoints on one edge.
pub const PROXIMITY_EPSILON: f64 = 0.1;

/// Default stroke width for new connections.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Connector configuration.
///
/// Every field has a default, so a JSON override only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorConfig {
    pub snap_radius: f64,
    pub hit_radius: f64,
    pub line_hit_tolerance: f64,
    pub gap_threshold: f64,
    pub proximity_epsilon: f64,
    /// Color given to newly drawn connections.
    pub color: SerializableColor,
    /// Stroke width given to newly drawn connections.
    pub stroke_width: f64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            snap_radius: SNAP_RADIUS,
            hit_radius: HIT_RADIUS,
            line_hit_tolerance: LINE_HIT_TOLERANCE,
            gap_threshold: GAP_THRESHOLD,
            proximity_epsilon: PROXIMITY_EPSILON,
            color: SerializableColor::default(),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl ConnectorConfig {
    /// Read a configuration from JSON, filling absent keys with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Style applied to connections created with this configuration.
    pub fn connection_style(&self) -> ConnectionStyle {
        ConnectionStyle {
            color: self.color,
            stroke_width: self.stroke_width,
        }
    }
}
