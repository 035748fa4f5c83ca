//! Dynamic endpoint generation.
//!
//! When a link lands on an edge, the edge is subdivided so there is always a
//! free endpoint nearby for the next link. Subdivision stops once every gap
//! is at or below the gap threshold, and a new endpoint is never placed
//! within the proximity epsilon of an existing one.

use super::endpoint::{EndpointDescriptor, EndpointId, Side};
use super::registry::EndpointRegistry;
use crate::card::CardId;
use crate::config::ConnectorConfig;

/// Slack for floating-point comparisons of edge fractions.
const TOLERANCE: f64 = 1e-9;

/// Positions to add on one edge, given the positions already there.
///
/// `existing` need not be sorted. The implicit boundaries 0 and 1 bound the
/// first and last gaps but are not endpoints themselves.
pub fn plan_edge(existing: &[f64], gap_threshold: f64, proximity_epsilon: f64) -> Vec<f64> {
    let mut sorted = existing.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut bounded = Vec::with_capacity(sorted.len() + 2);
    bounded.push(0.0);
    bounded.extend_from_slice(&sorted);
    bounded.push(1.0);

    let mut added: Vec<f64> = Vec::new();
    for pair in bounded.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        if p2 - p1 <= gap_threshold + TOLERANCE {
            continue;
        }

        let candidate = (p1 + p2) / 2.0;
        let crowded = sorted
            .iter()
            .chain(added.iter())
            .any(|&p| (p - candidate).abs() <= proximity_epsilon + TOLERANCE);
        if !crowded {
            added.push(candidate);
        }
    }
    added
}

/// Subdivide one edge of a card. Corners are never subdivided.
///
/// Returns the handles of the endpoints created.
pub fn refresh_edge(
    registry: &mut EndpointRegistry,
    card: CardId,
    side: Side,
    config: &ConnectorConfig,
) -> Vec<EndpointId> {
    if side.is_corner() {
        return Vec::new();
    }

    let existing: Vec<f64> = registry
        .find_by_side(card, side)
        .iter()
        .map(|endpoint| endpoint.position)
        .collect();
    let planned = plan_edge(&existing, config.gap_threshold, config.proximity_epsilon);
    if planned.is_empty() {
        log::debug!("Edge {:?} of card {} is saturated", side, card);
        return Vec::new();
    }

    planned
        .into_iter()
        .map(|position| registry.register(card, EndpointDescriptor::new(side, position)))
        .collect()
}

/// Subdivide every edge of a card that has an occupied endpoint.
pub fn refresh_card(
    registry: &mut EndpointRegistry,
    card: CardId,
    config: &ConnectorConfig,
) -> Vec<EndpointId> {
    let occupied_edges: Vec<Side> = Side::EDGES
        .into_iter()
        .filter(|&side| {
            registry
                .find_by_side(card, side)
                .iter()
                .any(|endpoint| endpoint.occupied)
        })
        .collect();

    occupied_edges
        .into_iter()
        .flat_map(|side| refresh_edge(registry, card, side, config))
        .collect()
}
