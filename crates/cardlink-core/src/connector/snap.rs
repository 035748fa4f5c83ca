//! Snapping a drag to the nearest endpoint.

use super::endpoint::{Endpoint, EndpointId};
use super::registry::EndpointRegistry;
use crate::geometry::{EndpointLocator, distance};
use kurbo::Point;

/// Nearest endpoint to `pointer` on a card other than `from`'s card.
///
/// The nearest candidate is accepted only if it is strictly closer than
/// `radius`. On equal distances the endpoint registered first wins.
/// Occupied endpoints are candidates too, so one side can host many links.
/// Endpoints whose card the locator no longer knows are skipped.
pub fn resolve<L: EndpointLocator + ?Sized>(
    pointer: Point,
    from: &Endpoint,
    registry: &EndpointRegistry,
    locator: &L,
    radius: f64,
) -> Option<EndpointId> {
    let mut best: Option<(EndpointId, f64)> = None;

    for endpoint in registry.all_except(from.card) {
        let Some(center) = locator.endpoint_center(&endpoint.key()) else {
            continue;
        };
        let dist = distance(pointer, center);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((endpoint.id, dist));
        }
    }

    best.filter(|&(_, dist)| dist < radius).map(|(id, _)| id)
}

/// Endpoint under the pointer on any card, within `radius`.
///
/// Used on pointer-down to decide whether a drawing starts.
pub fn endpoint_at<L: EndpointLocator + ?Sized>(
    pointer: Point,
    registry: &EndpointRegistry,
    locator: &L,
    radius: f64,
) -> Option<EndpointId> {
    let mut best: Option<EndpointId> = None;
    let mut best_dist_sq = radius * radius;

    for endpoint in registry.iter() {
        let Some(center) = locator.endpoint_center(&endpoint.key()) else {
            continue;
        };
        let dx = pointer.x - center.x;
        let dy = pointer.y - center.y;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = Some(endpoint.id);
        }
    }

    best
}
