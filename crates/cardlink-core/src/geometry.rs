//! Geometry helpers and the endpoint location capability.

use crate::card::CardId;
use crate::connector::{EndpointRef, Side};
use kurbo::{Point, Rect};

/// Center of a rectangle.
pub fn center_of(rect: Rect) -> Point {
    rect.center()
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Point on a card's outline for a side and relative position.
///
/// Edge positions run left-to-right on TOP/BOTTOM and top-to-bottom on
/// LEFT/RIGHT. Corner sides ignore `position`.
pub fn point_on_card(bounds: Rect, side: Side, position: f64) -> Point {
    let x_along = bounds.x0 + position * bounds.width();
    let y_along = bounds.y0 + position * bounds.height();
    match side {
        Side::Top => Point::new(x_along, bounds.y0),
        Side::Right => Point::new(bounds.x1, y_along),
        Side::Bottom => Point::new(x_along, bounds.y1),
        Side::Left => Point::new(bounds.x0, y_along),
        Side::TopLeft => Point::new(bounds.x0, bounds.y0),
        Side::TopRight => Point::new(bounds.x1, bounds.y0),
        Side::BottomRight => Point::new(bounds.x1, bounds.y1),
        Side::BottomLeft => Point::new(bounds.x0, bounds.y1),
    }
}

/// Source of live card geometry.
///
/// The connector never stores coordinates of its own; whatever owns the
/// cards (a [`CardSet`](crate::card::CardSet), or a renderer with its own
/// element tree) answers these queries at the moment they are needed.
pub trait EndpointLocator {
    /// Current bounds of a card, or `None` if the card no longer exists.
    fn card_bounds(&self, card: CardId) -> Option<Rect>;

    /// Whether a card currently exists.
    fn card_exists(&self, card: CardId) -> bool {
        self.card_bounds(card).is_some()
    }

    /// Rendered center of an endpoint.
    ///
    /// The default places the endpoint exactly on the card outline.
    /// Renderers that draw endpoint dots offset from the outline override this.
    fn endpoint_center(&self, endpoint: &EndpointRef) -> Option<Point> {
        self.card_bounds(endpoint.card)
            .map(|bounds| point_on_card(bounds, endpoint.side, endpoint.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert!((distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)) - 5.0).abs() < f64::EPSILON);
        assert_eq!(distance(Point::new(7.0, 7.0), Point::new(7.0, 7.0)), 0.0);
    }

    #[test]
    fn test_center_of() {
        let rect = Rect::new(0.0, 0.0, 350.0, 250.0);
        assert_eq!(center_of(rect), Point::new(175.0, 125.0));
    }

    #[test]
    fn test_point_on_card_edges() {
        let bounds = Rect::new(0.0, 0.0, 350.0, 250.0);
        assert_eq!(point_on_card(bounds, Side::Top, 0.5), Point::new(175.0, 0.0));
        assert_eq!(point_on_card(bounds, Side::Right, 0.5), Point::new(350.0, 125.0));
        assert_eq!(point_on_card(bounds, Side::Bottom, 0.25), Point::new(87.5, 250.0));
        assert_eq!(point_on_card(bounds, Side::Left, 0.0), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_point_on_card_corners_ignore_position() {
        let bounds = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(point_on_card(bounds, Side::TopLeft, 0.9), Point::new(10.0, 20.0));
        assert_eq!(point_on_card(bounds, Side::TopRight, 0.1), Point::new(110.0, 20.0));
        assert_eq!(point_on_card(bounds, Side::BottomRight, 0.5), Point::new(110.0, 70.0));
        assert_eq!(point_on_card(bounds, Side::BottomLeft, 0.5), Point::new(10.0, 70.0));
    }
}
