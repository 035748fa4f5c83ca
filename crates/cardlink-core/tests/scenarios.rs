//! End-to-end connector scenarios on the default grid.
//!
//! Grid cards are 350x250 at a 150 px gap, so card 1 spans (50, 50)-(400, 300)
//! and card 2 spans (550, 50)-(900, 300).

use cardlink_core::config::{GAP_THRESHOLD, PROXIMITY_EPSILON};
use cardlink_core::connector::EndpointRegistry;
use cardlink_core::{
    Canvas, Card, CardId, ConnectorConfig, DrawingOutcome, EndpointDescriptor, EndpointRef, Layout,
    PointerEvent, Side,
};
use kurbo::{Line, Point, Vec2};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn grid() -> Canvas {
    init_logging();
    Canvas::with_default_layout(ConnectorConfig::default())
}

fn down(x: f64, y: f64) -> PointerEvent {
    PointerEvent::Down { position: Point::new(x, y) }
}

fn moved(x: f64, y: f64) -> PointerEvent {
    PointerEvent::Move { position: Point::new(x, y) }
}

fn up(x: f64, y: f64) -> PointerEvent {
    PointerEvent::Up { position: Point::new(x, y) }
}

fn edge_positions(registry: &EndpointRegistry, card: CardId, side: Side) -> Vec<f64> {
    registry
        .find_by_side(card, side)
        .iter()
        .map(|endpoint| endpoint.position)
        .collect()
}

fn assert_edge_spacing(registry: &EndpointRegistry, card: CardId, side: Side) {
    let positions = edge_positions(registry, card, side);
    for pair in positions.windows(2) {
        assert!(
            pair[1] - pair[0] >= PROXIMITY_EPSILON - 1e-9,
            "card {} {:?}: {} and {} are closer than the proximity epsilon",
            card,
            side,
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn drag_right_to_left_commits_connection() {
    let mut canvas = grid();

    assert!(matches!(canvas.handle_event(down(400.0, 175.0)), DrawingOutcome::Started(_)));
    match canvas.handle_event(moved(540.0, 170.0)) {
        DrawingOutcome::Updated(line) => {
            assert_eq!(line.p0, Point::new(400.0, 175.0));
            assert_eq!(line.p1, Point::new(540.0, 170.0));
        }
        other => panic!("expected Updated, got {:?}", other),
    }

    let DrawingOutcome::Committed(id) = canvas.handle_event(up(548.0, 176.0)) else {
        panic!("expected a committed connection");
    };
    assert!(!canvas.connector().drawing().is_drawing());

    let saved = canvas.connector().get_all_connections();
    assert_eq!(saved.len(), 1);
    assert_eq!((saved[0].from_id, saved[0].from_side), (1, Side::Right));
    assert_eq!((saved[0].to_id, saved[0].to_side), (2, Side::Left));
    assert_eq!(saved[0].from_position, 0.5);
    assert_eq!(saved[0].to_position, 0.5);

    let line = canvas.connector().lines().get(id).unwrap();
    assert_eq!(line.p0, Point::new(400.0, 175.0));
    assert_eq!(line.p1, Point::new(550.0, 175.0));

    assert_eq!(
        canvas.connector().occupied_endpoints(),
        vec![EndpointRef::new(1, Side::Right, 0.5), EndpointRef::new(2, Side::Left, 0.5)]
    );

    // Both edges gained a free endpoint on each side of the link.
    let registry = canvas.connector().registry();
    for (card, side) in [(1, Side::Right), (2, Side::Left)] {
        let positions = edge_positions(registry, card, side);
        assert_eq!(positions.len(), 3);
        assert!((positions[0] - 0.25).abs() < 1e-12);
        assert!((positions[2] - 0.75).abs() < 1e-12);
    }
    // Untouched edges keep their single midpoint.
    assert_eq!(edge_positions(registry, 1, Side::Top), vec![0.5]);
}

#[test]
fn release_away_from_endpoints_creates_nothing() {
    let mut canvas = grid();
    let endpoints_before = canvas.connector().registry().len();

    canvas.handle_event(down(400.0, 175.0));
    canvas.handle_event(moved(580.0, 280.0));
    assert_eq!(canvas.handle_event(up(600.0, 300.0)), DrawingOutcome::Cancelled);

    assert!(canvas.connector().store().is_empty());
    assert!(canvas.connector().lines().is_empty());
    assert!(canvas.connector().occupied_endpoints().is_empty());
    assert_eq!(canvas.connector().registry().len(), endpoints_before);
    assert!(!canvas.connector().drawing().is_drawing());
}

#[test]
fn release_on_own_card_creates_nothing() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    // Card 1's bottom midpoint.
    assert_eq!(canvas.handle_event(up(225.0, 300.0)), DrawingOutcome::Cancelled);
    assert!(canvas.connector().store().is_empty());
}

#[test]
fn cancel_discards_drawing() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    assert!(canvas.connector().drawing().provisional_line().is_some());
    assert_eq!(canvas.handle_event(PointerEvent::Cancel), DrawingOutcome::Cancelled);
    assert!(canvas.connector().drawing().provisional_line().is_none());
    assert_eq!(canvas.handle_event(up(550.0, 175.0)), DrawingOutcome::Ignored);
}

#[test]
fn removing_source_card_mid_gesture_cancels() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    canvas.remove_card(1);
    assert!(!canvas.connector().drawing().is_drawing());
    assert_eq!(canvas.handle_event(up(550.0, 175.0)), DrawingOutcome::Ignored);
    assert!(canvas.connector().store().is_empty());
}

#[test]
fn double_click_on_line_shows_detail() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    let DrawingOutcome::Committed(id) = canvas.handle_event(up(550.0, 175.0)) else {
        panic!("expected a committed connection");
    };

    assert_eq!(canvas.handle_event(down(475.0, 177.0)), DrawingOutcome::Ignored);
    assert_eq!(canvas.handle_event(down(475.0, 177.0)), DrawingOutcome::ShowDetail(id));
}

#[test]
fn layout_round_trip_preserves_connections() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    canvas.handle_event(up(550.0, 175.0));
    // Card 2 bottom midpoint to card 5 top midpoint.
    canvas.handle_event(down(725.0, 300.0));
    assert!(matches!(canvas.handle_event(up(730.0, 452.0)), DrawingOutcome::Committed(_)));

    let json = canvas.to_layout().to_json().unwrap();
    let mut reloaded = Canvas::new(ConnectorConfig::default());
    reloaded.load_layout(&json).unwrap();

    assert_eq!(reloaded.to_layout(), canvas.to_layout());
    assert_eq!(
        reloaded.connector().get_all_connections(),
        canvas.connector().get_all_connections()
    );
    let original: Vec<Line> = canvas.connector().lines().iter().map(|(_, line)| line).collect();
    let restored: Vec<Line> = reloaded.connector().lines().iter().map(|(_, line)| line).collect();
    assert_eq!(original, restored);
}

#[test]
fn recompute_is_idempotent() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    canvas.handle_event(up(550.0, 175.0));
    canvas.translate_card(2, Vec2::new(40.0, -30.0));

    let first: Vec<_> = canvas.connector().lines().iter().collect();
    assert_eq!(canvas.recalculate_all_lines(), 1);
    let second: Vec<_> = canvas.connector().lines().iter().collect();
    assert_eq!(first, second);
    assert_eq!(first[0].1.p1, Point::new(590.0, 145.0));
}

#[test]
fn repeated_links_keep_edges_sparse() {
    let mut canvas = grid();

    for _ in 0..12 {
        let registry = canvas.connector().registry();
        let free = |card: CardId, side: Side| {
            registry
                .find_by_side(card, side)
                .into_iter()
                .find(|endpoint| !endpoint.occupied)
                .map(|endpoint| endpoint.key())
        };
        let (Some(from), Some(to)) = (free(1, Side::Right), free(2, Side::Left)) else {
            break;
        };
        canvas.create_connection_from_saved(
            from.card,
            from.side,
            to.card,
            to.side,
            Some(from.position),
            Some(to.position),
        );
    }

    let registry = canvas.connector().registry();
    for (card, side) in [(1, Side::Right), (2, Side::Left)] {
        assert_edge_spacing(registry, card, side);
        let positions = edge_positions(registry, card, side);
        assert!(positions.len() <= 10, "{:?} grew without bound", positions);
        let mut bounded = vec![0.0];
        bounded.extend(&positions);
        bounded.push(1.0);
        assert!(
            bounded.windows(2).all(|w| w[1] - w[0] <= GAP_THRESHOLD + 1e-9),
            "{:?} still has a gap above the threshold",
            positions
        );
    }
}

#[test]
fn top_edge_fills_outer_gaps_only() {
    init_logging();
    let mut canvas = Canvas::new(ConnectorConfig::default());
    canvas.add_card(Card::new(1, Point::new(0.0, 0.0)));
    canvas.add_card(Card::new(2, Point::new(500.0, 0.0)));
    canvas.register_endpoints(
        1,
        &[EndpointDescriptor::new(Side::Top, 0.3), EndpointDescriptor::new(Side::Top, 0.7)],
    );
    // Card 1's top midpoint is (175, 0), card 2's is (675, 0).
    canvas.handle_event(down(175.0, 0.0));
    assert!(matches!(canvas.handle_event(up(675.0, 0.0)), DrawingOutcome::Committed(_)));

    let positions = edge_positions(canvas.connector().registry(), 1, Side::Top);
    let expected = [0.15, 0.3, 0.5, 0.7, 0.85];
    assert_eq!(positions.len(), expected.len(), "{:?}", positions);
    for (actual, expected) in positions.iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-9, "{:?}", positions);
    }
    assert_edge_spacing(canvas.connector().registry(), 1, Side::Top);
}

#[test]
fn imported_positions_never_crowd_an_edge() {
    let mut canvas = grid();
    for position in [0.47, 0.53, 0.2, 0.27, 0.91] {
        canvas.create_connection_from_saved(1, Side::Right, 2, Side::Left, Some(position), None);
    }

    let registry = canvas.connector().registry();
    assert_edge_spacing(registry, 1, Side::Right);
    assert_edge_spacing(registry, 2, Side::Left);
    assert_eq!(canvas.connector().lines().len(), 5);
    for saved in canvas.connector().get_all_connections() {
        let key = EndpointRef::new(saved.from_id, saved.from_side, saved.from_position);
        assert!(registry.find(&key).is_some());
    }
}

#[test]
fn malformed_layout_falls_back_to_default_grid() {
    let mut canvas = grid();
    canvas.handle_event(down(400.0, 175.0));
    canvas.handle_event(up(550.0, 175.0));

    assert!(canvas.load_layout("{\"cards\": [{\"id\": \"one\"}]}").is_err());
    assert_eq!(canvas.to_layout(), Layout::default_grid());
    assert!(canvas.connector().lines().is_empty());
}
