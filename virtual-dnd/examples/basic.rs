// Example: resolve the placeholder for a drag over a fixed-height list and read the drop result.
use virtual_dnd::{
    ContainerGeometry, DragSession, DragSessionOptions, DragStart, DragUpdate, DraggedItem,
    ListStrategy, PlaceholderIndexCalculator, PlaceholderOptions, PlaceholderQuery, Point,
};

fn main() {
    let keys = ["alpha", "beta", "gamma", "delta", "epsilon"];
    let list = ListStrategy::fixed(40, keys);
    let calc = PlaceholderIndexCalculator::new(PlaceholderOptions::default());
    let container = ContainerGeometry::new(0.0, 200.0, 0.0);

    let mut session = DragSession::<&str, &str>::new(DragSessionOptions::default());
    session.set_on_change(Some(|s: &DragSession<&'static str, &'static str>| {
        println!("phase={:?} placeholder={:?}", s.phase(), s.placeholder_index());
    }));

    // Pick up "beta" 10px below its top edge.
    let cursor = Point::new(20.0, 50.0);
    session.start_drag(
        DragStart::new(DraggedItem::new("beta", "main", 120.0, 40.0))
            .with_cursor(cursor)
            .with_grab_offset(Point::new(20.0, 10.0))
            .with_source_index(1),
    );

    for y in [70.0, 110.0, 150.0] {
        let cursor = Point::new(20.0, y);
        let query = PlaceholderQuery::new(Some(container), cursor)
            .with_grab_offset(session.grab_offset().unwrap_or(Point::ZERO))
            .with_dragged_height(40.0)
            .with_source(true, session.source_index())
            .with_previous_index(session.placeholder_index());
        let result = calc.calculate(&list, &query);
        println!("y={y} -> index={} key={:?}", result.index, result.key);
        session.update_drag_position(
            DragUpdate::cursor(cursor).with_target("main", result.index, result.key),
        );
    }

    let dropped = session.snapshot().drop_result();
    session.end_drag(0);
    if let Some(drop) = dropped {
        println!(
            "drop: {} from {:?} to {} (noop={})",
            drop.item_id,
            drop.source_index,
            drop.destination_index(),
            drop.is_noop()
        );
    }
    session.complete_drop_transition();
}
