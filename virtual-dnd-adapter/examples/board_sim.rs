#[cfg(feature = "std")]
use virtual_dnd::{DraggedItem, ListStrategy, Point, Rect, ScrollMetrics};
#[cfg(feature = "std")]
use virtual_dnd_adapter::{DndController, DndOptions, DragEvent, KeyboardCommand, ListConfig};

#[cfg(feature = "std")]
fn main() {
    // Example: a two-column board driven without any UI objects.
    //
    // An adapter would:
    // - register each list with its container metrics
    // - forward pointer/keyboard input
    // - call tick(now_ms) every frame while the outcome asks for rescheduling
    // - apply Drop events to its own data
    let options = DndOptions::new().with_on_event(Some(|e: &DragEvent<u32, &'static str>| match e {
        DragEvent::DragMove(m) => println!("move -> {:?}@{:?}", m.target_list_id, m.target_index),
        DragEvent::Drop(d) => println!(
            "drop {} from {}@{:?} to {}@{}",
            d.source.item_id,
            d.source.list_id,
            d.source.index,
            d.destination.list_id,
            d.destination.index
        ),
        other => println!("{other:?}"),
    }));
    let mut c = DndController::<u32, &str>::new(options);
    c.register_list(
        "backlog",
        ListStrategy::fixed(40, 0u32..200),
        ScrollMetrics::new(Rect::new(0.0, 0.0, 240.0, 400.0), 240.0, 8_000.0),
        ListConfig::default(),
    );
    c.register_list(
        "doing",
        ListStrategy::fixed(40, 1_000u32..1_005),
        ScrollMetrics::new(Rect::new(260.0, 0.0, 240.0, 400.0), 240.0, 200.0),
        ListConfig::default().with_constrain_to_container(true),
    );

    // Pointer: drag item 3 to the bottom edge of the backlog and let it scroll.
    c.start_pointer_drag(
        DraggedItem::new(3, "backlog", 240.0, 40.0),
        Point::new(120.0, 140.0),
        Point::new(0.0, 120.0),
        None,
    );
    c.on_pointer_move(Point::new(120.0, 395.0));
    let mut now_ms = 0u64;
    while now_ms < 480 {
        now_ms += 16;
        let outcome = c.tick(now_ms);
        if !outcome.should_reschedule() {
            break;
        }
    }
    let scroll_top = c.container(&"backlog").map_or(0.0, |m| m.scroll_top);
    println!("scroll_top={scroll_top}");
    c.end_pointer_drag(now_ms);
    c.complete_drop_transition();

    // Keyboard: move item 1 down twice, then across to "doing".
    c.start_keyboard_drag(DraggedItem::new(1, "backlog", 240.0, 40.0));
    for key in ["ArrowDown", "ArrowDown", "ArrowRight", "Enter"] {
        if let Some(command) = KeyboardCommand::from_key(key) {
            c.handle_key(command, now_ms);
        }
    }
    println!("phase={:?}", c.phase());
}

#[cfg(not(feature = "std"))]
fn main() {}
