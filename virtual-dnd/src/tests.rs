use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }

    fn gen_f64(&mut self, start: f64, end: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        start + (end - start) * unit
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

const KEYS: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

fn cache_with(heights: &[u32]) -> HeightCache<usize> {
    let mut cache = HeightCache::with_keys(40, 0..heights.len());
    for (k, &h) in heights.iter().enumerate() {
        cache.set_height(k, h);
    }
    cache
}

fn viewport(top: f64, height: f64, scroll_top: f64) -> Option<ContainerGeometry> {
    Some(ContainerGeometry::new(top, top + height, scroll_top))
}

// ---------------------------------------------------------------------------------------------
// Fenwick

#[test]
fn fenwick_prefix_sums_follow_point_updates() {
    use crate::fenwick::Fenwick;

    let mut rng = Lcg::new(7);
    let mut heights: Vec<u32> = (0..64).map(|_| rng.gen_range_u64(1, 100) as u32).collect();
    let mut tree = Fenwick::from_heights(&heights);
    for _ in 0..200 {
        let i = rng.gen_range_usize(0, heights.len());
        let h = rng.gen_range_u64(1, 100) as u32;
        tree.add(i, i64::from(h) - i64::from(heights[i]));
        heights[i] = h;

        let count = rng.gen_range_usize(0, heights.len() + 1);
        let expected: u64 = heights[..count].iter().map(|&h| u64::from(h)).sum();
        assert_eq!(tree.prefix_sum(count), expected);
    }
    let all: u64 = heights.iter().map(|&h| u64::from(h)).sum();
    assert_eq!(tree.prefix_sum(heights.len() + 10), all);
    assert_eq!(tree.lower_bound(u64::from(heights[0]) - 1), 0);
    assert_eq!(tree.lower_bound(all), heights.len());
}

// ---------------------------------------------------------------------------------------------
// HeightCache

#[test]
fn unmeasured_items_use_the_estimate() {
    let cache = HeightCache::with_keys(25, KEYS);
    assert_eq!(cache.get_height(0), 25);
    assert_eq!(cache.get_offset(3), 75);
    assert_eq!(cache.get_total_height(6), 150);
    assert_eq!(cache.get_height(99), 25);
}

#[test]
fn set_height_reports_changes_only() {
    let mut cache = HeightCache::with_keys(25, KEYS);
    assert!(cache.set_height("b", 40));
    assert!(!cache.set_height("b", 40));
    assert!(cache.set_height("b", 10));
    assert!(cache.is_measured(&"b"));
    assert!(!cache.is_measured(&"c"));
    assert_eq!(cache.get_offset(2), 35);
}

#[test]
fn measurement_before_first_read_is_applied_on_rebuild() {
    let mut cache = HeightCache::new(10);
    cache.set_keys(["x", "y", "z"]);
    cache.set_height("y", 50);
    assert_eq!(cache.get_offset(2), 60);
    // Clean index now; this one takes the in-place path.
    cache.set_height("x", 20);
    assert_eq!(cache.get_offset(2), 70);
    assert_eq!(cache.get_total_height(3), 80);
}

#[test]
fn measurements_follow_keys_across_reorder() {
    let mut cache = HeightCache::with_keys(10, ["a", "b", "c"]);
    cache.set_height("b", 30);
    cache.set_keys(["c", "b", "a"]);
    assert_eq!(cache.get_height(0), 10);
    assert_eq!(cache.get_height(1), 30);
    assert_eq!(cache.index_of(&"a"), Some(2));
    assert_eq!(cache.index_of(&"q"), None);
    assert_eq!(cache.get_offset(2), 40);

    cache.reset_measurements();
    assert_eq!(cache.get_height(1), 10);
}

#[test]
fn excluded_item_collapses_offsets_but_not_total() {
    let mut cache = cache_with(&[10, 20, 30, 40]);
    assert_eq!(cache.get_total_height(4), 100);

    cache.set_excluded_index(Some(1));
    assert_eq!(cache.get_offset(0), 0);
    assert_eq!(cache.get_offset(1), 10);
    assert_eq!(cache.get_offset(2), 10);
    assert_eq!(cache.get_offset(3), 40);
    assert_eq!(cache.get_offset(4), 80);
    assert_eq!(cache.get_total_height(4), 100);

    cache.set_excluded_index(None);
    assert_eq!(cache.get_offset(2), 30);
}

#[test]
fn find_index_at_offset_skips_excluded_item() {
    let mut cache = cache_with(&[10, 20, 30, 40]);
    assert_eq!(cache.find_index_at_offset(0), 0);
    assert_eq!(cache.find_index_at_offset(10), 1);
    assert_eq!(cache.find_index_at_offset(99), 3);
    assert_eq!(cache.find_index_at_offset(10_000), 3);

    cache.set_excluded_index(Some(1));
    assert_eq!(cache.find_index_at_offset(5), 0);
    assert_eq!(cache.find_index_at_offset(10), 2);
    assert_eq!(cache.find_index_at_offset(39), 2);
    assert_eq!(cache.find_index_at_offset(40), 3);
    assert_eq!(cache.find_index_at_offset(10_000), 3);

    cache.set_excluded_index(Some(3));
    assert_eq!(cache.find_index_at_offset(10_000), 2);
}

#[test]
fn visible_window_queries() {
    let mut cache = cache_with(&[10, 20, 30, 40]);
    assert_eq!(cache.find_first_visible_index(15), 1);
    assert_eq!(cache.get_visible_count(0, 25), 3);
    assert_eq!(cache.get_visible_count(0, 0), 0);
    assert_eq!(cache.get_visible_count(9, 100), 0);
    assert_eq!(cache.get_visible_count(2, 1000), 2);

    cache.set_excluded_index(Some(1));
    assert_eq!(cache.get_visible_count(0, 25), 4);
}

#[test]
fn empty_cache_is_harmless() {
    let cache: HeightCache<u32> = HeightCache::new(30);
    assert!(cache.is_empty());
    assert_eq!(cache.find_index_at_offset(100), 0);
    assert_eq!(cache.get_offset(5), 0);
    assert_eq!(cache.get_total_height(2), 60);
    assert_eq!(cache.get_visible_count(0, 100), 0);
}

#[test]
fn offsets_are_consistent_with_heights_randomized() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..200 {
        let n = rng.gen_range_usize(1, 40);
        let mut cache = HeightCache::with_keys(rng.gen_range_u32(1, 60), 0..n);
        for _ in 0..rng.gen_range_usize(0, n * 2) {
            let key = rng.gen_range_usize(0, n);
            cache.set_height(key, rng.gen_range_u32(0, 120));
        }
        let excluded = rng.gen_bool().then(|| rng.gen_range_usize(0, n));
        let total_before = cache.get_total_height(n);
        cache.set_excluded_index(excluded);
        assert_eq!(cache.get_total_height(n), total_before);

        for i in 0..n {
            assert!(cache.get_offset(i + 1) >= cache.get_offset(i));
            if Some(i) == excluded {
                assert_eq!(cache.get_offset(i + 1), cache.get_offset(i));
                continue;
            }
            assert_eq!(
                cache.get_offset(i + 1) - cache.get_offset(i),
                u64::from(cache.get_height(i))
            );
            if cache.get_height(i) > 0 {
                let offset = cache.get_offset(i);
                let found = cache.find_index_at_offset(offset);
                assert_eq!(found, i, "lookup at start of item {i}");
            }
        }
    }
}

// ---------------------------------------------------------------------------------------------
// geometry

#[test]
fn containment_and_edges() {
    let rect = Rect::new(0.0, 100.0, 400.0, 400.0);
    assert!(geometry::contains(&rect, Point::new(0.0, 100.0)));
    assert!(geometry::contains(&rect, Point::new(400.0, 500.0)));
    assert!(!geometry::contains(&rect, Point::new(200.0, 501.0)));
    assert_eq!(
        geometry::clamp_point(&rect, Point::new(-5.0, 620.0)),
        Point::new(0.0, 500.0)
    );
    assert_eq!(
        geometry::clamp_point(&rect, Point::new(200.0, 300.0)),
        Point::new(200.0, 300.0)
    );

    let e = geometry::near_edges(&rect, Point::new(10.0, 480.0), 50.0);
    assert!(e.bottom && e.left && !e.top && !e.right);
    assert_eq!(e.distance_bottom, 20.0);

    let outside = geometry::near_edges(&rect, Point::new(10.0, 520.0), 50.0);
    assert!(!outside.any());
}

#[test]
fn fixed_offset_to_index() {
    assert_eq!(geometry::fixed_index_at_offset(0.0, 50.0), 0);
    assert_eq!(geometry::fixed_index_at_offset(49.9, 50.0), 0);
    assert_eq!(geometry::fixed_index_at_offset(50.0, 50.0), 1);
    assert_eq!(geometry::fixed_index_at_offset(-20.0, 50.0), 0);
    assert_eq!(geometry::fixed_index_at_offset(100.0, 0.0), 0);
}

// ---------------------------------------------------------------------------------------------
// PlaceholderIndexCalculator

fn centered_query(cursor_y: f64, height: f64) -> PlaceholderQuery {
    // Grabbed at the vertical center, so the preview center equals the cursor.
    PlaceholderQuery::new(viewport(0.0, 400.0, 0.0), Point::new(10.0, cursor_y))
        .with_grab_offset(Point::new(10.0, height / 2.0))
        .with_dragged_height(height)
}

#[test]
fn same_list_slots_past_the_source_shift_by_one() {
    let list = ListStrategy::fixed(50, KEYS);
    let calc = PlaceholderIndexCalculator::default();
    // Source index 1 is hidden; a preview center anywhere in visual slot 2 (100..150) maps past
    // the source to index 3.
    for center in [100.0, 110.0, 125.0, 140.0, 149.0] {
        let query = centered_query(center, 50.0).with_source(true, Some(1));
        let r = calc.calculate(&list, &query);
        assert_eq!(r.index, 3, "center={center}");
        assert_eq!(r.key, PlaceholderKey::Before("d"));
    }

    // Before the source nothing shifts.
    let r = calc.calculate(&list, &centered_query(10.0, 50.0).with_source(true, Some(1)));
    assert_eq!(r.index, 0);
}

#[test]
fn cross_list_uses_plain_slots() {
    let list = ListStrategy::fixed(50, KEYS);
    let calc = PlaceholderIndexCalculator::default();
    let r = calc.calculate(&list, &centered_query(110.0, 50.0).with_source(false, Some(1)));
    assert_eq!(r.index, 2);
    let r = calc.calculate(&list, &centered_query(130.0, 50.0));
    assert_eq!(r.index, 2);
    let r = calc.calculate(&list, &centered_query(150.0, 50.0));
    assert_eq!(r.index, 3);
}

#[test]
fn equal_moves_up_and_down_displace_symmetrically() {
    let list = ListStrategy::fixed(50, KEYS);
    let calc = PlaceholderIndexCalculator::default();
    // "d" (index 3, top at 150) grabbed at its center; at rest it reports index 4, its own gap.
    let gap_at = |center: f64| {
        let query = centered_query(center, 50.0)
            .with_source(true, Some(3))
            .with_previous_index(Some(4));
        let index = calc.calculate(&list, &query).index;
        if index > 3 { index - 1 } else { index }
    };
    assert_eq!(gap_at(175.0), 3);

    for d in [5.0, 15.0, 30.0, 40.0, 62.0, 90.0] {
        let down = gap_at(175.0 + d) - 3;
        let up = 3 - gap_at(175.0 - d);
        assert_eq!(down, up, "d={d}");
    }
    // Small moves stay put; half a row plus the margin displaces one neighbor.
    assert_eq!(gap_at(190.0), 3);
    assert_eq!(gap_at(160.0), 3);
    assert_eq!(gap_at(215.0), 4);
    assert_eq!(gap_at(135.0), 2);
}

#[test]
fn grab_point_does_not_bias_the_placement() {
    let list = ListStrategy::fixed(50, KEYS);
    let calc = PlaceholderIndexCalculator::default();
    // Same preview position (top at 85), grabbed near its top vs near its bottom.
    let high = PlaceholderQuery::new(viewport(0.0, 400.0, 0.0), Point::new(0.0, 90.0))
        .with_grab_offset(Point::new(0.0, 5.0))
        .with_dragged_height(50.0);
    let low = PlaceholderQuery::new(viewport(0.0, 400.0, 0.0), Point::new(0.0, 130.0))
        .with_grab_offset(Point::new(0.0, 45.0))
        .with_dragged_height(50.0);
    assert_eq!(calc.calculate(&list, &high), calc.calculate(&list, &low));
}

#[test]
fn scroll_offset_and_container_origin_are_applied() {
    let list = ListStrategy::fixed(50, 0..100u32);
    let calc = PlaceholderIndexCalculator::default();
    let query = PlaceholderQuery::new(viewport(200.0, 400.0, 1000.0), Point::new(0.0, 210.0))
        .with_dragged_height(0.0);
    // 210 - 200 + 1000 = 1010 -> slot 20, upper half.
    assert_eq!(calc.calculate(&list, &query).index, 20);
}

#[test]
fn missing_geometry_falls_back_to_zero() {
    let list = ListStrategy::fixed(50, KEYS);
    let calc = PlaceholderIndexCalculator::default();
    let r = calc.calculate(&list, &PlaceholderQuery::new(None, Point::new(0.0, 300.0)));
    assert_eq!(r.index, 0);
    assert_eq!(r.key, PlaceholderKey::Before("a"));

    let flat = PlaceholderQuery::new(viewport(0.0, 0.0, 0.0), Point::new(0.0, 300.0));
    assert_eq!(calc.calculate(&list, &flat).index, 0);
}

#[test]
fn empty_list_targets_end_of_list() {
    let list: ListStrategy<&str> = ListStrategy::fixed(50, []);
    let calc = PlaceholderIndexCalculator::default();
    let r = calc.calculate(&list, &centered_query(200.0, 50.0));
    assert_eq!(r.index, 0);
    assert!(r.key.is_end_of_list());
}

#[test]
fn below_the_content_appends() {
    let list = ListStrategy::fixed(50, KEYS);
    let calc = PlaceholderIndexCalculator::default();
    let r = calc.calculate(&list, &centered_query(390.0, 50.0));
    assert_eq!(r.index, 6);
    assert_eq!(r.key, PlaceholderKey::EndOfList);

    let r = calc.calculate(&list, &centered_query(390.0, 50.0).with_source(true, Some(2)));
    assert_eq!(r.index, 6);
}

#[test]
fn end_of_list_snap_near_bottom_edge_at_max_scroll() {
    // 20 rows of 50px in a 400px viewport scrolled to the max (600).
    let list = ListStrategy::fixed(50, 0..20u32);
    let calc = PlaceholderIndexCalculator::default();
    // Grabbed near the bottom of a 50px item: the top edge trails the cursor by 45px.
    let query = PlaceholderQuery::new(viewport(0.0, 400.0, 600.0), Point::new(0.0, 390.0))
        .with_grab_offset(Point::new(0.0, 45.0))
        .with_dragged_height(50.0);
    // Top edge at list offset 945 resolves to the last row, center 970 lies in it.
    assert_eq!(calc.calculate(&list, &query).index, 20);

    // Same geometry but the cursor well away from the bottom edge: no snap.
    let query = PlaceholderQuery::new(viewport(0.0, 400.0, 600.0), Point::new(0.0, 300.0))
        .with_grab_offset(Point::new(0.0, 45.0))
        .with_dragged_height(50.0);
    assert_eq!(calc.calculate(&list, &query).index, 17);
}

#[test]
fn constrained_preview_reaches_first_and_last_slot() {
    let list = ListStrategy::fixed(20, 0..10u32);
    let calc = PlaceholderIndexCalculator::default();
    // A clamped 100px preview keeps its top within 0..100 of a 200px container.
    let base = |cursor_y: f64| {
        PlaceholderQuery::new(viewport(0.0, 200.0, 0.0), Point::new(0.0, cursor_y))
            .with_grab_offset(Point::new(0.0, 50.0))
            .with_dragged_height(100.0)
    };

    // Unclamped, the top edge at 130 stops short of the last rows.
    assert_eq!(calc.calculate(&list, &base(180.0)).index, 7);

    let top = calc.calculate(&list, &base(30.0).with_constrain_to_container(true));
    assert_eq!(top.index, 0);

    let middle = calc.calculate(&list, &base(60.0).with_constrain_to_container(true));
    assert_eq!(middle.index, 1);

    let bottom = calc.calculate(&list, &base(180.0).with_constrain_to_container(true));
    assert_eq!(bottom.index, 10);
    assert!(bottom.key.is_end_of_list());
}

#[test]
fn previous_index_holds_near_a_midpoint() {
    let list = ListStrategy::fixed(40, 0..10u32);
    let calc = PlaceholderIndexCalculator::new(PlaceholderOptions::default());
    // Row 2 spans 80..120, midpoint 100; margin = 0.25 * 40 = 10. The preview's top edge sits
    // 20px above the cursor.
    let at = |y: f64, prev: Option<usize>| {
        let query = centered_query(y, 40.0).with_previous_index(prev);
        calc.calculate(&list, &query).index
    };
    assert_eq!(at(121.0, None), 3);
    assert_eq!(at(121.0, Some(2)), 2);
    assert_eq!(at(119.0, Some(3)), 3);
    assert_eq!(at(131.0, Some(2)), 3);
    assert_eq!(at(109.0, Some(3)), 2);

    let plain = PlaceholderIndexCalculator::new(
        PlaceholderOptions::default().with_hysteresis_fraction(0.0),
    );
    let r = plain.calculate(&list, &centered_query(121.0, 40.0).with_previous_index(Some(2)));
    assert_eq!(r.index, 3);
}

#[test]
fn tall_preview_among_short_rows_moves_one_slot_at_a_time() {
    let list = ListStrategy::fixed(20, 0..50u32);
    let calc = PlaceholderIndexCalculator::default();
    let tall = |y: f64, prev: Option<usize>| {
        calc.calculate(
            &list,
            &PlaceholderQuery::new(viewport(0.0, 1000.0, 0.0), Point::new(0.0, y))
                .with_grab_offset(Point::new(0.0, 150.0))
                .with_dragged_height(300.0)
                .with_previous_index(prev),
        )
        .index
    };
    let start = tall(400.0, None);
    assert_eq!(start, 13);
    // A few pixels of jitter never moves it by more than one slot.
    for dy in [-6.0, -3.0, 3.0, 6.0] {
        let next = tall(400.0 + dy, Some(start));
        assert!(next.abs_diff(start) <= 1, "dy={dy} moved {start} -> {next}");
    }
}

#[test]
fn dynamic_heights_with_and_without_cache_exclusion_agree() {
    let heights = [30, 60, 20, 50, 40, 70];
    let plain = ListStrategy::dynamic(cache_with(&heights));
    let mut excluded_cache = cache_with(&heights);
    excluded_cache.set_excluded_index(Some(1));
    let excluded = ListStrategy::dynamic(excluded_cache);

    let calc = PlaceholderIndexCalculator::default();
    for y in (0..300).step_by(7) {
        let q = centered_query(f64::from(y), 60.0).with_source(true, Some(1));
        assert_eq!(
            calc.calculate(&plain, &q),
            calc.calculate(&excluded, &q),
            "y={y}"
        );
    }

    // With item 1 (60px) hidden: 0:[0,30) 2:[30,50) 3:[50,100) ...
    // A top edge at 45 is past item 2's midpoint (40); at 30 it is not.
    let q = centered_query(75.0, 60.0).with_source(true, Some(1));
    assert_eq!(calc.calculate(&excluded, &q).index, 3);
    let q = centered_query(60.0, 60.0).with_source(true, Some(1));
    assert_eq!(calc.calculate(&excluded, &q).index, 2);
}

#[test]
fn placeholder_index_stays_in_range_and_is_idempotent_randomized() {
    let mut rng = Lcg::new(42);
    let calc = PlaceholderIndexCalculator::default();
    for _ in 0..2000 {
        let n = rng.gen_range_usize(0, 30);
        let mut list = if rng.gen_bool() {
            ListStrategy::fixed(rng.gen_range_u32(1, 80), 0..n)
        } else {
            let mut cache = HeightCache::with_keys(rng.gen_range_u32(1, 80), 0..n);
            for k in 0..n {
                if rng.gen_bool() {
                    cache.set_height(k, rng.gen_range_u32(1, 120));
                }
            }
            ListStrategy::dynamic(cache)
        };

        let same_list = n > 0 && rng.gen_bool();
        let source = same_list.then(|| rng.gen_range_usize(0, n));
        if let Some(s) = source.filter(|_| rng.gen_bool()) {
            list.set_excluded_index(Some(s));
        }
        let top = rng.gen_f64(-100.0, 300.0);
        let height = rng.gen_f64(1.0, 600.0);
        let query = PlaceholderQuery::new(
            viewport(top, height, rng.gen_f64(0.0, 3000.0)),
            Point::new(0.0, rng.gen_f64(-500.0, 1500.0)),
        )
        .with_grab_offset(Point::new(0.0, rng.gen_f64(0.0, 100.0)))
        .with_dragged_height(rng.gen_f64(0.0, 400.0))
        .with_source(same_list, source)
        .with_constrain_to_container(rng.gen_bool())
        .with_previous_index(rng.gen_bool().then(|| rng.gen_range_usize(0, n + 1)));

        let first = calc.calculate(&list, &query);
        assert!(first.index <= n, "index {} > {n}", first.index);
        assert_eq!(first.key.is_end_of_list(), first.index == n);

        let again = calc.calculate(&list, &query.with_previous_index(Some(first.index)));
        assert_eq!(again, first);
    }
}

// ---------------------------------------------------------------------------------------------
// AutoScrollController

fn scroller(scroll_top: f64, config: AutoScrollConfig) -> AutoScrollController<u8, ScrollMetrics> {
    let mut c = AutoScrollController::new();
    let metrics = ScrollMetrics::new(Rect::new(0.0, 100.0, 400.0, 400.0), 400.0, 1000.0)
        .with_scroll(0.0, scroll_top);
    c.register_container(1, metrics, Some(config));
    c.start_monitoring();
    c
}

fn scroll_top_after_tick(c: &mut AutoScrollController<u8, ScrollMetrics>, y: f64) -> f64 {
    c.tick(true, Some(Point::new(200.0, y)), |_, _| {});
    c.container(&1).map(|m| m.scroll_top).unwrap_or(f64::NAN)
}

#[test]
fn cursor_near_bottom_scrolls_down() {
    let mut c = scroller(200.0, AutoScrollConfig::default());
    let top = scroll_top_after_tick(&mut c, 480.0);
    assert!(top > 200.0);
    assert_eq!(top, 209.0);
    assert!(c.is_scrolling());
    assert_eq!(
        c.scroll_direction(),
        AutoScrollDirection {
            x: None,
            y: Some(ScrollDirection::Forward)
        }
    );
}

#[test]
fn threshold_decides_whether_to_scroll() {
    let mut narrow = scroller(200.0, AutoScrollConfig::default().with_threshold(30.0));
    assert_eq!(scroll_top_after_tick(&mut narrow, 460.0), 200.0);
    assert!(!narrow.is_scrolling());

    let mut wide = scroller(200.0, AutoScrollConfig::default().with_threshold(50.0));
    assert!(scroll_top_after_tick(&mut wide, 460.0) > 200.0);
}

#[test]
fn cursor_near_top_scrolls_up() {
    let mut c = scroller(200.0, AutoScrollConfig::default());
    assert!(scroll_top_after_tick(&mut c, 120.0) < 200.0);
    assert_eq!(c.scroll_direction().y, Some(ScrollDirection::Backward));
}

#[test]
fn scroll_stops_at_the_boundary() {
    let mut c = scroller(600.0, AutoScrollConfig::default());
    let outcome = c.tick(true, Some(Point::new(200.0, 480.0)), |_, _| {
        panic!("no scroll expected");
    });
    assert_eq!(outcome, TickOutcome::Idle);
    assert_eq!(c.container(&1).map(|m| m.scroll_top), Some(600.0));
    assert!(!c.is_scrolling());
    assert!(c.scroll_direction().is_neutral());

    // A 15px step from 595 would overshoot the maximum of 600, so it is dropped.
    let mut c = scroller(595.0, AutoScrollConfig::default().with_accelerate(false));
    let outcome = c.tick(true, Some(Point::new(200.0, 480.0)), |_, _| {});
    assert_eq!(outcome, TickOutcome::Idle);
    assert_eq!(c.container(&1).map(|m| m.scroll_top), Some(595.0));

    // Same near the top: a 15px step up from 10 would go below zero.
    let mut c = scroller(10.0, AutoScrollConfig::default().with_accelerate(false));
    assert_eq!(scroll_top_after_tick(&mut c, 120.0), 10.0);
    assert!(!c.is_scrolling());

    // A step that lands exactly on the boundary is kept.
    let mut c = scroller(585.0, AutoScrollConfig::default().with_accelerate(false));
    assert_eq!(scroll_top_after_tick(&mut c, 480.0), 600.0);
}

#[test]
fn constant_speed_without_acceleration() {
    let mut c = scroller(200.0, AutoScrollConfig::default().with_accelerate(false));
    assert_eq!(scroll_top_after_tick(&mut c, 480.0), 215.0);
    assert_eq!(scroll_top_after_tick(&mut c, 499.0), 230.0);
}

#[test]
fn speed_is_non_increasing_with_distance() {
    let config = AutoScrollConfig::default();
    let mut prev = f64::INFINITY;
    for d in 0..=60 {
        let s = config.speed_at(f64::from(d));
        assert!(s <= prev);
        assert!(s >= 1.0);
        prev = s;
    }
    assert_eq!(config.speed_at(0.0), 15.0);

    let flat = config.with_accelerate(false);
    for d in 0..50 {
        assert_eq!(flat.speed_at(f64::from(d)), 15.0);
    }

    // The 1 px/frame floor never lifts the speed above a smaller maximum.
    let slow = config.with_max_speed(0.5);
    for d in 0..=60 {
        let s = slow.speed_at(f64::from(d));
        assert!(s <= 0.5, "d={d} speed {s}");
        assert!(s > 0.0);
    }
}

#[test]
fn callback_sees_the_scroll_applied_in_the_same_tick() {
    let mut c = scroller(200.0, AutoScrollConfig::default());
    let mut seen = Vec::new();
    let outcome = c.tick(true, Some(Point::new(200.0, 480.0)), |id, m| {
        seen.push((*id, m.scroll_top()));
    });
    assert_eq!(outcome, TickOutcome::Scrolled { dx: 0.0, dy: 9.0 });
    assert_eq!(seen, [(1, 209.0)]);
}

#[test]
fn loop_stops_without_a_drag_and_waits_without_a_cursor() {
    let mut c = scroller(200.0, AutoScrollConfig::default());
    assert_eq!(c.tick(true, None, |_, _| {}), TickOutcome::Waiting);
    assert!(c.is_monitoring());

    c.set_cursor_override(Some(Point::new(200.0, 480.0)));
    assert_eq!(c.tick(false, Some(Point::new(0.0, 0.0)), |_, _| {}), TickOutcome::Stopped);
    assert!(!c.is_monitoring());
    assert_eq!(c.cursor_override(), None);
    assert!(!c.tick(true, Some(Point::new(200.0, 480.0)), |_, _| {}).should_reschedule());
}

#[test]
fn cursor_override_replaces_the_cursor_for_edge_detection() {
    let mut c = scroller(200.0, AutoScrollConfig::default());
    c.set_cursor_override(Some(Point::new(200.0, 480.0)));
    // The raw cursor is far outside the container.
    assert!(matches!(
        c.tick(true, Some(Point::new(900.0, 900.0)), |_, _| {}),
        TickOutcome::Scrolled { .. }
    ));
    c.stop_monitoring();
    assert_eq!(c.cursor_override(), None);
}

#[test]
fn only_the_first_matching_container_scrolls() {
    let mut c = AutoScrollController::new();
    let rect = Rect::new(0.0, 0.0, 300.0, 300.0);
    c.register_container("outer", ScrollMetrics::new(rect, 300.0, 900.0), None);
    c.register_container("inner", ScrollMetrics::new(rect, 300.0, 900.0), None);
    c.start_monitoring();
    let mut ids = Vec::new();
    c.tick(true, Some(Point::new(150.0, 290.0)), |id, _| ids.push(*id));
    assert_eq!(ids, ["outer"]);
    assert_eq!(c.container(&"inner").map(|m| m.scroll_top), Some(0.0));

    assert!(c.unregister_container(&"outer").is_some());
    assert!(c.unregister_container(&"outer").is_none());
    ids.clear();
    c.tick(true, Some(Point::new(150.0, 290.0)), |id, _| ids.push(*id));
    assert_eq!(ids, ["inner"]);
}

#[test]
fn horizontal_edges_scroll_horizontally() {
    let mut c = AutoScrollController::new();
    let metrics = ScrollMetrics::new(Rect::new(0.0, 0.0, 300.0, 100.0), 1200.0, 100.0);
    c.register_container(0u8, metrics, None);
    c.start_monitoring();
    let outcome = c.tick(true, Some(Point::new(290.0, 50.0)), |_, _| {});
    assert_eq!(outcome, TickOutcome::Scrolled { dx: 12.0, dy: 0.0 });
    assert_eq!(c.scroll_direction().x, Some(ScrollDirection::Forward));
}

#[test]
fn auto_scroll_never_leaves_the_scroll_range_randomized() {
    let mut rng = Lcg::new(7);
    for _ in 0..300 {
        let config = AutoScrollConfig {
            threshold: rng.gen_f64(0.0, 250.0),
            max_speed: rng.gen_f64(0.0, 400.0),
            accelerate: rng.gen_bool(),
        };
        let height = rng.gen_f64(50.0, 500.0);
        let content = rng.gen_f64(0.0, 2000.0);
        let start = rng.gen_f64(0.0, (content - height).max(0.0));
        let mut c = AutoScrollController::new();
        let metrics = ScrollMetrics::new(Rect::new(0.0, 0.0, 200.0, height), 200.0, content)
            .with_scroll(0.0, start);
        c.register_container(0u8, metrics, Some(config));
        c.start_monitoring();

        let max = (content - height).max(0.0);
        for _ in 0..40 {
            let cursor = Point::new(rng.gen_f64(-10.0, 210.0), rng.gen_f64(-10.0, height + 10.0));
            c.tick(true, Some(cursor), |_, _| {});
            let top = c.container(&0).map(|m| m.scroll_top).unwrap_or(f64::NAN);
            assert!((0.0..=max).contains(&top), "scroll_top {top} out of [0, {max}]");
        }
    }
}

// ---------------------------------------------------------------------------------------------
// DragSession

type Session = DragSession<&'static str, &'static str>;

fn item(id: &'static str) -> DraggedItem<&'static str, &'static str> {
    DraggedItem::new(id, "list-a", 200.0, 50.0)
}

fn start_pointer(session: &mut Session, id: &'static str, source_index: usize) {
    assert!(
        session.start_drag(
            DragStart::new(item(id))
                .with_cursor(Point::new(10.0, 20.0))
                .with_grab_offset(Point::new(5.0, 5.0))
                .with_active_list("list-a")
                .with_source_index(source_index)
        )
    );
}

#[test]
fn pointer_drag_round_trip_with_drop_pending() {
    let mut s = Session::default();
    assert_eq!(s.phase(), DragPhase::Idle);
    start_pointer(&mut s, "b", 1);
    assert_eq!(s.phase(), DragPhase::PointerDragging);
    assert_eq!(s.source_index(), Some(1));
    assert_eq!(s.source_list_id(), Some(&"list-a"));
    assert_eq!(s.initial_position(), Some(Point::new(10.0, 20.0)));

    s.update_drag_position(
        DragUpdate::cursor(Point::new(10.0, 140.0)).with_target(
            "list-a",
            3,
            PlaceholderKey::Before("d"),
        ),
    );
    assert_eq!(s.placeholder_index(), Some(3));
    assert_eq!(s.cursor_position(), Some(Point::new(10.0, 140.0)));

    let snap = s.snapshot();
    let drop = snap.drop_result().expect("over a list");
    assert_eq!(drop.destination_index(), 2);
    assert!(!drop.is_noop());

    s.end_drag(1_000);
    assert!(!s.is_dragging());
    assert_eq!(s.phase(), DragPhase::DropPending);
    assert_eq!(s.drop_pending_id(), Some(&"b"));
    assert_eq!(s.placeholder_index(), None);

    s.complete_drop_transition();
    assert_eq!(s.phase(), DragPhase::Idle);
}

#[test]
fn drop_pending_is_cleared_by_the_safety_timer() {
    let mut s = Session::new(DragSessionOptions::default().with_drop_pending_timeout_ms(100));
    start_pointer(&mut s, "b", 1);
    s.end_drag(1_000);
    s.update_timers(1_050);
    assert_eq!(s.drop_pending_id(), Some(&"b"));
    s.update_timers(1_100);
    assert_eq!(s.drop_pending_id(), None);
    assert_eq!(s.phase(), DragPhase::Idle);
}

#[test]
fn cancel_skips_drop_pending() {
    let mut s = Session::default();
    start_pointer(&mut s, "c", 2);
    s.cancel_drag();
    assert!(s.was_cancelled());
    assert_eq!(s.phase(), DragPhase::Idle);
    assert_eq!(s.drop_pending_id(), None);

    start_pointer(&mut s, "c", 2);
    assert!(!s.was_cancelled());
}

#[test]
fn stale_calls_are_ignored() {
    let changes = Arc::new(AtomicUsize::new(0));
    let mut s = Session::default();
    let counter = Arc::clone(&changes);
    s.set_on_change(Some(move |_: &Session| {
        counter.fetch_add(1, Ordering::Relaxed);
    }));

    s.update_drag_position(DragUpdate::cursor(Point::new(1.0, 1.0)));
    s.end_drag(0);
    s.cancel_drag();
    s.complete_drop_transition();
    s.update_timers(10_000);
    assert_eq!(changes.load(Ordering::Relaxed), 0);
    assert_eq!(s.cursor_position(), None);
    assert!(!s.was_cancelled());
}

#[test]
#[cfg_attr(debug_assertions, should_panic(expected = "already active"))]
fn second_start_is_rejected() {
    let mut s = Session::default();
    start_pointer(&mut s, "a", 0);
    let accepted = s.start_drag(DragStart::new(item("b")));
    assert!(!accepted);
    assert_eq!(s.dragged_item().map(|i| i.id), Some("a"));
}

#[test]
fn batch_update_notifies_once() {
    let changes = Arc::new(AtomicUsize::new(0));
    let mut s = Session::default();
    let counter = Arc::clone(&changes);
    s.set_on_change(Some(move |_: &Session| {
        counter.fetch_add(1, Ordering::Relaxed);
    }));
    s.batch_update(|s| {
        start_pointer(s, "a", 0);
        s.update_drag_position(DragUpdate::cursor(Point::new(3.0, 4.0)));
        s.update_drag_position(DragUpdate::cursor(Point::new(5.0, 6.0)));
    });
    assert_eq!(changes.load(Ordering::Relaxed), 1);
}

#[test]
fn axis_lock_pins_the_effective_cursor() {
    let mut s = Session::default();
    s.start_drag(
        DragStart::new(item("a"))
            .with_cursor(Point::new(10.0, 20.0))
            .with_grab_offset(Point::new(4.0, 8.0))
            .with_axis_lock(Some(AxisLock::Y)),
    );
    s.update_drag_position(DragUpdate::cursor(Point::new(50.0, 80.0)));
    assert_eq!(s.effective_cursor(), Some(Point::new(10.0, 80.0)));
    assert_eq!(s.preview_origin(), Some(Point::new(6.0, 72.0)));
    s.cancel_drag();

    s.start_drag(
        DragStart::new(item("a"))
            .with_cursor(Point::new(10.0, 20.0))
            .with_axis_lock(Some(AxisLock::X)),
    );
    s.update_drag_position(DragUpdate::cursor(Point::new(50.0, 80.0)));
    assert_eq!(s.effective_cursor(), Some(Point::new(50.0, 20.0)));
}

#[test]
fn dropping_in_place_is_a_noop() {
    let at = |placeholder_index: usize, destination: &'static str| DropResult {
        item_id: "b",
        source_list_id: "list-a",
        source_index: Some(1),
        destination_list_id: destination,
        placeholder_key: PlaceholderKey::EndOfList,
        placeholder_index,
    };
    assert!(at(1, "list-a").is_noop());
    assert!(at(2, "list-a").is_noop());
    assert_eq!(at(2, "list-a").destination_index(), 1);
    assert!(!at(3, "list-a").is_noop());
    assert_eq!(at(0, "list-a").destination_index(), 0);
    assert_eq!(at(2, "list-b").destination_index(), 2);
    assert!(!at(1, "list-b").is_noop());
}

#[test]
fn drop_result_requires_a_target() {
    let mut s = Session::default();
    start_pointer(&mut s, "a", 0);
    s.update_drag_position(DragUpdate::cursor(Point::new(900.0, 900.0)));
    assert!(s.snapshot().drop_result().is_none());
}

// ---------------------------------------------------------------------------------------------
// KeyboardDragController

fn key_in<'a>(keys: &'a [&'static str]) -> impl Fn(usize) -> Option<&'static str> + 'a {
    move |i| keys.get(i).copied()
}

#[test]
fn keyboard_moves_within_the_source_list() {
    let mut s = Session::default();
    let mut kb = KeyboardDragController::new();
    // Six items, "b" at index 1 is dragged: five remain visible.
    assert!(kb.start(&mut s, item("b"), 1, 5, key_in(&KEYS)));
    assert!(s.is_keyboard_drag());
    assert_eq!(s.phase(), DragPhase::KeyboardDragging);
    assert_eq!(kb.target_index(), 1);
    assert_eq!(s.placeholder_index(), Some(2));
    assert!(s.snapshot().drop_result().is_some_and(|d| d.is_noop()));

    kb.move_down(&mut s, key_in(&KEYS));
    assert_eq!(kb.target_index(), 2);
    assert_eq!(s.placeholder_index(), Some(3));
    assert_eq!(s.placeholder_key(), Some(&PlaceholderKey::Before("d")));

    kb.move_up(&mut s, key_in(&KEYS));
    kb.move_up(&mut s, key_in(&KEYS));
    kb.move_up(&mut s, key_in(&KEYS));
    assert_eq!(kb.target_index(), 0);
    assert_eq!(s.placeholder_index(), Some(0));

    for _ in 0..10 {
        kb.move_down(&mut s, key_in(&KEYS));
    }
    assert_eq!(kb.target_index(), 5);
    assert_eq!(s.placeholder_index(), Some(6));
    assert_eq!(s.placeholder_key(), Some(&PlaceholderKey::EndOfList));
}

#[test]
fn keyboard_hands_off_between_lists() {
    let other = ["x", "y"];
    let mut s = Session::default();
    let mut kb = KeyboardDragController::new();
    kb.start(&mut s, item("b"), 1, 5, key_in(&KEYS));

    kb.move_to_droppable(&mut s, "list-b", 9, 2, key_in(&other));
    assert_eq!(s.active_list_id(), Some(&"list-b"));
    assert_eq!(kb.target_index(), 2);
    assert_eq!(s.placeholder_index(), Some(2));
    assert_eq!(s.placeholder_key(), Some(&PlaceholderKey::EndOfList));

    kb.move_to_droppable(&mut s, "list-a", 3, 5, key_in(&KEYS));
    assert_eq!(s.placeholder_index(), Some(4));

    kb.complete(&mut s, 500);
    assert_eq!(s.phase(), DragPhase::DropPending);
    assert_eq!(kb, KeyboardDragController::default());
}

#[test]
fn keyboard_ignores_pointer_sessions() {
    let mut s = Session::default();
    let mut kb = KeyboardDragController::new();
    start_pointer(&mut s, "a", 0);
    kb.move_down(&mut s, key_in(&KEYS));
    assert_eq!(s.placeholder_index(), None);
    kb.cancel(&mut s);
    assert!(s.is_dragging());
    assert!(!kb.start(&mut s, item("b"), 1, 5, key_in(&KEYS)));
}

#[test]
fn keyboard_cancel_restores_idle() {
    let mut s = Session::default();
    let mut kb = KeyboardDragController::new();
    kb.start(&mut s, item("c"), 2, 5, key_in(&KEYS));
    kb.move_down(&mut s, key_in(&KEYS));
    kb.cancel(&mut s);
    assert!(s.was_cancelled());
    assert_eq!(s.phase(), DragPhase::Idle);
}
