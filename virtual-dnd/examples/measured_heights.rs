// Example: a height cache with measured rows, the dragged row collapsed out of the layout.
use virtual_dnd::HeightCache;

fn main() {
    let mut cache = HeightCache::with_keys(32, 0u32..10_000);
    for key in (0..10_000).step_by(7) {
        cache.set_height(key, 48 + key % 5 * 8);
    }

    println!("total_height={}", cache.get_total_height(cache.len()));
    let first = cache.find_first_visible_index(120_000);
    println!(
        "scroll_top=120000 first_visible={first} visible_count={}",
        cache.get_visible_count(first, 600)
    );

    cache.set_excluded_index(Some(first));
    println!(
        "excluding {first}: offset({})={} index_at(120000)={}",
        first + 1,
        cache.get_offset(first + 1),
        cache.find_index_at_offset(120_000)
    );
    cache.set_excluded_index(None);
}
