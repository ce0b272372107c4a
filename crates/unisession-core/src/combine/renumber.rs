use std::collections::HashMap;
use std::hash::Hash;

/// An item tagged with where it was found: its session's position in the
/// processing order and its index within that session's discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<T> {
    pub session_pos: usize,
    pub discovery_idx: usize,
    pub item: T,
}

/// An item with its newly assigned run.
#[derive(Debug, Clone, PartialEq)]
pub struct Numbered<T> {
    pub run: u32,
    /// Zero-padding width shared by every run of the item's group.
    pub width: usize,
    pub item: T,
}

/// Digits used for run labels: two, or more when a group needs them.
pub fn run_width(group_size: usize) -> usize {
    group_size.to_string().len().max(2)
}

/// Assign runs 1..N within each group, ordered by session position and then
/// discovery index. The sort is stable and ignores any original run numbers.
/// Output follows the same (session, discovery) order.
pub fn renumber<T, K, F>(mut items: Vec<Ordered<T>>, key: F) -> Vec<Numbered<T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    items.sort_by_key(|o| (o.session_pos, o.discovery_idx));

    let mut sizes: HashMap<K, usize> = HashMap::new();
    for o in &items {
        *sizes.entry(key(&o.item)).or_default() += 1;
    }

    let mut next: HashMap<K, u32> = HashMap::new();
    items
        .into_iter()
        .map(|o| {
            let k = key(&o.item);
            let width = run_width(sizes.get(&k).copied().unwrap_or(0));
            let run = next.entry(k).or_insert(0);
            *run += 1;
            Numbered {
                run: *run,
                width,
                item: o.item,
            }
        })
        .collect()
}
