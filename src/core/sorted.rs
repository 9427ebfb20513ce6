use std::cmp::Ordering;

/// Index at which `item` keeps `items` sorted under `compare`.
///
/// Walks back from the end while `item` sorts strictly before its
/// predecessor, so an item equal to existing ones lands after them. `items`
/// must already be sorted.
pub fn insertion_index_by<T, F>(items: &[T], item: &T, mut compare: F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut index = items.len();
    while index >= 1 && compare(item, &items[index - 1]) == Ordering::Less {
        index -= 1;
    }
    index
}

/// True when `items` is non-decreasing under `compare`.
pub fn is_sorted_by<T, F>(items: &[T], mut compare: F) -> bool
where
    F: FnMut(&T, &T) -> Ordering,
{
    items
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}
