//! Drag-to-reorder as a stable list move.

use crate::store::LinkItem;

/// Anything with a stable, unique identity inside its list.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for LinkItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Move the item identified by `from` to the position currently held by `to`.
///
/// The moved item is removed and reinserted at the destination index; every
/// other item keeps its relative order (a move, not a swap). Returns `false`
/// and leaves the list untouched when the ids are equal or either is absent.
pub fn move_by_id<T: Identified>(items: &mut Vec<T>, from: &str, to: &str) -> bool {
    if from == to {
        return false;
    }

    let Some(old_index) = items.iter().position(|item| item.id() == from) else {
        return false;
    };
    let Some(new_index) = items.iter().position(|item| item.id() == to) else {
        return false;
    };

    let item = items.remove(old_index);
    items.insert(new_index, item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    impl Identified for String {
        fn id(&self) -> &str {
            self
        }
    }

    fn list(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_down() {
        let mut items = list(&["a", "b", "c", "d"]);
        assert!(move_by_id(&mut items, "a", "c"));
        assert_eq!(items, list(&["b", "c", "a", "d"]));
    }

    #[test]
    fn test_move_up() {
        let mut items = list(&["a", "b", "c", "d"]);
        assert!(move_by_id(&mut items, "d", "b"));
        assert_eq!(items, list(&["a", "d", "b", "c"]));
    }

    #[test]
    fn test_adjacent_move() {
        let mut items = list(&["a", "b", "c"]);
        assert!(move_by_id(&mut items, "b", "c"));
        assert_eq!(items, list(&["a", "c", "b"]));
    }

    #[test]
    fn test_same_id_is_noop() {
        let mut items = list(&["a", "b"]);
        assert!(!move_by_id(&mut items, "a", "a"));
        assert_eq!(items, list(&["a", "b"]));
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut items = list(&["a", "b"]);
        assert!(!move_by_id(&mut items, "zz", "a"));
        assert!(!move_by_id(&mut items, "a", "zz"));
        assert_eq!(items, list(&["a", "b"]));
    }

    #[test]
    fn test_link_items() {
        let mut links = crate::store::default_links();
        assert!(move_by_id(&mut links, "4", "1"));
        let ids: Vec<_> = links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "1", "2", "3"]);
    }

    fn ids_and_picks() -> impl Strategy<Value = (Vec<String>, usize, usize)> {
        (1usize..12).prop_flat_map(|len| {
            (
                Just((0..len).map(|i| format!("id-{i}")).collect::<Vec<_>>()),
                0..len,
                0..len,
            )
        })
    }

    proptest! {
        #[test]
        fn prop_move_is_permutation((ids, from, to) in ids_and_picks()) {
            let mut items = ids.clone();
            move_by_id(&mut items, &ids[from], &ids[to]);

            prop_assert_eq!(items.len(), ids.len());
            let mut sorted = items.clone();
            sorted.sort();
            let mut expected = ids.clone();
            expected.sort();
            prop_assert_eq!(sorted, expected);
        }

        #[test]
        fn prop_moved_item_lands_on_target_index((ids, from, to) in ids_and_picks()) {
            let mut items = ids.clone();
            move_by_id(&mut items, &ids[from], &ids[to]);
            prop_assert_eq!(&items[to], &ids[from]);
        }

        #[test]
        fn prop_swapped_positions_restore_order((ids, from, to) in ids_and_picks()) {
            let mut items = ids.clone();
            move_by_id(&mut items, &ids[from], &ids[to]);

            // Drag back: the moved item now sits at `to`, the drop target is
            // whatever now occupies `from`
            let back_from = items[to].clone();
            let back_to = items[from].clone();
            move_by_id(&mut items, &back_from, &back_to);
            prop_assert_eq!(items, ids);
        }
    }
}
