//! Local list permutations
//!
//! Nothing here touches a store; these are the in-memory steps a reorder
//! starts from.

use crate::error::PlanError;
use crate::plan::TEMP_ORDER_BASE;

/// An entity that takes part in a sibling-ordered list.
pub trait Sequenced {
    fn id(&self) -> u32;
    fn order(&self) -> i32;
    fn set_order(&mut self, order: i32);
}

/// Remove the element at `from` and reinsert it at `to`.
///
/// `to` is an index into the resulting list, so moving the first of three
/// elements to index 2 places it last.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), PlanError> {
    let len = items.len();
    if from >= len {
        return Err(PlanError::IndexOutOfBounds { index: from, len });
    }
    if to >= len {
        return Err(PlanError::IndexOutOfBounds { index: to, len });
    }
    if from == to {
        return Ok(());
    }

    let moving = items.remove(from);
    items.insert(to, moving);
    Ok(())
}

/// Order for a sibling appended after `existing`: one past the maximum, or 1.
///
/// Values parked in the temporary namespace are not counted.
pub fn next_order<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i32>,
{
    existing
        .into_iter()
        .filter(|&order| order < TEMP_ORDER_BASE)
        .max()
        .map_or(1, |max| max.max(0) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_move_forward() {
        let mut items = vec!['a', 'b', 'c'];
        array_move(&mut items, 0, 2).unwrap();
        assert_eq!(items, vec!['b', 'c', 'a']);
    }

    #[test]
    fn test_array_move_backward() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        array_move(&mut items, 3, 1).unwrap();
        assert_eq!(items, vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn test_array_move_same_index_keeps_list() {
        let mut items = vec![1, 2, 3];
        array_move(&mut items, 1, 1).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_array_move_out_of_bounds() {
        let mut items = vec![1, 2];
        assert_eq!(
            array_move(&mut items, 0, 2),
            Err(PlanError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(items, vec![1, 2]);
    }

    #[test]
    fn test_next_order() {
        assert_eq!(next_order([1, 5, 3, 2, 4]), 6);
        assert_eq!(next_order(Vec::new()), 1);
        assert_eq!(next_order([1, 10000, 10001]), 2);
    }
}
