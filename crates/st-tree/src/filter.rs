// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Kind-based filtering.
//!
//! Filtering only changes leaf occupancy: every slot whose enclosing field
//! kind fails the predicate becomes the absent sentinel, and nothing else in
//! the tree — statics, field order, nesting — moves. Leaves outside any
//! kind-tagged field carry no kind and pass through untouched, which keeps
//! the partition and composition laws total over every tree shape.

use crate::kind::FieldKind;
use crate::leaf::LeafSlot;
use crate::schema::FieldRole;
use crate::value::{NodeValue, TreeValue};

fn walk(
    value: &TreeValue,
    ctx: Option<&FieldKind>,
    pred: &dyn Fn(&FieldKind) -> bool,
) -> TreeValue {
    match value {
        TreeValue::Slot(slot) => match ctx {
            Some(kind) if !pred(kind) => TreeValue::Slot(LeafSlot::Absent),
            _ => TreeValue::Slot(slot.clone()),
        },
        TreeValue::List(items) => {
            TreeValue::List(items.iter().map(|item| walk(item, ctx, pred)).collect())
        }
        TreeValue::Dict(entries) => TreeValue::Dict(
            entries
                .iter()
                .map(|(key, item)| (key.clone(), walk(item, ctx, pred)))
                .collect(),
        ),
        TreeValue::Node(node) => {
            let schema = node.schema();
            let fields = schema
                .fields()
                .iter()
                .zip(node.fields())
                .map(|(decl, field_value)| match decl.role() {
                    FieldRole::Leaf(kind) => walk(field_value, Some(kind), pred),
                    FieldRole::Child => walk(field_value, None, pred),
                })
                .collect();
            TreeValue::from(NodeValue::from_parts(
                schema.clone(),
                node.statics().to_vec(),
                fields,
            ))
        }
    }
}

/// Produces a tree of identical descriptor shape where every leaf whose kind
/// fails the predicate is replaced by the absent sentinel.
pub fn filter<F>(tree: &TreeValue, pred: F) -> TreeValue
where
    F: Fn(&FieldKind) -> bool,
{
    walk(tree, None, &pred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::rng::RngKey;
    use crate::testing::sample_block;

    #[test]
    fn filtering_changes_occupancy_only() {
        let tree = sample_block(2, RngKey::new(11)).unwrap();
        let params = filter(&tree, FieldKind::is_parameter);
        let (full, def) = flatten(&tree).unwrap();
        let (kept, filtered_def) = flatten(&params).unwrap();
        assert_eq!(def, filtered_def);
        assert_eq!(full.len(), kept.len());
        // weights and biases plus the head scale survive, state and rng do
        // not, and the kindless taps pass through.
        let survivors = kept.iter().filter(|slot| slot.is_present()).count();
        assert_eq!(survivors, 5 + 2);
    }

    #[test]
    fn filtering_is_idempotent() {
        let tree = sample_block(2, RngKey::new(12)).unwrap();
        let once = filter(&tree, FieldKind::is_state);
        let twice = filter(&once, FieldKind::is_state);
        assert_eq!(once, twice);
    }

    #[test]
    fn successive_filters_compose_by_conjunction() {
        let tree = sample_block(2, RngKey::new(13)).unwrap();
        let p1 = |kind: &FieldKind| !kind.is_rng();
        let p2 = FieldKind::is_state;
        let chained = filter(&filter(&tree, p1), p2);
        let conjoined = filter(&tree, |kind| p1(kind) && p2(kind));
        assert_eq!(chained, conjoined);
    }

    #[test]
    fn kindless_leaves_are_never_filtered_out() {
        let tree = sample_block(1, RngKey::new(14)).unwrap();
        let nothing = filter(&tree, |_| false);
        let (slots, _) = flatten(&nothing).unwrap();
        let survivors = slots.iter().filter(|slot| slot.is_present()).count();
        // Only the two kindless taps survive an all-rejecting predicate.
        assert_eq!(survivors, 2);
    }
}
