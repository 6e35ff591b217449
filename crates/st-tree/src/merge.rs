// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Recombining partial trees.
//!
//! Merge requires every operand to share one structure descriptor and fills
//! each leaf position left to right: a later non-absent operand overrides
//! earlier ones, so callers order operands as "defaults first, overrides
//! last". Re-tagging (`map_kinds`) rewrites the kind tags of a tree without
//! touching leaf values, the structural half of optimizer-state bookkeeping.

use crate::error::{TreeError, TreeResult};
use crate::flatten::{flatten, unflatten};
use crate::kind::FieldKind;
use crate::value::{NodeValue, TreeValue};
use tracing::debug;

/// Merges operands of identical structure, later non-absent slots winning.
///
/// Operands with unequal descriptors cannot be combined; that always
/// signals comparing trees from different definitions or different static
/// configuration, so it is fatal rather than recoverable.
pub fn merge(operands: &[TreeValue]) -> TreeResult<TreeValue> {
    let Some((first, rest)) = operands.split_first() else {
        return Err(TreeError::EmptyMerge);
    };
    let (mut slots, def) = flatten(first)?;
    for operand in rest {
        let (incoming, incoming_def) = flatten(operand)?;
        if incoming_def != def {
            debug!(left = %def, right = %incoming_def, "merge rejected");
            return Err(TreeError::StructureMismatch {
                left: def.to_string(),
                right: incoming_def.to_string(),
            });
        }
        for (slot, candidate) in slots.iter_mut().zip(incoming) {
            if candidate.is_present() {
                *slot = candidate;
            }
        }
    }
    unflatten(&def, &slots)
}

/// Two-operand merge where `patch` overrides `base` wherever it is present.
pub fn update(base: &TreeValue, patch: &TreeValue) -> TreeResult<TreeValue> {
    let (mut slots, def) = flatten(base)?;
    let (incoming, incoming_def) = flatten(patch)?;
    if incoming_def != def {
        debug!(left = %def, right = %incoming_def, "update rejected");
        return Err(TreeError::StructureMismatch {
            left: def.to_string(),
            right: incoming_def.to_string(),
        });
    }
    for (slot, candidate) in slots.iter_mut().zip(incoming) {
        if candidate.is_present() {
            *slot = candidate;
        }
    }
    unflatten(&def, &slots)
}

/// Rewrites every kind tag in the tree through `f`, leaving leaf values,
/// statics, and nesting untouched.
///
/// The rewritten nodes carry derived schemas that compare by value, so two
/// trees mapped through the same function keep equal descriptors while both
/// differ from their unmapped sources.
pub fn map_kinds<F>(tree: &TreeValue, f: F) -> TreeValue
where
    F: Fn(&FieldKind) -> FieldKind,
{
    fn walk(value: &TreeValue, f: &dyn Fn(&FieldKind) -> FieldKind) -> TreeValue {
        match value {
            TreeValue::Slot(slot) => TreeValue::Slot(slot.clone()),
            TreeValue::List(items) => {
                TreeValue::List(items.iter().map(|item| walk(item, f)).collect())
            }
            TreeValue::Dict(entries) => TreeValue::Dict(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), walk(item, f)))
                    .collect(),
            ),
            TreeValue::Node(node) => {
                let schema = node.schema().with_kinds(f);
                let fields = node.fields().iter().map(|item| walk(item, f)).collect();
                TreeValue::from(NodeValue::from_parts(
                    schema,
                    node.statics().to_vec(),
                    fields,
                ))
            }
        }
    }
    walk(tree, &f)
}
