// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::def::TreeDef;
use crate::error::TreeResult;
use crate::filter::filter;
use crate::flatten::{flatten, unflatten};
use crate::kind::FieldKind;
use crate::leaf::LeafSlot;
use crate::merge::merge;
use crate::rng::RngKey;
use crate::schema::FieldSchema;
use crate::value::{NodeValue, TreeValue};
use std::sync::Arc;

/// Contract implemented by every concrete layer.
///
/// A layer declares its fields once through [`FieldSchema::builder`] and
/// converts itself to and from [`NodeValue`]; everything else — flattening,
/// filtering, partitioning, merging, structural equality — is provided. The
/// conversion pair is the registration a host engine needs to traverse the
/// layer exactly as it traverses its own containers.
///
/// Constructors are expected to call [`Module::initialise`] exactly once;
/// [`Module::from_node`] must never call it, so flatten/unflatten cycles
/// reuse the leaf values they were given instead of re-drawing them.
pub trait Module: Sized {
    /// Returns the interned field schema for this class.
    fn schema() -> TreeResult<Arc<FieldSchema>>;

    /// Projects the instance into tree form.
    fn to_node(&self) -> TreeResult<NodeValue>;

    /// Rebuilds an instance from tree form without running initialisation.
    fn from_node(node: NodeValue) -> TreeResult<Self>;

    /// Construction-time hook for drawing initial values from a key.
    fn initialise(&mut self, _key: RngKey) -> TreeResult<()> {
        Ok(())
    }

    /// Wraps the instance as a tree value.
    fn to_tree(&self) -> TreeResult<TreeValue> {
        Ok(TreeValue::from(self.to_node()?))
    }

    /// Rebuilds an instance from a tree value.
    fn from_tree(tree: TreeValue) -> TreeResult<Self> {
        Self::from_node(tree.into_node()?)
    }

    /// Flattens the instance into leaf slots plus its descriptor.
    fn flatten(&self) -> TreeResult<(Vec<LeafSlot>, TreeDef)> {
        flatten(&self.to_tree()?)
    }

    /// Rebuilds an instance from a descriptor and leaf slots.
    fn unflatten(def: &TreeDef, slots: &[LeafSlot]) -> TreeResult<Self> {
        Self::from_tree(unflatten(def, slots)?)
    }

    /// Returns the structure descriptor of the instance.
    fn structure(&self) -> TreeResult<TreeDef> {
        Ok(self.flatten()?.1)
    }

    /// Filters the instance's tree by kind.
    fn filtered<F>(&self, pred: F) -> TreeResult<TreeValue>
    where
        F: Fn(&FieldKind) -> bool,
    {
        Ok(filter(&self.to_tree()?, pred))
    }

    /// Splits the instance's tree into the matching part and the rest.
    fn partition<F>(&self, pred: F) -> TreeResult<(TreeValue, TreeValue)>
    where
        F: Fn(&FieldKind) -> bool,
    {
        let tree = self.to_tree()?;
        let matching = filter(&tree, &pred);
        let rest = filter(&tree, |kind| !pred(kind));
        Ok((matching, rest))
    }

    /// Merges partial trees back into a typed instance.
    fn merge_parts(parts: &[TreeValue]) -> TreeResult<Self> {
        Self::from_tree(merge(parts)?)
    }

    /// Structural equality: equal descriptors and equal leaf values.
    fn tree_eq(&self, other: &Self) -> TreeResult<bool> {
        let (ours, our_def) = self.flatten()?;
        let (theirs, their_def) = other.flatten()?;
        Ok(our_def == their_def && ours == theirs)
    }

    /// Renders the instance's tree for logs and debugging.
    fn describe(&self) -> TreeResult<String> {
        Ok(self.to_tree()?.to_string())
    }
}
