// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Flattening a tree into a leaf list plus its descriptor, and back.
//!
//! The traversal order is fixed: dynamic fields in declaration order, list
//! elements by index, dict entries in ascending key order, nested nodes
//! recursively before later sibling fields. Static values go into the
//! descriptor, never into the leaf list, so replacing leaf values can never
//! change a descriptor while touching a static always does.

use crate::def::{NodeDef, TreeDef};
use crate::error::{TreeError, TreeResult};
use crate::kind::FieldKind;
use crate::leaf::LeafSlot;
use crate::schema::FieldRole;
use crate::value::{NodeValue, TreeValue};
use core::fmt;
use std::collections::BTreeMap;

/// One step of a leaf path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named module field.
    Field(&'static str),
    /// List position.
    Index(usize),
    /// Dict key.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(index) => write!(f, "{index}"),
            PathSegment::Key(key) => f.write_str(key),
        }
    }
}

/// Renders a leaf path with the `::` separator used for parameter names.
pub fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for (idx, segment) in path.iter().enumerate() {
        if idx > 0 {
            out.push_str("::");
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Kind context while inside a kind-tagged field, kept for blame reporting.
struct KindCtx<'a> {
    kind: &'a FieldKind,
    class: &'static str,
    field: &'static str,
}

fn walk(
    value: &TreeValue,
    ctx: Option<&KindCtx<'_>>,
    path: &mut Vec<PathSegment>,
    sink: &mut dyn FnMut(&[PathSegment], &LeafSlot),
) -> TreeResult<TreeDef> {
    match value {
        TreeValue::Slot(slot) => {
            sink(path, slot);
            Ok(TreeDef::Leaf(ctx.map(|c| c.kind.clone())))
        }
        TreeValue::List(items) => {
            let mut defs = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(index));
                let def = walk(item, ctx, path, sink);
                path.pop();
                defs.push(def?);
            }
            Ok(TreeDef::List(defs))
        }
        TreeValue::Dict(entries) => {
            let mut defs = Vec::with_capacity(entries.len());
            for (key, item) in entries {
                path.push(PathSegment::Key(key.clone()));
                let def = walk(item, ctx, path, sink);
                path.pop();
                defs.push((key.clone(), def?));
            }
            Ok(TreeDef::Dict(defs))
        }
        TreeValue::Node(node) => {
            if let Some(ctx) = ctx {
                return Err(TreeError::Classification {
                    class: ctx.class,
                    field: ctx.field,
                    found: "module",
                });
            }
            let schema = node.schema();
            let mut defs = Vec::with_capacity(node.fields().len());
            for (decl, field_value) in schema.fields().iter().zip(node.fields()) {
                path.push(PathSegment::Field(decl.name()));
                let def = match decl.role() {
                    FieldRole::Leaf(kind) => {
                        let ctx = KindCtx {
                            kind,
                            class: schema.class(),
                            field: decl.name(),
                        };
                        walk(field_value, Some(&ctx), path, sink)
                    }
                    FieldRole::Child => walk(field_value, None, path, sink),
                };
                path.pop();
                defs.push(def?);
            }
            Ok(TreeDef::Node(NodeDef::new(
                schema.clone(),
                node.statics().to_vec(),
                defs,
            )))
        }
    }
}

/// Flattens a tree into its leaf slots and structure descriptor.
pub fn flatten(tree: &TreeValue) -> TreeResult<(Vec<LeafSlot>, TreeDef)> {
    let mut leaves = Vec::new();
    let def = walk(tree, None, &mut Vec::new(), &mut |_, slot| {
        leaves.push(slot.clone());
    })?;
    Ok((leaves, def))
}

/// Flattens a tree into `(rendered path, slot)` pairs in traversal order.
pub fn named_leaves(tree: &TreeValue) -> TreeResult<Vec<(String, LeafSlot)>> {
    let mut leaves = Vec::new();
    walk(tree, None, &mut Vec::new(), &mut |path, slot| {
        leaves.push((render_path(path), slot.clone()));
    })?;
    Ok(leaves)
}

struct SlotCursor<'a> {
    slots: &'a [LeafSlot],
    pos: usize,
}

impl<'a> SlotCursor<'a> {
    fn next(&mut self) -> TreeResult<LeafSlot> {
        let slot = self.slots.get(self.pos).ok_or(TreeError::LeafCount {
            expected: self.pos + 1,
            got: self.slots.len(),
        })?;
        self.pos += 1;
        Ok(slot.clone())
    }
}

fn rebuild(def: &TreeDef, cursor: &mut SlotCursor<'_>) -> TreeResult<TreeValue> {
    match def {
        TreeDef::Leaf(_) => Ok(TreeValue::Slot(cursor.next()?)),
        TreeDef::List(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(rebuild(item, cursor)?);
            }
            Ok(TreeValue::List(values))
        }
        TreeDef::Dict(entries) => {
            let mut values = BTreeMap::new();
            for (key, item) in entries {
                values.insert(key.clone(), rebuild(item, cursor)?);
            }
            Ok(TreeValue::Dict(values))
        }
        TreeDef::Node(node) => {
            let mut fields = Vec::with_capacity(node.fields().len());
            for field in node.fields() {
                fields.push(rebuild(field, cursor)?);
            }
            Ok(TreeValue::from(NodeValue::from_parts(
                node.schema().clone(),
                node.statics().to_vec(),
                fields,
            )))
        }
    }
}

/// Reconstructs a tree from a descriptor and its leaf slots.
///
/// A count mismatch is an internal-contract violation: it can only arise
/// from bypassing [`flatten`] output, so it is fatal rather than recoverable.
pub fn unflatten(def: &TreeDef, slots: &[LeafSlot]) -> TreeResult<TreeValue> {
    let expected = def.leaf_count();
    if slots.len() != expected {
        return Err(TreeError::LeafCount {
            expected,
            got: slots.len(),
        });
    }
    rebuild(def, &mut SlotCursor { slots, pos: 0 })
}
