// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Structure descriptors: the shape-only fingerprint of a tree.
//!
//! A descriptor captures class, static values, field order and kinds, and
//! nested shapes, but never leaf values. Equal descriptors mean a host engine
//! may reuse compiled artifacts across calls; the descriptor is `Hash` so it
//! can key such caches directly.

use crate::kind::FieldKind;
use crate::schema::FieldSchema;
use crate::value::StaticValue;
use core::fmt;
use std::sync::Arc;

/// Shape-only fingerprint of a tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TreeDef {
    /// Terminal slot tagged with the kind of the innermost enclosing
    /// kind-tagged field; `None` for leaves outside any tagged field.
    Leaf(Option<FieldKind>),
    /// Ordered sequence of nested shapes.
    List(Vec<TreeDef>),
    /// Mapping entries in ascending key order.
    Dict(Vec<(String, TreeDef)>),
    /// Module node shape.
    Node(NodeDef),
}

impl TreeDef {
    /// Returns the number of leaf slots this descriptor spans.
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeDef::Leaf(_) => 1,
            TreeDef::List(items) => items.iter().map(TreeDef::leaf_count).sum(),
            TreeDef::Dict(entries) => entries.iter().map(|(_, def)| def.leaf_count()).sum(),
            TreeDef::Node(node) => node.fields.iter().map(TreeDef::leaf_count).sum(),
        }
    }
}

impl fmt::Display for TreeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeDef::Leaf(Some(kind)) => f.write_str(kind.label()),
            TreeDef::Leaf(None) => f.write_str("leaf"),
            TreeDef::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            TreeDef::Dict(entries) => {
                write!(f, "{{")?;
                for (idx, (key, def)) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {def}")?;
                }
                write!(f, "}}")
            }
            TreeDef::Node(node) => write!(f, "{node}"),
        }
    }
}

/// Node component of a descriptor: schema identity plus static values plus
/// nested field shapes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeDef {
    schema: Arc<FieldSchema>,
    statics: Vec<StaticValue>,
    fields: Vec<TreeDef>,
}

impl NodeDef {
    pub(crate) fn new(
        schema: Arc<FieldSchema>,
        statics: Vec<StaticValue>,
        fields: Vec<TreeDef>,
    ) -> Self {
        Self {
            schema,
            statics,
            fields,
        }
    }

    /// Returns the schema identity of the node.
    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    /// Returns the class name of the node.
    pub fn class(&self) -> &'static str {
        self.schema.class()
    }

    /// Returns the captured static values.
    pub fn statics(&self) -> &[StaticValue] {
        &self.statics
    }

    /// Returns the nested field shapes in declaration order.
    pub fn fields(&self) -> &[TreeDef] {
        &self.fields
    }
}

impl fmt::Display for NodeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.schema.class())?;
        let mut first = true;
        for (name, value) in self.schema.statics().iter().zip(&self.statics) {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{name}={value}")?;
        }
        for (decl, def) in self.schema.fields().iter().zip(&self.fields) {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={def}", decl.name())?;
        }
        write!(f, ")")
    }
}
