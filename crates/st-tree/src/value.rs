// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Universal tree representation walked by every structural operation.

use crate::error::{TreeError, TreeResult};
use crate::leaf::{Leaf, LeafSlot};
use crate::rng::RngKey;
use crate::schema::FieldSchema;
use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Hashable static metadata captured into descriptors by value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StaticValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Bit-exact float so descriptors stay hashable.
    Float(u64),
    Str(String),
    List(Vec<StaticValue>),
}

impl StaticValue {
    /// Wraps a float, preserving its exact bit pattern.
    pub fn float(value: f64) -> Self {
        StaticValue::Float(value.to_bits())
    }

    fn type_name(&self) -> &'static str {
        match self {
            StaticValue::Bool(_) => "bool",
            StaticValue::Int(_) => "int",
            StaticValue::UInt(_) => "uint",
            StaticValue::Float(_) => "float",
            StaticValue::Str(_) => "str",
            StaticValue::List(_) => "list",
        }
    }

    /// Reads the value as a bool.
    pub fn as_bool(&self) -> TreeResult<bool> {
        match self {
            StaticValue::Bool(value) => Ok(*value),
            other => Err(TreeError::StaticType {
                expected: "bool",
                found: other.type_name(),
            }),
        }
    }

    /// Reads the value as a signed integer.
    pub fn as_i64(&self) -> TreeResult<i64> {
        match self {
            StaticValue::Int(value) => Ok(*value),
            other => Err(TreeError::StaticType {
                expected: "int",
                found: other.type_name(),
            }),
        }
    }

    /// Reads the value as an unsigned integer.
    pub fn as_u64(&self) -> TreeResult<u64> {
        match self {
            StaticValue::UInt(value) => Ok(*value),
            other => Err(TreeError::StaticType {
                expected: "uint",
                found: other.type_name(),
            }),
        }
    }

    /// Reads the value as a usize, the common case for sizes and widths.
    pub fn as_usize(&self) -> TreeResult<usize> {
        Ok(self.as_u64()? as usize)
    }

    /// Reads the value as a float.
    pub fn as_f64(&self) -> TreeResult<f64> {
        match self {
            StaticValue::Float(bits) => Ok(f64::from_bits(*bits)),
            other => Err(TreeError::StaticType {
                expected: "float",
                found: other.type_name(),
            }),
        }
    }

    /// Reads the value as a string slice.
    pub fn as_str(&self) -> TreeResult<&str> {
        match self {
            StaticValue::Str(value) => Ok(value),
            other => Err(TreeError::StaticType {
                expected: "str",
                found: other.type_name(),
            }),
        }
    }
}

impl From<bool> for StaticValue {
    fn from(value: bool) -> Self {
        StaticValue::Bool(value)
    }
}

impl From<i64> for StaticValue {
    fn from(value: i64) -> Self {
        StaticValue::Int(value)
    }
}

impl From<u64> for StaticValue {
    fn from(value: u64) -> Self {
        StaticValue::UInt(value)
    }
}

impl From<usize> for StaticValue {
    fn from(value: usize) -> Self {
        StaticValue::UInt(value as u64)
    }
}

impl From<f64> for StaticValue {
    fn from(value: f64) -> Self {
        StaticValue::float(value)
    }
}

impl From<&str> for StaticValue {
    fn from(value: &str) -> Self {
        StaticValue::Str(value.to_string())
    }
}

impl From<String> for StaticValue {
    fn from(value: String) -> Self {
        StaticValue::Str(value)
    }
}

impl fmt::Display for StaticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticValue::Bool(value) => write!(f, "{value}"),
            StaticValue::Int(value) => write!(f, "{value}"),
            StaticValue::UInt(value) => write!(f, "{value}"),
            StaticValue::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            StaticValue::Str(value) => write!(f, "{value:?}"),
            StaticValue::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Any nested combination of nodes, containers, and leaf slots.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeValue {
    /// Terminal position, occupied or absent.
    Slot(LeafSlot),
    /// Ordered sequence traversed by index.
    List(Vec<TreeValue>),
    /// Mapping traversed in ascending key order.
    Dict(BTreeMap<String, TreeValue>),
    /// Module instance in tree form.
    Node(Box<NodeValue>),
}

impl TreeValue {
    /// Wraps a leaf value in an occupied slot.
    pub fn leaf(leaf: impl Into<Leaf>) -> Self {
        TreeValue::Slot(LeafSlot::Present(leaf.into()))
    }

    /// Returns the absent sentinel slot.
    pub fn absent() -> Self {
        TreeValue::Slot(LeafSlot::Absent)
    }

    pub(crate) fn shape_name(&self) -> &'static str {
        match self {
            TreeValue::Slot(_) => "leaf slot",
            TreeValue::List(_) => "list",
            TreeValue::Dict(_) => "dict",
            TreeValue::Node(_) => "module",
        }
    }

    /// Consumes the value as a leaf slot.
    pub fn into_slot(self) -> TreeResult<LeafSlot> {
        match self {
            TreeValue::Slot(slot) => Ok(slot),
            other => Err(TreeError::ValueShape {
                expected: "leaf slot",
                found: other.shape_name(),
            }),
        }
    }

    /// Consumes the value as a list.
    pub fn into_list(self) -> TreeResult<Vec<TreeValue>> {
        match self {
            TreeValue::List(items) => Ok(items),
            other => Err(TreeError::ValueShape {
                expected: "list",
                found: other.shape_name(),
            }),
        }
    }

    /// Consumes the value as a dict.
    pub fn into_dict(self) -> TreeResult<BTreeMap<String, TreeValue>> {
        match self {
            TreeValue::Dict(entries) => Ok(entries),
            other => Err(TreeError::ValueShape {
                expected: "dict",
                found: other.shape_name(),
            }),
        }
    }

    /// Consumes the value as a module node.
    pub fn into_node(self) -> TreeResult<NodeValue> {
        match self {
            TreeValue::Node(node) => Ok(*node),
            other => Err(TreeError::ValueShape {
                expected: "module",
                found: other.shape_name(),
            }),
        }
    }

    /// Borrows the value as a module node.
    pub fn as_node(&self) -> TreeResult<&NodeValue> {
        match self {
            TreeValue::Node(node) => Ok(node),
            other => Err(TreeError::ValueShape {
                expected: "module",
                found: other.shape_name(),
            }),
        }
    }
}

impl From<Leaf> for TreeValue {
    fn from(leaf: Leaf) -> Self {
        TreeValue::leaf(leaf)
    }
}

impl From<LeafSlot> for TreeValue {
    fn from(slot: LeafSlot) -> Self {
        TreeValue::Slot(slot)
    }
}

impl From<RngKey> for TreeValue {
    fn from(key: RngKey) -> Self {
        TreeValue::leaf(Leaf::Key(key))
    }
}

impl From<NodeValue> for TreeValue {
    fn from(node: NodeValue) -> Self {
        TreeValue::Node(Box::new(node))
    }
}

impl From<Vec<TreeValue>> for TreeValue {
    fn from(items: Vec<TreeValue>) -> Self {
        TreeValue::List(items)
    }
}

impl fmt::Display for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeValue::Slot(LeafSlot::Absent) => f.write_str("absent"),
            TreeValue::Slot(LeafSlot::Present(Leaf::Key(_))) => f.write_str("key"),
            TreeValue::Slot(LeafSlot::Present(Leaf::Array(array))) => {
                write!(f, "array{:?}", array.shape())
            }
            TreeValue::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            TreeValue::Dict(entries) => {
                write!(f, "{{")?;
                for (idx, (key, value)) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            TreeValue::Node(node) => write!(f, "{node}"),
        }
    }
}

/// A module instance projected into tree form.
///
/// Statics and dynamic fields are stored by schema position, so a fully
/// built node always satisfies its class layout.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeValue {
    schema: Arc<FieldSchema>,
    statics: Vec<StaticValue>,
    fields: Vec<TreeValue>,
}

impl NodeValue {
    /// Starts populating a node for the given schema.
    pub fn builder(schema: Arc<FieldSchema>) -> NodeBuilder {
        let statics = vec![None; schema.statics().len()];
        let fields = vec![None; schema.fields().len()];
        NodeBuilder {
            schema,
            statics,
            fields,
            error: None,
        }
    }

    pub(crate) fn from_parts(
        schema: Arc<FieldSchema>,
        statics: Vec<StaticValue>,
        fields: Vec<TreeValue>,
    ) -> Self {
        Self {
            schema,
            statics,
            fields,
        }
    }

    /// Returns the schema this node was built against.
    pub fn schema(&self) -> &Arc<FieldSchema> {
        &self.schema
    }

    /// Returns the class name.
    pub fn class(&self) -> &'static str {
        self.schema.class()
    }

    /// Returns the static values in declaration order.
    pub fn statics(&self) -> &[StaticValue] {
        &self.statics
    }

    /// Returns the dynamic field values in declaration order.
    pub fn fields(&self) -> &[TreeValue] {
        &self.fields
    }

    /// Reads a static value by name.
    pub fn static_value(&self, name: &'static str) -> TreeResult<&StaticValue> {
        let index = self
            .schema
            .static_index(name)
            .ok_or(TreeError::UnknownField {
                class: self.schema.class(),
                field: name,
            })?;
        Ok(&self.statics[index])
    }

    /// Reads a dynamic field value by name.
    pub fn field(&self, name: &'static str) -> TreeResult<&TreeValue> {
        let index = self
            .schema
            .field_index(name)
            .ok_or(TreeError::UnknownField {
                class: self.schema.class(),
                field: name,
            })?;
        Ok(&self.fields[index])
    }

    /// Consumes the node into a by-name field table for typed reconstruction.
    pub fn into_fields(self) -> FieldValues {
        FieldValues {
            schema: self.schema,
            fields: self.fields.into_iter().map(Some).collect(),
        }
    }
}

/// Chainable population of a node; the first error is reported at `finish`.
pub struct NodeBuilder {
    schema: Arc<FieldSchema>,
    statics: Vec<Option<StaticValue>>,
    fields: Vec<Option<TreeValue>>,
    error: Option<TreeError>,
}

impl NodeBuilder {
    /// Sets a static value by name.
    pub fn static_value(mut self, name: &'static str, value: impl Into<StaticValue>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.schema.static_index(name) {
            Some(index) => self.statics[index] = Some(value.into()),
            None => {
                self.error = Some(TreeError::UnknownField {
                    class: self.schema.class(),
                    field: name,
                });
            }
        }
        self
    }

    /// Sets a dynamic field value by name.
    pub fn field(mut self, name: &'static str, value: impl Into<TreeValue>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.schema.field_index(name) {
            Some(index) => self.fields[index] = Some(value.into()),
            None => {
                self.error = Some(TreeError::UnknownField {
                    class: self.schema.class(),
                    field: name,
                });
            }
        }
        self
    }

    /// Checks completeness and produces the node.
    pub fn finish(self) -> TreeResult<NodeValue> {
        let Self {
            schema,
            statics,
            fields,
            error,
        } = self;
        if let Some(error) = error {
            return Err(error);
        }
        let class = schema.class();
        let mut static_values = Vec::with_capacity(statics.len());
        for (slot, name) in statics.into_iter().zip(schema.statics().iter().copied()) {
            static_values.push(slot.ok_or(TreeError::MissingField { class, field: name })?);
        }
        let mut field_values = Vec::with_capacity(fields.len());
        for (slot, decl) in fields.into_iter().zip(schema.fields()) {
            field_values.push(slot.ok_or(TreeError::MissingField {
                class,
                field: decl.name(),
            })?);
        }
        Ok(NodeValue {
            schema,
            statics: static_values,
            fields: field_values,
        })
    }
}

/// By-name extraction of a node's dynamic fields.
pub struct FieldValues {
    schema: Arc<FieldSchema>,
    fields: Vec<Option<TreeValue>>,
}

impl FieldValues {
    /// Takes a field out of the table; taking twice is an error.
    pub fn take(&mut self, name: &'static str) -> TreeResult<TreeValue> {
        let index = self
            .schema
            .field_index(name)
            .ok_or(TreeError::UnknownField {
                class: self.schema.class(),
                field: name,
            })?;
        self.fields[index].take().ok_or(TreeError::MissingField {
            class: self.schema.class(),
            field: name,
        })
    }
}

impl fmt::Display for NodeValue {
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
        for (decl, value) in self.schema.fields().iter().zip(&self.fields) {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{}={value}", decl.name())?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;

    fn demo_schema() -> Arc<FieldSchema> {
        FieldSchema::builder("ValueDemo")
            .static_field("features")
            .parameter("weight")
            .batch_stat("mean")
            .seal()
            .unwrap()
    }

    #[test]
    fn builder_fills_every_declared_slot() {
        let node = NodeValue::builder(demo_schema())
            .static_value("features", 3usize)
            .field("weight", Leaf::from_vec(vec![1.0, 2.0, 3.0]))
            .field("mean", Leaf::zeros(&[3]))
            .finish()
            .unwrap();
        assert_eq!(node.class(), "ValueDemo");
        assert_eq!(node.static_value("features").unwrap().as_usize().unwrap(), 3);
        assert!(node.field("weight").is_ok());
    }

    #[test]
    fn builder_rejects_missing_and_unknown_fields() {
        let missing = NodeValue::builder(demo_schema())
            .static_value("features", 3usize)
            .field("weight", Leaf::zeros(&[3]))
            .finish();
        assert_eq!(
            missing.unwrap_err(),
            TreeError::MissingField {
                class: "ValueDemo",
                field: "mean",
            }
        );
        let unknown = NodeValue::builder(demo_schema())
            .field("bias", Leaf::zeros(&[3]))
            .finish();
        assert_eq!(
            unknown.unwrap_err(),
            TreeError::UnknownField {
                class: "ValueDemo",
                field: "bias",
            }
        );
    }

    #[test]
    fn field_table_takes_each_field_once() {
        let node = NodeValue::builder(demo_schema())
            .static_value("features", 2usize)
            .field("weight", Leaf::zeros(&[2]))
            .field("mean", Leaf::zeros(&[2]))
            .finish()
            .unwrap();
        let mut fields = node.into_fields();
        assert!(fields.take("weight").is_ok());
        assert!(fields.take("weight").is_err());
    }

    #[test]
    fn static_accessors_check_types() {
        let value = StaticValue::from(4usize);
        assert_eq!(value.as_usize().unwrap(), 4);
        assert_eq!(
            value.as_str().unwrap_err(),
            TreeError::StaticType {
                expected: "str",
                found: "uint",
            }
        );
        let float = StaticValue::float(0.5);
        assert_eq!(float.as_f64().unwrap(), 0.5);
    }
}
