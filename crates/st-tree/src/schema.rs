// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Per-class field classification.
//!
//! A class declares its fields once through [`SchemaBuilder`]; the sealed
//! schema is interned in a process-wide registry so classification happens a
//! single time per class and is shared read-only afterwards. Kind tags are a
//! side table keyed by class and field name, never attached to values.

use crate::error::{TreeError, TreeResult};
use crate::kind::FieldKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Role a declared field plays during tree traversal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Terminal field carrying leaf values under a kind tag.
    Leaf(FieldKind),
    /// Plain sub-tree field holding nested modules or containers.
    Child,
}

/// A single dynamic-field declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDecl {
    name: &'static str,
    role: FieldRole,
}

impl FieldDecl {
    /// Returns the declared field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the role assigned at declaration time.
    pub fn role(&self) -> &FieldRole {
        &self.role
    }

    /// Returns the kind tag for leaf fields, `None` for sub-tree fields.
    pub fn kind(&self) -> Option<&FieldKind> {
        match &self.role {
            FieldRole::Leaf(kind) => Some(kind),
            FieldRole::Child => None,
        }
    }
}

/// Immutable field table for one module class.
///
/// Statics are captured into descriptors by value; dynamic fields are
/// traversed in declaration order. Two schemas compare equal when class name,
/// static names, and field declarations all match.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FieldSchema {
    class: &'static str,
    statics: Vec<&'static str>,
    fields: Vec<FieldDecl>,
}

impl FieldSchema {
    /// Starts declaring fields for `class`.
    pub fn builder(class: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            class,
            statics: Vec::new(),
            fields: Vec::new(),
            error: None,
        }
    }

    /// Returns the class name this schema belongs to.
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// Returns the static field names in declaration order.
    pub fn statics(&self) -> &[&'static str] {
        &self.statics
    }

    /// Returns the dynamic field declarations in declaration order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Returns the position of a static field.
    pub fn static_index(&self, name: &str) -> Option<usize> {
        self.statics.iter().position(|s| *s == name)
    }

    /// Returns the position of a dynamic field.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Derives a schema with every kind tag rewritten through `f`.
    ///
    /// Derived schemas are not interned; they compare by value, so two trees
    /// retagged through the same function keep equal descriptors.
    pub(crate) fn with_kinds(&self, f: &dyn Fn(&FieldKind) -> FieldKind) -> Arc<FieldSchema> {
        let fields = self
            .fields
            .iter()
            .map(|decl| FieldDecl {
                name: decl.name,
                role: match &decl.role {
                    FieldRole::Leaf(kind) => FieldRole::Leaf(f(kind)),
                    FieldRole::Child => FieldRole::Child,
                },
            })
            .collect();
        Arc::new(FieldSchema {
            class: self.class,
            statics: self.statics.clone(),
            fields,
        })
    }
}

/// Incremental declaration of a class field table.
///
/// The builder records the first declaration error and reports it from
/// [`SchemaBuilder::seal`], keeping call sites chainable.
pub struct SchemaBuilder {
    class: &'static str,
    statics: Vec<&'static str>,
    fields: Vec<FieldDecl>,
    error: Option<TreeError>,
}

impl SchemaBuilder {
    fn check_name(&mut self, name: &'static str) -> bool {
        if self.error.is_some() {
            return false;
        }
        if name.is_empty() {
            self.error = Some(TreeError::EmptyFieldName { class: self.class });
            return false;
        }
        let taken = self.statics.contains(&name)
            || self.fields.iter().any(|f| f.name == name);
        if taken {
            self.error = Some(TreeError::DuplicateField {
                class: self.class,
                field: name,
            });
            return false;
        }
        true
    }

    fn leaf(mut self, name: &'static str, kind: FieldKind) -> Self {
        if self.check_name(name) {
            self.fields.push(FieldDecl {
                name,
                role: FieldRole::Leaf(kind),
            });
        }
        self
    }

    /// Declares a trainable parameter field.
    pub fn parameter(self, name: &'static str) -> Self {
        self.leaf(name, FieldKind::Parameter)
    }

    /// Declares a mutable state field.
    pub fn state(self, name: &'static str) -> Self {
        self.leaf(name, FieldKind::State)
    }

    /// Declares a running-statistic field.
    pub fn batch_stat(self, name: &'static str) -> Self {
        self.leaf(name, FieldKind::BatchStat)
    }

    /// Declares a random-key field.
    pub fn rng(self, name: &'static str) -> Self {
        self.leaf(name, FieldKind::Rng)
    }

    /// Declares a leaf field under a caller-named custom kind.
    pub fn custom(self, name: &'static str, tag: impl Into<String>) -> Self {
        self.leaf(name, FieldKind::Custom(tag.into()))
    }

    /// Declares a plain sub-tree field.
    pub fn child(mut self, name: &'static str) -> Self {
        if self.check_name(name) {
            self.fields.push(FieldDecl {
                name,
                role: FieldRole::Child,
            });
        }
        self
    }

    /// Declares a static (non-tree) metadata field.
    pub fn static_field(mut self, name: &'static str) -> Self {
        if self.check_name(name) {
            self.statics.push(name);
        }
        self
    }

    /// Validates the declarations and interns the schema for the class.
    ///
    /// Sealing the same layout again returns the already interned schema;
    /// sealing a different layout under the same class name is an error.
    pub fn seal(self) -> TreeResult<Arc<FieldSchema>> {
        if let Some(error) = self.error {
            return Err(error);
        }
        intern(FieldSchema {
            class: self.class,
            statics: self.statics,
            fields: self.fields,
        })
    }
}

static REGISTRY: Lazy<RwLock<HashMap<&'static str, Arc<FieldSchema>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn intern(schema: FieldSchema) -> TreeResult<Arc<FieldSchema>> {
    {
        let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = registry.get(schema.class) {
            return if **existing == schema {
                Ok(existing.clone())
            } else {
                Err(TreeError::SchemaConflict {
                    class: schema.class,
                })
            };
        }
    }
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = registry.get(schema.class) {
        return if **existing == schema {
            Ok(existing.clone())
        } else {
            Err(TreeError::SchemaConflict {
                class: schema.class,
            })
        };
    }
    trace!(class = schema.class, "interned module schema");
    let shared = Arc::new(schema);
    registry.insert(shared.class, shared.clone());
    Ok(shared)
}

/// Looks up the interned schema registered under a class name.
///
/// This is the stable identity host engines use to recurse into module
/// nodes exactly as they would into built-in containers.
pub fn lookup(class: &str) -> Option<Arc<FieldSchema>> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry.get(class).cloned()
}
