// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use core::fmt;

/// Result alias used throughout the crate.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors emitted by the tree-object layer.
///
/// Every error here is deterministic for a given input, so none of them is
/// worth retrying; they surface synchronously to the immediate caller.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeError {
    /// A kind-tagged field held a value that is not leaf-shaped or absent.
    Classification {
        class: &'static str,
        field: &'static str,
        found: &'static str,
    },
    /// Merge received operands whose structure descriptors differ.
    StructureMismatch { left: String, right: String },
    /// The leaf list handed to a reconstruction does not match its descriptor.
    LeafCount { expected: usize, got: usize },
    /// Merge was invoked without any operand.
    EmptyMerge,
    /// A class declared the same field name twice.
    DuplicateField {
        class: &'static str,
        field: &'static str,
    },
    /// A class declared a field with an empty name.
    EmptyFieldName { class: &'static str },
    /// A class name was re-registered with a different field layout.
    SchemaConflict { class: &'static str },
    /// A field name was used that the class never declared.
    UnknownField {
        class: &'static str,
        field: &'static str,
    },
    /// A declared field was never populated, or was consumed twice.
    MissingField {
        class: &'static str,
        field: &'static str,
    },
    /// A static value was read with the wrong type accessor.
    StaticType {
        expected: &'static str,
        found: &'static str,
    },
    /// A leaf value was required but the slot is absent.
    AbsentLeaf { context: &'static str },
    /// A tree value had a different shape than the caller expected.
    ValueShape {
        expected: &'static str,
        found: &'static str,
    },
    /// A leaf accessor was used with the wrong payload variant.
    LeafType {
        expected: &'static str,
        found: &'static str,
    },
    /// Data provided to a leaf constructor does not match the requested shape.
    DataLength { expected: usize, got: usize },
    /// Generic configuration violation for construction helpers.
    InvalidValue { label: &'static str },
    /// A snapshot does not contain a leaf the target tree requires.
    MissingLeaf { path: String },
    /// Wrapper around I/O failures when persisting or restoring snapshots.
    IoError { message: String },
    /// Wrapper around serde failures when handling snapshots.
    SerializationError { message: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Classification {
                class,
                field,
                found,
            } => {
                write!(
                    f,
                    "field '{field}' of {class} is tagged with a leaf kind but holds a {found} value"
                )
            }
            TreeError::StructureMismatch { left, right } => {
                write!(
                    f,
                    "structure mismatch: {left} and {right} cannot be merged"
                )
            }
            TreeError::LeafCount { expected, got } => {
                write!(
                    f,
                    "leaf count mismatch: descriptor expects {expected}, got {got}"
                )
            }
            TreeError::EmptyMerge => {
                write!(f, "merge requires at least one operand")
            }
            TreeError::DuplicateField { class, field } => {
                write!(f, "duplicate field '{field}' declared on {class}")
            }
            TreeError::EmptyFieldName { class } => {
                write!(f, "{class} declared a field with an empty name")
            }
            TreeError::SchemaConflict { class } => {
                write!(
                    f,
                    "class '{class}' was re-registered with a different field layout"
                )
            }
            TreeError::UnknownField { class, field } => {
                write!(f, "class {class} does not declare a field '{field}'")
            }
            TreeError::MissingField { class, field } => {
                write!(f, "field '{field}' of {class} was never populated")
            }
            TreeError::StaticType { expected, found } => {
                write!(
                    f,
                    "static value type mismatch: expected {expected}, found {found}"
                )
            }
            TreeError::AbsentLeaf { context } => {
                write!(
                    f,
                    "{context} requires a leaf value but the slot is absent"
                )
            }
            TreeError::ValueShape { expected, found } => {
                write!(f, "expected a {expected} value, found {found}")
            }
            TreeError::LeafType { expected, found } => {
                write!(f, "expected a {expected} leaf, found {found}")
            }
            TreeError::DataLength { expected, got } => {
                write!(f, "data length mismatch: expected {expected}, got {got}")
            }
            TreeError::InvalidValue { label } => {
                write!(f, "invalid value for {label}")
            }
            TreeError::MissingLeaf { path } => {
                write!(f, "snapshot is missing leaf '{path}'")
            }
            TreeError::IoError { message } => {
                write!(f, "i/o error while handling tree snapshot: {message}")
            }
            TreeError::SerializationError { message } => {
                write!(
                    f,
                    "serialization error while handling tree snapshot: {message}"
                )
            }
        }
    }
}

impl std::error::Error for TreeError {}
