// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::error::{TreeError, TreeResult};
use crate::rng::RngKey;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

/// Terminal tree value: a dense array or a random key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Leaf {
    /// Dense numeric payload.
    Array(ArrayD<f32>),
    /// Splittable random key held by an Rng-kind field.
    Key(RngKey),
}

impl Leaf {
    /// Wraps a zero-dimensional array around a single value.
    pub fn scalar(value: f32) -> Self {
        Leaf::Array(ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// Builds a one-dimensional array leaf.
    pub fn from_vec(data: Vec<f32>) -> Self {
        Leaf::Array(ndarray::Array1::from_vec(data).into_dyn())
    }

    /// Builds an array leaf with an explicit shape.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f32>) -> TreeResult<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(TreeError::DataLength {
                expected,
                got: data.len(),
            });
        }
        let array =
            ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| TreeError::DataLength {
                expected,
                got: expected,
            })?;
        Ok(Leaf::Array(array))
    }

    /// Builds a zero-filled array leaf.
    pub fn zeros(shape: &[usize]) -> Self {
        Leaf::Array(ArrayD::zeros(IxDyn(shape)))
    }

    /// Wraps a random key.
    pub fn key(key: RngKey) -> Self {
        Leaf::Key(key)
    }

    /// Returns the array payload, rejecting key leaves.
    pub fn as_array(&self) -> TreeResult<&ArrayD<f32>> {
        match self {
            Leaf::Array(array) => Ok(array),
            Leaf::Key(_) => Err(TreeError::LeafType {
                expected: "array",
                found: "key",
            }),
        }
    }

    /// Returns the key payload, rejecting array leaves.
    pub fn as_key(&self) -> TreeResult<RngKey> {
        match self {
            Leaf::Key(key) => Ok(*key),
            Leaf::Array(_) => Err(TreeError::LeafType {
                expected: "key",
                found: "array",
            }),
        }
    }

    /// Returns the array shape; key leaves report an empty shape.
    pub fn shape(&self) -> &[usize] {
        match self {
            Leaf::Array(array) => array.shape(),
            Leaf::Key(_) => &[],
        }
    }
}

impl From<ArrayD<f32>> for Leaf {
    fn from(array: ArrayD<f32>) -> Self {
        Leaf::Array(array)
    }
}

impl From<RngKey> for Leaf {
    fn from(key: RngKey) -> Self {
        Leaf::Key(key)
    }
}

/// A leaf position inside a tree: either occupied or explicitly absent.
///
/// `Absent` is the single sentinel standing for "structurally present but
/// value-excluded". The filter engine is its only producer; it never appears
/// in a fully constructed module. Derived equality makes it equal only to
/// itself and never to any occupied slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LeafSlot {
    /// The slot holds a leaf value.
    Present(Leaf),
    /// The slot was excluded by filtering.
    Absent,
}

impl LeafSlot {
    /// Returns `true` when the slot was excluded by filtering.
    pub fn is_absent(&self) -> bool {
        matches!(self, LeafSlot::Absent)
    }

    /// Returns `true` when the slot holds a value.
    pub fn is_present(&self) -> bool {
        matches!(self, LeafSlot::Present(_))
    }

    /// Returns the leaf when present.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            LeafSlot::Present(leaf) => Some(leaf),
            LeafSlot::Absent => None,
        }
    }

    /// Returns the leaf or an error naming the calling context.
    pub fn leaf(&self, context: &'static str) -> TreeResult<&Leaf> {
        self.as_leaf()
            .ok_or(TreeError::AbsentLeaf { context })
    }

    /// Consumes the slot, returning the leaf or an error.
    pub fn into_leaf(self, context: &'static str) -> TreeResult<Leaf> {
        match self {
            LeafSlot::Present(leaf) => Ok(leaf),
            LeafSlot::Absent => Err(TreeError::AbsentLeaf { context }),
        }
    }
}

impl From<Leaf> for LeafSlot {
    fn from(leaf: Leaf) -> Self {
        LeafSlot::Present(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_equals_only_itself() {
        assert_eq!(LeafSlot::Absent, LeafSlot::Absent);
        assert_ne!(LeafSlot::Absent, LeafSlot::Present(Leaf::scalar(0.0)));
        // The engine's own zero is a legitimate leaf, not the sentinel.
        assert_ne!(LeafSlot::Absent, LeafSlot::Present(Leaf::zeros(&[1])));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        assert!(Leaf::from_shape_vec(&[2, 3], vec![0.0; 5]).is_err());
        let leaf = Leaf::from_shape_vec(&[2, 3], vec![0.5; 6]).unwrap();
        assert_eq!(leaf.shape(), &[2, 3]);
    }

    #[test]
    fn typed_accessors_reject_wrong_variant() {
        let array = Leaf::from_vec(vec![1.0, 2.0]);
        let key = Leaf::key(RngKey::new(1));
        assert!(array.as_array().is_ok());
        assert!(array.as_key().is_err());
        assert!(key.as_key().is_ok());
        assert!(key.as_array().is_err());
    }

    #[test]
    fn slot_accessors_guard_absence() {
        let slot = LeafSlot::from(Leaf::scalar(1.5));
        assert!(slot.leaf("test").is_ok());
        let absent = LeafSlot::Absent;
        assert_eq!(
            absent.leaf("test"),
            Err(TreeError::AbsentLeaf { context: "test" })
        );
    }
}
