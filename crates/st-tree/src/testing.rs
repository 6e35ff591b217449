// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Shared fixtures for the unit tests: a tiny affine layer, a scaler with
//! running statistics and a key, and a block composing both through list and
//! dict containers. Class names are registered once per test process.

use crate::error::TreeResult;
use crate::leaf::{Leaf, LeafSlot};
use crate::module::Module;
use crate::rng::RngKey;
use crate::schema::FieldSchema;
use crate::value::{NodeValue, TreeValue};
use std::collections::BTreeMap;
use std::sync::Arc;

pub(crate) struct Affine {
    pub features: usize,
    pub weight: LeafSlot,
    pub bias: LeafSlot,
}

impl Affine {
    pub fn new(features: usize, key: RngKey) -> TreeResult<Self> {
        let mut module = Self {
            features,
            weight: LeafSlot::Absent,
            bias: LeafSlot::Absent,
        };
        module.initialise(key)?;
        Ok(module)
    }
}

impl Module for Affine {
    fn schema() -> TreeResult<Arc<FieldSchema>> {
        FieldSchema::builder("Affine")
            .static_field("features")
            .parameter("weight")
            .parameter("bias")
            .seal()
    }

    fn to_node(&self) -> TreeResult<NodeValue> {
        NodeValue::builder(Self::schema()?)
            .static_value("features", self.features)
            .field("weight", self.weight.clone())
            .field("bias", self.bias.clone())
            .finish()
    }

    fn from_node(node: NodeValue) -> TreeResult<Self> {
        let features = node.static_value("features")?.as_usize()?;
        let mut fields = node.into_fields();
        Ok(Self {
            features,
            weight: fields.take("weight")?.into_slot()?,
            bias: fields.take("bias")?.into_slot()?,
        })
    }

    fn initialise(&mut self, key: RngKey) -> TreeResult<()> {
        let (w_key, _) = key.split();
        let weight = w_key.normal(&[self.features, self.features], 0.0, 0.02)?;
        self.weight = LeafSlot::Present(Leaf::Array(weight));
        self.bias = LeafSlot::Present(Leaf::zeros(&[self.features]));
        Ok(())
    }
}

pub(crate) struct Scaler {
    pub features: usize,
    pub scale: LeafSlot,
    pub mean: LeafSlot,
    pub key: LeafSlot,
}

impl Scaler {
    pub fn new(features: usize, key: RngKey) -> TreeResult<Self> {
        let mut module = Self {
            features,
            scale: LeafSlot::Absent,
            mean: LeafSlot::Absent,
            key: LeafSlot::Absent,
        };
        module.initialise(key)?;
        Ok(module)
    }

}

impl Module for Scaler {
    fn schema() -> TreeResult<Arc<FieldSchema>> {
        FieldSchema::builder("Scaler")
            .static_field("features")
            .parameter("scale")
            .batch_stat("mean")
            .rng("key")
            .seal()
    }

    fn to_node(&self) -> TreeResult<NodeValue> {
        NodeValue::builder(Self::schema()?)
            .static_value("features", self.features)
            .field("scale", self.scale.clone())
            .field("mean", self.mean.clone())
            .field("key", self.key.clone())
            .finish()
    }

    fn from_node(node: NodeValue) -> TreeResult<Self> {
        let features = node.static_value("features")?.as_usize()?;
        let mut fields = node.into_fields();
        Ok(Self {
            features,
            scale: fields.take("scale")?.into_slot()?,
            mean: fields.take("mean")?.into_slot()?,
            key: fields.take("key")?.into_slot()?,
        })
    }

    fn initialise(&mut self, key: RngKey) -> TreeResult<()> {
        let (scale_key, carry) = key.split();
        let scale = scale_key.uniform(&[self.features], 0.9, 1.1)?;
        self.scale = LeafSlot::Present(Leaf::Array(scale));
        self.mean = LeafSlot::Present(Leaf::zeros(&[self.features]));
        self.key = LeafSlot::Present(Leaf::Key(carry));
        Ok(())
    }
}

pub(crate) struct Block {
    pub depth: usize,
    pub stack: Vec<Affine>,
    pub head: Scaler,
    pub taps: BTreeMap<String, Leaf>,
}

impl Block {
    pub fn new(depth: usize, key: RngKey) -> TreeResult<Self> {
        let mut stack = Vec::with_capacity(depth);
        for index in 0..depth {
            stack.push(Affine::new(2, key.fold_in(index as u64))?);
        }
        let head = Scaler::new(2, key.fold_in(depth as u64))?;
        let mut taps = BTreeMap::new();
        taps.insert("pre".to_string(), Leaf::scalar(0.0));
        taps.insert("post".to_string(), Leaf::scalar(0.0));
        Ok(Self {
            depth,
            stack,
            head,
            taps,
        })
    }
}

impl Module for Block {
    fn schema() -> TreeResult<Arc<FieldSchema>> {
        FieldSchema::builder("Block")
            .static_field("depth")
            .child("stack")
            .child("head")
            .child("taps")
            .seal()
    }

    fn to_node(&self) -> TreeResult<NodeValue> {
        let mut stack = Vec::with_capacity(self.stack.len());
        for layer in &self.stack {
            stack.push(layer.to_tree()?);
        }
        let mut taps = BTreeMap::new();
        for (name, leaf) in &self.taps {
            taps.insert(name.clone(), TreeValue::leaf(leaf.clone()));
        }
        NodeValue::builder(Self::schema()?)
            .static_value("depth", self.depth)
            .field("stack", TreeValue::List(stack))
            .field("head", self.head.to_tree()?)
            .field("taps", TreeValue::Dict(taps))
            .finish()
    }

    fn from_node(node: NodeValue) -> TreeResult<Self> {
        let depth = node.static_value("depth")?.as_usize()?;
        let mut fields = node.into_fields();
        let mut stack = Vec::new();
        for item in fields.take("stack")?.into_list()? {
            stack.push(Affine::from_tree(item)?);
        }
        let head = Scaler::from_tree(fields.take("head")?)?;
        let mut taps = BTreeMap::new();
        for (name, value) in fields.take("taps")?.into_dict()? {
            taps.insert(name, value.into_slot()?.into_leaf("block tap")?);
        }
        Ok(Self {
            depth,
            stack,
            head,
            taps,
        })
    }
}

/// A scaler tree with `features` leaves for scale/mean plus the key slot.
pub(crate) fn sample_scaler(features: usize, key: RngKey) -> TreeResult<TreeValue> {
    Scaler::new(features, key)?.to_tree()
}

/// A two-level tree exercising nodes, lists, dicts, and kindless leaves.
pub(crate) fn sample_block(depth: usize, key: RngKey) -> TreeResult<TreeValue> {
    Block::new(depth, key)?.to_tree()
}

/// A scaler whose parameter field wrongly holds a nested module.
pub(crate) fn misclassified_scaler(features: usize) -> TreeResult<TreeValue> {
    let filler = Affine::new(features, RngKey::new(0))?;
    let node = NodeValue::builder(Scaler::schema()?)
        .static_value("features", features)
        .field("scale", filler.to_tree()?)
        .field("mean", Leaf::zeros(&[features]))
        .field("key", RngKey::new(1))
        .finish()?;
    Ok(TreeValue::from(node))
}
