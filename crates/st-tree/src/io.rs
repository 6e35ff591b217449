// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Path-keyed leaf snapshots.
//!
//! A snapshot stores every occupied leaf under its rendered path; loading
//! walks the target tree in the same deterministic order and replaces each
//! occupied slot from the snapshot. Structure itself is never persisted —
//! the target tree supplies it, which keeps the format stable across
//! refactors that only rename classes internally.

use crate::error::{TreeError, TreeResult};
use crate::flatten::{flatten, named_leaves, unflatten};
use crate::leaf::{Leaf, LeafSlot};
use crate::module::Module;
use crate::value::TreeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TreeSnapshot {
    leaves: BTreeMap<String, Leaf>,
}

fn to_snapshot(tree: &TreeValue) -> TreeResult<TreeSnapshot> {
    let mut leaves = BTreeMap::new();
    for (path, slot) in named_leaves(tree)? {
        if let LeafSlot::Present(leaf) = slot {
            leaves.insert(path, leaf);
        }
    }
    Ok(TreeSnapshot { leaves })
}

fn apply_snapshot(tree: &TreeValue, snapshot: &TreeSnapshot) -> TreeResult<TreeValue> {
    let named = named_leaves(tree)?;
    let (_, def) = flatten(tree)?;
    let mut slots = Vec::with_capacity(named.len());
    for (path, slot) in named {
        match slot {
            LeafSlot::Absent => slots.push(LeafSlot::Absent),
            LeafSlot::Present(_) => {
                let leaf = snapshot
                    .leaves
                    .get(&path)
                    .ok_or(TreeError::MissingLeaf { path })?;
                slots.push(LeafSlot::Present(leaf.clone()));
            }
        }
    }
    unflatten(&def, &slots)
}

fn io_error(err: std::io::Error) -> TreeError {
    TreeError::IoError {
        message: err.to_string(),
    }
}

fn serde_error(err: impl ToString) -> TreeError {
    TreeError::SerializationError {
        message: err.to_string(),
    }
}

/// Saves the tree's occupied leaves as pretty-printed JSON.
pub fn save_json<P: AsRef<Path>>(tree: &TreeValue, path: P) -> TreeResult<()> {
    let snapshot = to_snapshot(tree)?;
    let file = File::create(path.as_ref()).map_err(io_error)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &snapshot).map_err(serde_error)?;
    Ok(())
}

/// Loads a JSON snapshot into a copy of the given tree.
pub fn load_json<P: AsRef<Path>>(tree: &TreeValue, path: P) -> TreeResult<TreeValue> {
    let file = File::open(path.as_ref()).map_err(io_error)?;
    let reader = BufReader::new(file);
    let snapshot: TreeSnapshot = serde_json::from_reader(reader).map_err(serde_error)?;
    apply_snapshot(tree, &snapshot)
}

/// Saves the tree's occupied leaves in the bincode format.
pub fn save_bincode<P: AsRef<Path>>(tree: &TreeValue, path: P) -> TreeResult<()> {
    let snapshot = to_snapshot(tree)?;
    let file = File::create(path.as_ref()).map_err(io_error)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, &snapshot).map_err(serde_error)?;
    Ok(())
}

/// Loads a bincode snapshot into a copy of the given tree.
pub fn load_bincode<P: AsRef<Path>>(tree: &TreeValue, path: P) -> TreeResult<TreeValue> {
    let file = File::open(path.as_ref()).map_err(io_error)?;
    let reader = BufReader::new(file);
    let snapshot: TreeSnapshot = bincode::deserialize_from(reader).map_err(serde_error)?;
    apply_snapshot(tree, &snapshot)
}

/// Saves a typed module as a JSON snapshot.
pub fn save_module_json<M: Module, P: AsRef<Path>>(module: &M, path: P) -> TreeResult<()> {
    save_json(&module.to_tree()?, path)
}

/// Loads a JSON snapshot into a new instance shaped like `module`.
pub fn load_module_json<M: Module, P: AsRef<Path>>(module: &M, path: P) -> TreeResult<M> {
    M::from_tree(load_json(&module.to_tree()?, path)?)
}

/// Saves a typed module as a bincode snapshot.
pub fn save_module_bincode<M: Module, P: AsRef<Path>>(module: &M, path: P) -> TreeResult<()> {
    save_bincode(&module.to_tree()?, path)
}

/// Loads a bincode snapshot into a new instance shaped like `module`.
pub fn load_module_bincode<M: Module, P: AsRef<Path>>(module: &M, path: P) -> TreeResult<M> {
    M::from_tree(load_bincode(&module.to_tree()?, path)?)
}
