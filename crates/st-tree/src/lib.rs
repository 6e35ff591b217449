//! Kind-tagged module trees for functional numerical engines.
//!
//! This crate lets a layer author write an ordinary struct — nested
//! sub-modules, weight arrays, running statistics, random keys — while
//! presenting it to a transformation engine as a flat, immutable tree of
//! leaves. Field kinds live in a per-class schema rather than in wrapper
//! types, so plain arrays stay directly usable as leaves; flattening,
//! kind-based filtering, and structure-checked merging all derive from that
//! one declaration.
//!
//! The flatten/filter/merge triple is the whole integration surface:
//! training code filters a tree to extract parameters for gradient work,
//! filters again for state bookkeeping, and merges the updated parts back
//! into a full tree for the next step.

pub mod def;
pub mod error;
pub mod filter;
pub mod flatten;
pub mod io;
pub mod kind;
pub mod leaf;
pub mod merge;
pub mod module;
pub mod rng;
pub mod schema;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use def::{NodeDef, TreeDef};
pub use error::{TreeError, TreeResult};
pub use filter::filter;
pub use flatten::{flatten, named_leaves, render_path, unflatten, PathSegment};
pub use io::{
    load_bincode, load_json, load_module_bincode, load_module_json, save_bincode, save_json,
    save_module_bincode, save_module_json,
};
pub use kind::FieldKind;
pub use leaf::{Leaf, LeafSlot};
pub use merge::{map_kinds, merge, update};
pub use module::Module;
pub use rng::RngKey;
pub use schema::{FieldDecl, FieldRole, FieldSchema, SchemaBuilder};
pub use value::{FieldValues, NodeBuilder, NodeValue, StaticValue, TreeValue};
