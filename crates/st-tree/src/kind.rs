// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use core::fmt;

/// Kind tag attached to a leaf-bearing field declaration.
///
/// Kinds live in the per-class field schema, never on values, so every
/// instance of a class carries exactly the same tagging. Filtering predicates
/// match on kinds structurally; `Custom` is the escape tag for taxonomies the
/// built-in set does not cover.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Trainable weight updated by gradient descent.
    Parameter,
    /// Mutable bookkeeping carried across calls.
    State,
    /// Running statistic, a refinement of `State`.
    BatchStat,
    /// Random-number key consumed by stochastic layers.
    Rng,
    /// Open-taxonomy tag carrying a caller-chosen name.
    Custom(String),
}

impl FieldKind {
    /// Returns `true` for the trainable-parameter kind.
    pub fn is_parameter(&self) -> bool {
        matches!(self, FieldKind::Parameter)
    }

    /// Returns `true` for `State` and every refinement of it.
    pub fn is_state(&self) -> bool {
        matches!(self, FieldKind::State | FieldKind::BatchStat)
    }

    /// Returns `true` for the random-key kind.
    pub fn is_rng(&self) -> bool {
        matches!(self, FieldKind::Rng)
    }

    /// Returns the label used when rendering descriptors and diagnostics.
    pub fn label(&self) -> &str {
        match self {
            FieldKind::Parameter => "parameter",
            FieldKind::State => "state",
            FieldKind::BatchStat => "batch_stat",
            FieldKind::Rng => "rng",
            FieldKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_refinements_report_as_state() {
        assert!(FieldKind::State.is_state());
        assert!(FieldKind::BatchStat.is_state());
        assert!(!FieldKind::Parameter.is_state());
        assert!(!FieldKind::Rng.is_state());
    }

    #[test]
    fn custom_kind_carries_its_name() {
        let kind = FieldKind::Custom("opt_state".to_string());
        assert_eq!(kind.label(), "opt_state");
        assert_ne!(kind, FieldKind::Custom("cache".to_string()));
    }
}
