// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use crate::error::{TreeError, TreeResult};
use ndarray::{ArrayD, IxDyn};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

/// Splittable random key stored as an Rng-kind leaf.
///
/// The key is a plain value: splitting or folding derives new keys without
/// mutating the original, so key-bearing trees stay immutable snapshots. The
/// actual stream is ChaCha20 seeded from the key words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RngKey {
    word: u64,
    stream: u64,
}

impl RngKey {
    /// Creates a root key from a user seed.
    pub fn new(seed: u64) -> Self {
        Self {
            word: seed,
            stream: 0,
        }
    }

    fn chacha(&self) -> ChaCha20Rng {
        let mut seed = [0u8; 32];
        seed[..8].copy_from_slice(&self.word.to_le_bytes());
        seed[8..16].copy_from_slice(&self.stream.to_le_bytes());
        ChaCha20Rng::from_seed(seed)
    }

    fn derive(&self) -> Self {
        let mut rng = self.chacha();
        Self {
            word: rng.next_u64(),
            stream: rng.next_u64(),
        }
    }

    /// Splits the key into two statistically independent children.
    pub fn split(self) -> (RngKey, RngKey) {
        let mut rng = self.chacha();
        let left = RngKey {
            word: rng.next_u64(),
            stream: rng.next_u64(),
        };
        let right = RngKey {
            word: rng.next_u64(),
            stream: rng.next_u64(),
        };
        (left, right)
    }

    /// Derives a child key bound to the provided data word.
    pub fn fold_in(self, data: u64) -> RngKey {
        RngKey {
            word: self.word,
            stream: self.stream ^ data.rotate_left(17),
        }
        .derive()
    }

    /// Draws a normally distributed array from this key.
    pub fn normal(&self, shape: &[usize], mean: f32, std: f32) -> TreeResult<ArrayD<f32>> {
        let dist = Normal::new(mean, std).map_err(|_| TreeError::InvalidValue {
            label: "normal_std",
        })?;
        let mut rng = self.chacha();
        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(dist.sample(&mut rng));
        }
        ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| TreeError::DataLength {
            expected: len,
            got: len,
        })
    }

    /// Draws a uniformly distributed array over `[low, high)` from this key.
    pub fn uniform(&self, shape: &[usize], low: f32, high: f32) -> TreeResult<ArrayD<f32>> {
        if !(low < high) {
            return Err(TreeError::InvalidValue {
                label: "uniform_range",
            });
        }
        let dist = Uniform::new(low, high);
        let mut rng = self.chacha();
        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(dist.sample(&mut rng));
        }
        ArrayD::from_shape_vec(IxDyn(shape), data).map_err(|_| TreeError::DataLength {
            expected: len,
            got: len,
        })
    }
}
