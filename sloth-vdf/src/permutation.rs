#![forbid(unsafe_code)]

//! Round-chained square-root permutation over one prime field.
//!
//! One forward round is `x ← sqrt_perm(flip(x))`:
//!
//! * `flip` XORs the low half of the bits with ones, keeping `x` unchanged
//!   when the result would leave `[0, p)`. It is an involution and stops
//!   fixed points of the bare square-root map from surviving many rounds.
//! * `sqrt_perm` computes `r = x^{(p+1)/4}`. When `r² ≡ x` the output is the
//!   even root, otherwise `r` is a root of `-x` and the output is the odd one.
//!   The output parity records whether the pre-image was a residue.
//!
//! One backward round is `y ← flip(unsqrt(y))` where `unsqrt` squares `y` and
//! negates the square when `y` is odd. Forward costs a full exponentiation,
//! backward a single multiplication, and each round consumes the previous
//! round's output so the forward chain cannot be parallelised.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use sloth_core::{SlothError, SlothResult};
use tracing::warn;
use tokio_util::sync::CancellationToken;

use crate::field::PrimeField;
use crate::prime::{write_fixed_be, Prime};

/// Direction of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Slow square-root chain (encode).
    Forward,
    /// Fast squaring chain (decode / verify).
    Backward,
}

/// Asymmetric permutation over blocks of `block_size` bytes.
#[derive(Debug)]
pub struct PermutationEngine {
    field: PrimeField,
    mask: BigUint,
    block_size: usize,
}

impl PermutationEngine {
    /// Take ownership of a derived prime.
    pub fn new(prime: Prime) -> SlothResult<Self> {
        let block_size = prime.block_size();
        Self::from_field(prime.into_field()?, block_size)
    }

    /// Build an engine over an arbitrary `p ≡ 3 (mod 4)` that fits in `block_size` bytes.
    pub fn from_modulus(p: BigUint, block_size: usize) -> SlothResult<Self> {
        Self::from_field(PrimeField::new(p)?, block_size)
    }

    fn from_field(field: PrimeField, block_size: usize) -> SlothResult<Self> {
        if field.bits() > block_size as u64 * 8 {
            return Err(SlothError::invalid_input(format!(
                "{}-bit modulus does not fit in {block_size} byte blocks",
                field.bits()
            )));
        }
        // ones over the low half of the bits
        let mask = (BigUint::one() << (field.bits() / 2) as usize) - BigUint::one();
        Ok(Self { field, mask, block_size })
    }

    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    fn flip(&self, x: BigUint) -> BigUint {
        let y = &x ^ &self.mask;
        if y < *self.field.modulus() {
            y
        } else {
            x
        }
    }

    fn sqrt_permutation(&self, x: &BigUint) -> BigUint {
        let r = self.field.sqrt_unchecked(x);
        let residue = self.field.square_unchecked(&r) == *x;
        // residue -> even root, non-residue -> odd root
        if r.is_even() == residue {
            r
        } else {
            self.field.neg_unchecked(&r)
        }
    }

    fn invert_sqrt(&self, y: &BigUint) -> BigUint {
        let t = self.field.square_unchecked(y);
        if y.is_even() {
            t
        } else {
            self.field.neg_unchecked(&t)
        }
    }

    /// Apply `rounds` square-root rounds to `x` in `[0, p)`.
    pub fn forward(&self, x: BigUint, rounds: u64, cancel: Option<&CancellationToken>) -> SlothResult<BigUint> {
        self.run(Direction::Forward, x, rounds, cancel)
    }

    /// Undo [`forward`](Self::forward): `rounds` squaring rounds on `y` in `[0, p)`.
    pub fn backward(&self, y: BigUint, rounds: u64, cancel: Option<&CancellationToken>) -> SlothResult<BigUint> {
        self.run(Direction::Backward, y, rounds, cancel)
    }

    /// Run one pass in the given direction.
    pub fn run(
        &self,
        direction: Direction,
        mut x: BigUint,
        rounds: u64,
        cancel: Option<&CancellationToken>,
    ) -> SlothResult<BigUint> {
        self.field.check(&x)?;
        for round in 0..rounds {
            if cancel.map_or(false, CancellationToken::is_cancelled) {
                warn!(?direction, round, rounds, "pass interrupted");
                return Err(SlothError::Interrupted { round });
            }
            x = match direction {
                Direction::Forward => self.sqrt_permutation(&self.flip(x)),
                Direction::Backward => self.flip(self.invert_sqrt(&x)),
            };
        }
        Ok(x)
    }

    /// Permute one `block_size` byte block into `out`.
    pub fn apply_block(
        &self,
        direction: Direction,
        rounds: u64,
        block: &[u8],
        out: &mut [u8],
        cancel: Option<&CancellationToken>,
    ) -> SlothResult<()> {
        if block.len() != self.block_size || out.len() != self.block_size {
            return Err(SlothError::invalid_input(format!(
                "block of {} bytes does not match block size {}",
                block.len(),
                self.block_size
            )));
        }
        let x = BigUint::from_bytes_be(block);
        let y = self.run(direction, x, rounds, cancel)?;
        write_fixed_be(&y, out);
        Ok(())
    }

    /// Forward pass over a single block.
    pub fn encode_block(&self, rounds: u64, block: &[u8]) -> SlothResult<Vec<u8>> {
        let mut out = vec![0u8; self.block_size];
        self.apply_block(Direction::Forward, rounds, block, &mut out, None)?;
        Ok(out)
    }

    /// Backward pass over a single block.
    pub fn decode_block(&self, rounds: u64, block: &[u8]) -> SlothResult<Vec<u8>> {
        let mut out = vec![0u8; self.block_size];
        self.apply_block(Direction::Backward, rounds, block, &mut out, None)?;
        Ok(out)
    }
}
