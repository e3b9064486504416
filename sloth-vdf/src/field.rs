#![forbid(unsafe_code)]

//! Modular arithmetic over a prime `p ≡ 3 (mod 4)`.
//!
//! For such primes a square root of a quadratic residue `x` is the closed
//! form `x^{(p+1)/4} mod p`, a single modular exponentiation. Squaring is
//! one multiplication and one reduction, which is where the encode/decode
//! cost asymmetry comes from.
//!
//! Values handed to the checked operations must already lie in `[0, p)`;
//! anything else is reported as invalid input rather than reduced silently.
//!
//! Not constant-time. The prime is not secret material in the protocols
//! this serves, but its limbs are still scrubbed on drop.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use sloth_core::{SlothError, SlothResult};

/// `base^exponent mod p` for `0 <= base < p`.
pub fn mod_exp(base: &BigUint, exponent: &BigUint, p: &BigUint) -> SlothResult<BigUint> {
    if p.is_zero() {
        return Err(SlothError::invalid_input("modulus must be non-zero"));
    }
    check_below(base, p)?;
    Ok(base.modpow(exponent, p))
}

/// Square root candidate `x^{(p+1)/4} mod p`.
///
/// Only a true root when `p ≡ 3 (mod 4)` and `x` is a quadratic residue.
/// For a non-residue the result is a root of `p - x` instead.
pub fn mod_sqrt_3mod4(x: &BigUint, p: &BigUint) -> SlothResult<BigUint> {
    let field = PrimeField::new(p.clone())?;
    field.sqrt(x)
}

/// Least significant bit of `x`.
#[must_use]
pub fn parity(x: &BigUint) -> bool {
    x.is_odd()
}

fn check_below(x: &BigUint, p: &BigUint) -> SlothResult<()> {
    if x >= p {
        return Err(SlothError::invalid_input(format!(
            "value of {} bits is not below the {}-bit modulus",
            x.bits(),
            p.bits()
        )));
    }
    Ok(())
}

/// Zero every limb of `v` in place before its storage is released.
pub(crate) fn scrub(v: &mut BigUint) {
    // Clearing from the low end keeps the limb vector at full length until the
    // last bit, so every limb is overwritten before normalisation drops it.
    for bit in 0..v.bits() {
        v.set_bit(bit, false);
    }
}

/// Prime field with the square-root exponent precomputed.
pub struct PrimeField {
    p: BigUint,
    sqrt_exp: BigUint,
}

impl PrimeField {
    /// Wrap `p`, which must be odd with `p ≡ 3 (mod 4)`.
    pub fn new(p: BigUint) -> SlothResult<Self> {
        let three = BigUint::from(3u8);
        if (&p & &three) != three {
            return Err(SlothError::invalid_input("modulus must be congruent to 3 mod 4"));
        }
        // (p + 1) / 4
        let sqrt_exp = (&p + BigUint::one()) >> 2usize;
        Ok(Self { p, sqrt_exp })
    }

    #[must_use]
    pub fn modulus(&self) -> &BigUint {
        &self.p
    }

    /// Bit length of the modulus.
    #[must_use]
    pub fn bits(&self) -> u64 {
        self.p.bits()
    }

    /// Reject values outside `[0, p)`.
    pub fn check(&self, x: &BigUint) -> SlothResult<()> {
        check_below(x, &self.p)
    }

    pub fn pow(&self, base: &BigUint, exponent: &BigUint) -> SlothResult<BigUint> {
        self.check(base)?;
        Ok(base.modpow(exponent, &self.p))
    }

    pub fn sqrt(&self, x: &BigUint) -> SlothResult<BigUint> {
        self.check(x)?;
        Ok(self.sqrt_unchecked(x))
    }

    #[must_use]
    pub(crate) fn sqrt_unchecked(&self, x: &BigUint) -> BigUint {
        x.modpow(&self.sqrt_exp, &self.p)
    }

    /// `x^2 mod p` for `x` in `[0, p)`.
    pub fn square(&self, x: &BigUint) -> SlothResult<BigUint> {
        self.check(x)?;
        Ok(self.square_unchecked(x))
    }

    /// `-x mod p` for `x` in `[0, p)`.
    pub fn neg(&self, x: &BigUint) -> SlothResult<BigUint> {
        self.check(x)?;
        Ok(self.neg_unchecked(x))
    }

    #[must_use]
    pub(crate) fn square_unchecked(&self, x: &BigUint) -> BigUint {
        (x * x) % &self.p
    }

    /// Caller guarantees `x < p`.
    #[must_use]
    pub(crate) fn neg_unchecked(&self, x: &BigUint) -> BigUint {
        if x.is_zero() {
            BigUint::zero()
        } else {
            &self.p - x
        }
    }
}

impl Drop for PrimeField {
    fn drop(&mut self) {
        scrub(&mut self.p);
        scrub(&mut self.sqrt_exp);
    }
}

impl std::fmt::Debug for PrimeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimeField").field("bits", &self.bits()).finish()
    }
}
