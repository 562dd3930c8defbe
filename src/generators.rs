//! The `generators` module contains API for producing a set of
//! generators for a range proof: one fixed triple of Pedersen
//! generators, one per blinding factor (`G`, `H`, `H2`), plus two
//! independent, indexed families `{G_i}`, `{H_i}` used by the zk-WIP
//! reduction.
//!
//! Each generator is derived deterministically by hashing a
//! domain-separation label into a SHAKE256 extendable-output stream and
//! mapping consecutive 64-byte blocks onto the curve with
//! `RistrettoPoint::from_uniform_bytes`. Two different proof setups
//! using the same label therefore always agree on the same generators,
//! and nobody (including the prover) ever learns a discrete log
//! relation between any two of them.

#![allow(non_snake_case)]

extern crate alloc;

use alloc::vec::Vec;

use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::VartimeMultiscalarMul;
use digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;

/// An iterator of deterministically-derived Ristretto generators,
/// seeded by a single domain-separation label. Each `.next()` call
/// pulls one more independent curve point out of the XOF.
struct GeneratorsChain {
    reader: <Shake256 as ExtendableOutput>::Reader,
}

impl GeneratorsChain {
    fn new(label: &[u8]) -> Self {
        let mut shake = Shake256::default();
        Update::update(&mut shake, b"bulletproofs-plus-zb/GeneratorsChain");
        Update::update(&mut shake, label);
        GeneratorsChain {
            reader: shake.finalize_xof(),
        }
    }
}

impl Iterator for GeneratorsChain {
    type Item = RistrettoPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let mut uniform_bytes = [0u8; 64];
        self.reader.read(&mut uniform_bytes);
        Some(RistrettoPoint::from_uniform_bytes(&uniform_bytes))
    }
}

/// The three fixed, independent generators used by the double-blinded
/// Pedersen commitment `commit2(v, m1, m2) = v*G + m1*H + m2*H2`.
#[derive(Copy, Clone, Debug)]
pub struct PedersenGens {
    /// Value generator.
    pub G: RistrettoPoint,
    /// First blinding generator.
    pub H: RistrettoPoint,
    /// Second blinding generator, added by the double-blinding
    /// extension to the base commitment scheme.
    pub H2: RistrettoPoint,
}

impl PedersenGens {
    /// `commit2(v, m1, m2) = v*G + m1*H + m2*H2`, computed as a single
    /// 3-scalar multi-exponentiation.
    ///
    /// Not on the verifier's hot path (unlike the batched multiexp in
    /// `range_proof`): a vartime mul is fine here, since none of its
    /// inputs are secret to anyone who doesn't already hold the full
    /// opening.
    pub fn commit2(&self, value: Scalar, mask1: Scalar, mask2: Scalar) -> RistrettoPoint {
        RistrettoPoint::vartime_multiscalar_mul(
            [value, mask1, mask2].iter(),
            [self.G, self.H, self.H2].iter().copied(),
        )
    }
}

impl Default for PedersenGens {
    fn default() -> Self {
        PedersenGens {
            G: GeneratorsChain::new(b"Fixed/G").next().unwrap(),
            H: GeneratorsChain::new(b"Fixed/H").next().unwrap(),
            H2: GeneratorsChain::new(b"Fixed/H2").next().unwrap(),
        }
    }
}

/// Which indexed generator family to fetch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GeneratorKind {
    G,
    H,
}

/// Holds the indexed generator families `{G_i}`, `{H_i}`, flat and
/// growable so a proof over `mn = m * N`
/// values/bits can always be served by slicing the first `mn` entries.
/// `G_i` and `H_i` use independent domain-separation labels from each
/// other and from the three fixed [`PedersenGens`] points, so no
/// discrete-log relation between any of them is known to anyone.
#[derive(Clone, Debug)]
pub struct BulletproofGens {
    /// The maximum `N` (bit-width) this instance has generated
    /// capacity for, tracked only so `increase_capacity` can resume a
    /// `GeneratorsChain` without re-deriving existing entries.
    pub gens_capacity: usize,
    /// The maximum aggregation size `m` this instance supports; plain
    /// bookkeeping, since generators are stored flat (`mn` long) rather
    /// than partitioned per value the way an MPC "party" layout would.
    pub party_capacity: usize,
    G_vec: Vec<RistrettoPoint>,
    H_vec: Vec<RistrettoPoint>,
}

impl BulletproofGens {
    /// Create a new `BulletproofGens` supporting proofs with bit-width
    /// up to `gens_capacity` and aggregation size up to
    /// `party_capacity`, i.e. `mn` up to `gens_capacity *
    /// party_capacity`.
    pub fn new(gens_capacity: usize, party_capacity: usize) -> Self {
        let mut gens = BulletproofGens {
            gens_capacity: 0,
            party_capacity: 0,
            G_vec: Vec::new(),
            H_vec: Vec::new(),
        };
        gens.increase_capacity(gens_capacity, party_capacity);
        gens
    }

    /// Grow the generator families to cover `mn = new_n * new_m`,
    /// without disturbing any already-derived generator (so proofs
    /// created against a smaller capacity keep verifying against the
    /// grown table).
    pub fn increase_capacity(&mut self, new_n: usize, new_m: usize) {
        let old_mn = self.gens_capacity * self.party_capacity;
        let new_mn = new_n * new_m;
        if new_mn <= old_mn {
            self.gens_capacity = self.gens_capacity.max(new_n);
            self.party_capacity = self.party_capacity.max(new_m);
            return;
        }
        self.G_vec.extend(
            GeneratorsChain::new(b"Indexed/G")
                .skip(old_mn)
                .take(new_mn - old_mn),
        );
        self.H_vec.extend(
            GeneratorsChain::new(b"Indexed/H")
                .skip(old_mn)
                .take(new_mn - old_mn),
        );
        self.gens_capacity = new_n;
        self.party_capacity = new_m;
    }

    /// Total number of generators currently derived in each family.
    pub fn capacity(&self) -> usize {
        self.G_vec.len()
    }

    /// Fetch a single generator out of one of the indexed families.
    pub fn get(&self, kind: GeneratorKind, index: usize) -> RistrettoPoint {
        match kind {
            GeneratorKind::G => self.G_vec[index],
            GeneratorKind::H => self.H_vec[index],
        }
    }

    /// Borrow the first `mn` `G_i` generators.
    pub fn G(&self, mn: usize) -> &[RistrettoPoint] {
        &self.G_vec[..mn]
    }

    /// Borrow the first `mn` `H_i` generators.
    pub fn H(&self, mn: usize) -> &[RistrettoPoint] {
        &self.H_vec[..mn]
    }
}
