#![allow(non_snake_case)]

//! Aggregated Bulletproofs+ range proofs over double-blinded Pedersen
//! commitments.
//!
//! A single [`RangeProof`] attests that every value in a batch of
//! `commit2(v_i, m1_i, m2_i)` commitments lies in `[0, 2^n)`, for a
//! shared bit-width `n`. The core is a zk-WIP (weighted inner-product)
//! reduction run over `log2(m*n)` rounds, where `m` is the next power
//! of two at or above the number of aggregated values.

extern crate alloc;

use alloc::vec::Vec;
use core::convert::TryInto;
use core::iter;

use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{IsIdentity, MultiscalarMul, VartimeMultiscalarMul};
use merlin::Transcript;

use sha3::{Digest, Sha3_512};

use crate::errors::ProofError;
use crate::generators::{BulletproofGens, PedersenGens};
use crate::transcript::TranscriptProtocol;
use crate::util::{self, ScalarMatrix};

use rand_core::{CryptoRng, RngCore};
use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

/// A proof that a batch of double-blinded Pedersen commitments each
/// open to a value in `[0, 2^n)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeProof {
    /// Left cross-terms of the zk-WIP reduction, one per round.
    L: Vec<CompressedRistretto>,
    /// Right cross-terms of the zk-WIP reduction, one per round.
    R: Vec<CompressedRistretto>,
    /// Commitment to the bit-decomposition vectors `aL`, `aR`.
    A0: CompressedRistretto,
    /// Final-round commitment binding the folded witness scalars.
    A: CompressedRistretto,
    /// Final-round commitment to the folded inner product.
    B: CompressedRistretto,
    r: Scalar,
    s: Scalar,
    delta_1: Scalar,
    delta_2: Scalar,
}

/// A value commitment the verifier can hand over either pre-decompressed
/// or still compressed, so a caller who already decompressed a `V` for
/// other purposes doesn't pay for it twice.
pub trait ValueCommitment: Copy {
    fn decompress(&self) -> Option<RistrettoPoint>;
    fn compress(&self) -> CompressedRistretto;
}

impl ValueCommitment for RistrettoPoint {
    fn decompress(&self) -> Option<RistrettoPoint> {
        Some(*self)
    }
    fn compress(&self) -> CompressedRistretto {
        RistrettoPoint::compress(self)
    }
}

impl ValueCommitment for CompressedRistretto {
    fn decompress(&self) -> Option<RistrettoPoint> {
        CompressedRistretto::decompress(self)
    }
    fn compress(&self) -> CompressedRistretto {
        *self
    }
}

/// `z = H(y)`, a hash step deliberately kept outside the running
/// transcript. Binding `z` back into the transcript (so later
/// challenges depend on it) is the caller's job, immediately after
/// calling this.
fn hash_scalar_to_scalar(y: &Scalar) -> Scalar {
    let mut hasher = Sha3_512::new();
    hasher.update(b"bulletproofs-plus-zb/hs");
    hasher.update(y.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 64];
    bytes.copy_from_slice(&digest);
    Scalar::from_bytes_mod_order_wide(&bytes)
}

fn one_div_8() -> Scalar {
    Scalar::from(8u64).invert()
}

/// `true` iff `n` is one of the supported bit-widths. Values are taken
/// as `u64`, so `n` cannot practically exceed 64.
fn is_supported_bitsize(n: usize) -> bool {
    matches!(n, 8 | 16 | 32 | 64)
}

fn ceil_log2_values_len(len: usize) -> usize {
    len.next_power_of_two().trailing_zeros() as usize
}

/// `2^n - 1` as a `Scalar`, careful about the `n == 64` overflow edge.
fn two_pow_n_minus_one(n: usize) -> Scalar {
    if n >= 64 {
        Scalar::from(u64::MAX)
    } else {
        Scalar::from((1u64 << n) - 1)
    }
}

impl RangeProof {
    /// Create a proof for a single value and its two blinding factors.
    /// A convenience wrapper around [`RangeProof::prove_multiple_with_rng`].
    pub fn prove_single_with_rng<T: RngCore + CryptoRng>(
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        v: u64,
        m1: &Scalar,
        m2: &Scalar,
        n: usize,
        rng: &mut T,
    ) -> Result<(RangeProof, CompressedRistretto), ProofError> {
        let (proof, commitments) = RangeProof::prove_multiple_with_rng(
            bp_gens,
            pc_gens,
            transcript,
            &[v],
            &[*m1],
            &[*m2],
            n,
            rng,
        )?;
        Ok((proof, commitments[0]))
    }

    /// [`RangeProof::prove_single_with_rng`] with a threadsafe RNG.
    #[cfg(feature = "std")]
    pub fn prove_single(
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        v: u64,
        m1: &Scalar,
        m2: &Scalar,
        n: usize,
    ) -> Result<(RangeProof, CompressedRistretto), ProofError> {
        RangeProof::prove_single_with_rng(bp_gens, pc_gens, transcript, v, m1, m2, n, &mut rand::rng())
    }

    /// Create an aggregated range proof for `values`, each double-blinded
    /// by the matching entries of `masks1`/`masks2`.
    ///
    /// `values`, `masks1` and `masks2` must share one nonzero length not
    /// exceeding `bp_gens.party_capacity`, and every mask must already be
    /// in canonical/reduced form. `n` must be one of `8, 16, 32, 64`.
    pub fn prove_multiple_with_rng<T: RngCore + CryptoRng>(
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        values: &[u64],
        masks1: &[Scalar],
        masks2: &[Scalar],
        n: usize,
        rng: &mut T,
    ) -> Result<(RangeProof, Vec<CompressedRistretto>), ProofError> {
        if !is_supported_bitsize(n) {
            return Err(ProofError::InvalidBitsize);
        }
        let values_len = values.len();
        if values_len == 0
            || values_len != masks1.len()
            || values_len != masks2.len()
            || values_len > bp_gens.party_capacity
        {
            return Err(ProofError::WrongNumBlindingFactors);
        }
        for mask in masks1.iter().chain(masks2.iter()) {
            if !bool::from(mask.is_canonical()) {
                return Err(ProofError::UnreducedScalar);
            }
        }

        #[cfg(debug_assertions)]
        {
            if n < 64 {
                for &v in values {
                    debug_assert!(v < (1u64 << n), "value does not fit in the claimed bit-width");
                }
            }
        }

        prove_bit_decomposed_with_rng(bp_gens, pc_gens, transcript, values, masks1, masks2, n, rng)
    }
}

/// Builds the bit-decomposition commitment and runs the zk-WIP
/// reduction for `values` against the claimed bit-width `n`, without
/// asserting that every value actually fits in `n` bits. An honest
/// caller never reaches here with an out-of-range value (the public
/// entry point above debug-asserts it first); a dishonest one gets a
/// proof that fails verification, since the returned commitment opens
/// to the full value while the bit matrix captures only its low `n`
/// bits.
fn prove_bit_decomposed_with_rng<T: RngCore + CryptoRng>(
    bp_gens: &BulletproofGens,
    pc_gens: &PedersenGens,
    transcript: &mut Transcript,
    values: &[u64],
    masks1: &[Scalar],
    masks2: &[Scalar],
    n: usize,
    rng: &mut T,
) -> Result<(RangeProof, Vec<CompressedRistretto>), ProofError> {
        let values_len = values.len();
        let log2_m = ceil_log2_values_len(values_len);
        let m = 1usize << log2_m;
        let mn = m * n;
        let log2_n = n.trailing_zeros() as usize;
        let log2_mn = log2_m + log2_n;

        if bp_gens.capacity() < mn {
            return Err(ProofError::InvalidGeneratorsLength);
        }

        let inv8 = one_div_8();

        // commit2(v_i, m1_i, m2_i) pre-scaled by 1/8.
        let mut commitments = Vec::with_capacity(values_len);
        for i in 0..values_len {
            let v = Scalar::from(values[i]);
            let commitment = pc_gens.commit2(v * inv8, masks1[i] * inv8, masks2[i] * inv8);
            commitments.push(commitment.compress());
        }

        // Bit decomposition: aL, aR, column-major m x n; padding rows
        // [values_len, m) get aR = -1 everywhere.
        let mut aL = ScalarMatrix::zero(m, n);
        let mut aR = ScalarMatrix::zero(m, n);
        let minus_one = -Scalar::ONE;
        for i in 0..values_len {
            let v = values[i];
            for j in 0..n {
                if (v >> j) & 1 == 1 {
                    aL.set(i, j, Scalar::ONE);
                } else {
                    aR.set(i, j, minus_one);
                }
            }
        }
        for i in values_len..m {
            for j in 0..n {
                aR.set(i, j, minus_one);
            }
        }

        transcript.rangeproof_domain_sep(n as u64, m as u64);
        for V in commitments.iter() {
            // Unlike A0/A/B, V is allowed to be the identity: commit2(0, 0, 0)
            // is a valid commitment to a zero value under zero blinding.
            transcript.append_point(b"V", V);
        }

        let alpha_1 = Scalar::random(rng);
        let alpha_2 = Scalar::random(rng);

        let g_gens = bp_gens.G(mn);
        let h_gens = bp_gens.H(mn);
        let aL_flat = aL.as_flat();
        let aR_flat = aR.as_flat();

        let mut A0_point = pc_gens.H * alpha_1 + pc_gens.H2 * alpha_2;
        A0_point += RistrettoPoint::multiscalar_mul(
            aL_flat.iter().chain(aR_flat.iter()).copied(),
            g_gens.iter().chain(h_gens.iter()).copied(),
        );
        A0_point *= inv8;
        let A0_compressed = A0_point.compress();
        transcript.append_point(b"A0", &A0_compressed);

        let y = transcript.challenge_scalar(b"y");
        let z = hash_scalar_to_scalar(&y);
        transcript.append_scalar(b"z", &z);
        let z_sq = z * z;

        // d(i, j) = 2^j * z^(2(i+1)), column-major.
        let mut d = ScalarMatrix::zero(m, n);
        d.set(0, 0, z_sq);
        for i in 1..m {
            d.set(i, 0, d.get(i - 1, 0) * z_sq);
        }
        for j in 1..n {
            for i in 0..m {
                let prev = d.get(i, j - 1);
                d.set(i, j, prev + prev);
            }
        }
        let d_flat = d.as_flat();

        // Extended Vandermonde vector y^0..y^(mn+1).
        let mut y_powers = Vec::with_capacity(mn + 2);
        y_powers.push(Scalar::ONE);
        for i in 1..=mn + 1 {
            y_powers.push(y_powers[i - 1] * y);
        }
        let y_mn_p1 = y_powers[mn + 1];

        // Hat vectors.
        let mut a: Vec<Scalar> = (0..mn).map(|i| aL_flat[i] - z).collect();
        let mut b: Vec<Scalar> = (0..mn)
            .map(|i| aR_flat[i] + z + d_flat[i] * y_powers[mn - i])
            .collect();

        // alpha_hat scalars, folding in the real values' blinding
        // contributions only.
        let mut alpha_hat_1 = Scalar::ZERO;
        let mut alpha_hat_2 = Scalar::ZERO;
        for i in 0..values_len {
            let d_i0 = d.get(i, 0);
            alpha_hat_1 += d_i0 * masks1[i];
            alpha_hat_2 += d_i0 * masks2[i];
        }
        alpha_hat_1 = alpha_1 + y_mn_p1 * alpha_hat_1;
        alpha_hat_2 = alpha_2 + y_mn_p1 * alpha_hat_2;

        let y_inv = y.invert();
        let mut y_inv_powers = Vec::with_capacity(mn / 2 + 1);
        y_inv_powers.push(Scalar::ONE);
        for i in 1..=mn / 2 {
            y_inv_powers.push(y_inv_powers[i - 1] * y_inv);
        }

        let mut g: Vec<RistrettoPoint> = g_gens.to_vec();
        let mut h: Vec<RistrettoPoint> = h_gens.to_vec();

        let mut L_vec = Vec::with_capacity(log2_mn);
        let mut R_vec = Vec::with_capacity(log2_mn);

        // zk-WIP reduction rounds.
        let mut n_round = mn / 2;
        while n_round >= 1 {
            let (a1, a2) = a.split_at(n_round);
            let (b1, b2) = b.split_at(n_round);
            let (g1, g2) = g.split_at(n_round);
            let (h1, h2) = h.split_at(n_round);

            let dL = Scalar::random(rng);
            let dL2 = Scalar::random(rng);
            let dR = Scalar::random(rng);
            let dR2 = Scalar::random(rng);

            let mut cL = Scalar::ZERO;
            for i in 0..n_round {
                cL += a1[i] * y_powers[i + 1] * b2[i];
            }
            let mut cR = Scalar::ZERO;
            for i in 0..n_round {
                cR += a2[i] * y_powers[i + 1] * b1[i];
            }
            cR *= y_powers[n_round];

            let sum_a1_g2 = RistrettoPoint::multiscalar_mul(a1.iter().copied(), g2.iter().copied());
            let sum_b2_h1 = RistrettoPoint::multiscalar_mul(b2.iter().copied(), h1.iter().copied());
            let mut L_point = sum_a1_g2 * y_inv_powers[n_round] + sum_b2_h1 + pc_gens.commit2(cL, dL, dL2);
            L_point *= inv8;

            let sum_a2_g1 = RistrettoPoint::multiscalar_mul(a2.iter().copied(), g1.iter().copied());
            let sum_b1_h2 = RistrettoPoint::multiscalar_mul(b1.iter().copied(), h2.iter().copied());
            let mut R_point = sum_a2_g1 * y_powers[n_round] + sum_b1_h2 + pc_gens.commit2(cR, dR, dR2);
            R_point *= inv8;

            let L_compressed = L_point.compress();
            let R_compressed = R_point.compress();
            transcript.append_point(b"L", &L_compressed);
            transcript.append_point(b"R", &R_compressed);
            L_vec.push(L_compressed);
            R_vec.push(R_compressed);

            let e = transcript.challenge_scalar(b"e");
            let e_sq = e * e;
            let e_inv = e.invert();
            let e_inv_sq = e_inv * e_inv;
            let e_y_inv_n = e * y_inv_powers[n_round];
            let e_inv_y_n = e_inv * y_powers[n_round];

            let mut new_g = Vec::with_capacity(n_round);
            let mut new_h = Vec::with_capacity(n_round);
            let mut new_a = Vec::with_capacity(n_round);
            let mut new_b = Vec::with_capacity(n_round);
            for i in 0..n_round {
                new_g.push(e_inv * g1[i] + e_y_inv_n * g2[i]);
                new_h.push(e * h1[i] + e_inv * h2[i]);
                new_a.push(e * a1[i] + e_inv_y_n * a2[i]);
                new_b.push(e_inv * b1[i] + e * b2[i]);
            }
            g = new_g;
            h = new_h;
            a = new_a;
            b = new_b;

            alpha_hat_1 += e_sq * dL + e_inv_sq * dR;
            alpha_hat_2 += e_sq * dL2 + e_inv_sq * dR2;

            n_round /= 2;
        }

        // Final round.
        let r = Scalar::random(rng);
        let s = Scalar::random(rng);
        let delta_1 = Scalar::random(rng);
        let delta_2 = Scalar::random(rng);
        let eta_1 = Scalar::random(rng);
        let eta_2 = Scalar::random(rng);

        let mut A_point = pc_gens.commit2(y * (r * b[0] + s * a[0]), delta_1, delta_2);
        A_point += g[0] * r + h[0] * s;
        A_point *= inv8;
        let A_compressed = A_point.compress();

        let mut B_point = pc_gens.commit2(r * y * s, eta_1, eta_2);
        B_point *= inv8;
        let B_compressed = B_point.compress();

        transcript.append_point(b"A", &A_compressed);
        transcript.append_point(b"B", &B_compressed);
        let e_f = transcript.challenge_scalar(b"e_f");

        let proof = RangeProof {
            L: L_vec,
            R: R_vec,
            A0: A0_compressed,
            A: A_compressed,
            B: B_compressed,
            r: r + e_f * a[0],
            s: s + e_f * b[0],
            delta_1: eta_1 + e_f * delta_1 + e_f * e_f * alpha_hat_1,
            delta_2: eta_2 + e_f * delta_2 + e_f * e_f * alpha_hat_2,
        };

        Ok((proof, commitments))
    }

impl RangeProof {
    /// [`RangeProof::prove_multiple_with_rng`] with a threadsafe RNG.
    #[cfg(feature = "std")]
    pub fn prove_multiple(
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        values: &[u64],
        masks1: &[Scalar],
        masks2: &[Scalar],
        n: usize,
    ) -> Result<(RangeProof, Vec<CompressedRistretto>), ProofError> {
        RangeProof::prove_multiple_with_rng(
            bp_gens,
            pc_gens,
            transcript,
            values,
            masks1,
            masks2,
            n,
            &mut rand::rng(),
        )
    }

    /// Verify a proof against a single commitment.
    pub fn verify_single_with_rng<T: RngCore + CryptoRng>(
        &self,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        V: &impl ValueCommitment,
        n: usize,
        rng: &mut T,
    ) -> Result<(), ProofError> {
        self.verify_multiple_with_rng(bp_gens, pc_gens, transcript, &[*V], n, rng)
    }

    /// [`RangeProof::verify_single_with_rng`] with a threadsafe RNG.
    #[cfg(feature = "std")]
    pub fn verify_single(
        &self,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        V: &impl ValueCommitment,
        n: usize,
    ) -> Result<(), ProofError> {
        self.verify_single_with_rng(bp_gens, pc_gens, transcript, V, n, &mut rand::rng())
    }

    /// Verify a proof against its aggregated commitments.
    pub fn verify_multiple_with_rng<T: RngCore + CryptoRng, V: ValueCommitment>(
        &self,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        value_commitments: &[V],
        n: usize,
        rng: &mut T,
    ) -> Result<(), ProofError> {
        RangeProof::verify_batch_with_rng(
            iter::once(self.verification_view(transcript, value_commitments, n)),
            bp_gens,
            pc_gens,
            rng,
        )
    }

    /// [`RangeProof::verify_multiple_with_rng`] with a threadsafe RNG.
    #[cfg(feature = "std")]
    pub fn verify_multiple<V: ValueCommitment>(
        &self,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        transcript: &mut Transcript,
        value_commitments: &[V],
        n: usize,
    ) -> Result<(), ProofError> {
        self.verify_multiple_with_rng(bp_gens, pc_gens, transcript, value_commitments, n, &mut rand::rng())
    }

    /// Wrap `self` with the transcript/commitments/bit-width it should be
    /// checked against, for batch verification.
    pub fn verification_view<'a, V: ValueCommitment>(
        &'a self,
        transcript: &'a mut Transcript,
        value_commitments: &'a [V],
        n: usize,
    ) -> RangeProofView<'a, V> {
        RangeProofView {
            proof: self,
            transcript,
            value_commitments,
            n,
        }
    }

    /// Batch-verify an arbitrary list of independent proofs, amortising
    /// the generator multiexp across the whole batch and inverting all
    /// `y`s and round challenges `e` in one batched-inversion pass.
    pub fn verify_batch<'a, V: ValueCommitment + 'a>(
        batch: impl IntoIterator<Item = RangeProofView<'a, V>>,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
    ) -> Result<(), ProofError> {
        Self::verify_batch_with_rng(batch, bp_gens, pc_gens, &mut rand::rng())
    }

    pub fn verify_batch_with_rng<'a, T: RngCore + CryptoRng, V: ValueCommitment + 'a>(
        batch: impl IntoIterator<Item = RangeProofView<'a, V>>,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        rng: &mut T,
    ) -> Result<(), ProofError> {
        let mut collector = BatchCollector::new();
        for view in batch {
            collector.add_proof(view)?;
        }
        collector.verify(bp_gens, pc_gens, rng)
    }

    /// Serialize as `len_LR:u32 | L[] | R[] | A0 | A | B | r | s | delta_1 | delta_2`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + (self.L.len() + self.R.len() + 3) * 32 + 4 * 32);
        buf.extend_from_slice(&(self.L.len() as u32).to_le_bytes());
        for p in &self.L {
            buf.extend_from_slice(p.as_bytes());
        }
        for p in &self.R {
            buf.extend_from_slice(p.as_bytes());
        }
        buf.extend_from_slice(self.A0.as_bytes());
        buf.extend_from_slice(self.A.as_bytes());
        buf.extend_from_slice(self.B.as_bytes());
        buf.extend_from_slice(self.r.as_bytes());
        buf.extend_from_slice(self.s.as_bytes());
        buf.extend_from_slice(self.delta_1.as_bytes());
        buf.extend_from_slice(self.delta_2.as_bytes());
        buf
    }

    /// Deserialize from the wire format of [`RangeProof::to_bytes`].
    pub fn from_bytes(slice: &[u8]) -> Result<RangeProof, ProofError> {
        if slice.len() < 4 {
            return Err(ProofError::FormatError);
        }
        let len_lr = u32::from_le_bytes(slice[0..4].try_into().unwrap()) as usize;

        let header = 4;
        let expected_len = header + (len_lr * 2 + 3) * 32 + 4 * 32;
        if len_lr == 0 || slice.len() != expected_len {
            return Err(ProofError::FormatError);
        }

        let mut offset = header;
        let mut L = Vec::with_capacity(len_lr);
        for _ in 0..len_lr {
            L.push(CompressedRistretto(util::read32(&slice[offset..])));
            offset += 32;
        }
        let mut R = Vec::with_capacity(len_lr);
        for _ in 0..len_lr {
            R.push(CompressedRistretto(util::read32(&slice[offset..])));
            offset += 32;
        }
        let A0 = CompressedRistretto(util::read32(&slice[offset..]));
        offset += 32;
        let A = CompressedRistretto(util::read32(&slice[offset..]));
        offset += 32;
        let B = CompressedRistretto(util::read32(&slice[offset..]));
        offset += 32;

        let r = Option::from(Scalar::from_canonical_bytes(util::read32(&slice[offset..])))
            .ok_or(ProofError::FormatError)?;
        offset += 32;
        let s = Option::from(Scalar::from_canonical_bytes(util::read32(&slice[offset..])))
            .ok_or(ProofError::FormatError)?;
        offset += 32;
        let delta_1 = Option::from(Scalar::from_canonical_bytes(util::read32(&slice[offset..])))
            .ok_or(ProofError::FormatError)?;
        offset += 32;
        let delta_2 = Option::from(Scalar::from_canonical_bytes(util::read32(&slice[offset..])))
            .ok_or(ProofError::FormatError)?;

        Ok(RangeProof {
            L,
            R,
            A0,
            A,
            B,
            r,
            s,
            delta_1,
            delta_2,
        })
    }
}

impl Serialize for RangeProof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de> Deserialize<'de> for RangeProof {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = serde::Deserialize::deserialize(deserializer)?;
        RangeProof::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// A `RangeProof` together with the transcript, commitments and bit-width
/// it should be verified against — the unit of work fed to
/// [`RangeProof::verify_batch`].
pub struct RangeProofView<'a, V: ValueCommitment> {
    proof: &'a RangeProof,
    transcript: &'a mut Transcript,
    value_commitments: &'a [V],
    n: usize,
}

/// Per-proof data re-derived by replaying its transcript, kept around
/// until the whole batch's `y`s and round challenges have gone through
/// one shared batch-inversion pass.
struct ProofContext {
    y: Scalar,
    z: Scalar,
    z_sq: Scalar,
    e: Vec<Scalar>,
    e_sq: Vec<Scalar>,
    e_final: Scalar,
    e_final_sq: Scalar,
    inv_y_offset: usize,
    inv_e_offset: usize,
    log2_m: usize,
    m: usize,
    mn: usize,
    A0: RistrettoPoint,
    A: RistrettoPoint,
    B: RistrettoPoint,
    L: Vec<RistrettoPoint>,
    R: Vec<RistrettoPoint>,
    commitments: Vec<RistrettoPoint>,
    r: Scalar,
    s: Scalar,
    delta_1: Scalar,
    delta_2: Scalar,
}

/// Accumulates the closed-form collapsed verification identity across an
/// entire batch of proofs before performing one final
/// multiscalar-multiplication-is-zero check.
struct BatchCollector {
    contexts: Vec<ProofContext>,
    batch_for_inverse: Vec<Scalar>,
}

impl BatchCollector {
    fn new() -> Self {
        BatchCollector {
            contexts: Vec::new(),
            batch_for_inverse: Vec::new(),
        }
    }

    fn add_proof<V: ValueCommitment>(&mut self, view: RangeProofView<V>) -> Result<(), ProofError> {
        let proof = view.proof;

        if view.value_commitments.is_empty() {
            return Err(ProofError::EmptyCommitments);
        }
        if proof.L.is_empty() || proof.L.len() != proof.R.len() {
            return Err(ProofError::MalformedProof);
        }
        if !bool::from(proof.r.is_canonical())
            || !bool::from(proof.s.is_canonical())
            || !bool::from(proof.delta_1.is_canonical())
            || !bool::from(proof.delta_2.is_canonical())
        {
            return Err(ProofError::UnreducedScalar);
        }
        if !is_supported_bitsize(view.n) {
            return Err(ProofError::InvalidBitsize);
        }

        let log2_m = ceil_log2_values_len(view.value_commitments.len());
        let m = 1usize << log2_m;
        let log2_n = view.n.trailing_zeros() as usize;
        let mn = m * view.n;

        if proof.L.len() != log2_m + log2_n {
            return Err(ProofError::MalformedProof);
        }

        let A0 = proof.A0.decompress().ok_or(ProofError::FormatError)?;
        let A = proof.A.decompress().ok_or(ProofError::FormatError)?;
        let B = proof.B.decompress().ok_or(ProofError::FormatError)?;
        let mut L = Vec::with_capacity(proof.L.len());
        let mut R = Vec::with_capacity(proof.R.len());
        for i in 0..proof.L.len() {
            L.push(proof.L[i].decompress().ok_or(ProofError::FormatError)?);
            R.push(proof.R[i].decompress().ok_or(ProofError::FormatError)?);
        }
        let mut commitments = Vec::with_capacity(view.value_commitments.len());
        for V in view.value_commitments.iter() {
            commitments.push(V.decompress().ok_or(ProofError::FormatError)?);
        }

        view.transcript.rangeproof_domain_sep(view.n as u64, m as u64);
        for V in view.value_commitments.iter() {
            // V may legitimately be the identity (commit2(0, 0, 0)); only
            // A0/A/B are required to be non-identity.
            view.transcript.append_point(b"V", &V.compress());
        }
        view.transcript.validate_and_append_point(b"A0", &proof.A0)?;

        let y = view.transcript.challenge_scalar(b"y");
        let z = hash_scalar_to_scalar(&y);
        view.transcript.append_scalar(b"z", &z);
        let z_sq = z * z;

        let inv_y_offset = self.batch_for_inverse.len();
        self.batch_for_inverse.push(y);
        let inv_e_offset = self.batch_for_inverse.len();

        let mut e = Vec::with_capacity(proof.L.len());
        let mut e_sq = Vec::with_capacity(proof.L.len());
        for i in 0..proof.L.len() {
            view.transcript.append_point(b"L", &proof.L[i]);
            view.transcript.append_point(b"R", &proof.R[i]);
            let e_i = view.transcript.challenge_scalar(b"e");
            e_sq.push(e_i * e_i);
            e.push(e_i);
            self.batch_for_inverse.push(e_i);
        }

        view.transcript.append_point(b"A", &proof.A);
        view.transcript.append_point(b"B", &proof.B);
        let e_final = view.transcript.challenge_scalar(b"e_f");
        let e_final_sq = e_final * e_final;

        self.contexts.push(ProofContext {
            y,
            z,
            z_sq,
            e,
            e_sq,
            e_final,
            e_final_sq,
            inv_y_offset,
            inv_e_offset,
            log2_m,
            m,
            mn,
            A0,
            A,
            B,
            L,
            R,
            commitments,
            r: proof.r,
            s: proof.s,
            delta_1: proof.delta_1,
            delta_2: proof.delta_2,
        });

        Ok(())
    }

    fn verify<T: RngCore + CryptoRng>(
        self,
        bp_gens: &BulletproofGens,
        pc_gens: &PedersenGens,
        rng: &mut T,
    ) -> Result<(), ProofError> {
        if self.contexts.is_empty() {
            return Err(ProofError::EmptyCommitments);
        }

        let mn_max = self.contexts.iter().map(|c| c.mn).max().unwrap();
        if bp_gens.capacity() < mn_max {
            return Err(ProofError::InvalidGeneratorsLength);
        }

        let mut inverses = self.batch_for_inverse.clone();
        Scalar::batch_invert(&mut inverses);

        let mut g_scalars = alloc::vec![Scalar::ZERO; mn_max];
        let mut h_scalars = alloc::vec![Scalar::ZERO; mn_max];
        let mut G_scalar = Scalar::ZERO;
        let mut H_scalar = Scalar::ZERO;
        let mut H2_scalar = Scalar::ZERO;
        let mut summand = RistrettoPoint::default();

        for ctx in &self.contexts {
            let rwf = Scalar::random(rng);

            let n = ctx.mn / ctx.m;
            let mut d = ScalarMatrix::zero(ctx.m, n);
            d.set(0, 0, ctx.z_sq);
            for i in 1..ctx.m {
                d.set(i, 0, d.get(i - 1, 0) * ctx.z_sq);
            }
            for j in 1..n {
                for i in 0..ctx.m {
                    let prev = d.get(i, j - 1);
                    d.set(i, j, prev + prev);
                }
            }
            let d_flat = d.as_flat();
            let sum_d = two_pow_n_minus_one(n) * util::sum_of_powers(&ctx.z_sq, ctx.m);

            let y_inv = inverses[ctx.inv_y_offset];
            let e_inv: Vec<Scalar> = (0..ctx.e.len()).map(|i| inverses[ctx.inv_e_offset + i]).collect();

            let log2_mn = ctx.e.len();
            let mut s_vec = alloc::vec![Scalar::ZERO; ctx.mn];
            s_vec[0] = e_inv[0];
            for i in 1..log2_mn {
                s_vec[0] *= e_inv[i];
            }
            for i in 1..ctx.mn {
                let base = i & (i - 1);
                let bit_index = log2_mn - (i.trailing_zeros() as usize) - 1;
                s_vec[i] = s_vec[base] * ctx.e_sq[bit_index];
            }

            let mut y_inv_powers = alloc::vec![Scalar::ZERO; ctx.mn];
            y_inv_powers[0] = Scalar::ONE;
            for i in 1..ctx.mn {
                y_inv_powers[i] = y_inv_powers[i - 1] * y_inv;
            }

            let mut y_power_mnp1 = ctx.y;
            for _ in 0..log2_mn {
                y_power_mnp1 *= y_power_mnp1;
            }
            y_power_mnp1 *= ctx.y;

            let rwf_e_sq_z = rwf * ctx.e_final_sq * ctx.z;
            let rwf_r_e = rwf * ctx.e_final * ctx.r;
            for i in 0..ctx.mn {
                g_scalars[i] += rwf_r_e * y_inv_powers[i] * s_vec[i] + rwf_e_sq_z;
            }

            let rwf_s_e = rwf * ctx.s * ctx.e_final;
            let mut rwf_e_sq_y = rwf * ctx.e_final_sq * ctx.y;
            for i in (0..ctx.mn).rev() {
                h_scalars[i] += rwf_s_e * s_vec[ctx.mn - 1 - i] - rwf_e_sq_z - rwf_e_sq_y * d_flat[i];
                rwf_e_sq_y *= ctx.y;
            }

            G_scalar += rwf * ctx.r * ctx.y * ctx.s + rwf_e_sq_y * sum_d * ctx.z;
            G_scalar -= rwf * ctx.e_final_sq * (ctx.z - ctx.z_sq) * util::sum_of_powers(&ctx.y, ctx.mn);

            H_scalar += rwf * ctx.delta_1;
            H2_scalar += rwf * ctx.delta_2;

            let mut summand_8 = -(rwf * ctx.e_final_sq) * ctx.A0;
            let mut e_sq_y_mn1_z_sq_power = rwf * ctx.e_final_sq * y_power_mnp1;
            for commitment in &ctx.commitments {
                e_sq_y_mn1_z_sq_power *= ctx.z_sq;
                summand_8 -= e_sq_y_mn1_z_sq_power * commitment;
            }
            let rwf_e_sq = rwf * ctx.e_final_sq;
            for j in 0..log2_mn {
                summand_8 -= rwf_e_sq * (ctx.e_sq[j] * ctx.L[j] + e_inv[j] * e_inv[j] * ctx.R[j]);
            }
            summand_8 -= rwf * ctx.e_final * ctx.A + rwf * ctx.B;
            summand_8 *= Scalar::from(8u64);
            summand += summand_8;
        }

        let gh_exponents = pc_gens.commit2(G_scalar, H_scalar, H2_scalar);

        let g_all = bp_gens.G(mn_max);
        let h_all = bp_gens.H(mn_max);
        let mut check = RistrettoPoint::vartime_multiscalar_mul(g_scalars.iter(), g_all.iter().copied());
        check += RistrettoPoint::vartime_multiscalar_mul(h_scalars.iter(), h_all.iter().copied());
        check += summand + gh_exponents;

        if check.is_identity() {
            Ok(())
        } else {
            Err(ProofError::VerificationError)
        }
    }
}
