#![allow(non_snake_case)]

use bulletproofs_plus_zb::{BulletproofGens, PedersenGens, RangeProof};
use curve25519_dalek::scalar::Scalar;
use merlin::Transcript;
use rand::Rng;

fn gens(n: usize, m: usize) -> (BulletproofGens, PedersenGens) {
    (BulletproofGens::new(n, m), PedersenGens::default())
}

fn random_masks(m: usize, rng: &mut impl rand::RngCore) -> (Vec<Scalar>, Vec<Scalar>) {
    (
        (0..m).map(|_| Scalar::random(rng)).collect(),
        (0..m).map(|_| Scalar::random(rng)).collect(),
    )
}

/// S1: a single zero value still produces a verifiable proof.
#[test]
fn zero_value_verifies() {
    let (bp_gens, pc_gens) = gens(64, 1);
    let mut rng = rand::rng();
    let (masks1, masks2) = random_masks(1, &mut rng);

    let mut transcript = Transcript::new(b"range_proof tests");
    let (proof, commitments) =
        RangeProof::prove_multiple(&bp_gens, &pc_gens, &mut transcript, &[0u64], &masks1, &masks2, 64)
            .unwrap();

    let mut transcript = Transcript::new(b"range_proof tests");
    assert!(proof
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_ok());
}

/// A zero value under all-zero blinding commits to the identity point
/// (`commit2(0, 0, 0)`); the value commitment must still be accepted,
/// unlike A0/A/B which are required to be non-identity.
#[test]
fn zero_value_and_zero_masks_verifies() {
    let (bp_gens, pc_gens) = gens(64, 1);
    let masks1 = [Scalar::ZERO];
    let masks2 = [Scalar::ZERO];

    let mut transcript = Transcript::new(b"range_proof tests");
    let (proof, commitments) =
        RangeProof::prove_multiple(&bp_gens, &pc_gens, &mut transcript, &[0u64], &masks1, &masks2, 64)
            .unwrap();

    let mut transcript = Transcript::new(b"range_proof tests");
    assert!(proof
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_ok());
}

/// S2: a small aggregated batch of powers of two.
#[test]
fn powers_of_two_batch_verifies() {
    let (bp_gens, pc_gens) = gens(64, 4);
    let mut rng = rand::rng();
    let values = [1u64, 2, 4, 8];
    let (masks1, masks2) = random_masks(values.len(), &mut rng);

    let mut transcript = Transcript::new(b"range_proof tests");
    let (proof, commitments) =
        RangeProof::prove_multiple(&bp_gens, &pc_gens, &mut transcript, &values, &masks1, &masks2, 64)
            .unwrap();

    let mut transcript = Transcript::new(b"range_proof tests");
    assert!(proof
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_ok());
}

/// S3: the full range of representable 64-bit values, including the
/// boundary values 0 and `u64::MAX`.
#[test]
fn boundary_values_verify() {
    let (bp_gens, pc_gens) = gens(64, 4);
    let mut rng = rand::rng();
    let values = [u64::MAX, 0, 1, 1u64 << 63];
    let (masks1, masks2) = random_masks(values.len(), &mut rng);

    let mut transcript = Transcript::new(b"range_proof tests");
    let (proof, commitments) =
        RangeProof::prove_multiple(&bp_gens, &pc_gens, &mut transcript, &values, &masks1, &masks2, 64)
            .unwrap();

    let mut transcript = Transcript::new(b"range_proof tests");
    assert!(proof
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_ok());
}

/// S4: a batch of independently-generated proofs, each aggregating a
/// different number of values, verified together.
#[test]
fn batch_of_varying_aggregation_sizes_verifies() {
    let (bp_gens, pc_gens) = gens(64, 16);
    let mut rng = rand::rng();

    let sizes = [1usize, 2, 3, 5, 7, 8, 8, 16];
    let mut proofs = Vec::new();
    for &m in &sizes {
        let values: Vec<u64> = (0..m).map(|i| rng.random_range(0..=u64::MAX) ^ (i as u64)).collect();
        let (masks1, masks2) = random_masks(m, &mut rng);
        let mut transcript = Transcript::new(b"range_proof batch tests");
        let (proof, commitments) = RangeProof::prove_multiple(
            &bp_gens,
            &pc_gens,
            &mut transcript,
            &values,
            &masks1,
            &masks2,
            64,
        )
        .unwrap();
        proofs.push((proof, commitments));
    }

    let mut transcripts: Vec<Transcript> =
        proofs.iter().map(|_| Transcript::new(b"range_proof batch tests")).collect();
    let views = proofs
        .iter()
        .zip(transcripts.iter_mut())
        .map(|((proof, commitments), transcript)| proof.verification_view(transcript, commitments, 64));

    assert!(RangeProof::verify_batch(views, &bp_gens, &pc_gens).is_ok());
}

/// S5: tampering with a proof's final-round scalar breaks soundness.
#[test]
fn tampered_scalar_fails_verification() {
    let (bp_gens, pc_gens) = gens(64, 4);
    let mut rng = rand::rng();
    let values = [1u64, 2, 4, 8];
    let (masks1, masks2) = random_masks(values.len(), &mut rng);

    let mut transcript = Transcript::new(b"range_proof tests");
    let (proof, commitments) =
        RangeProof::prove_multiple(&bp_gens, &pc_gens, &mut transcript, &values, &masks1, &masks2, 64)
            .unwrap();

    let mut bytes = proof.to_bytes();
    // `r` sits right after the L/R arrays and the three A0/A/B points in
    // the wire format; flip its first byte to perturb it off-curve of
    // what the verifier expects without touching the structural header.
    let r_offset = bytes.len() - 4 * 32;
    bytes[r_offset] ^= 0x01;
    let tampered = RangeProof::from_bytes(&bytes).unwrap();

    let mut transcript = Transcript::new(b"range_proof tests");
    assert!(tampered
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_err());
}

/// S6: substituting an unrelated commitment breaks verification even
/// though the proof itself is untouched.
#[test]
fn substituted_commitment_fails_verification() {
    let (bp_gens, pc_gens) = gens(64, 4);
    let mut rng = rand::rng();
    let values = [1u64, 2, 4, 8];
    let (masks1, masks2) = random_masks(values.len(), &mut rng);

    let mut transcript = Transcript::new(b"range_proof tests");
    let (proof, mut commitments) =
        RangeProof::prove_multiple(&bp_gens, &pc_gens, &mut transcript, &values, &masks1, &masks2, 64)
            .unwrap();

    let unrelated_mask1 = Scalar::random(&mut rng);
    let unrelated_mask2 = Scalar::random(&mut rng);
    commitments[0] = pc_gens
        .commit2(
            Scalar::from(999u64) * Scalar::from(8u64).invert(),
            unrelated_mask1 * Scalar::from(8u64).invert(),
            unrelated_mask2 * Scalar::from(8u64).invert(),
        )
        .compress();

    let mut transcript = Transcript::new(b"range_proof tests");
    assert!(proof
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_err());
}

#[test]
fn single_value_prove_and_verify_roundtrip() {
    let (bp_gens, pc_gens) = gens(32, 1);
    let mut rng = rand::rng();
    let m1 = Scalar::random(&mut rng);
    let m2 = Scalar::random(&mut rng);

    let mut transcript = Transcript::new(b"range_proof single");
    let (proof, commitment) =
        RangeProof::prove_single(&bp_gens, &pc_gens, &mut transcript, 123456, &m1, &m2, 32).unwrap();

    let mut transcript = Transcript::new(b"range_proof single");
    assert!(proof
        .verify_single(&bp_gens, &pc_gens, &mut transcript, &commitment, 32)
        .is_ok());
}

#[test]
fn proof_wire_format_round_trips() {
    let (bp_gens, pc_gens) = gens(64, 2);
    let mut rng = rand::rng();
    let (masks1, masks2) = random_masks(2, &mut rng);

    let mut transcript = Transcript::new(b"range_proof wire format");
    let (proof, commitments) = RangeProof::prove_multiple(
        &bp_gens,
        &pc_gens,
        &mut transcript,
        &[10u64, 20u64],
        &masks1,
        &masks2,
        64,
    )
    .unwrap();

    let bytes = proof.to_bytes();
    let decoded = RangeProof::from_bytes(&bytes).unwrap();
    assert_eq!(proof, decoded);

    let mut transcript = Transcript::new(b"range_proof wire format");
    assert!(decoded
        .verify_multiple(&bp_gens, &pc_gens, &mut transcript, &commitments, 64)
        .is_ok());
}
