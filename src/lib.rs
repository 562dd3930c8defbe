#![cfg_attr(not(feature = "std"), no_std)]
#![allow(non_snake_case)]

//! Aggregated Bulletproofs+ range proofs over double-blinded Pedersen
//! commitments `commit2(v, m1, m2) = v*G + m1*H + m2*H2`.
//!
//! ```
//! use bulletproofs_plus_zb::{BulletproofGens, PedersenGens, RangeProof};
//! use curve25519_dalek::scalar::Scalar;
//! use merlin::Transcript;
//!
//! let bp_gens = BulletproofGens::new(64, 1);
//! let pc_gens = PedersenGens::default();
//!
//! let mut rng = rand::rng();
//! let m1 = Scalar::random(&mut rng);
//! let m2 = Scalar::random(&mut rng);
//!
//! let mut prover_transcript = Transcript::new(b"doctest example");
//! let (proof, commitment) =
//!     RangeProof::prove_single(&bp_gens, &pc_gens, &mut prover_transcript, 31, &m1, &m2, 64)
//!         .expect("a valid proof");
//!
//! let mut verifier_transcript = Transcript::new(b"doctest example");
//! assert!(proof
//!     .verify_single(&bp_gens, &pc_gens, &mut verifier_transcript, &commitment, 64)
//!     .is_ok());
//! ```

extern crate alloc;

mod errors;
mod generators;
pub mod range_proof;
mod transcript;
mod util;

pub use crate::errors::ProofError;
pub use crate::generators::{BulletproofGens, GeneratorKind, PedersenGens};
pub use crate::range_proof::{RangeProof, RangeProofView, ValueCommitment};
