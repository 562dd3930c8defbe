//! Defines a `TranscriptProtocol` trait for using a Merlin transcript as
//! the running Fiat-Shamir hash chain binding a range proof's challenges
//! to everything absorbed before them.

use curve25519_dalek::ristretto::CompressedRistretto;
use curve25519_dalek::scalar::Scalar;
use merlin::Transcript;

use crate::errors::ProofError;

pub trait TranscriptProtocol {
    /// Append a domain separator for an aggregated range proof of `n`
    /// bits and `m` values.
    fn rangeproof_domain_sep(&mut self, n: u64, m: u64);

    /// Absorb a `scalar` with the given `label`.
    fn append_scalar(&mut self, label: &'static [u8], scalar: &Scalar);

    /// Absorb a compressed `point` with the given `label`.
    fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto);

    /// Check that `point` is not the identity, then append it.
    fn validate_and_append_point(
        &mut self,
        label: &'static [u8],
        point: &CompressedRistretto,
    ) -> Result<(), ProofError>;

    /// Derive a non-zero field challenge from the current transcript
    /// state, labelled `label`.
    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar;
}

impl TranscriptProtocol for Transcript {
    fn rangeproof_domain_sep(&mut self, n: u64, m: u64) {
        self.append_message(b"dom-sep", b"rangeproof v2");
        self.append_u64(b"n", n);
        self.append_u64(b"m", m);
    }

    fn append_scalar(&mut self, label: &'static [u8], scalar: &Scalar) {
        self.append_message(label, scalar.as_bytes());
    }

    fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto) {
        self.append_message(label, point.as_bytes());
    }

    fn validate_and_append_point(
        &mut self,
        label: &'static [u8],
        point: &CompressedRistretto,
    ) -> Result<(), ProofError> {
        use curve25519_dalek::traits::IsIdentity;

        if point.is_identity() {
            Err(ProofError::FormatError)
        } else {
            Ok(self.append_message(label, point.as_bytes()))
        }
    }

    fn challenge_scalar(&mut self, label: &'static [u8]) -> Scalar {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);
        // Reject a zero challenge by re-deriving with a domain-separated
        // retry label. Landing on zero has probability ~2^-252.
        let mut challenge = Scalar::from_bytes_mod_order_wide(&buf);
        while challenge == Scalar::ZERO {
            self.challenge_bytes(b"retry-zero-challenge", &mut buf);
            challenge = Scalar::from_bytes_mod_order_wide(&buf);
        }
        challenge
    }
}
