//! Errors that can arise when proving or verifying range proofs.

/// Represents an error in proof creation, verification, or parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ProofError {
    /// The final collapsed multiscalar-multiplication check was
    /// non-zero.
    #[cfg_attr(feature = "std", error("range proof verification failed"))]
    VerificationError,

    /// The proof's byte encoding was malformed: wrong total length, a
    /// scalar that did not decode to a canonical field element, or a
    /// compressed point that failed to decompress.
    #[cfg_attr(feature = "std", error("range proof data could not be parsed"))]
    FormatError,

    /// `N` is not one of the supported bit-widths `{8, 16, 32, 64}`.
    #[cfg_attr(feature = "std", error("invalid bitsize: N must be one of 8, 16, 32, 64"))]
    InvalidBitsize,

    /// The generator table does not carry enough `G_i`/`H_i` capacity
    /// for the requested `(party_capacity, gens_capacity)`.
    #[cfg_attr(
        feature = "std",
        error("generator table too small for the requested proof shape")
    )]
    InvalidGeneratorsLength,

    /// `values`, `masks1` and `masks2` did not all share one nonzero
    /// length not exceeding the aggregation capacity.
    #[cfg_attr(
        feature = "std",
        error("values/masks1/masks2 must be equal-length, nonempty, and within the aggregation limit")
    )]
    WrongNumBlindingFactors,

    /// A supplied blinding scalar (or, on the verifier side, a proof
    /// scalar `r`, `s`, `delta_1`, `delta_2`) was not in canonical
    /// reduced form.
    #[cfg_attr(feature = "std", error("a supplied scalar was not reduced"))]
    UnreducedScalar,

    /// `L` and `R` did not have equal, matching, nonzero length, or
    /// their length did not equal `log2(m) + log2(N)` for the number of
    /// commitments supplied.
    #[cfg_attr(
        feature = "std",
        error("L/R length mismatch, or does not match log2(m) + log2(N)")
    )]
    MalformedProof,

    /// The commitments list attached to a proof was empty.
    #[cfg_attr(feature = "std", error("empty commitments list"))]
    EmptyCommitments,
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for ProofError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}
