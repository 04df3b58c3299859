//! Simple-majority arithmetic.
//!
//! - n signers → floor(n / 2) + 1 required
//!
//! An empty set still requires one signature, so nothing can be approved
//! by nobody.

/// Minimum number of signatures that form a majority of `total_signers`.
///
/// # Examples
///
/// ```
/// use quorum_consensus::majority;
///
/// assert_eq!(majority(1), 1);
/// assert_eq!(majority(3), 2);
/// assert_eq!(majority(4), 3);
/// ```
pub const fn majority(total_signers: usize) -> usize {
    total_signers / 2 + 1
}

/// Check if a signature count reaches the majority.
pub const fn has_majority(total_signers: usize, signatures: usize) -> bool {
    signatures >= majority(total_signers)
}
