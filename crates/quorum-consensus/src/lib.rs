//! Majority Safety for Validator-Set Changes
//!
//! Every configuration change is approved by the validators of the quorum.
//! A change to the validator set itself is the dangerous one: if too many of
//! the old validators are dropped at once, a newcomer coalition could approve
//! anything afterwards.
//!
//! # Rule
//!
//! A validator-set change is allowed only when a majority of the *current*
//! set survives into the *new* set:
//!
//! ```text
//! |current ∩ new| ≥ floor(|current| / 2) + 1
//! ```
//!
//! The threshold is a simple majority, not a `2f + 1` Byzantine quorum. The
//! trust model assumes validators fail by going offline rather than colluding.

mod majority;
mod validators;

pub use majority::{has_majority, majority};
pub use validators::{all_required_signatures_present, is_allowed_validators_update, retained};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_scales_correctly() {
        assert_eq!(majority(0), 1);
        assert_eq!(majority(1), 1);
        assert_eq!(majority(2), 2);
        assert_eq!(majority(3), 2);
        assert_eq!(majority(4), 3);
        assert_eq!(majority(7), 4);
        assert_eq!(majority(20), 11);
    }

    #[test]
    fn replacing_one_of_three_is_allowed() {
        let current = ["A", "B", "C"];
        let new = ["A", "B", "D"];
        assert!(is_allowed_validators_update(&current, &new));
    }

    #[test]
    fn replacing_two_of_three_is_rejected() {
        let current = ["A", "B", "C"];
        let new = ["A", "D", "E"];
        assert!(!is_allowed_validators_update(&current, &new));
    }
}
