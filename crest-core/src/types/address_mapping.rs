//! Named address sets.
//!
//! An address mapping is a permanently registered, immutable set of
//! addresses, in inclusion form (the set is exactly `addresses`) or
//! exclusion form (the set is everything except `addresses`). Approval
//! rules and permissions reference mappings by ID.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::address::Address;

/// A named address set, registered once and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressMapping {
    /// Unique mapping identifier.
    pub mapping_id: String,
    /// The listed addresses.
    pub addresses: Vec<Address>,
    /// `true`: the set is exactly `addresses`.
    /// `false`: the set is the complement of `addresses`.
    pub include_addresses: bool,
    /// Off-chain metadata URI.
    pub uri: String,
    /// Arbitrary attached data.
    pub custom_data: String,
}

impl AddressMapping {
    /// A mapping containing every address.
    pub fn all(mapping_id: impl Into<String>) -> Self {
        Self {
            mapping_id: mapping_id.into(),
            addresses: Vec::new(),
            include_addresses: false,
            uri: String::new(),
            custom_data: String::new(),
        }
    }

    /// A mapping containing no address.
    pub fn empty(mapping_id: impl Into<String>) -> Self {
        Self {
            mapping_id: mapping_id.into(),
            addresses: Vec::new(),
            include_addresses: true,
            uri: String::new(),
            custom_data: String::new(),
        }
    }

    /// Check whether `address` is a member of this set.
    pub fn includes(&self, address: &Address) -> bool {
        let listed = self.addresses.contains(address);
        if self.include_addresses {
            listed
        } else {
            !listed
        }
    }

    /// The complement of this set, under the same ID.
    pub fn complement(&self) -> AddressMapping {
        let mut inverted = self.clone();
        inverted.include_addresses = !self.include_addresses;
        inverted
    }

    /// Check whether this set contains every member of `other`.
    ///
    /// Works across inclusion/exclusion forms: an exclusion-form set is
    /// infinite, so it can never be contained in an inclusion-form set.
    pub fn contains_mapping(&self, other: &AddressMapping) -> bool {
        let ours: HashSet<&Address> = self.addresses.iter().collect();
        let theirs: HashSet<&Address> = other.addresses.iter().collect();
        match (other.include_addresses, self.include_addresses) {
            // finite ⊆ finite: listed members must all be listed here.
            (true, true) => theirs.is_subset(&ours),
            // finite ⊆ cofinite: no listed member may be excluded here.
            (true, false) => theirs.is_disjoint(&ours),
            // cofinite ⊆ finite: impossible.
            (false, true) => false,
            // cofinite ⊆ cofinite: our exclusions must all be excluded there.
            (false, false) => ours.is_subset(&theirs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(tag: u8) -> Address {
        [tag; 20]
    }

    fn inclusion(ids: &[u8]) -> AddressMapping {
        AddressMapping {
            mapping_id: "test".into(),
            addresses: ids.iter().map(|&t| addr(t)).collect(),
            include_addresses: true,
            uri: String::new(),
            custom_data: String::new(),
        }
    }

    fn exclusion(ids: &[u8]) -> AddressMapping {
        AddressMapping {
            include_addresses: false,
            ..inclusion(ids)
        }
    }

    #[test]
    fn test_inclusion_membership() {
        let mapping = inclusion(&[1, 2]);
        assert!(mapping.includes(&addr(1)));
        assert!(!mapping.includes(&addr(3)));
    }

    #[test]
    fn test_exclusion_membership() {
        let mapping = exclusion(&[1, 2]);
        assert!(!mapping.includes(&addr(1)));
        assert!(mapping.includes(&addr(3)));
    }

    #[test]
    fn test_all_and_empty() {
        assert!(AddressMapping::all("all").includes(&addr(9)));
        assert!(!AddressMapping::empty("none").includes(&addr(9)));
    }

    #[test]
    fn test_complement() {
        let mapping = inclusion(&[1]);
        let inverted = mapping.complement();
        assert!(!inverted.includes(&addr(1)));
        assert!(inverted.includes(&addr(2)));
        assert_eq!(inverted.complement(), mapping);
    }

    #[test]
    fn test_contains_mapping_finite_in_finite() {
        assert!(inclusion(&[1, 2, 3]).contains_mapping(&inclusion(&[1, 3])));
        assert!(!inclusion(&[1, 2]).contains_mapping(&inclusion(&[1, 3])));
    }

    #[test]
    fn test_contains_mapping_finite_in_cofinite() {
        assert!(exclusion(&[9]).contains_mapping(&inclusion(&[1, 2])));
        assert!(!exclusion(&[2]).contains_mapping(&inclusion(&[1, 2])));
    }

    #[test]
    fn test_contains_mapping_cofinite_in_finite() {
        assert!(!inclusion(&[1, 2]).contains_mapping(&exclusion(&[1, 2])));
    }

    #[test]
    fn test_contains_mapping_cofinite_in_cofinite() {
        assert!(exclusion(&[1]).contains_mapping(&exclusion(&[1, 2])));
        assert!(!exclusion(&[1, 3]).contains_mapping(&exclusion(&[1, 2])));
    }
}
