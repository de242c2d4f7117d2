//! Region differencing: sub-constituents in a seed's enlarged region that the
//! seed itself does not own

use crate::event::ConstituentRef;

/// Sorted multiset difference `region \ seed`.
///
/// Both inputs are copied and sorted by reference order, then merged in one
/// linear pass. The output is in reference order, not region order. A region
/// that is a subset of the seed yields an empty result.
pub fn unique_regional_extras(
    seed_daughters: &[ConstituentRef],
    region_daughters: &[ConstituentRef],
) -> Vec<ConstituentRef> {
    let mut seed = seed_daughters.to_vec();
    let mut region = region_daughters.to_vec();
    seed.sort();
    region.sort();

    let mut extras = Vec::with_capacity(region.len().saturating_sub(seed.len()));
    let mut s = seed.iter().peekable();

    for r in region {
        // Advance past seed refs ordered before this region ref
        while s.next_if(|x| **x < r).is_some() {}
        if s.next_if(|x| **x == r).is_none() {
            extras.push(r);
        }
    }

    extras
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RefKey;

    fn refs(indices: &[u32]) -> Vec<ConstituentRef> {
        indices.iter().map(|&i| RefKey::new(3, i)).collect()
    }

    #[test]
    fn test_difference_is_sorted() {
        let seed = refs(&[4, 1, 9]);
        let region = refs(&[9, 7, 2, 1, 4, 3]);
        assert_eq!(unique_regional_extras(&seed, &region), refs(&[2, 3, 7]));
    }

    #[test]
    fn test_identical_sets() {
        let x = refs(&[5, 2, 8]);
        assert!(unique_regional_extras(&x, &x).is_empty());
    }

    #[test]
    fn test_region_subset_of_seed() {
        let seed = refs(&[1, 2, 3, 4]);
        let region = refs(&[3, 1]);
        assert!(unique_regional_extras(&seed, &region).is_empty());
    }

    #[test]
    fn test_empty_seed_returns_sorted_region() {
        let region = refs(&[6, 0, 3]);
        assert_eq!(unique_regional_extras(&[], &region), refs(&[0, 3, 6]));
    }

    #[test]
    fn test_duplicates_are_multiset() {
        let seed = refs(&[2]);
        let region = refs(&[2, 2, 5]);
        assert_eq!(unique_regional_extras(&seed, &region), refs(&[2, 5]));
    }

    #[test]
    fn test_product_id_participates_in_order() {
        let seed = vec![RefKey::new(1, 0)];
        let region = vec![RefKey::new(2, 0), RefKey::new(1, 0)];
        assert_eq!(
            unique_regional_extras(&seed, &region),
            vec![RefKey::new(2, 0)]
        );
    }
}
