//! Partitioning of transfer pairs into per-transaction bundles

use crate::types::{Bundle, TransferPair};

/// Split `pairs` into bundles of at most `bundle_size`, preserving
/// input order. Every pair lands in exactly one bundle; only the last
/// bundle may be short.
///
/// `bundle_size` is validated by configuration before the engine runs.
pub fn chunk_pairs(pairs: &[TransferPair], bundle_size: usize) -> Vec<Bundle> {
    debug_assert!(bundle_size >= 1, "bundle_size is validated upstream");

    pairs
        .chunks(bundle_size)
        .enumerate()
        .map(|(index, chunk)| Bundle {
            index,
            pairs: chunk.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use solana_sdk::pubkey::Pubkey;

    fn pair_from_seed(seed: u8) -> TransferPair {
        TransferPair::new(
            Pubkey::new_from_array([seed; 32]),
            Pubkey::new_from_array([seed.wrapping_add(100); 32]),
        )
    }

    #[test]
    fn test_three_pairs_bundle_size_two() {
        let pairs = vec![pair_from_seed(1), pair_from_seed(2), pair_from_seed(3)];
        let bundles = chunk_pairs(&pairs, 2);

        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].pairs, vec![pairs[0], pairs[1]]);
        assert_eq!(bundles[1].pairs, vec![pairs[2]]);
        assert_eq!(bundles[0].index, 0);
        assert_eq!(bundles[1].index, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk_pairs(&[], 6).is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        let pairs: Vec<_> = (0..6).map(pair_from_seed).collect();
        let bundles = chunk_pairs(&pairs, 3);
        assert_eq!(bundles.len(), 2);
        assert!(bundles.iter().all(|b| b.len() == 3));
    }

    proptest! {
        #[test]
        fn prop_partition_is_exact_and_ordered(
            seeds in prop::collection::vec(0u8..=255, 0..40),
            bundle_size in 1usize..=8,
        ) {
            let pairs: Vec<_> = seeds.iter().map(|&s| pair_from_seed(s)).collect();
            let bundles = chunk_pairs(&pairs, bundle_size);

            // Concatenating the bundles reproduces the input exactly:
            // no pair duplicated, dropped, or reordered.
            let rejoined: Vec<_> = bundles
                .iter()
                .flat_map(|b| b.pairs.iter().copied())
                .collect();
            prop_assert_eq!(rejoined, pairs.clone());

            // Size bounds: all full except possibly the last.
            for (i, bundle) in bundles.iter().enumerate() {
                prop_assert!(bundle.len() >= 1);
                prop_assert!(bundle.len() <= bundle_size);
                if i + 1 < bundles.len() {
                    prop_assert_eq!(bundle.len(), bundle_size);
                }
                prop_assert_eq!(bundle.index, i);
            }
        }
    }
}
