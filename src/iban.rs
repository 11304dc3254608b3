//! Round-robin IBAN allocation from small fixed pools.
//!
//! Each country keeps a shuffled order and a cursor. A pass hands out every
//! pool entry exactly once; when the cursor runs off the end the pool is
//! reshuffled and a new pass starts.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Mutex;

/// Returned for country codes without a pool.
pub const IBAN_UNAVAILABLE: &str = "N/A";

/// Placeholder IBANs per country code. Not generated, not validated.
pub const PREDEFINED_IBANS: &[(&str, &[&str])] = &[
    (
        "IT",
        &["IT60X0542811101000000123456", "IT12A0306912345100000067890"],
    ),
    (
        "FR",
        &["FR1420041010050500013M02606", "FR7630006000011234567890189"],
    ),
    ("DE", &["DE89370400440532013000", "DE02100100100006820101"]),
    ("LU", &["LU280019400644750000", "LU120010001234567891"]),
];

#[derive(Debug)]
struct PoolCursor {
    order: Vec<String>,
    index: usize,
}

/// Hands out IBANs without repeats inside a pass.
#[derive(Debug)]
pub struct IbanAllocator {
    pools: HashMap<String, Vec<String>>,
    cursors: Mutex<HashMap<String, PoolCursor>>,
}

impl Default for IbanAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IbanAllocator {
    /// Allocator over [`PREDEFINED_IBANS`].
    pub fn new() -> Self {
        let pools = PREDEFINED_IBANS
            .iter()
            .map(|(code, ibans)| {
                (
                    code.to_string(),
                    ibans.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect();
        Self::with_pools(pools)
    }

    /// Allocator over caller-supplied pools. Keys are upper-cased.
    pub fn with_pools(pools: HashMap<String, Vec<String>>) -> Self {
        let pools = pools
            .into_iter()
            .map(|(code, ibans)| (code.to_uppercase(), ibans))
            .collect();
        Self {
            pools,
            cursors: Mutex::new(HashMap::new()),
        }
    }

    pub fn pool_size(&self, country_code: &str) -> usize {
        self.pools
            .get(&country_code.to_uppercase())
            .map_or(0, Vec::len)
    }

    /// Next IBAN for `country_code`, or [`IBAN_UNAVAILABLE`] when there is no pool.
    pub fn next_iban(&self, country_code: &str) -> String {
        self.next_iban_with(country_code, &mut rand::rng())
    }

    /// Same as [`next_iban`](Self::next_iban) with an explicit RNG for the reshuffle.
    pub fn next_iban_with<R: Rng + ?Sized>(&self, country_code: &str, rng: &mut R) -> String {
        let code = country_code.trim().to_uppercase();
        let pool = match self.pools.get(&code) {
            Some(pool) if !pool.is_empty() => pool,
            _ => {
                tracing::debug!("No IBAN pool for country code '{}'", code);
                return IBAN_UNAVAILABLE.to_string();
            }
        };

        // Never held across an await.
        let mut cursors = self.cursors.lock().unwrap_or_else(|e| e.into_inner());
        let cursor = cursors.entry(code.clone()).or_insert_with(|| PoolCursor {
            order: Vec::new(),
            index: 0,
        });

        if cursor.index >= cursor.order.len() {
            let mut order = pool.clone();
            order.shuffle(rng);
            tracing::debug!("Reshuffled IBAN pool for {} ({} entries)", code, order.len());
            cursor.order = order;
            cursor.index = 0;
        }

        let iban = cursor.order[cursor.index].clone();
        cursor.index += 1;
        iban
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_pass_is_a_permutation_of_the_pool() {
        let allocator = IbanAllocator::new();
        let mut rng = StdRng::seed_from_u64(7);

        for (code, ibans) in PREDEFINED_IBANS {
            let pass: Vec<String> = (0..ibans.len())
                .map(|_| allocator.next_iban_with(code, &mut rng))
                .collect();
            let expected: Vec<String> = ibans.iter().map(|s| s.to_string()).collect();
            assert_eq!(sorted(pass), sorted(expected), "pool {}", code);
        }
    }

    #[test]
    fn test_next_pass_starts_after_exhaustion() {
        let pools = HashMap::from([(
            "it".to_string(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        )]);
        let allocator = IbanAllocator::with_pools(pools);
        let mut rng = StdRng::seed_from_u64(42);

        let first: Vec<String> = (0..3).map(|_| allocator.next_iban_with("IT", &mut rng)).collect();
        let second: Vec<String> = (0..3).map(|_| allocator.next_iban_with("it", &mut rng)).collect();

        assert_eq!(first.iter().collect::<HashSet<_>>().len(), 3);
        assert_eq!(sorted(first), sorted(second));
    }

    #[test]
    fn test_unknown_country_returns_sentinel() {
        let allocator = IbanAllocator::new();
        assert_eq!(allocator.next_iban("ES"), IBAN_UNAVAILABLE);
        assert_eq!(allocator.next_iban(""), IBAN_UNAVAILABLE);
        assert_eq!(allocator.pool_size("ES"), 0);
    }

    #[test]
    fn test_empty_pool_returns_sentinel() {
        let allocator = IbanAllocator::with_pools(HashMap::from([("XX".to_string(), Vec::new())]));
        assert_eq!(allocator.next_iban("XX"), IBAN_UNAVAILABLE);
    }

    #[test]
    fn test_countries_have_independent_cursors() {
        let allocator = IbanAllocator::new();
        let it_first = allocator.next_iban("IT");
        let _ = allocator.next_iban("DE");
        let it_second = allocator.next_iban("IT");
        assert_ne!(it_first, it_second);
        assert!(it_first.starts_with("IT") && it_second.starts_with("IT"));
    }
}
