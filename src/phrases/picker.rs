//! Lock-guarded uniform random selection over a phrase catalog.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;
use rand::SeedableRng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

use super::PhraseCatalog;

/// Picks phrases uniformly at random. Safe to share between tasks and threads.
#[derive(Debug)]
pub struct RandomPicker {
    catalog: PhraseCatalog,
    rng: Mutex<StdRng>,
}

impl RandomPicker {
    /// Creates a picker whose generator is seeded from the current time.
    #[must_use]
    pub fn new(catalog: PhraseCatalog) -> Self {
        let seed = time_seed(
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        );
        debug!("Seeding phrase picker over {} phrases", catalog.len());
        Self::with_seed(catalog, seed)
    }

    /// Creates a picker with a deterministic generator.
    #[must_use]
    pub fn with_seed(catalog: PhraseCatalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &PhraseCatalog {
        &self.catalog
    }

    /// Returns one phrase from the catalog.
    ///
    /// # Panics
    ///
    /// Never in practice: `PhraseCatalog::new` rejects empty lists.
    pub fn pick(&self) -> &str {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.catalog
            .as_slice()
            .choose(&mut *rng)
            .map(String::as_str)
            .expect("phrase catalogs are never empty")
    }
}

/// Keeps the low 64 bits of the nanosecond count.
fn time_seed(since_epoch: Duration) -> u64 {
    let nanos = since_epoch.as_nanos() & u128::from(u64::MAX);
    u64::try_from(nanos).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn catalog() -> PhraseCatalog {
        PhraseCatalog::new(["villain", "knave", "varlet", "rogue"]).expect("non-empty")
    }

    #[test]
    fn picks_only_catalog_phrases() {
        let picker = RandomPicker::with_seed(catalog(), 7);
        for _ in 0..500 {
            assert!(picker.catalog().contains(picker.pick()));
        }
    }

    #[test]
    fn every_phrase_is_eventually_picked() {
        let picker = RandomPicker::new(catalog());
        let seen: HashSet<&str> = (0..2_000).map(|_| picker.pick()).collect();
        assert_eq!(seen.len(), picker.catalog().len());
    }

    #[test]
    fn single_phrase_catalog_always_returns_it() {
        let picker = RandomPicker::new(PhraseCatalog::new(["only"]).expect("non-empty"));
        assert_eq!(picker.pick(), "only");
    }

    #[test]
    fn picked_phrases_are_never_blank() {
        let picker = RandomPicker::with_seed(catalog(), 3);
        assert!((0..200).all(|_| !picker.pick().is_empty()));
    }

    #[test]
    fn time_seed_keeps_low_bits() {
        assert_eq!(time_seed(Duration::from_nanos(5)), 5);
        assert_eq!(time_seed(Duration::from_nanos(u64::MAX)), u64::MAX);
        // 2^64 + 7 nanoseconds wraps to 7 rather than saturating.
        let wrapped = Duration::new(18_446_744_073, 709_551_616 + 7);
        assert_eq!(time_seed(wrapped), 7);
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let left = RandomPicker::with_seed(catalog(), 42);
        let right = RandomPicker::with_seed(catalog(), 42);
        let left: Vec<&str> = (0..20).map(|_| left.pick()).collect();
        let right: Vec<&str> = (0..20).map(|_| right.pick()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn concurrent_picks_stay_in_catalog() {
        let picker = Arc::new(RandomPicker::new(catalog()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let picker = Arc::clone(&picker);
                thread::spawn(move || {
                    (0..1_000)
                        .map(|_| picker.pick().to_string())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            let picks = handle.join().expect("picker thread panicked");
            assert_eq!(picks.len(), 1_000);
            assert!(picks.iter().all(|phrase| picker.catalog().contains(phrase)));
        }
    }
}
