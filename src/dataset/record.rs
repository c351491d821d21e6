// src/dataset/record.rs

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rows written per dataset file.
pub const ROWS_PER_FILE: i32 = 20;

pub const NAMES: [&str; 5] = ["Sai", "Teja", "Ravi", "Anu", "Priya"];
pub const CITIES: [&str; 5] = ["Dallas", "Houston", "Austin", "NYC", "Chicago"];

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 50;

/// Column order shared by the CSV header and the target table.
pub const COLUMNS: [&str; 4] = ["id", "name", "age", "city"];

/// One synthetic person. Field order is the on-disk column order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Record {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub city: String,
}

impl Record {
    /// Draw one record with the given `id`; name, age and city are uniform.
    pub fn random<R: Rng>(id: i32, rng: &mut R) -> Self {
        Record {
            id,
            name: pick(&NAMES, rng).to_string(),
            age: rng.gen_range(MIN_AGE..=MAX_AGE),
            city: pick(&CITIES, rng).to_string(),
        }
    }
}

fn pick<'a, R: Rng>(vocab: &'a [&'a str], rng: &mut R) -> &'a str {
    // vocabularies are non-empty constants
    vocab.choose(rng).copied().unwrap_or(vocab[0])
}

/// A full dataset: ids run 1..=ROWS_PER_FILE.
pub fn generate_records<R: Rng>(rng: &mut R) -> Vec<Record> {
    (1..=ROWS_PER_FILE).map(|id| Record::random(id, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_records_are_sequential_and_in_range() {
        let mut rng = StdRng::seed_from_u64(0x_d00d_f00d);
        let records = generate_records(&mut rng);

        assert_eq!(records.len(), ROWS_PER_FILE as usize);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.id, i as i32 + 1);
            assert!((MIN_AGE..=MAX_AGE).contains(&rec.age), "age {}", rec.age);
            assert!(NAMES.contains(&rec.name.as_str()), "name {}", rec.name);
            assert!(CITIES.contains(&rec.city.as_str()), "city {}", rec.city);
        }
    }

    #[test]
    fn test_ages_cover_both_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let ages: Vec<i32> = (0..5_000).map(|i| Record::random(i, &mut rng).age).collect();
        assert!(ages.contains(&MIN_AGE));
        assert!(ages.contains(&MAX_AGE));
        assert!(ages.iter().all(|a| (MIN_AGE..=MAX_AGE).contains(a)));
    }

    #[test]
    fn test_every_vocabulary_entry_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let drawn: Vec<Record> = (0..1_000).map(|i| Record::random(i, &mut rng)).collect();
        for name in NAMES {
            assert!(drawn.iter().any(|r| r.name == name), "never drew {}", name);
        }
        for city in CITIES {
            assert!(drawn.iter().any(|r| r.city == city), "never drew {}", city);
        }
    }
}
