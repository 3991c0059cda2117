//! Loot roll при смерти агента.

use rand::Rng;

use crate::config::{LootPolicy, LootTable};

/// Роллит таблицу по политике; возвращает id предметов для LootSpawner
pub fn roll_loot<'a>(table: &'a LootTable, rng: &mut impl Rng) -> Vec<&'a str> {
    let mut drops = Vec::new();

    match table.policy {
        LootPolicy::FirstSuccess => {
            for entry in &table.entries {
                if roll(entry.chance, rng) {
                    drops.push(entry.item.as_str());
                    break;
                }
            }
        }
        LootPolicy::SingleRoll => {
            if let Some(entry) = table.entries.first() {
                if roll(entry.chance, rng) {
                    drops.push(entry.item.as_str());
                }
            }
        }
        LootPolicy::MultiRoll => {
            for entry in &table.entries {
                if roll(entry.chance, rng) {
                    drops.push(entry.item.as_str());
                }
            }
        }
    }

    drops
}

/// `chance` в процентах: 100 выпадает всегда, 0 никогда
fn roll(chance: f32, rng: &mut impl Rng) -> bool {
    rng.gen_range(0.0f32..100.0) < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LootEntry;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table(policy: LootPolicy, entries: &[(&str, f32)]) -> LootTable {
        LootTable {
            entries: entries
                .iter()
                .map(|(item, chance)| LootEntry::new(*item, *chance))
                .collect(),
            policy,
        }
    }

    #[test]
    fn test_guaranteed_single_entry_always_drops_once() {
        let table = table(LootPolicy::FirstSuccess, &[("HealthPack", 100.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(roll_loot(&table, &mut rng), vec!["HealthPack"]);
        }
    }

    #[test]
    fn test_first_success_stops_after_first_drop() {
        let table = table(
            LootPolicy::FirstSuccess,
            &[("Never", 0.0), ("Coin", 100.0), ("Gem", 100.0)],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(roll_loot(&table, &mut rng), vec!["Coin"]);
    }

    #[test]
    fn test_single_roll_only_checks_first_entry() {
        let table = table(LootPolicy::SingleRoll, &[("Never", 0.0), ("Coin", 100.0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(roll_loot(&table, &mut rng).is_empty());
    }

    #[test]
    fn test_multi_roll_rolls_every_entry() {
        let table = table(
            LootPolicy::MultiRoll,
            &[("Coin", 100.0), ("Never", 0.0), ("Gem", 100.0)],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert_eq!(roll_loot(&table, &mut rng), vec!["Coin", "Gem"]);
    }

    #[test]
    fn test_empty_table_drops_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(roll_loot(&LootTable::default(), &mut rng).is_empty());
    }
}
