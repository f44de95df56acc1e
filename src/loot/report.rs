//! Aggregated results over many simulated kills.

use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;

use crate::common::error::LootResult;
use crate::loot::entry::{DropResult, LootEntry};
use crate::loot::simulator::{roll_kill, validate_all};

/// Observed drops of one loot row.
///
/// Rows are tallied separately even when they share an item id, so each
/// configured chance lines up with its own observed rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTally {
    pub row: usize,
    pub item: u32,
    pub name: Option<String>,
    /// Configured chance of the row, for comparison with the observed rate.
    pub chance: f64,
    pub group_id: u32,
    pub times_dropped: u32,
    pub total_count: u64,
}

impl ItemTally {
    fn from_drop(drop: &DropResult) -> Self {
        Self {
            row: drop.row,
            item: drop.item,
            name: drop.name.clone(),
            chance: drop.chance,
            group_id: drop.group_id,
            times_dropped: 0,
            total_count: 0,
        }
    }

    /// Average stack size per drop.
    pub fn average_count(&self) -> f64 {
        if self.times_dropped == 0 {
            0.0
        } else {
            self.total_count as f64 / self.times_dropped as f64
        }
    }
}

/// Summary of repeated kills against the same table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LootReport {
    pub kills: u32,
    /// Kills that dropped nothing at all.
    pub empty_kills: u32,
    rows: BTreeMap<usize, ItemTally>,
}

impl LootReport {
    /// Fold one kill into the report.
    pub fn record(&mut self, drops: &[DropResult]) {
        self.kills += 1;
        if drops.is_empty() {
            self.empty_kills += 1;
        }
        for drop in drops {
            let tally = self
                .rows
                .entry(drop.row)
                .or_insert_with(|| ItemTally::from_drop(drop));
            tally.times_dropped += 1;
            tally.total_count += u64::from(drop.dropped_count);
        }
    }

    #[cfg(test)]
    pub fn tally(&self, row: usize) -> Option<&ItemTally> {
        self.rows.get(&row)
    }

    /// Tallies ordered by row.
    pub fn tallies(&self) -> impl Iterator<Item = &ItemTally> {
        self.rows.values()
    }

    /// Percentage of kills in which `row` dropped.
    pub fn observed_rate(&self, row: usize) -> f64 {
        if self.kills == 0 {
            return 0.0;
        }
        let dropped = self.rows.get(&row).map_or(0, |t| t.times_dropped);
        f64::from(dropped) * 100.0 / f64::from(self.kills)
    }
}

/// Simulate `kills` kills and aggregate the drops.
pub fn simulate_kills<R: Rng>(entries: &[LootEntry], kills: u32, rng: &mut R) -> LootResult<LootReport> {
    validate_all(entries)?;

    let mut report = LootReport::default();
    for _ in 0..kills {
        report.record(&roll_kill(entries, rng));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_report_counts_kills_and_drops() {
        let entries = vec![LootEntry::new(1, 100.0, 2, 2).named("Linen Cloth"), LootEntry::new(2, 0.0, 1, 1)];
        let report = simulate_kills(&entries, 40, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(report.kills, 40);
        assert_eq!(report.empty_kills, 0);
        let tally = report.tally(0).unwrap();
        assert_eq!(tally.times_dropped, 40);
        assert_eq!(tally.total_count, 80);
        assert_eq!(tally.average_count(), 2.0);
        assert_eq!(tally.name.as_deref(), Some("Linen Cloth"));
        assert!(report.tally(1).is_none());
        assert_eq!(report.observed_rate(0), 100.0);
        assert_eq!(report.observed_rate(1), 0.0);
    }

    #[test]
    fn test_observed_rate_tracks_chance() {
        let entries = vec![LootEntry::new(5, 25.0, 1, 1)];
        let report = simulate_kills(&entries, 4000, &mut StdRng::seed_from_u64(8)).unwrap();

        let rate = report.observed_rate(0);
        assert!((20.0..30.0).contains(&rate), "observed {}%", rate);
        assert_eq!(report.kills - report.empty_kills, report.tally(0).unwrap().times_dropped);
    }

    #[test]
    fn test_group_rates_sum_to_hundred() {
        let entries = vec![
            LootEntry::new(1, 1.0, 1, 1).in_group(1),
            LootEntry::new(2, 3.0, 1, 1).in_group(1),
        ];
        let report = simulate_kills(&entries, 1000, &mut StdRng::seed_from_u64(2)).unwrap();

        let total = report.observed_rate(0) + report.observed_rate(1);
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(report.empty_kills, 0);
    }

    #[test]
    fn test_zero_kills() {
        let report = simulate_kills(&[LootEntry::new(1, 50.0, 1, 1)], 0, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(report.kills, 0);
        assert_eq!(report.observed_rate(0), 0.0);
        assert_eq!(report.tallies().count(), 0);
    }

    #[test]
    fn test_same_item_in_two_rows_tallied_apart() {
        let entries = vec![
            LootEntry::new(7, 100.0, 1, 1),
            LootEntry::new(7, 5.0, 1, 1).in_group(1),
        ];
        let report = simulate_kills(&entries, 10, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(report.tallies().count(), 2);
        for tally in report.tallies() {
            assert_eq!(tally.item, 7);
            assert_eq!(tally.times_dropped, 10);
            assert_eq!(report.observed_rate(tally.row), 100.0);
        }
        assert_eq!(report.tally(0).unwrap().chance, 100.0);
        assert_eq!(report.tally(1).unwrap().chance, 5.0);
        assert_eq!(report.tally(1).unwrap().group_id, 1);
    }

    #[test]
    fn test_invalid_table_rejected_before_rolling() {
        let entries = vec![LootEntry::new(1, 150.0, 1, 1)];
        assert!(simulate_kills(&entries, 10, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
