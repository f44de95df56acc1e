//! Single-kill loot rolls.
//!
//! Approximates the TrinityCore two-tier loot model:
//! ungrouped rows roll independently against their chance, and every
//! group of rows sharing a `GroupId` yields exactly one winner weighted
//! by chance. Reference rows are resolved elsewhere and never roll here.

use std::collections::BTreeMap;

use rand::Rng;
use tracing::trace;

use crate::common::error::LootResult;
use crate::loot::entry::{DropResult, LootEntry};

/// Upper bound (exclusive) of the independent roll.
const ROLL_MAX: f64 = 100.0;

/// Simulate one kill against a loot table.
///
/// Every entry is validated before any roll happens, so an invalid row
/// yields an error and never a partial result. An empty `Vec` means the
/// kill simply dropped nothing.
pub fn simulate_kill<R: Rng>(entries: &[LootEntry], rng: &mut R) -> LootResult<Vec<DropResult>> {
    validate_all(entries)?;
    Ok(roll_kill(entries, rng))
}

pub(crate) fn validate_all(entries: &[LootEntry]) -> LootResult<()> {
    entries.iter().try_for_each(LootEntry::validate)
}

/// Roll entries that are already known to be valid.
pub(crate) fn roll_kill<R: Rng>(entries: &[LootEntry], rng: &mut R) -> Vec<DropResult> {
    let mut drops = Vec::new();

    for (row, entry) in entries.iter().enumerate().filter(|(_, e)| e.is_independent()) {
        let roll = rng.gen_range(0.0..ROLL_MAX);
        // A zero chance never drops, even on an exact 0.0 roll.
        if entry.chance > 0.0 && roll <= entry.chance {
            let count = roll_count(entry, rng);
            trace!("Item {} dropped x{} (roll {:.3} <= {})", entry.item, count, roll, entry.chance);
            drops.push(DropResult::from_entry(row, entry, count));
        }
    }

    for (group_id, members) in group_entries(entries) {
        match roll_group(&members, rng) {
            Some((row, winner)) => {
                let count = roll_count(winner, rng);
                trace!("Group {} winner: item {} x{}", group_id, winner.item, count);
                drops.push(DropResult::from_entry(row, winner, count));
            }
            None => trace!("Group {} has no weight, nothing dropped", group_id),
        }
    }

    drops
}

type Member<'a> = (usize, &'a LootEntry);

/// Collect grouped entries with their row index by group id, keeping their
/// relative order.
fn group_entries(entries: &[LootEntry]) -> BTreeMap<u32, Vec<Member<'_>>> {
    let mut groups: BTreeMap<u32, Vec<Member<'_>>> = BTreeMap::new();
    for (row, entry) in entries.iter().enumerate().filter(|(_, e)| e.is_grouped()) {
        groups.entry(entry.group_id).or_default().push((row, entry));
    }
    groups
}

/// Pick one member of a group weighted by chance.
///
/// Returns `None` only when the group's total chance is zero.
fn roll_group<'a, R: Rng>(members: &[Member<'a>], rng: &mut R) -> Option<Member<'a>> {
    let total: f64 = members.iter().map(|(_, e)| e.chance).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.gen_range(0.0..total);
    for &(row, entry) in members {
        roll -= entry.chance;
        if roll <= 0.0 && entry.chance > 0.0 {
            return Some((row, entry));
        }
    }

    // Float rounding can leave a sliver of remainder after the last member.
    members.iter().rev().find(|(_, e)| e.chance > 0.0).copied()
}

fn roll_count<R: Rng>(entry: &LootEntry, rng: &mut R) -> u32 {
    rng.gen_range(entry.min_count..=entry.max_count)
}
