//! Loot tables: row types, kill simulation, reports and SQL export.

pub mod entry;
pub mod report;
pub mod simulator;
pub mod sql;

pub use entry::{load_table, DropResult, LootEntry, LootTable};
pub use report::{simulate_kills, LootReport};
pub use simulator::simulate_kill;
pub use sql::export_sql;
