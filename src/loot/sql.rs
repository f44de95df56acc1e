//! SQL export of loot tables for copy-paste into a world database.

use chrono::Local;

use crate::loot::entry::{LootEntry, LootTable};

pub const LOOT_TABLE_NAME: &str = "creature_loot_template";

const COLUMNS: &str = "`Entry`, `Item`, `Reference`, `Chance`, `QuestRequired`, `LootMode`, `GroupId`, `MinCount`, `MaxCount`, `Comment`";

/// Quote a string literal for MySQL.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "''");
    format!("'{}'", escaped)
}

fn value_row(entry_id: u32, entry: &LootEntry) -> String {
    format!(
        "({}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        entry_id,
        entry.item,
        entry.reference,
        entry.chance,
        u8::from(entry.quest_required),
        entry.loot_mode,
        entry.group_id,
        entry.min_count,
        entry.max_count,
        quote(entry.name.as_deref().unwrap_or("")),
    )
}

/// Render a loot table as a replace-style script: the DELETE wipes the
/// existing rows for the loot id, the INSERT restores the given ones.
pub fn export_sql(table: &LootTable) -> String {
    let mut sql = format!(
        "-- {} {} exported {}\nDELETE FROM `{}` WHERE `Entry` = {};\n",
        LOOT_TABLE_NAME,
        table.entry,
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        LOOT_TABLE_NAME,
        table.entry
    );

    if table.entries.is_empty() {
        return sql;
    }

    let rows: Vec<String> = table
        .entries
        .iter()
        .map(|e| value_row(table.entry, e))
        .collect();

    sql.push_str(&format!(
        "INSERT INTO `{}` ({}) VALUES\n{};\n",
        LOOT_TABLE_NAME,
        COLUMNS,
        rows.join(",\n")
    ));
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("Hogger's Claw"), "'Hogger''s Claw'");
        assert_eq!(quote(r"a\b"), r"'a\\b'");
        assert_eq!(quote(""), "''");
    }

    #[test]
    fn test_export_rows() {
        let mut quest = LootEntry::new(884, 35.5, 1, 1).named("Ghoul Rib");
        quest.quest_required = true;
        let table = LootTable::new(
            448,
            vec![
                LootEntry::new(2672, 100.0, 1, 3).named("Stringy Wolf Meat"),
                quest,
                LootEntry::new(0, 5.0, 1, 1).with_reference(24001),
                LootEntry::new(1200, 0.5, 1, 1).in_group(2),
            ],
        );

        let sql = export_sql(&table);
        assert!(sql.contains("DELETE FROM `creature_loot_template` WHERE `Entry` = 448;"));
        assert!(sql.contains("INSERT INTO `creature_loot_template` (`Entry`, `Item`"));
        assert!(sql.contains("(448, 2672, 0, 100, 0, 1, 0, 1, 3, 'Stringy Wolf Meat'),"));
        assert!(sql.contains("(448, 884, 0, 35.5, 1, 1, 0, 1, 1, 'Ghoul Rib'),"));
        assert!(sql.contains("(448, 0, 24001, 5, 0, 1, 0, 1, 1, ''),"));
        assert!(sql.trim_end().ends_with("(448, 1200, 0, 0.5, 0, 1, 2, 1, 1, '');"));
    }

    #[test]
    fn test_export_empty_table_only_deletes() {
        let sql = export_sql(&LootTable::new(12, Vec::new()));
        assert!(sql.contains("DELETE FROM `creature_loot_template` WHERE `Entry` = 12;"));
        assert!(!sql.contains("INSERT"));
    }
}
