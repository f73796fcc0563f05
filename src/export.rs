//! SQL export — render a changeset as bulk statements.
//!
//! For callers whose link table lives in a relational database. The three
//! statements (or fewer, empty parts are skipped) are meant to run inside
//! one transaction:
//!
//! ```text
//! INSERT INTO links (side1_id, side2_id, level) VALUES (...), (...);
//! UPDATE links SET level = CASE id WHEN 5 THEN 1 ... END WHERE id IN (...);
//! DELETE FROM links WHERE id IN (...);
//! ```
//!
//! Every value written is an integer, so no escaping is involved. Table and
//! column names are copied verbatim and must come from trusted configuration.

use std::io::Write;

use crate::model::*;
use crate::Result;

const INDENT: &str = "    ";

/// Target table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlTable {
    pub name: String,
    pub id_column: String,
    pub source_column: String,
    pub target_column: String,
    pub level_column: String,
}

impl Default for SqlTable {
    fn default() -> Self {
        Self {
            name: "links".into(),
            id_column: "id".into(),
            source_column: "side1_id".into(),
            target_column: "side2_id".into(),
            level_column: "level".into(),
        }
    }
}

impl SqlTable {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }
}

/// Write the changeset as SQL statements. Writes nothing for an empty
/// changeset.
pub fn write_changeset_sql(
    changeset: &Changeset,
    table: &SqlTable,
    writer: &mut dyn Write,
) -> Result<()> {
    if !changeset.created.is_empty() {
        writeln!(
            writer,
            "INSERT INTO {} ({}, {}, {}) VALUES",
            table.name, table.source_column, table.target_column, table.level_column,
        )?;
        let last = changeset.created.len() - 1;
        for (i, link) in changeset.created.iter().enumerate() {
            let sep = if i == last { ";" } else { "," };
            writeln!(writer, "{INDENT}({}, {}, {}){sep}", link.source, link.target, link.level)?;
        }
    }

    if !changeset.updated.is_empty() {
        writeln!(writer, "UPDATE {}", table.name)?;
        writeln!(writer, "{INDENT}SET {} = CASE {}", table.level_column, table.id_column)?;
        for link in &changeset.updated {
            writeln!(writer, "{INDENT}{INDENT}WHEN {} THEN {}", link.id, link.level)?;
        }
        writeln!(writer, "{INDENT}END")?;
        let ids: Vec<LinkId> = changeset.updated.iter().map(|l| l.id).collect();
        writeln!(writer, "WHERE {} IN ({});", table.id_column, join_ids(&ids))?;
    }

    if !changeset.deleted.is_empty() {
        writeln!(
            writer,
            "DELETE FROM {} WHERE {} IN ({});",
            table.name, table.id_column, join_ids(&changeset.deleted),
        )?;
    }
    Ok(())
}

/// Render the changeset to a `String`.
pub fn changeset_sql(changeset: &Changeset, table: &SqlTable) -> Result<String> {
    let mut buf = Vec::new();
    write_changeset_sql(changeset, table, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn join_ids(ids: &[LinkId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
