//! SQL statement builders
//!
//! Identifiers come from validated configuration, but are still quoted so that
//! reserved words (`type`, `order`, ...) and mixed case survive.

use crate::domain::EntitySpec;

/// Quotes an identifier, handling `schema.table` qualification
pub fn quote_ident(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// `SELECT COUNT(*)` over the whole table
pub fn count_sql(entity: &EntitySpec) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(entity.table_name()))
}

/// Counts rows where any of `columns` is NULL
///
/// Returns `None` for an empty column list; nothing can be NULL then.
pub fn count_any_null_sql(entity: &EntitySpec, columns: &[&str]) -> Option<String> {
    if columns.is_empty() {
        return None;
    }

    let predicate = columns
        .iter()
        .map(|c| format!("{} IS NULL", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(" OR ");

    Some(format!(
        "SELECT COUNT(*) FROM {} WHERE {}",
        quote_ident(entity.table_name()),
        predicate
    ))
}

/// Selects `columns` in order, skipping rows without a key, ordered by key
pub fn fetch_sql(entity: &EntitySpec, columns: &[&str], key_column: &str) -> String {
    fetch_sql_casting(entity, columns, key_column, &[])
}

/// Like [`fetch_sql`], but selects the columns in `as_text` through their
/// text representation (`"col"::text AS "col"`)
pub fn fetch_sql_casting(
    entity: &EntitySpec,
    columns: &[&str],
    key_column: &str,
    as_text: &[&str],
) -> String {
    let projection = columns
        .iter()
        .map(|c| {
            let ident = quote_ident(c);
            if as_text.contains(c) {
                format!("{ident}::text AS {ident}")
            } else {
                ident
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let key = quote_ident(key_column);

    format!(
        "SELECT {} FROM {} WHERE {} IS NOT NULL ORDER BY {}",
        projection,
        quote_ident(entity.table_name()),
        key,
        key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnSpec;

    fn products() -> EntitySpec {
        EntitySpec::builder("products")
            .key_column("id")
            .column(ColumnSpec::new("id").required())
            .column(ColumnSpec::new("type").renamed("name").required())
            .column(ColumnSpec::new("price"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("customers"), "\"customers\"");
        assert_eq!(quote_ident("sales.orders"), "\"sales\".\"orders\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_count_sql() {
        assert_eq!(count_sql(&products()), "SELECT COUNT(*) FROM \"products\"");
    }

    #[test]
    fn test_count_any_null_sql() {
        let sql = count_any_null_sql(&products(), &["id", "type"]).unwrap();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM \"products\" WHERE \"id\" IS NULL OR \"type\" IS NULL"
        );
        assert!(count_any_null_sql(&products(), &[]).is_none());
    }

    #[test]
    fn test_fetch_sql_uses_source_names() {
        let spec = products();
        let sql = fetch_sql(&spec, &spec.source_columns(), &spec.key_column);
        assert_eq!(
            sql,
            "SELECT \"id\", \"type\", \"price\" FROM \"products\" WHERE \"id\" IS NOT NULL ORDER BY \"id\""
        );
    }

    #[test]
    fn test_fetch_sql_casts_selected_columns_to_text() {
        let spec = products();
        let sql = fetch_sql_casting(&spec, &spec.source_columns(), &spec.key_column, &["price"]);
        assert_eq!(
            sql,
            "SELECT \"id\", \"type\", \"price\"::text AS \"price\" FROM \"products\" WHERE \"id\" IS NOT NULL ORDER BY \"id\""
        );
    }
}
