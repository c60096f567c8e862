//! Table and structured output for `get` and `describe`.

use dataplane::WireObject;
use serde_json::Value;
use std::collections::BTreeSet;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Columns shown before the alphabetical rest.
const PRIORITY_COLUMNS: [&str; 4] = ["name", "acl_name", "id", "storage_name"];

pub const EMPTY: &str = "No resources found.";

/// Render rows as a kubectl-style table.
///
/// Columns are the union of row keys: the identifying column first, then the
/// rest alphabetically. Missing and null cells show as `-`.
pub fn table(rows: &[WireObject]) -> String {
    if rows.is_empty() {
        return EMPTY.to_string();
    }
    let columns = columns(rows);

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for row in rows {
        builder.push_record(columns.iter().map(|c| cell(row.get(c.as_str()))));
    }

    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

/// Render rows with a fixed column set, in the given order.
pub fn table_with(rows: &[WireObject], columns: &[&str]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for row in rows {
        builder.push_record(columns.iter().map(|c| cell(row.get(*c))));
    }

    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

fn columns(rows: &[WireObject]) -> Vec<String> {
    let keys: BTreeSet<&str> = rows.iter().flat_map(|r| r.keys().map(String::as_str)).collect();
    let primary = PRIORITY_COLUMNS.into_iter().find(|p| keys.contains(p));

    primary
        .into_iter()
        .chain(keys.into_iter().filter(|k| Some(*k) != primary))
        .map(str::to_string)
        .collect()
}

/// Human-readable cell text.
pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => format!("{:.0}", n.as_f64().unwrap_or_default()),
        },
        Some(Value::Array(items)) => list_cell(items),
        Some(Value::Object(map)) => match map.values().next() {
            Some(only) if map.len() == 1 => cell(Some(only)),
            _ => "{...}".to_string(),
        },
    }
}

fn list_cell(items: &[Value]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    let servers: Option<Vec<String>> = items
        .iter()
        .map(|item| {
            let obj = item.as_object()?;
            let (name, address, port) = (obj.get("name")?, obj.get("address")?, obj.get("port")?);
            Some(format!(
                "{} ({}:{})",
                cell(Some(name)),
                cell(Some(address)),
                cell(Some(port))
            ))
        })
        .collect();
    match servers {
        Some(servers) => servers.join(", "),
        None => items
            .iter()
            .map(|item| cell(Some(item)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Sort rows by their identifying field (`name`, falling back to `id`).
pub fn sort_rows(rows: &mut [WireObject]) {
    rows.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
}

fn sort_key(row: &WireObject) -> &str {
    ["name", "storage_name", "id"]
        .into_iter()
        .find_map(|key| row.get(key).and_then(Value::as_str))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> WireObject {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(table(&[]), EMPTY);
    }

    #[test]
    fn test_name_column_first_then_alphabetical() {
        let rows = vec![obj(json!({"mode": "http", "name": "web", "balance": {"algorithm": "roundrobin"}}))];
        let out = table(&rows);
        let header: Vec<&str> = out.lines().next().unwrap().split_whitespace().collect();
        assert_eq!(header, ["NAME", "BALANCE", "MODE"]);
        assert!(out.contains("roundrobin"));
    }

    #[test]
    fn test_missing_cells_are_dashes() {
        let rows = vec![
            obj(json!({"name": "a", "mode": "http"})),
            obj(json!({"name": "b"})),
        ];
        let out = table(&rows);
        let last: Vec<&str> = out.lines().last().unwrap().split_whitespace().collect();
        assert_eq!(last, ["b", "-"]);
    }

    #[test]
    fn test_cell_formatting() {
        assert_eq!(cell(Some(&json!(8080))), "8080");
        assert_eq!(cell(Some(&json!(1.0))), "1");
        assert_eq!(cell(Some(&json!(true))), "true");
        assert_eq!(cell(Some(&json!(null))), "-");
        assert_eq!(cell(Some(&json!({"a": 1, "b": 2}))), "{...}");
        assert_eq!(cell(Some(&json!([]))), "-");
    }

    #[test]
    fn test_server_list_cell() {
        let servers = json!([
            {"name": "s1", "address": "10.0.0.1", "port": 80},
            {"name": "s2", "address": "10.0.0.2", "port": 81}
        ]);
        assert_eq!(
            cell(Some(&servers)),
            "s1 (10.0.0.1:80), s2 (10.0.0.2:81)"
        );
    }

    #[test]
    fn test_sort_rows() {
        let mut rows = vec![obj(json!({"name": "b"})), obj(json!({"name": "a"}))];
        sort_rows(&mut rows);
        assert_eq!(rows[0]["name"], "a");
    }

    #[test]
    fn test_fixed_columns() {
        let rows = vec![obj(json!({"name": "s1", "address": "h", "port": 80}))];
        let out = table_with(&rows, &["name", "address", "port", "weight"]);
        let row: Vec<&str> = out.lines().nth(1).unwrap().split_whitespace().collect();
        assert_eq!(row, ["s1", "h", "80", "-"]);
    }
}
