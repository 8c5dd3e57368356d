use chrono::{DateTime, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::merge::{Attr, UNKNOWN_MARKER};
use crate::task::{OperationHandle, TaskStatus};

#[derive(Tabled)]
struct StatusRow {
    field: &'static str,
    value: String,
}

pub fn status_table(handle: &OperationHandle, status: &TaskStatus) -> String {
    let timestamp = |t: Option<DateTime<Utc>>| t.map(|t| t.to_rfc3339()).unwrap_or_else(|| "-".to_string());

    let rows = vec![
        StatusRow {
            field: "task",
            value: handle.to_string(),
        },
        StatusRow {
            field: "kind",
            value: handle
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "-".to_string()),
        },
        StatusRow {
            field: "state",
            value: status.state.clone(),
        },
        StatusRow {
            field: "details",
            value: status.details.clone().unwrap_or_else(|| "-".to_string()),
        },
        StatusRow {
            field: "created",
            value: timestamp(status.created_at),
        },
        StatusRow {
            field: "updated",
            value: timestamp(status.updated_at),
        },
        StatusRow {
            field: "done",
            value: timestamp(status.done_at),
        },
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn attr_tree(label: String, attr: &Attr) -> Tree<String> {
    match attr {
        Attr::Object(fields) => {
            Tree::new(label).with_leaves(fields.iter().map(|(k, v)| attr_tree(k.clone(), v)))
        }
        Attr::List(items) => Tree::new(format!("{} [{}]", label, items.len())).with_leaves(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| attr_tree(format!("[{}]", i), v)),
        ),
        scalar => Tree::new(format!("{}: {}", label, scalar_text(scalar))),
    }
}

fn scalar_text(attr: &Attr) -> String {
    match attr {
        Attr::Unknown => UNKNOWN_MARKER.to_string(),
        Attr::Null => "null".to_string(),
        Attr::Bool(b) => b.to_string(),
        Attr::Number(n) => n.to_string(),
        Attr::String(s) => format!("\"{}\"", s),
        Attr::List(_) | Attr::Object(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;

    #[test]
    fn test_status_table_lists_fields() {
        let handle = OperationHandle::new("ns1.ip-1-2-3.eu", 42)
            .unwrap()
            .with_kind(TaskKind::DedicatedServerTask);
        let status = TaskStatus::new("done").with_details("reboot finished");

        let table = status_table(&handle, &status);
        assert!(table.contains("ns1.ip-1-2-3.eu/42"));
        assert!(table.contains("dedicated-server-task"));
        assert!(table.contains("reboot finished"));
        assert!(table.contains("done"));
    }

    #[test]
    fn test_attr_tree_renders_nested_snapshot() {
        let attr = Attr::from_json(serde_json::json!({
            "name": "disk1",
            "size": 10,
            "ip": UNKNOWN_MARKER,
            "tags": ["a", "b"]
        }));

        let rendered = attr_tree("snapshot".to_string(), &attr).to_string();
        assert!(rendered.starts_with("snapshot"));
        assert!(rendered.contains("name: \"disk1\""));
        assert!(rendered.contains("size: 10"));
        assert!(rendered.contains("ip: (known after apply)"));
        assert!(rendered.contains("tags [2]"));
        assert!(rendered.contains("[1]: \"b\""));
    }
}
