use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::poller::{FetchError, PollError};

/// Identifies a remote asynchronous task for the lifetime of one poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    pub service_scope: String,
    pub task_id: String,
    pub kind: Option<TaskKind>,
}

impl OperationHandle {
    pub fn new(
        service_scope: impl Into<String>,
        task_id: impl ToString,
    ) -> Result<Self, PollError> {
        let handle = Self {
            service_scope: service_scope.into(),
            task_id: task_id.to_string(),
            kind: None,
        };
        handle.validate()?;
        Ok(handle)
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), PollError> {
        if self.service_scope.trim().is_empty() {
            return Err(PollError::InvalidHandle {
                reason: "service scope is empty".to_string(),
            });
        }
        if self.task_id.trim().is_empty() {
            return Err(PollError::InvalidHandle {
                reason: "task id is empty".to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service_scope, self.task_id)
    }
}

/// A task status as last reported by the remote system.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskStatus {
    pub state: String,
    pub details: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
}

impl TaskStatus {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Pending,
    Succeeded,
    Failed,
}

/// Where each field of a task body lives for a given queue family.
#[derive(Debug, Clone, Copy)]
struct StatusLayout {
    state: &'static str,
    details: Option<&'static str>,
    created: Option<&'static str>,
    updated: Option<&'static str>,
    done: Option<&'static str>,
}

/// OVH task queue families. Each one differs only in its path, field names,
/// state vocabulary and default timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum TaskKind {
    DbaasLogsOperation,
    DedicatedServerTask,
    VrackTask,
    CloudProjectOperation,
    DomainZoneTask,
    IpLoadbalancingTask,
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::DbaasLogsOperation => "dbaas-logs-operation",
            TaskKind::DedicatedServerTask => "dedicated-server-task",
            TaskKind::VrackTask => "vrack-task",
            TaskKind::CloudProjectOperation => "cloud-project-operation",
            TaskKind::DomainZoneTask => "domain-zone-task",
            TaskKind::IpLoadbalancingTask => "ip-loadbalancing-task",
        }
    }

    pub fn path(&self, handle: &OperationHandle) -> String {
        let scope = urlencoding::encode(&handle.service_scope);
        let id = urlencoding::encode(&handle.task_id);
        match self {
            TaskKind::DbaasLogsOperation => format!("/dbaas/logs/{}/operation/{}", scope, id),
            TaskKind::DedicatedServerTask => format!("/dedicated/server/{}/task/{}", scope, id),
            TaskKind::VrackTask => format!("/vrack/{}/task/{}", scope, id),
            TaskKind::CloudProjectOperation => {
                format!("/cloud/project/{}/operation/{}", scope, id)
            }
            TaskKind::DomainZoneTask => format!("/domain/zone/{}/task/{}", scope, id),
            TaskKind::IpLoadbalancingTask => format!("/ipLoadbalancing/{}/task/{}", scope, id),
        }
    }

    pub fn pending_states(&self) -> &'static [&'static str] {
        match self {
            TaskKind::DbaasLogsOperation => &["PENDING", "RECEIVED", "STARTED", "RETRY", "RUNNING"],
            TaskKind::DedicatedServerTask | TaskKind::VrackTask => &["init", "todo", "doing"],
            TaskKind::CloudProjectOperation => &["created", "pending", "in-progress"],
            TaskKind::DomainZoneTask => &["todo", "doing"],
            TaskKind::IpLoadbalancingTask => &["todo", "doing", "blocked"],
        }
    }

    pub fn success_states(&self) -> &'static [&'static str] {
        match self {
            TaskKind::DbaasLogsOperation => &["SUCCESS"],
            TaskKind::CloudProjectOperation => &["completed"],
            TaskKind::DedicatedServerTask
            | TaskKind::VrackTask
            | TaskKind::DomainZoneTask
            | TaskKind::IpLoadbalancingTask => &["done"],
        }
    }

    pub fn failure_states(&self) -> &'static [&'static str] {
        match self {
            TaskKind::DbaasLogsOperation => &["FAILURE", "REVOKED"],
            TaskKind::DedicatedServerTask => &["cancelled", "customerError", "ovhError"],
            TaskKind::VrackTask => &["cancelled", "error"],
            TaskKind::CloudProjectOperation => &["in-error"],
            TaskKind::DomainZoneTask | TaskKind::IpLoadbalancingTask => &["error", "cancelled"],
        }
    }

    pub fn default_timeout(&self) -> Duration {
        let minutes = match self {
            TaskKind::DbaasLogsOperation => 30,
            TaskKind::DedicatedServerTask => 45,
            TaskKind::VrackTask | TaskKind::DomainZoneTask => 60,
            TaskKind::CloudProjectOperation | TaskKind::IpLoadbalancingTask => 20,
        };
        Duration::from_secs(minutes * 60)
    }

    fn layout(&self) -> StatusLayout {
        match self {
            TaskKind::DbaasLogsOperation => StatusLayout {
                state: "state",
                details: Some("message"),
                created: Some("createdAt"),
                updated: Some("updatedAt"),
                done: None,
            },
            TaskKind::DedicatedServerTask => StatusLayout {
                state: "status",
                details: Some("comment"),
                created: Some("startDate"),
                updated: Some("lastUpdate"),
                done: Some("doneDate"),
            },
            TaskKind::VrackTask => StatusLayout {
                state: "status",
                details: None,
                created: Some("todoDate"),
                updated: Some("lastUpdate"),
                done: None,
            },
            TaskKind::CloudProjectOperation => StatusLayout {
                state: "status",
                details: None,
                created: Some("startedAt"),
                updated: None,
                done: Some("completedAt"),
            },
            TaskKind::DomainZoneTask => StatusLayout {
                state: "status",
                details: Some("comment"),
                created: Some("creationDate"),
                updated: Some("lastUpdate"),
                done: Some("doneDate"),
            },
            TaskKind::IpLoadbalancingTask => StatusLayout {
                state: "status",
                details: None,
                created: Some("creationDate"),
                updated: None,
                done: Some("doneDate"),
            },
        }
    }

    /// Extracts a [`TaskStatus`] from a raw task body of this kind.
    pub fn parse_status(&self, body: &serde_json::Value) -> Result<TaskStatus, FetchError> {
        let layout = self.layout();

        let state = body
            .get(layout.state)
            .and_then(|v| v.as_str())
            .ok_or_else(|| FetchError::Decode {
                message: format!("{} body has no '{}' field", self.name(), layout.state),
            })?;

        let text = |field: Option<&str>| {
            field
                .and_then(|f| body.get(f))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        let timestamp = |field: Option<&str>| text(field).and_then(|s| parse_timestamp(&s));

        Ok(TaskStatus {
            state: state.to_string(),
            details: text(layout.details),
            created_at: timestamp(layout.created),
            updated_at: timestamp(layout.updated),
            done_at: timestamp(layout.done),
        })
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ValueEnum;

    #[test]
    fn test_handle_accepts_integer_task_id() {
        let handle = OperationHandle::new("ns123.ip-1-2-3.eu", 4242).unwrap();
        assert_eq!(handle.task_id, "4242");
        assert_eq!(handle.to_string(), "ns123.ip-1-2-3.eu/4242");
    }

    #[test]
    fn test_handle_rejects_empty_scope() {
        let err = OperationHandle::new("  ", "1").unwrap_err();
        assert!(matches!(err, PollError::InvalidHandle { .. }));
        assert!(err.to_string().contains("service scope"));
    }

    #[test]
    fn test_handle_rejects_empty_task_id() {
        let err = OperationHandle::new("pn-123", "").unwrap_err();
        assert!(err.to_string().contains("task id"));
    }

    #[test]
    fn test_paths_are_encoded() {
        let handle = OperationHandle::new("example.com", "12").unwrap();
        assert_eq!(
            TaskKind::DomainZoneTask.path(&handle),
            "/domain/zone/example.com/task/12"
        );

        let handle = OperationHandle::new("ldp-ab/cd", "op 1").unwrap();
        assert_eq!(
            TaskKind::DbaasLogsOperation.path(&handle),
            "/dbaas/logs/ldp-ab%2Fcd/operation/op%201"
        );
    }

    #[test]
    fn test_default_timeouts_per_kind() {
        assert_eq!(
            TaskKind::VrackTask.default_timeout(),
            Duration::from_secs(3600)
        );
        assert_eq!(
            TaskKind::DbaasLogsOperation.default_timeout(),
            Duration::from_secs(1800)
        );
        assert_eq!(
            TaskKind::CloudProjectOperation.default_timeout(),
            Duration::from_secs(1200)
        );
    }

    #[test]
    fn test_state_sets_are_disjoint() {
        for kind in TaskKind::value_variants() {
            for state in kind.pending_states() {
                assert!(!kind.success_states().contains(state), "{kind}: {state}");
                assert!(!kind.failure_states().contains(state), "{kind}: {state}");
            }
            for state in kind.success_states() {
                assert!(!kind.failure_states().contains(state), "{kind}: {state}");
            }
        }
    }

    #[test]
    fn test_parse_dedicated_server_task() {
        let body = serde_json::json!({
            "taskId": 987,
            "function": "hardReboot",
            "status": "customerError",
            "comment": "Server is locked",
            "startDate": "2024-03-01T10:00:00+01:00",
            "lastUpdate": "2024-03-01T10:05:00+01:00",
            "doneDate": null
        });

        let status = TaskKind::DedicatedServerTask.parse_status(&body).unwrap();
        assert_eq!(status.state, "customerError");
        assert_eq!(status.details.as_deref(), Some("Server is locked"));
        assert_eq!(
            status.created_at.unwrap().to_rfc3339(),
            "2024-03-01T09:00:00+00:00"
        );
        assert!(status.updated_at.is_some());
        assert!(status.done_at.is_none());
    }

    #[test]
    fn test_parse_dbaas_logs_operation_uses_state_field() {
        let body = serde_json::json!({
            "operationId": "6d7f-aa",
            "state": "RUNNING",
            "createdAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-01T10:00:02Z"
        });

        let status = TaskKind::DbaasLogsOperation.parse_status(&body).unwrap();
        assert_eq!(status.state, "RUNNING");
        assert!(status.details.is_none());
    }

    #[test]
    fn test_parse_ignores_malformed_timestamps() {
        let body = serde_json::json!({"status": "done", "doneDate": "yesterday"});
        let status = TaskKind::DomainZoneTask.parse_status(&body).unwrap();
        assert_eq!(status.state, "done");
        assert!(status.done_at.is_none());
    }

    #[test]
    fn test_parse_missing_state_is_decode_error() {
        let body = serde_json::json!({"id": 1});
        let err = TaskKind::VrackTask.parse_status(&body).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(err.to_string().contains("'status'"));
    }
}
