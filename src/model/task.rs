use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Lowercase name, as stored on disk
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse a lowercase priority name
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Priority::High),
            "medium" | "med" | "m" => Some(Priority::Medium),
            "low" | "l" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Cycle: none → high → medium → low → none
    pub fn cycle(current: Option<Priority>) -> Option<Priority> {
        match current {
            None => Some(Priority::High),
            Some(Priority::High) => Some(Priority::Medium),
            Some(Priority::Medium) => Some(Priority::Low),
            Some(Priority::Low) => None,
        }
    }
}

/// A single to-do item.
///
/// Field names on disk are camelCase (`createdAt`, `dueDate`). The optional
/// fields are omitted when absent, and records written before they existed
/// load with both set to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier
    pub id: String,
    /// Trimmed, never empty
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// RFC 3339 date-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl Task {
    /// Creation time as a UTC timestamp
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    /// Parsed due date, if present and well-formed
    pub fn due(&self) -> Option<DateTime<Utc>> {
        let raw = self.due_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Short local-date label for display, e.g. `Mar 1`
    pub fn due_label(&self) -> Option<String> {
        due_label(self.due_date.as_deref()?)
    }

    /// An open task whose due date has passed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due().is_some_and(|due| due < now)
    }
}

/// Format an RFC 3339 due date as a short local-date label
pub fn due_label(raw: &str) -> Option<String> {
    let due = DateTime::parse_from_rfc3339(raw).ok()?;
    Some(due.with_timezone(&Local).format("%b %-d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(json: &str) -> Task {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn loads_record_without_optional_fields() {
        let t = task(r#"{"id":"1","text":"Buy milk","completed":false,"createdAt":1700000000000}"#);
        assert_eq!(t.priority, None);
        assert_eq!(t.due_date, None);
        assert_eq!(t.created_at, 1_700_000_000_000);
    }

    #[test]
    fn absent_fields_are_not_written() {
        let t = task(r#"{"id":"1","text":"Buy milk","completed":true,"createdAt":5}"#);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1","text":"Buy milk","completed":true,"createdAt":5}"#
        );
    }

    #[test]
    fn priority_and_due_date_use_wire_names() {
        let t = task(
            r#"{"id":"1","text":"x","completed":false,"createdAt":5,"priority":"high","dueDate":"2025-03-01T00:00:00.000Z"}"#,
        );
        assert_eq!(t.priority, Some(Priority::High));
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["priority"], "high");
        assert_eq!(json["dueDate"], "2025-03-01T00:00:00.000Z");
    }

    #[test]
    fn parse_priority_names() {
        assert_eq!(Priority::parse_priority("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse_priority("med"), Some(Priority::Medium));
        assert_eq!(Priority::parse_priority(" low "), Some(Priority::Low));
        assert_eq!(Priority::parse_priority("urgent"), None);
    }

    #[test]
    fn priority_cycle_wraps_to_none() {
        let mut p = None;
        let mut seen = Vec::new();
        for _ in 0..4 {
            p = Priority::cycle(p);
            seen.push(p);
        }
        assert_eq!(
            seen,
            vec![
                Some(Priority::High),
                Some(Priority::Medium),
                Some(Priority::Low),
                None
            ]
        );
    }

    #[test]
    fn overdue_only_when_open_and_past() {
        let mut t = task(
            r#"{"id":"1","text":"x","completed":false,"createdAt":5,"dueDate":"2025-03-01T00:00:00Z"}"#,
        );
        let before = Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap();
        assert!(!t.is_overdue(before));
        assert!(t.is_overdue(after));
        t.completed = true;
        assert!(!t.is_overdue(after));
    }

    #[test]
    fn malformed_due_date_is_ignored() {
        let t = task(r#"{"id":"1","text":"x","createdAt":5,"dueDate":"next tuesday"}"#);
        assert!(t.due().is_none());
        assert!(!t.completed);
    }

    #[test]
    fn due_label_is_local_month_day() {
        let local_noon = Local.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut t = task(r#"{"id":"1","text":"x","createdAt":5}"#);
        assert_eq!(t.due_label(), None);
        t.due_date = Some(local_noon.with_timezone(&Utc).to_rfc3339());
        assert_eq!(t.due_label().as_deref(), Some("Mar 1"));
    }
}
