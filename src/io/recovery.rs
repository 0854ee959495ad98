use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::io::lock;

/// Size past which old entries are trimmed on the next append (1 MB).
const MAX_LOG_SIZE: u64 = 1_048_576;

/// Entries older than this many days are prunable.
pub const PRUNE_AGE_DAYS: i64 = 30;

const FILE_HEADER: &str = "\
<!-- tick recovery log: data tick could not save or read normally.
     View with: tick recovery
     Prune old entries: tick recovery prune
     Safe to delete. -->

---
";

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryCategory {
    /// Stored data that could not be parsed and was replaced
    Parser,
    /// A save that did not reach disk
    Write,
    /// A deleted task, kept so it can be restored by hand
    Delete,
}

impl fmt::Display for RecoveryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryCategory::Parser => write!(f, "parser"),
            RecoveryCategory::Write => write!(f, "write"),
            RecoveryCategory::Delete => write!(f, "delete"),
        }
    }
}

impl RecoveryCategory {
    pub fn parse_category(s: &str) -> Option<Self> {
        match s {
            "parser" => Some(RecoveryCategory::Parser),
            "write" => Some(RecoveryCategory::Write),
            "delete" => Some(RecoveryCategory::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryEntry {
    pub timestamp: DateTime<Utc>,
    pub category: RecoveryCategory,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub body: String,
}

pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".recovery.log")
}

// ---------------------------------------------------------------------------
// Atomic file write
// ---------------------------------------------------------------------------

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Writing entries
// ---------------------------------------------------------------------------

impl RecoveryEntry {
    /// Markdown block: `## <timestamp> [<category>] <description>`, then
    /// `Key: value` lines, a fenced body, and a `---` separator.
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "## {} [{}] {}\n\n",
            self.timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.category,
            self.description,
        );
        for (key, value) in &self.fields {
            out.push_str(&format!("{}: {}\n", key, value));
        }
        if !self.body.is_empty() {
            out.push_str("\n```text\n");
            out.push_str(&self.body);
            if !self.body.ends_with('\n') {
                out.push('\n');
            }
            out.push_str("```\n");
        }
        out.push_str("\n---\n");
        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();

        serde_json::json!({
            "timestamp": self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            "category": self.category.to_string(),
            "description": self.description,
            "fields": fields,
            "body": self.body,
        })
    }
}

/// Append an entry to the log. Failures are reported on stderr and otherwise ignored.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append_entry(data_dir, &entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append_entry(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let path = recovery_log_path(data_dir);

    if fs::metadata(&path).is_ok_and(|m| m.len() > MAX_LOG_SIZE) {
        let cutoff = Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS);
        // Best effort: skip the trim if another process holds the log
        let _ = rewrite_locked(&path, |content| prune_entries_before(content, &cutoff), false);
    }

    let needs_header = fs::metadata(&path).map_or(true, |m| m.len() == 0);
    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    if needs_header {
        file.write_all(FILE_HEADER.as_bytes())?;
    }
    file.write_all(entry.to_markdown().as_bytes())
}

/// Record a deleted task so it can be restored by hand.
pub fn log_task_deletion(data_dir: &Path, task_id: &str, task_json: &str) {
    log_recovery(
        data_dir,
        RecoveryEntry {
            timestamp: Utc::now(),
            category: RecoveryCategory::Delete,
            description: format!("task {} deleted", task_id),
            fields: vec![("Task".to_string(), task_id.to_string())],
            body: task_json.to_string(),
        },
    );
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read entries, most recent first.
pub fn read_recovery_entries(
    data_dir: &Path,
    limit: Option<usize>,
    since: Option<DateTime<Utc>>,
) -> Vec<RecoveryEntry> {
    let content = match fs::read_to_string(recovery_log_path(data_dir)) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut entries = parse_entries(&content);
    if let Some(since) = since {
        entries.retain(|e| e.timestamp >= since);
    }
    entries.reverse();
    if let Some(n) = limit {
        entries.truncate(n);
    }
    entries
}

fn parse_entries(content: &str) -> Vec<RecoveryEntry> {
    let mut entries = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some((timestamp, category, description)) =
            line.strip_prefix("## ").and_then(parse_entry_header)
        else {
            continue;
        };

        let mut fields = Vec::new();
        let mut body_lines: Vec<&str> = Vec::new();
        let mut in_body = false;

        while let Some(&next) = lines.peek() {
            if !in_body && (next == "---" || next.starts_with("## ")) {
                break;
            }
            lines.next();
            if in_body {
                if next == "```" {
                    in_body = false;
                } else {
                    body_lines.push(next);
                }
            } else if next.starts_with("```") {
                in_body = true;
            } else if let Some((key, value)) = next.trim().split_once(": ") {
                fields.push((key.to_string(), value.to_string()));
            }
        }

        entries.push(RecoveryEntry {
            timestamp,
            category,
            description,
            fields,
            body: body_lines.join("\n"),
        });
    }

    entries
}

/// Parse `<timestamp> [<category>] <description>`
fn parse_entry_header(header: &str) -> Option<(DateTime<Utc>, RecoveryCategory, String)> {
    let (timestamp_str, rest) = header.split_once(" [")?;
    let (category_str, description) = rest.split_once("] ")?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp_str)
        .ok()?
        .with_timezone(&Utc);
    let category = RecoveryCategory::parse_category(category_str)?;
    Some((timestamp, category, description.to_string()))
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove entries older than `before` (default: 30 days ago), or all entries.
/// Returns the number removed.
pub fn prune_recovery(
    data_dir: &Path,
    before: Option<DateTime<Utc>>,
    all: bool,
) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    if !path.exists() {
        return Ok(0);
    }

    let cutoff = before.unwrap_or_else(|| Utc::now() - chrono::Duration::days(PRUNE_AGE_DAYS));
    let mut removed = 0;
    rewrite_locked(
        &path,
        |content| {
            let before_count = parse_entries(content).len();
            let pruned = if all {
                FILE_HEADER.to_string()
            } else {
                prune_entries_before(content, &cutoff)
            };
            removed = before_count - parse_entries(&pruned).len();
            pruned
        },
        true,
    )?;
    Ok(removed)
}

/// Rewrite the log under an exclusive flock. With `wait`, retries for about
/// a second before giving up.
fn rewrite_locked(
    path: &Path,
    f: impl FnOnce(&str) -> String,
    wait: bool,
) -> io::Result<()> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    let attempts = if wait { 10 } else { 1 };
    let mut locked = false;
    for attempt in 0..attempts {
        if lock::try_lock(&file).is_ok() {
            locked = true;
            break;
        }
        if attempt + 1 < attempts {
            std::thread::sleep(std::time::Duration::from_millis(100));
        }
    }
    if !locked {
        return Err(io::Error::new(
            io::ErrorKind::WouldBlock,
            "recovery log is in use, try again later",
        ));
    }

    let content = fs::read_to_string(path)?;
    let rewritten = f(&content);
    if rewritten != content {
        fs::write(path, rewritten)?;
    }
    Ok(())
}

/// Drop entries stamped before `cutoff`. The log is re-rendered from the
/// parsed entries under a fresh file header.
fn prune_entries_before(content: &str, cutoff: &DateTime<Utc>) -> String {
    parse_entries(content)
        .iter()
        .filter(|e| e.timestamp >= *cutoff)
        .fold(FILE_HEADER.to_string(), |mut out, e| {
            out.push_str(&e.to_markdown());
            out
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
