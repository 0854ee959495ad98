use serde::Serialize;

use crate::model::task::Task;

/// Counts shown above the list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    /// Percentage of tasks completed, rounded half-up; 0 for an empty list
    pub completion_rate: u32,
}

pub fn stats(tasks: &[Task]) -> Stats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    Stats {
        total,
        active: total - completed,
        completed,
        completion_rate: completion_rate(completed, total),
    }
}

fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // round(100 * completed / total), half-up, in integers
    ((200 * completed + total) / (2 * total)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tasks(done: &[bool]) -> Vec<Task> {
        done.iter()
            .enumerate()
            .map(|(i, &completed)| Task {
                id: i.to_string(),
                text: format!("task {}", i),
                completed,
                created_at: i as i64,
                priority: None,
                due_date: None,
            })
            .collect()
    }

    #[test]
    fn empty_list_is_zero() {
        assert_eq!(stats(&[]), Stats::default());
    }

    #[test]
    fn half_done_is_fifty_percent() {
        let s = stats(&tasks(&[true, false, true, false]));
        assert_eq!(
            s,
            Stats {
                total: 4,
                active: 2,
                completed: 2,
                completion_rate: 50
            }
        );
    }

    #[test]
    fn rounding() {
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13); // 12.5 rounds up
        assert_eq!(completion_rate(3, 3), 100);
        assert_eq!(completion_rate(0, 7), 0);
    }
}
