use anyhow::anyhow;
use tracing::trace;

use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default
)]
pub enum Filter {
  #[default]
  All,
  Active,
  Completed
}

impl Filter {
  pub fn parse(
    token: &str
  ) -> anyhow::Result<Self> {
    match token
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(Filter::All),
      | "active" => Ok(Filter::Active),
      | "completed" => {
        Ok(Filter::Completed)
      }
      | other => Err(anyhow!(
        "unknown filter: {other} \
         (expected all, active or \
         completed)"
      ))
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      | Filter::All => "All",
      | Filter::Active => "Active",
      | Filter::Completed => {
        "Completed"
      }
    }
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    let ok = match self {
      | Filter::All => true,
      | Filter::Active => {
        !task.is_complete
      }
      | Filter::Completed => {
        task.is_complete
      }
    };

    trace!(filter = ?self, id = %task.id, ok, "tab match");
    ok
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
  pub total:     usize,
  pub active:    usize,
  pub completed: usize
}

impl Stats {
  pub fn of(tasks: &[Task]) -> Self {
    let active = tasks
      .iter()
      .filter(|task| !task.is_complete)
      .count();
    let completed = tasks
      .iter()
      .filter(|task| task.is_complete)
      .count();

    Self {
      total: tasks.len(),
      active,
      completed
    }
  }
}

pub fn filtered<'a>(
  tasks: &'a [Task],
  filter: Filter
) -> Vec<&'a Task> {
  tasks
    .iter()
    .filter(|task| filter.matches(task))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::{
    Filter,
    Stats,
    filtered
  };
  use crate::task::Task;

  fn task(
    id: &str,
    complete: bool
  ) -> Task {
    Task {
      id:          id.to_string(),
      task:        format!("task {id}"),
      is_complete: complete,
      created_at:
        "2026-02-16T05:00:00+00:00"
          .to_string()
    }
  }

  #[test]
  fn parse_accepts_the_three_tabs() {
    assert_eq!(
      Filter::parse("all").unwrap(),
      Filter::All
    );
    assert_eq!(
      Filter::parse("Active").unwrap(),
      Filter::Active
    );
    assert_eq!(
      Filter::parse(" COMPLETED ")
        .unwrap(),
      Filter::Completed
    );
    assert!(
      Filter::parse("done").is_err()
    );
  }

  #[test]
  fn tabs_select_matching_subsets() {
    let tasks = vec![
      task("1", false),
      task("2", true),
      task("3", false),
    ];

    assert_eq!(
      filtered(&tasks, Filter::All)
        .len(),
      3
    );

    let active =
      filtered(&tasks, Filter::Active);
    let ids: Vec<&str> = active
      .iter()
      .map(|t| t.id.as_str())
      .collect();
    assert_eq!(ids, vec!["1", "3"]);

    let completed = filtered(
      &tasks,
      Filter::Completed
    );
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, "2");
  }

  #[test]
  fn stats_count_both_sides() {
    let tasks = vec![
      task("1", false),
      task("2", true),
      task("3", true),
    ];

    let stats = Stats::of(&tasks);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.completed, 2);
    assert_eq!(
      stats.total,
      stats.active + stats.completed
    );
  }

  #[test]
  fn labels_match_the_tab_captions() {
    assert_eq!(
      Filter::All.label(),
      "All"
    );
    assert_eq!(
      Filter::Active.label(),
      "Active"
    );
    assert_eq!(
      Filter::Completed.label(),
      "Completed"
    );
  }
}
