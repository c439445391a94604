use tracing::{debug, instrument, warn};

use crate::fallback::FallbackProvider;
use crate::filter::{self, Filter, Stats};
use crate::store::TaskStore;
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LoadFailed,
    Added,
    AddedDemo,
    Completed,
    CompletedDemo,
    MarkedActive,
    MarkedActiveDemo,
    Deleted,
    DeletedDemo,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::LoadFailed => "Failed to load todos. Using demo mode.",
            Notice::Added => "Todo added!",
            Notice::AddedDemo => "Todo added! (Demo mode)",
            Notice::Completed => "Todo completed!",
            Notice::CompletedDemo => "Todo completed! (Demo)",
            Notice::MarkedActive => "Todo marked as active",
            Notice::MarkedActiveDemo => "Todo marked as active! (Demo)",
            Notice::Deleted => "Todo deleted!",
            Notice::DeletedDemo => "Todo deleted! (Demo mode)",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::LoadFailed)
    }
}

pub struct TodoSession<S, F> {
    store: S,
    fallback: F,
    tasks: Vec<Task>,
    filter: Filter,
    draft: String,
    loading: bool,
    adding: bool,
    notices: Vec<Notice>,
}

impl<S: TaskStore, F: FallbackProvider> TodoSession<S, F> {
    pub fn new(store: S, fallback: F) -> Self {
        Self {
            store,
            fallback,
            tasks: vec![],
            filter: Filter::All,
            draft: String::new(),
            loading: false,
            adding: false,
            notices: vec![],
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.loading = true;
        match self.store.list_all().await {
            Ok(rows) => {
                debug!(count = rows.len(), "loaded todos");
                self.tasks = rows;
            }
            Err(err) => {
                warn!(error = %err, "load failed; switching to demo tasks");
                self.tasks = self.fallback.demo_tasks();
                self.notices.push(Notice::LoadFailed);
            }
        }
        self.loading = false;
    }

    #[instrument(skip(self))]
    pub async fn add(&mut self) {
        let text = self.draft.trim().to_string();
        if text.is_empty() {
            debug!("draft is empty after trimming; nothing to add");
            return;
        }

        self.adding = true;
        let (task, notice) = match self.store.insert(&text).await {
            Ok(created) => (created, Notice::Added),
            Err(err) => {
                warn!(error = %err, "insert failed; keeping the todo locally");
                (self.fallback.local_task(&text), Notice::AddedDemo)
            }
        };

        self.tasks.insert(0, task);
        self.draft.clear();
        self.notices.push(notice);
        self.adding = false;
    }

    #[instrument(skip(self))]
    pub async fn toggle(&mut self, id: &str, current: bool) {
        let notice = match self.store.set_complete(id, !current).await {
            Ok(()) => {
                if current {
                    Notice::MarkedActive
                } else {
                    Notice::Completed
                }
            }
            Err(err) => {
                warn!(error = %err, id, "update failed; flipping locally only");
                if current {
                    Notice::MarkedActiveDemo
                } else {
                    Notice::CompletedDemo
                }
            }
        };

        for task in &mut self.tasks {
            if task.id == id {
                task.is_complete = !current;
            }
        }
        self.notices.push(notice);
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: &str) {
        let notice = match self.store.delete(id).await {
            Ok(()) => Notice::Deleted,
            Err(err) => {
                warn!(error = %err, id, "delete failed; removing locally only");
                Notice::DeletedDemo
            }
        };

        self.tasks.retain(|task| task.id != id);
        self.notices.push(notice);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        filter::filtered(&self.tasks, self.filter)
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.tasks)
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: String) {
        self.draft = text;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_adding(&self) -> bool {
        self.adding
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
