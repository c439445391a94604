use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::task::Task;

pub trait FallbackProvider {
    fn demo_tasks(&self) -> Vec<Task>;

    fn local_task(&self, text: &str) -> Task;
}

#[derive(Debug, Clone, Default)]
pub struct DemoFallback;

impl FallbackProvider for DemoFallback {
    fn demo_tasks(&self) -> Vec<Task> {
        debug!("serving built-in demo todos");
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        vec![
            Task {
                id: "1".to_string(),
                task: "Set up Supabase project".to_string(),
                is_complete: false,
                created_at: created.clone(),
            },
            Task {
                id: "2".to_string(),
                task: "Connect to your database".to_string(),
                is_complete: false,
                created_at: created,
            },
        ]
    }

    fn local_task(&self, text: &str) -> Task {
        let now = Utc::now();
        Task {
            id: now.timestamp_millis().to_string(),
            task: text.to_string(),
            is_complete: false,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
