//! Drives one task through the editor.
//!
//! ```text
//! Task + prior error context + ContextMemory
//!   ↓
//! build_instruction()           kind template, file scope, previous-attempt note
//!   ↓
//! search_queries() → SearchProvider::search_many()   (optional, failures ignored)
//!   ↓
//! Editor::apply()               Err → EditFailure, logged, returns false
//! ```

mod instructions;

use std::sync::Arc;

use crate::collab::{Editor, SearchProvider};
use crate::error::GeniusError;
use crate::feedback::ContextMemory;
use crate::task::Task;

pub use instructions::{build_instruction, search_queries};

pub struct Executor {
    editor: Arc<dyn Editor>,
    search: Option<Arc<dyn SearchProvider>>,
    max_results_per_query: usize,
}

impl Executor {
    pub fn new(
        editor: Arc<dyn Editor>,
        search: Option<Arc<dyn SearchProvider>>,
        max_results_per_query: usize,
    ) -> Self {
        Self {
            editor,
            search,
            max_results_per_query,
        }
    }

    /// Returns whether the editor call completed without error.
    pub async fn execute(
        &self,
        task: &Task,
        prior_error: Option<&str>,
        memory: &ContextMemory,
    ) -> bool {
        let reasoning = if prior_error.is_some() {
            "retrying with the previous failure attached"
        } else {
            "first attempt"
        };
        tracing::info!(
            target: "genius.exec",
            phase = "editing",
            action = "apply task",
            reasoning,
            task = %task.name,
            kind = %task.kind,
            retry_count = task.retry_count
        );

        let mut message = build_instruction(task, prior_error, memory);
        if let Some(extra) = self.search_context(task, prior_error).await {
            message.push_str("\n\nRelevant web search context:\n");
            message.push_str(&extra);
        }

        match self.editor.apply(&message).await {
            Ok(()) => true,
            Err(e) => {
                let err = GeniusError::EditFailure(format!("{:#}", e));
                tracing::error!(
                    target: "genius.exec",
                    task = %task.name,
                    editor = self.editor.name(),
                    "{}",
                    err
                );
                false
            }
        }
    }

    async fn search_context(&self, task: &Task, prior_error: Option<&str>) -> Option<String> {
        let search = self.search.as_ref().filter(|s| s.is_available())?;
        let queries = search_queries(task, prior_error);
        if queries.is_empty() {
            return None;
        }

        match search
            .search_many(&queries, self.max_results_per_query)
            .await
        {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(
                    target: "genius.search",
                    task = %task.name,
                    queries = queries.len(),
                    "search context attached"
                );
                Some(text)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(
                    target: "genius.search",
                    task = %task.name,
                    error = %e,
                    "search failed; continuing without context"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Editor for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        async fn apply(&self, message: &str) -> anyhow::Result<()> {
            self.messages.lock().unwrap().push(message.to_string());
            if self.fail {
                anyhow::bail!("editor exited with status 2");
            }
            Ok(())
        }
    }

    struct StaticSearch(anyhow::Result<String>);

    #[async_trait]
    impl SearchProvider for StaticSearch {
        fn name(&self) -> &str {
            "static"
        }
        fn is_available(&self) -> bool {
            true
        }
        async fn search_many(&self, _q: &[String], _n: usize) -> anyhow::Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(anyhow::anyhow!("{}", e)),
            }
        }
    }

    fn feature() -> Task {
        Task::new("f", TaskKind::FeatureImplementation, 1, "add rate limiting")
    }

    #[tokio::test]
    async fn test_search_context_appended() {
        let editor = Arc::new(Recorder::default());
        let search: Arc<dyn SearchProvider> =
            Arc::new(StaticSearch(Ok("**Search Results:**".into())));
        let exec = Executor::new(editor.clone(), Some(search), 2);

        assert!(exec.execute(&feature(), None, &ContextMemory::default()).await);
        let sent = editor.messages.lock().unwrap();
        assert!(sent[0].ends_with("Relevant web search context:\n**Search Results:**"));
    }

    #[tokio::test]
    async fn test_search_failure_is_swallowed() {
        let editor = Arc::new(Recorder::default());
        let search: Arc<dyn SearchProvider> =
            Arc::new(StaticSearch(Err(anyhow::anyhow!("rate limited"))));
        let exec = Executor::new(editor.clone(), Some(search), 2);

        assert!(exec.execute(&feature(), None, &ContextMemory::default()).await);
        assert!(!editor.messages.lock().unwrap()[0].contains("web search"));
    }

    #[tokio::test]
    async fn test_editor_error_returns_false() {
        let editor = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let exec = Executor::new(editor, None, 2);
        assert!(!exec.execute(&feature(), None, &ContextMemory::default()).await);
    }
}
