//! Failure isolation around a single handler call.
//!
//! Whatever the handler does (returns an error, panics, or hangs past the
//! timeout), [`HandlerInvoker::invoke`] comes back with a [`ToolResponse`].

use crate::mcp::{
    protocol::{ContentBlock, ToolResponse},
    registry::ToolDefinition,
    schema::ValidatedArgs,
};
use futures::{future, FutureExt};
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HandlerInvoker {
    timeout: Duration,
}

impl Default for HandlerInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_HANDLER_TIMEOUT)
    }
}

impl HandlerInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn invoke(
        &self,
        id: Value,
        definition: &ToolDefinition,
        args: ValidatedArgs,
    ) -> ToolResponse {
        let operation = panic::catch_unwind(AssertUnwindSafe(|| definition.operation(&args)))
            .unwrap_or_else(|payload| {
                warn!(
                    "Operation label for '{}' panicked: {}",
                    definition.name(),
                    panic_message(payload.as_ref())
                );
                format!("run {}", definition.name())
            });
        // Building the future runs the handler body, so it happens inside the guard too.
        let call = AssertUnwindSafe(future::lazy(|_| definition.call(args)).flatten())
            .catch_unwind();

        let message = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(content))) => {
                debug!("Tool '{}' completed", definition.name());
                if content.is_empty() {
                    return ToolResponse::success(
                        id,
                        vec![ContentBlock::text(format!(
                            "{} completed with no output.",
                            definition.name()
                        ))],
                    );
                }
                return ToolResponse::success(id, content);
            }
            Ok(Ok(Err(e))) => format!("{:#}", e),
            Ok(Err(panic)) => panic_message(panic.as_ref()),
            Err(_) => format!("request timed out after {}", humanize(self.timeout)),
        };

        warn!("Tool '{}' failed: {}", definition.name(), message);
        ToolResponse::failure(id, failure_text(&operation, &message))
    }
}

/// The text of every handler failure.
pub fn failure_text(operation: &str, message: &str) -> String {
    format!("Failed to {}. Error: {}", operation, message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

fn humanize(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::schema::{validate, ParameterSchema};
    use anyhow::anyhow;
    use serde_json::json;

    fn tool<F, Fut>(handler: F) -> ToolDefinition
    where
        F: Fn(ValidatedArgs) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = anyhow::Result<Vec<ContentBlock>>> + Send + 'static,
    {
        ToolDefinition::new("sample", "Sample tool", ParameterSchema::new(), "run sample", handler)
    }

    fn no_args() -> ValidatedArgs {
        validate(&ParameterSchema::new(), &Value::Null).unwrap()
    }

    #[tokio::test]
    async fn test_success_passes_content_through() {
        let definition = tool(|_| async { Ok(vec![ContentBlock::text("ok")]) });
        let resp = HandlerInvoker::default()
            .invoke(json!(1), &definition, no_args())
            .await;
        assert!(!resp.is_error);
        assert_eq!(resp.id, json!(1));
        assert_eq!(resp.text(), "ok");
    }

    #[tokio::test]
    async fn test_error_becomes_failure_content() {
        let definition = tool(|_| async { Err(anyhow!("upstream unreachable")) });
        let resp = HandlerInvoker::default()
            .invoke(json!(2), &definition, no_args())
            .await;
        assert!(resp.is_error);
        assert_eq!(resp.text(), "Failed to run sample. Error: upstream unreachable");
    }

    #[tokio::test]
    async fn test_error_context_chain_is_kept() {
        let definition = tool(|_| async {
            Err(anyhow!("connection refused").context("eth_getBalance call failed"))
        });
        let resp = HandlerInvoker::default()
            .invoke(json!(3), &definition, no_args())
            .await;
        assert!(resp.text().contains("eth_getBalance call failed: connection refused"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let definition = tool(|_| async {
            if true {
                panic!("boom");
            }
            Ok(Vec::new())
        });
        let resp = HandlerInvoker::default()
            .invoke(json!(4), &definition, no_args())
            .await;
        assert!(resp.is_error);
        assert_eq!(resp.text(), "Failed to run sample. Error: boom");
    }

    #[tokio::test]
    async fn test_panic_before_future_is_contained() {
        let definition = tool(|_| {
            let empty: Vec<u8> = Vec::new();
            let _ = empty[3];
            async { Ok(Vec::new()) }
        });
        let resp = HandlerInvoker::default()
            .invoke(json!(7), &definition, no_args())
            .await;
        assert!(resp.is_error);
        assert_eq!(resp.id, json!(7));
        assert!(resp.text().starts_with("Failed to run sample. Error: index out of bounds"));
    }

    #[tokio::test]
    async fn test_panicking_label_falls_back_to_tool_name() {
        let definition = tool(|_| async { Err(anyhow!("upstream unreachable")) })
            .with_operation_label(|_| panic!("bad label"));
        let resp = HandlerInvoker::default()
            .invoke(json!(8), &definition, no_args())
            .await;
        assert!(resp.is_error);
        assert_eq!(resp.text(), "Failed to run sample. Error: upstream unreachable");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_a_failure() {
        let definition = tool(|_| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![ContentBlock::text("late")])
        });
        let resp = HandlerInvoker::new(Duration::from_secs(5))
            .invoke(json!(5), &definition, no_args())
            .await;
        assert!(resp.is_error);
        assert_eq!(
            resp.text(),
            "Failed to run sample. Error: request timed out after 5s"
        );
    }

    #[tokio::test]
    async fn test_empty_success_still_has_content() {
        let definition = tool(|_| async { Ok(Vec::new()) });
        let resp = HandlerInvoker::default()
            .invoke(json!(6), &definition, no_args())
            .await;
        assert!(!resp.is_error);
        assert_eq!(resp.content.len(), 1);
        assert_eq!(resp.text(), "sample completed with no output.");
    }
}
