//! GenAI semantic convention span helpers for completion calls.
//!
//! Uses OpenTelemetry GenAI semantic conventions:
//! - `gen_ai.operation.name`
//! - `gen_ai.request.model`
//! - `gen_ai.provider.name`
//!
//! plus two local fields, `codegen_eval.task_id` and
//! `codegen_eval.attempts`.

use tracing::Span;

/// Start a span covering one completion call, retries included.
///
/// The attempt count is declared empty and filled via [`record_attempts`].
pub fn start_chat_span(model: &str, provider: &str, task_id: &str) -> Span {
    tracing::info_span!(
        "gen_ai.chat",
        "gen_ai.operation.name" = "chat",
        "gen_ai.request.model" = model,
        "gen_ai.provider.name" = provider,
        "codegen_eval.task_id" = task_id,
        "codegen_eval.attempts" = tracing::field::Empty,
    )
}

/// Record how many attempts the call took.
pub fn record_attempts(span: &Span, attempts: u32) {
    span.record("codegen_eval.attempts", attempts);
}
