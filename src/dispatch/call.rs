//! A single completion call: retried request, then code extraction.

use crate::error::Result;
use crate::llm::{CompletionRequest, CompletionService, extract_code};
use crate::model::{CompletionResult, WorkItem};
use crate::retry::RetryPolicy;
use crate::telemetry::genai::{record_attempts, start_chat_span};
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use tracing::{Instrument, debug};

/// Complete one work item.
///
/// The request is retried under `retry`; on success the first Python fenced
/// block of the response (or the whole response) becomes the completion.
/// Fails with [`crate::error::Error::Call`] once the attempt budget is spent.
pub async fn complete_item<S: CompletionService>(
    service: &S,
    retry: &RetryPolicy,
    model: &str,
    item: WorkItem,
) -> Result<CompletionResult> {
    let span = start_chat_span(model, service.provider(), &item.id);
    let request = CompletionRequest::new(model, item.prompt);
    let attempts_counter = metrics::completion_attempts();

    let mut attempts = 0;
    let outcome = retry
        .retry(&item.id, |attempt| {
            attempts = attempt;
            let request = &request;
            let counter = &attempts_counter;
            async move {
                let response = service.complete(request).await;
                let result = if response.is_ok() { "ok" } else { "error" };
                counter.add(
                    1,
                    &[
                        KeyValue::new("model", request.model.clone()),
                        KeyValue::new("result", result),
                    ],
                );
                response
            }
        })
        .instrument(span.clone())
        .await;
    record_attempts(&span, attempts);

    let response = outcome?;
    let completion = extract_code(&response).to_string();
    span.in_scope(|| debug!(attempts, bytes = completion.len(), "completion extracted"));

    Ok(CompletionResult {
        id: item.id,
        completion,
    })
}
