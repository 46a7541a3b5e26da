//! Sequential eval runner.

use crate::dispatch::Dispatcher;
use crate::report::Aggregator;
use crate::types::{EvalRecord, RunSummary, Verdict};
use serde_json::Value;
use tokio::sync::mpsc;

/// Progress events emitted during a run, in dispatch order.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run is about to dispatch `total` evals.
    RunStarted { total: usize },
    /// An eval passed the credential gate and is about to reach its adapter.
    EvalDispatched {
        id: String,
        given: Value,
        when: Value,
        then: Value,
    },
    /// An eval produced its verdict.
    EvalCompleted { eval: EvalRecord, verdict: Verdict },
    /// Every eval has been dispatched.
    RunFinished { summary: RunSummary },
}

/// Sender for progress events.
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Run every eval, one at a time, in the given order.
pub async fn run_evals(evals: &[EvalRecord], dispatcher: &Dispatcher) -> Aggregator {
    run_evals_with_progress(evals, dispatcher, None).await
}

/// Run every eval, one at a time, reporting progress as verdicts arrive.
///
/// Each eval is awaited to completion before the next one starts; evals may
/// share state inside the system under test.
pub async fn run_evals_with_progress(
    evals: &[EvalRecord],
    dispatcher: &Dispatcher,
    progress: Option<ProgressSender>,
) -> Aggregator {
    let send = |event: ProgressEvent| {
        if let Some(tx) = &progress {
            let _ = tx.send(event);
        }
    };

    send(ProgressEvent::RunStarted { total: evals.len() });

    let mut aggregator = Aggregator::new();
    for eval in evals {
        let verdict = dispatcher.dispatch(eval, progress.as_ref()).await;
        aggregator.record(eval, &verdict);
        send(ProgressEvent::EvalCompleted {
            eval: eval.clone(),
            verdict,
        });
    }

    send(ProgressEvent::RunFinished {
        summary: aggregator.summary(),
    });
    aggregator
}
