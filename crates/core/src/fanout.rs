//! Fan-out/fan-in over independent fallible tasks.
//!
//! Every task runs to completion; a failure or panic in one task is captured
//! as its outcome and never affects its siblings.

use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;

/// Result of one task.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Failed(String),
}

/// Outcome of a labelled task, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled<T> {
    pub label: &'static str,
    pub outcome: Outcome<T>,
}

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Await every task concurrently and collect one outcome per task.
pub async fn settle_all<T, E, F>(tasks: Vec<(&'static str, F)>) -> Vec<Settled<T>>
where
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    let guarded = tasks.into_iter().map(|(label, task)| async move {
        let outcome = match AssertUnwindSafe(task).catch_unwind().await {
            Ok(Ok(value)) => Outcome::Completed(value),
            Ok(Err(e)) => Outcome::Failed(e.to_string()),
            Err(payload) => Outcome::Failed(panic_reason(payload)),
        };
        Settled { label, outcome }
    });

    join_all(guarded).await
}
