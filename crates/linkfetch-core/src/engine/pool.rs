//! Bounded worker pool over a shared queue of fetch tasks.
//!
//! Workers pop from the queue until it is empty or the batch is aborted and
//! send `(index, outcome)` back over a channel. The receiving side ends when
//! every worker has dropped its sender, so a lost worker can never hang it;
//! indexes that never reported are turned into SYSTEM_ERROR events.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::control::BatchControl;
use crate::event::LogEvent;
use crate::outcome::{BatchResult, FetchOutcome};
use crate::task::{FetchTask, TaskContext};

type WorkQueue = Mutex<VecDeque<(usize, FetchTask)>>;

pub(super) fn run_pool(
    tasks: Vec<FetchTask>,
    ctx: Arc<TaskContext>,
    max_workers: usize,
    control: &BatchControl,
) -> BatchResult {
    let mut result = BatchResult::new();
    let count = tasks.len();
    if count == 0 {
        return result;
    }

    let links: Vec<String> = tasks.iter().map(|t| t.link().to_string()).collect();
    let work: Arc<WorkQueue> = Arc::new(Mutex::new(tasks.into_iter().enumerate().collect()));
    let (tx, rx) = mpsc::channel::<(usize, FetchOutcome)>();
    let num_workers = max_workers.max(1).min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let ctx = Arc::clone(&ctx);
        let control = control.clone();
        let spawned = thread::Builder::new()
            .name(format!("linkfetch-worker-{}", i))
            .spawn(move || worker_loop(&work, &tx, &ctx, &control));
        match spawned {
            Ok(h) => handles.push(h),
            Err(e) => tracing::error!("could not spawn worker {}: {}", i, e),
        }
    }
    drop(tx);
    tracing::debug!(links = count, workers = handles.len(), "pool started");

    let mut reported = vec![false; count];
    for (index, outcome) in rx {
        reported[index] = true;
        result.merge(outcome);
    }
    for h in handles {
        if let Err(payload) = h.join() {
            tracing::error!("worker panicked: {}", panic_message(payload.as_ref()));
        }
    }

    let missing: Vec<usize> = (0..count).filter(|&i| !reported[i]).collect();
    if missing.is_empty() {
        return result;
    }
    if control.is_aborted() {
        tracing::warn!(skipped = missing.len(), "batch aborted");
        result.push(LogEvent::system_error(format!(
            "Download aborted: {} link(s) not started",
            missing.len()
        )));
    } else {
        for i in missing {
            result.merge(FetchOutcome::system_error(format!(
                "{}: no worker was available to fetch this link",
                links[i]
            )));
        }
    }
    result
}

fn worker_loop(
    work: &WorkQueue,
    tx: &mpsc::Sender<(usize, FetchOutcome)>,
    ctx: &TaskContext,
    control: &BatchControl,
) {
    loop {
        if control.is_aborted() {
            break;
        }
        let next = work
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some((index, task)) = next else {
            break;
        };
        let outcome = run_guarded(&task, ctx);
        if tx.send((index, outcome)).is_err() {
            break;
        }
    }
}

/// A panicking task must not take its worker or the batch down with it.
fn run_guarded(task: &FetchTask, ctx: &TaskContext) -> FetchOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| task.run(ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(link = task.link(), "task panicked: {}", msg);
            FetchOutcome::system_error(format!("{}: task panicked: {}", task.link(), msg))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::fetch::{ByteStream, FetchError, Fetcher};
    use crate::manifest::LinkGroup;
    use crate::throttle::Throttle;
    use std::io::Cursor;

    fn tasks(n: usize) -> Vec<FetchTask> {
        (0..n)
            .map(|i| FetchTask::new(LinkGroup::new(format!("mem://{}", i), format!("f{}", i))))
            .collect()
    }

    fn ctx(dir: &std::path::Path, fetcher: Arc<dyn Fetcher>) -> Arc<TaskContext> {
        Arc::new(TaskContext::new(dir, fetcher, Throttle::unlimited()))
    }

    #[test]
    fn empty_pool_returns_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(|_: &str| -> Result<ByteStream, FetchError> {
            Ok(Box::new(Cursor::new(Vec::new())))
        });
        let result = run_pool(Vec::new(), ctx(dir.path(), fetcher), 4, &BatchControl::new());
        assert!(result.events().is_empty());
        assert_eq!(result.total_bytes(), 0);
    }

    #[test]
    fn every_task_reports_once() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(|_: &str| -> Result<ByteStream, FetchError> {
            Ok(Box::new(Cursor::new(vec![7u8; 10])))
        });
        let result = run_pool(tasks(9), ctx(dir.path(), fetcher), 3, &BatchControl::new());
        assert_eq!(result.count(EventKind::Success), 9);
        assert_eq!(result.total_bytes(), 90);
    }

    #[test]
    fn panic_becomes_system_error_for_that_link_only() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(|link: &str| -> Result<ByteStream, FetchError> {
            if link == "mem://1" {
                panic!("boom");
            }
            Ok(Box::new(Cursor::new(b"ok".to_vec())))
        });
        let result = run_pool(tasks(3), ctx(dir.path(), fetcher), 1, &BatchControl::new());
        assert_eq!(result.count(EventKind::Success), 2);
        assert_eq!(result.count(EventKind::SystemError), 1);
        let err = result
            .events()
            .iter()
            .find(|e| e.kind() == EventKind::SystemError)
            .unwrap();
        assert_eq!(err.message(), "mem://1: task panicked: boom");
    }

    #[test]
    fn abort_before_start_reports_unstarted_links() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher: Arc<dyn Fetcher> = Arc::new(|_: &str| -> Result<ByteStream, FetchError> {
            Ok(Box::new(Cursor::new(b"x".to_vec())))
        });
        let control = BatchControl::new();
        control.request_abort();
        let result = run_pool(tasks(4), ctx(dir.path(), fetcher), 2, &control);
        assert_eq!(result.events().len(), 1);
        assert_eq!(
            result.events()[0].message(),
            "Download aborted: 4 link(s) not started"
        );
        assert_eq!(result.total_bytes(), 0);
    }

    #[test]
    fn panic_message_handles_string_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "static");
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }
}
