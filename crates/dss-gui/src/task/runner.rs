//! Background task runner and UI-thread event bridge.
//!
//! Each launched task gets its own worker thread and its own channel; the
//! [`Task`] handle owns the receiving end. The worker only ever produces
//! immutable event values - zero or more `Progress` updates followed by
//! exactly one terminal `Completed` or `Failed` - and never touches
//! view-model or widget state.
//!
//! There is no cancellation signal. Abandoning a task means dropping its
//! handle: the channel closes, the stale worker's sends fail, and the
//! worker ignores those failures. A superseded task therefore cannot
//! cross-deliver events into newer state.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use dss_loader::{LoadError, Progress, ProgressSink};

/// Kind of background work, used for thread naming and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Loading the IOD entry list.
    ListLoad,
    /// Loading one IOD's specification tree.
    TreeLoad,
}

impl TaskKind {
    /// Short label for logs and thread names.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ListLoad => "list-load",
            Self::TreeLoad => "tree-load",
        }
    }
}

/// Event emitted by a background task.
#[derive(Debug)]
pub enum TaskEvent<T> {
    /// Intermediate progress update.
    Progress(Progress),
    /// Terminal: the task finished with a result.
    Completed(T),
    /// Terminal: the task failed; carries the user-facing message.
    Failed(String),
}

/// Handle to one in-flight background task.
///
/// Dropping the handle abandons the task.
#[derive(Debug)]
pub struct Task<T> {
    kind: TaskKind,
    receiver: Receiver<TaskEvent<T>>,
}

impl<T: Send + 'static> Task<T> {
    /// Run `job` on a fresh worker thread.
    ///
    /// The job receives a [`ProgressSink`] that forwards updates into the
    /// task channel. Its result becomes the terminal event; errors are
    /// logged in full here and delivered as their user-facing message.
    pub fn spawn<F>(kind: TaskKind, job: F) -> Self
    where
        F: FnOnce(&dyn ProgressSink) -> Result<T, LoadError> + Send + 'static,
    {
        let (sender, receiver) = channel();
        let worker_sender = sender.clone();

        let spawned = thread::Builder::new()
            .name(format!("dss-{}", kind.label()))
            .spawn(move || {
                let sink = ChannelSink {
                    sender: worker_sender.clone(),
                };
                let event = match job(&sink) {
                    Ok(value) => TaskEvent::Completed(value),
                    Err(err) => {
                        tracing::error!(task = kind.label(), %err, "background task failed");
                        TaskEvent::Failed(err.user_message().to_string())
                    }
                };
                // The receiver may be gone if the task was superseded.
                let _ = worker_sender.send(event);
            });

        if let Err(err) = spawned {
            tracing::error!(task = kind.label(), %err, "failed to spawn worker thread");
            let _ = sender.send(TaskEvent::Failed(
                "Could not start the background task.".to_string(),
            ));
        }

        Self { kind, receiver }
    }

    /// Kind of this task.
    #[must_use]
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Drain all events queued since the last poll, in send order.
    ///
    /// Called from the UI thread only; never blocks.
    pub fn drain(&self) -> Vec<TaskEvent<T>> {
        self.receiver.try_iter().collect()
    }
}

/// Forwards progress updates from the worker into the task channel.
struct ChannelSink<T> {
    sender: Sender<TaskEvent<T>>,
}

impl<T: Send> ProgressSink for ChannelSink<T> {
    fn report(&self, progress: Progress) {
        let _ = self.sender.send(TaskEvent::Progress(progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dss_loader::ProgressStage;
    use std::time::{Duration, Instant};

    fn drain_until_terminal<T: Send + 'static>(task: &Task<T>) -> Vec<TaskEvent<T>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            events.extend(task.drain());
            if events
                .iter()
                .any(|e| matches!(e, TaskEvent::Completed(_) | TaskEvent::Failed(_)))
            {
                return events;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("task did not reach a terminal event");
    }

    #[test]
    fn test_progress_then_completed_in_order() {
        let task = Task::spawn(TaskKind::ListLoad, |progress| {
            progress.report(Progress::new(ProgressStage::Download, 50));
            progress.report(Progress::new(ProgressStage::Download, 100));
            Ok(42)
        });

        let events = drain_until_terminal(&task);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], TaskEvent::Progress(p) if p.percent == 50));
        assert!(matches!(events[1], TaskEvent::Progress(p) if p.percent == 100));
        assert!(matches!(events[2], TaskEvent::Completed(42)));
    }

    #[test]
    fn test_failure_carries_user_message() {
        let task: Task<()> = Task::spawn(TaskKind::TreeLoad, |_| {
            Err(LoadError::Fetch("boom".to_string()))
        });

        let events = drain_until_terminal(&task);
        match events.last().unwrap() {
            TaskEvent::Failed(message) => {
                assert!(message.contains("Could not retrieve"));
                assert!(!message.contains("boom"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_abandoned_task_does_not_panic_the_worker() {
        let (started_tx, started_rx) = channel();
        let task = Task::spawn(TaskKind::TreeLoad, move |progress| {
            started_tx.send(()).unwrap();
            // Give the main thread time to drop the handle.
            thread::sleep(Duration::from_millis(50));
            progress.report(Progress::unknown(ProgressStage::ParseModules));
            Ok(1)
        });
        started_rx.recv().unwrap();
        drop(task);
        // The worker's sends now fail silently; nothing to assert beyond
        // not panicking, so give it time to finish.
        thread::sleep(Duration::from_millis(100));
    }
}
