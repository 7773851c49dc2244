//! Bounded task pool
//!
//! A fixed set of workers draining a FIFO queue of boxed tasks. Running tasks
//! may enqueue further tasks, so an empty queue is not proof of quiescence:
//! termination is detected with a pending counter incremented on enqueue and
//! decremented only after a task finishes. [`TaskPool::run`] returns once the
//! counter reaches zero, at which point the queue is necessarily empty and no
//! worker can produce new work.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinSet;

pub type Task = Pin<Box<dyn Future<Output = ()> + Send>>;

enum Message {
    Run(Task),
    Shutdown,
}

/// Handle for enqueueing tasks; cheap to clone into running tasks
#[derive(Clone)]
pub struct TaskHandle {
    sender: UnboundedSender<Message>,
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
}

impl TaskHandle {
    /// Enqueues a task without blocking; safe to call from inside a task
    pub fn add(&self, task: Task) {
        self.pending.fetch_add(1, Ordering::AcqRel);

        if self.sender.send(Message::Run(task)).is_err() {
            // the pool has shut down; keep the counter balanced
            self.pending.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

pub struct TaskPool {
    workers: usize,
    receiver: Arc<Mutex<UnboundedReceiver<Message>>>,
    handle: TaskHandle,
}

impl TaskPool {
    pub fn new(workers: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            workers,
            receiver: Arc::new(Mutex::new(receiver)),
            handle: TaskHandle {
                sender,
                pending: Arc::new(AtomicUsize::new(0)),
                idle: Arc::new(Notify::new()),
            },
        }
    }

    pub fn handle(&self) -> TaskHandle {
        self.handle.clone()
    }

    /// Runs queued tasks until every worker is idle and the queue is empty
    pub async fn run(&self) {
        let mut workers = JoinSet::new();

        for _ in 0..self.workers {
            let receiver = self.receiver.clone();
            let pending = self.handle.pending.clone();
            let idle = self.handle.idle.clone();

            workers.spawn(async move {
                loop {
                    // hold the receiver lock only while waiting for a message
                    let message = { receiver.lock().await.recv().await };

                    match message {
                        Some(Message::Run(task)) => {
                            task.await;

                            if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                                idle.notify_waiters();
                            }
                        }
                        Some(Message::Shutdown) | None => break,
                    }
                }
            });
        }

        loop {
            let notified = self.handle.idle.notified();

            if self.handle.pending.load(Ordering::Acquire) == 0 {
                break;
            }

            notified.await;
        }

        tracing::debug!("task pool drained, stopping workers");

        for _ in 0..self.workers {
            let _ = self.handle.sender.send(Message::Shutdown);
        }

        while workers.join_next().await.is_some() {}
    }
}
