//! Single execution context for completion callbacks
//!
//! Network and login calls run on the async runtime, but their completions
//! are always delivered through a [`CompletionContext`]: one FIFO queue whose
//! jobs run strictly one at a time, in submission order. Collaborators that
//! only ever touch their state from completions need no locking of their own.

use log::{debug, warn};
use tokio::sync::mpsc;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle for posting completions. Cheap to clone.
#[derive(Clone)]
pub struct CompletionContext {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving end of a [`CompletionContext`], driven by the caller
pub struct CompletionQueue {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl CompletionContext {
    /// Create a context whose queue the caller drives (e.g. from a UI loop)
    pub fn channel() -> (Self, CompletionQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, CompletionQueue { rx })
    }

    /// Create a context backed by one dedicated thread.
    ///
    /// The thread exits once every handle has been dropped and the queue
    /// is drained.
    pub fn spawn() -> std::io::Result<Self> {
        let (context, mut queue) = Self::channel();
        std::thread::Builder::new()
            .name("photoop-completions".to_string())
            .spawn(move || {
                while let Some(job) = queue.rx.blocking_recv() {
                    job();
                }
                debug!("Completion thread finished");
            })?;
        Ok(context)
    }

    /// Queue a job. Returns false if the queue is gone.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let delivered = self.tx.send(Box::new(job)).is_ok();
        if !delivered {
            warn!("Completion dropped: the completion queue is closed");
        }
        delivered
    }

    /// Deliver `value` to `completion` on this context
    pub fn deliver<T, F>(&self, value: T, completion: F) -> bool
    where
        T: Send + 'static,
        F: FnOnce(T) + Send + 'static,
    {
        self.post(move || completion(value))
    }
}

impl CompletionQueue {
    /// Run jobs until every [`CompletionContext`] handle is dropped
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
    }

    /// Wait for the next job and run it. Returns false once closed.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(job) => {
                job();
                true
            }
            None => false,
        }
    }

    /// Run every job already queued without waiting. Returns the count.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }
}
