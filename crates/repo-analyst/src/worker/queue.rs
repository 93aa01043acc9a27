use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::error::WorkerError;
use crate::job::JobId;

/// Fire-and-forget handoff of a job id to the workers.
pub trait JobQueue: Send + Sync {
    fn enqueue(&self, id: JobId) -> Result<(), WorkerError>;
}

/// Cloneable producer side of a [`WorkerPool`](super::WorkerPool) queue.
///
/// The queue is unbounded, so `enqueue` never waits on running jobs.
#[derive(Clone)]
pub struct QueueHandle {
    sender: Sender<JobId>,
    shutdown: Arc<AtomicBool>,
}

impl QueueHandle {
    pub(crate) fn new(sender: Sender<JobId>, shutdown: Arc<AtomicBool>) -> Self {
        Self { sender, shutdown }
    }
}

impl JobQueue for QueueHandle {
    fn enqueue(&self, id: JobId) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        self.sender
            .send(id)
            .map_err(|_| WorkerError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_shutdown() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let handle = QueueHandle::new(tx, Arc::clone(&shutdown));

        handle.enqueue(JobId::from("a")).unwrap();
        handle.clone().enqueue(JobId::from("b")).unwrap();
        assert_eq!(rx.len(), 2);
        assert_eq!(rx.recv().unwrap(), JobId::from("a"));

        shutdown.store(true, Ordering::Relaxed);
        assert!(matches!(
            handle.enqueue(JobId::from("c")),
            Err(WorkerError::ChannelClosed)
        ));
    }

    #[test]
    fn test_enqueue_after_receiver_dropped() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let handle = QueueHandle::new(tx, Arc::new(AtomicBool::new(false)));
        assert!(handle.enqueue(JobId::from("a")).is_err());
    }
}
