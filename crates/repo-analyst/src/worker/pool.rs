use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::error::WorkerError;
use crate::job::JobId;
use crate::pipeline::AnalysisPipeline;

use super::queue::QueueHandle;

const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// Fixed set of OS threads, each running one job at a time.
pub struct WorkerPool {
    job_sender: Sender<JobId>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(pipeline: Arc<AnalysisPipeline>, worker_count: usize) -> Result<Self, WorkerError> {
        if worker_count == 0 {
            return Err(WorkerError::SpawnFailed(
                "worker_count must be > 0".to_string(),
            ));
        }

        let (job_sender, job_receiver) = unbounded::<JobId>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_pipeline = Arc::clone(&pipeline);

            let handle = thread::Builder::new()
                .name(format!("analyst-worker-{}", worker_id))
                .spawn(move || run_worker(worker_id, job_rx, shutdown_flag, worker_pipeline))
                .map_err(|e| {
                    shutdown.store(true, Ordering::Relaxed);
                    WorkerError::SpawnFailed(e.to_string())
                })?;

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Ok(Self {
            job_sender,
            workers,
            shutdown,
        })
    }

    pub fn queue(&self) -> QueueHandle {
        QueueHandle::new(self.job_sender.clone(), Arc::clone(&self.shutdown))
    }

    /// Stops accepting work. Workers exit after their current job; queued
    /// jobs stay PENDING for the next start's recovery.
    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Joins every worker and returns how many of them panicked.
    ///
    /// Blocks until [`shutdown`](Self::shutdown) is called or every
    /// [`QueueHandle`] has been dropped and the queue is drained.
    pub fn wait(self) -> usize {
        drop(self.job_sender);

        let mut panicked = 0;
        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {}", i, panic_message(e.as_ref()));
                panicked += 1;
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
        panicked
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<JobId>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<AnalysisPipeline>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(RECV_TIMEOUT) {
            Ok(id) => {
                debug!("Worker {} processing job {}", worker_id, id);

                let result = panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(&id)));

                match result {
                    Ok(outcome) => debug!("Worker {} finished job {}: {:?}", worker_id, id, outcome),
                    Err(payload) => {
                        let reason = format!("worker panicked: {}", panic_message(payload.as_ref()));
                        error!("Worker {} lost job {}: {}", worker_id, id, reason);
                        if let Err(e) = pipeline.fail_interrupted(&id, &reason) {
                            error!("Failed to mark job {} as failed: {}", id, e);
                        }
                    }
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
