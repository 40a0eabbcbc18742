//! A bounded pool of worker threads for the blocking phase of loads.
//!
//! The pool runs at most `capacity` jobs at once; further submissions queue
//! up in the job channel until a worker frees. The default capacity of one
//! preserves the at-most-one-concurrent-blocking-phase behavior the cache
//! was designed around.

use crossbeam_channel::{self as channel, Receiver, Sender, TryRecvError};
use std::thread;

use crate::error::Error;

type Job = Box<dyn FnOnce() + Send>;

/// An error returned when an end of a channel was disconnected.
#[derive(Debug)]
pub(crate) struct Disconnected;

pub(crate) struct AsyncExecutor {
    sender: Option<Sender<Job>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl AsyncExecutor {
    /// Starts a pool of `capacity` worker threads (at least one).
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = channel::unbounded::<Job>();

        let workers = (0..capacity.max(1))
            .map(|i| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("asset-worker-{i}"))
                    .spawn(move || worker_thread(&receiver))
                    .unwrap()
            })
            .collect();

        Self {
            sender: Some(sender),
            workers,
        }
    }

    /// Submits a job, returning a handle to poll for its result.
    pub fn submit<T, F>(&self, job: F) -> Result<AsyncResult<T>, Error>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_tx, result_rx) = channel::bounded(1);
        let job: Job = Box::new(move || {
            // the receiver may be gone if the task was dropped mid-flight
            let _ = result_tx.send(job());
        });

        let sender = self.sender.as_ref().ok_or(Error::WorkerShutdown)?;
        sender.send(job).map_err(|_| Error::WorkerShutdown)?;
        Ok(AsyncResult { receiver: result_rx })
    }
}

impl Drop for AsyncExecutor {
    fn drop(&mut self) {
        // closing the job channel stops the workers once drained
        self.sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("an asset worker thread panicked");
            }
        }
    }
}

fn worker_thread(jobs: &Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        job();
    }
}

/// A handle on the result of a job submitted to the pool.
pub(crate) struct AsyncResult<T> {
    receiver: Receiver<T>,
}

impl<T> AsyncResult<T> {
    /// Takes the result if the job has finished.
    ///
    /// Returns `Err(Disconnected)` if the result can no longer arrive, which
    /// means the job panicked on its worker thread.
    pub fn try_take(&self) -> Result<Option<T>, Disconnected> {
        match self.receiver.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn take_blocking<T>(result: &AsyncResult<T>) -> T {
        loop {
            if let Some(value) = result.try_take().unwrap() {
                return value;
            }
            thread::yield_now();
        }
    }

    #[test]
    fn submit_returns_result() {
        let executor = AsyncExecutor::new(1);
        let result = executor.submit(|| 6 * 7).unwrap();
        assert_eq!(take_blocking(&result), 42);
    }

    #[test]
    fn jobs_queue_on_a_single_worker() {
        let executor = AsyncExecutor::new(1);
        let first = executor
            .submit(|| {
                thread::sleep(Duration::from_millis(10));
                1
            })
            .unwrap();
        let second = executor.submit(|| 2).unwrap();

        // a single worker runs jobs in submission order
        assert_eq!(take_blocking(&second), 2);
        assert_eq!(first.try_take().unwrap(), Some(1));
    }

    #[test]
    fn panicked_job_reports_disconnected() {
        let executor = AsyncExecutor::new(1);
        let result: AsyncResult<i32> = executor.submit(|| panic!("boom")).unwrap();
        loop {
            match result.try_take() {
                Ok(None) => thread::yield_now(),
                Ok(Some(_)) => panic!("job should not produce a value"),
                Err(Disconnected) => break,
            }
        }
        // the pool replaces nothing: respawning is not supported, but the
        // drop path must still join the dead worker without hanging
    }

    #[test]
    fn shutdown_joins_workers() {
        let executor = AsyncExecutor::new(2);
        let result = executor.submit(|| "done").unwrap();
        assert_eq!(take_blocking(&result), "done");
        drop(executor);
    }
}
