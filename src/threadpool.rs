use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};
use simple_error::{bail, SimpleError, SimpleResult};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A shared flag used to abort work that hasn't started yet.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The result of a submitted task. `wait` blocks until the task has run (or was skipped).
pub struct Pending<T> {
    receiver: Receiver<SimpleResult<T>>,
}

impl<T> Pending<T> {
    pub fn wait(self) -> SimpleResult<T> {
        match self.receiver.recv() {
            Ok(result) => result,
            // The job was dropped without running (the pool went away):
            Err(_) => Err(SimpleError::new("Task was dropped before it could run.")),
        }
    }
}

/// A fixed number of workers pulling jobs off of a single FIFO queue.
pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    threads: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Spawns `num_threads` workers. When `bind_threads` is set and there are enough
    /// cores, every worker is pinned to its own core.
    pub fn new(num_threads: usize, bind_threads: bool) -> SimpleResult<Self> {
        // First we checked if the number of threads is indeed positive:
        if num_threads == 0 {
            bail!("Can't create thread pool with 0 threads.");
        }

        // If there are fewer cores than threads demanded, than don't bother binding threads:
        let core_ids = if bind_threads {
            match core_affinity::get_core_ids() {
                Some(ids) if ids.len() >= num_threads => ids,
                _ => {
                    warn!("Not enough cores to bind {} threads, leaving them unbound.", num_threads);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let (sender, receiver) = channel::unbounded::<Job>();

        let mut threads = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            let receiver = receiver.clone();
            let core_id = core_ids.get(id).copied();
            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || {
                    if let Some(core_id) = core_id {
                        core_affinity::set_for_current(core_id);
                    }
                    // Ends once the pool drops the sender and the queue is empty:
                    for job in receiver.iter() {
                        job();
                    }
                })
                .map_err(|e| SimpleError::new(format!("Failed to spawn worker {}: {}", id, e)))?;
            threads.push(handle);
        }
        debug!("Started {} worker threads", num_threads);

        Ok(ThreadPool {
            sender: Some(sender),
            threads,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.threads.len()
    }

    /// Queues a task. If `cancel` is set by the time a worker picks it up, the task is
    /// skipped and resolves to an error. A panic inside the task also becomes an error
    /// for this task only.
    pub fn submit<T, F>(&self, cancel: &CancelToken, f: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> SimpleResult<T> + Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        let cancel = cancel.clone();

        let job: Job = Box::new(move || {
            let result = if cancel.is_cancelled() {
                Err(SimpleError::new("Task was cancelled."))
            } else {
                match panic::catch_unwind(AssertUnwindSafe(f)) {
                    Ok(result) => result,
                    Err(payload) => Err(SimpleError::new(format!(
                        "Task panicked: {}",
                        panic_message(&*payload)
                    ))),
                }
            };
            // Nobody might be waiting anymore, which is fine:
            let _ = tx.send(result);
        });

        if let Some(sender) = &self.sender {
            // On failure the job (and its sender) is dropped, so `wait` reports it:
            if sender.send(job).is_err() {
                warn!("Thread pool queue is closed, dropping task.");
            }
        }

        Pending { receiver: rx }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing the queue lets every worker finish what's left and exit:
        self.sender.take();
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                warn!("A worker thread panicked outside of a task.");
            }
        }
        debug!("Thread pool shut down");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn zero_threads_is_an_error() {
        assert!(ThreadPool::new(0, false).is_err());
    }

    #[test]
    fn results_come_back_per_task() {
        let pool = ThreadPool::new(4, false).unwrap();
        assert_eq!(pool.num_threads(), 4);
        let cancel = CancelToken::new();
        let pending: Vec<_> = (0..100u64).map(|i| pool.submit(&cancel, move || Ok(i * i))).collect();
        let results: Vec<u64> = pending.into_iter().map(|p| p.wait().unwrap()).collect();
        assert_eq!(results, (0..100u64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn panic_only_fails_its_task() {
        let pool = ThreadPool::new(2, false).unwrap();
        let cancel = CancelToken::new();
        let bad = pool.submit(&cancel, || -> SimpleResult<u32> { panic!("boom") });
        let good = pool.submit(&cancel, || Ok(7u32));
        let err = bad.wait().unwrap_err();
        assert!(err.as_str().contains("boom"));
        assert_eq!(good.wait().unwrap(), 7);
    }

    #[test]
    fn cancelled_tasks_do_not_run() {
        let pool = ThreadPool::new(1, false).unwrap();
        let cancel = CancelToken::new();
        let ran = Arc::new(AtomicUsize::new(0));

        // Keep the single worker busy while the rest are queued:
        let (started_tx, started_rx) = channel::bounded(1);
        let gate = pool.submit(&cancel, move || {
            let _ = started_tx.send(());
            thread::sleep(Duration::from_millis(100));
            Ok(())
        });
        started_rx.recv().unwrap();
        let pending: Vec<_> = (0..10)
            .map(|_| {
                let ran = ran.clone();
                pool.submit(&cancel, move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();
        cancel.cancel();

        gate.wait().unwrap();
        for p in pending {
            assert!(p.wait().is_err());
        }
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drop_runs_queued_work() {
        let ran = Arc::new(AtomicUsize::new(0));
        {
            let pool = ThreadPool::new(3, false).unwrap();
            let cancel = CancelToken::new();
            for _ in 0..30 {
                let ran = ran.clone();
                let _ = pool.submit(&cancel, move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                });
            }
        }
        assert_eq!(ran.load(Ordering::SeqCst), 30);
    }
}
