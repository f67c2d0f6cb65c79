use crate::error::{Result, UrlPadError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle for submitting jobs to a [`WorkerPool`]
#[derive(Clone)]
pub struct Spawner {
    name: Arc<str>,
    tx: Sender<Job>,
}

impl Spawner {
    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .map_err(|_| UrlPadError::Other(format!("worker pool '{}' is shut down", self.name)))
    }
}

/// Fixed number of threads draining one shared job queue
///
/// The queue closes once the pool and every [`Spawner`] are dropped; workers
/// finish the queued jobs and exit.
pub struct WorkerPool {
    spawner: Option<Spawner>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(name: &str, size: usize) -> Result<Self> {
        let (tx, rx) = channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let size = size.max(1);

        let handles = (0..size)
            .map(|i| {
                let rx = Arc::clone(&rx);
                thread::Builder::new()
                    .name(format!("{}-{}", name, i))
                    .spawn(move || worker_loop(rx))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        log::debug!("Started worker pool '{}' with {} threads", name, size);
        Ok(Self {
            spawner: Some(Spawner {
                name: Arc::from(name),
                tx,
            }),
            handles,
        })
    }

    pub fn spawner(&self) -> Option<Spawner> {
        self.spawner.clone()
    }

    pub fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.spawner {
            Some(spawner) => spawner.spawn(job),
            None => Err(UrlPadError::Other("worker pool is shut down".to_string())),
        }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Close this pool's handle on the queue and wait for the workers
    ///
    /// Workers keep running while outside [`Spawner`]s are alive.
    pub fn shutdown(&mut self) {
        self.spawner.take();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("Worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(rx: Arc<Mutex<Receiver<Job>>>) {
    loop {
        // Critical section: take the next job, run it outside the lock
        let job = {
            let Ok(lock) = rx.lock() else {
                log::error!("Job queue lock poisoned, worker exiting");
                return;
            };
            match lock.recv() {
                Ok(job) => job,
                Err(_) => return, // Queue closed and drained
            }
        };
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            log::error!("Job panicked on {:?}", thread::current().name());
        }
    }
}
