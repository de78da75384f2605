//! Reader-writer execution queue
//!
//! Serialization discipline for a store backed by one shared resource:
//! - read jobs may run concurrently with other reads
//! - write jobs run alone, excluding all reads and writes
//! - jobs start in submission order: a write waits for earlier reads to
//!   drain, and nothing submitted after a write starts before it finishes
//!
//! A dedicated dispatcher thread consumes submissions in FIFO order.
//! Reads are handed to worker threads while a counting gate tracks how
//! many are in flight; writes run inline on the dispatcher once the gate
//! drains, which makes them mutually exclusive and ordered for free.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Task {
    Read(Job),
    Write(Job),
}

/// Counting gate over in-flight reads.
#[derive(Default)]
struct ReadGate {
    active: Mutex<usize>,
    drained: Condvar,
}

impl ReadGate {
    fn begin_read(&self) {
        *self.lock() += 1;
    }

    fn end_read(&self) {
        let mut active = self.lock();
        *active -= 1;
        if *active == 0 {
            self.drained.notify_all();
        }
    }

    fn wait_for_drain(&self) {
        let mut active = self.lock();
        while *active > 0 {
            active = self
                .drained
                .wait(active)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, usize> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its read slot even if the job unwinds.
struct ReadPermit {
    gate: Arc<ReadGate>,
}

impl Drop for ReadPermit {
    fn drop(&mut self) {
        self.gate.end_read();
    }
}

/// Execution queue with concurrent reads and exclusive, ordered writes.
///
/// Dropping the queue stops accepting work, drains everything already
/// submitted, and joins the dispatcher.
pub(crate) struct ReadWriteQueue {
    tx: Option<Sender<Task>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl ReadWriteQueue {
    /// Spawn the dispatcher thread under the given name.
    pub fn new(name: &str) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        let dispatcher = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || dispatch(rx))?;

        Ok(Self {
            tx: Some(tx),
            dispatcher: Some(dispatcher),
        })
    }

    /// Submit a job that may overlap with other reads.
    pub fn read(&self, job: impl FnOnce() + Send + 'static) {
        self.submit(Task::Read(Box::new(job)));
    }

    /// Submit a job that runs alone.
    pub fn write(&self, job: impl FnOnce() + Send + 'static) {
        self.submit(Task::Write(Box::new(job)));
    }

    fn submit(&self, task: Task) {
        if let Some(tx) = &self.tx {
            // The dispatcher outlives the sender; a send can only fail if
            // the dispatcher died mid-job, in which case the job is lost
            // along with its completion.
            let _ = tx.send(task);
        }
    }
}

impl Drop for ReadWriteQueue {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(dispatcher) = self.dispatcher.take() {
            let _ = dispatcher.join();
        }
    }
}

fn dispatch(rx: Receiver<Task>) {
    let gate = Arc::new(ReadGate::default());

    while let Ok(task) = rx.recv() {
        match task {
            Task::Read(job) => {
                gate.begin_read();
                let permit = ReadPermit {
                    gate: Arc::clone(&gate),
                };
                thread::spawn(move || {
                    let _permit = permit;
                    job();
                });
            }
            Task::Write(job) => {
                gate.wait_for_drain();
                job();
            }
        }
    }

    // Sender gone: wait for in-flight reads before the queue disappears.
    gate.wait_for_drain();
}
