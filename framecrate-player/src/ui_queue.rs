//! Bounded hand-off queue from background threads to the UI thread
//!
//! Tasks are plain closures over the UI context `C`, carried over a bounded
//! `flume` channel. The queue keeps FIFO order; when it is full the oldest
//! pending task is dropped so the newest frame always gets through.

use flume::{Receiver, RecvTimeoutError, Sender, TrySendError};
use log::{trace, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A unit of work to run on the UI thread
pub type UiTask<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Create a queue holding at most `capacity` pending tasks (at least one)
pub fn ui_queue<C>(capacity: usize) -> (UiSender<C>, UiReceiver<C>) {
    let capacity = capacity.max(1);
    let (sender, receiver) = flume::bounded(capacity);
    let evicted = Arc::new(AtomicU64::new(0));
    (
        UiSender {
            sender,
            evictor: receiver.clone(),
            evicted: Arc::clone(&evicted),
            capacity,
        },
        UiReceiver { receiver, evicted },
    )
}

/// Posting side, cloneable across threads
pub struct UiSender<C> {
    sender: Sender<UiTask<C>>,
    // pops the oldest task when the channel is full
    evictor: Receiver<UiTask<C>>,
    evicted: Arc<AtomicU64>,
    capacity: usize,
}

impl<C> UiSender<C> {
    /// Enqueue a task. Never blocks; evicts the oldest task when full.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        let mut task: UiTask<C> = Box::new(task);
        loop {
            match self.sender.try_send(task) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if self.evictor.try_recv().is_ok() {
                        self.evicted.fetch_add(1, Ordering::Relaxed);
                        warn!("UI queue full ({}), dropped oldest pending update", self.capacity);
                    }
                    task = rejected;
                }
                // the evictor keeps a receiver alive, so this cannot happen
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<C> Clone for UiSender<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            evictor: self.evictor.clone(),
            evicted: Arc::clone(&self.evicted),
            capacity: self.capacity,
        }
    }
}

/// Consuming side, owned by the UI thread
pub struct UiReceiver<C> {
    receiver: Receiver<UiTask<C>>,
    evicted: Arc<AtomicU64>,
}

impl<C> UiReceiver<C> {
    /// Run every pending task in order. Returns how many ran.
    pub fn drain(&self, context: &mut C) -> usize {
        let mut count = 0;
        for task in self.receiver.try_iter() {
            task(context);
            count += 1;
        }
        if count > 0 {
            trace!("Ran {} UI task(s)", count);
        }
        count
    }

    /// Wait up to `timeout` for work, then drain.
    pub fn recv_timeout(&self, context: &mut C, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => {
                task(context);
                1 + self.drain(context)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    /// Run tasks until every sender is gone and the queue is empty
    pub fn run(&self, context: &mut C) -> usize {
        let mut total = 0;
        while let Ok(task) = self.receiver.recv() {
            task(context);
            total += 1;
        }
        total
    }

    /// Drop every pending task without running it
    pub fn discard(&self) -> usize {
        self.receiver.try_iter().count()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Tasks dropped because the queue was full
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    pub fn is_disconnected(&self) -> bool {
        self.receiver.is_disconnected()
    }
}
