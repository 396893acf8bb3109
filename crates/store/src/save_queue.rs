//! Background saves, run one at a time in dispatch order.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Each queued save waits until every earlier one has finished. Progress is a
/// watch of the highest finished ticket, so any number of waiters can follow
/// it without taking anything out of the queue.
pub(crate) struct SaveQueue {
    issued: Mutex<u64>,
    finished: Arc<watch::Sender<u64>>,
}

impl SaveQueue {
    pub(crate) fn new() -> Self {
        let (finished, _) = watch::channel(0);
        Self {
            issued: Mutex::new(0),
            finished: Arc::new(finished),
        }
    }

    /// Queues `save` on the current runtime. Returns `false`, dropping the
    /// save, when called outside a runtime.
    pub(crate) fn push(&self, save: impl Future<Output = ()> + Send + 'static) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            return false;
        };
        let mut issued = self.issued.lock();
        *issued += 1;
        let ticket = Ticket {
            seq: *issued,
            finished: Arc::clone(&self.finished),
        };
        let mut turn = self.finished.subscribe();
        runtime.spawn(async move {
            let _ = turn.wait_for(|done| *done + 1 >= ticket.seq).await;
            save.await;
            drop(ticket);
        });
        true
    }

    /// Waits for every save queued before this call.
    pub(crate) async fn flush(&self) {
        let target = *self.issued.lock();
        let mut finished = self.finished.subscribe();
        let _ = finished.wait_for(|done| *done >= target).await;
    }
}

/// Marks its save finished when dropped, including when the task panics or
/// the runtime shuts down, so later saves never stall behind it.
struct Ticket {
    seq: u64,
    finished: Arc<watch::Sender<u64>>,
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let seq = self.seq;
        self.finished.send_modify(|done| *done = (*done).max(seq));
    }
}
