use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace, warn};

/// What the reader thread hands to the consumer.
#[derive(Debug)]
pub enum PumpEvent {
    /// Raw bytes exactly as read, in arrival order.
    Chunk(Vec<u8>),
    /// The stream reached EOF.
    Closed,
    /// A read failed with something other than a timeout.
    Failed(std::io::Error),
}

/// Dedicated reader thread feeding chunks through a bounded channel.
///
/// Read timeouts are idle ticks that let the thread notice [`stop`]. When the
/// channel is full the thread blocks, so a slow consumer slows the reads
/// instead of growing memory.
///
/// [`stop`]: ChunkPump::stop
pub struct ChunkPump {
    rx: Receiver<PumpEvent>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ChunkPump {
    /// Move `source` into a new reader thread.
    pub fn spawn<R>(source: R, chunk_size: usize, capacity: usize) -> std::io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("loadlink-reader".into())
            .spawn(move || read_loop(source, chunk_size.max(1), tx, flag))?;

        Ok(Self {
            rx,
            running,
            handle: Some(handle),
        })
    }

    /// Wait for the next event; `None` once the thread has exited and the
    /// channel is drained.
    pub fn recv(&self) -> Option<PumpEvent> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<PumpEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_recv(&self) -> Result<PumpEvent, TryRecvError> {
        self.rx.try_recv()
    }

    /// Ask the reader thread to exit after its current read.
    ///
    /// Buffered events are discarded. A thread blocked on a read without
    /// timeout exits once that read returns.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        while self.rx.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ChunkPump {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

fn read_loop<R: Read>(
    mut source: R,
    chunk_size: usize,
    tx: SyncSender<PumpEvent>,
    running: Arc<AtomicBool>,
) {
    let mut buf = vec![0u8; chunk_size];
    while running.load(Ordering::SeqCst) {
        let event = match source.read(&mut buf) {
            Ok(0) => PumpEvent::Closed,
            Ok(n) => {
                trace!(bytes = n, "chunk read");
                PumpEvent::Chunk(buf[..n].to_vec())
            }
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
                ) =>
            {
                continue;
            }
            Err(err) => {
                warn!(error = %err, "read failed");
                PumpEvent::Failed(err)
            }
        };

        let last = !matches!(event, PumpEvent::Chunk(_));
        if tx.send(event).is_err() || last {
            break;
        }
    }
    debug!("reader thread exiting");
}
