//! stdin reader for raw terminal input.
//!
//! Reads raw bytes from stdin in a dedicated thread and hands each read
//! to the event loop as one chunk. The thread only moves bytes; all
//! classification and dispatch stays on the loop's thread, so one chunk is
//! fully processed before the next is looked at.

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Message from the reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinMessage {
    /// One raw read.
    Data(Vec<u8>),
    /// stdin closed or failed.
    Closed,
}

/// Dedicated stdin reader thread.
#[derive(Debug)]
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the stdin reader thread.
    pub fn spawn() -> io::Result<(Self, Receiver<StdinMessage>)> {
        Self::spawn_from(io::stdin())
    }

    /// Spawn a reader over any byte source.
    pub fn spawn_from<R>(source: R) -> io::Result<(Self, Receiver<StdinMessage>)>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::Builder::new()
            .name("spark-stdin".to_string())
            .spawn(move || Self::read_loop(source, running_clone, tx))?;

        Ok((
            Self {
                handle: Some(handle),
                running,
            },
            rx,
        ))
    }

    fn read_loop<R: Read>(mut source: R, running: Arc<AtomicBool>, tx: Sender<StdinMessage>) {
        let mut buf = [0u8; 1024];

        while running.load(Ordering::SeqCst) {
            match source.read(&mut buf) {
                Ok(0) => {
                    let _ = tx.send(StdinMessage::Closed);
                    break;
                }
                Ok(n) => {
                    if tx.send(StdinMessage::Data(buf[..n].to_vec())).is_err() {
                        break; // Channel closed
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::debug!(error = %e, "stdin read failed");
                    let _ = tx.send(StdinMessage::Closed);
                    break;
                }
            }
        }
    }

    /// Stop the reader thread.
    ///
    /// The thread may be blocked in `read`; it exits on its next wakeup or
    /// with the process. It is never joined.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.handle.take();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reader_delivers_chunks_then_closed() {
        let (_reader, rx) = StdinReader::spawn_from(Cursor::new(b"abc".to_vec())).unwrap();
        assert_eq!(rx.recv().unwrap(), StdinMessage::Data(b"abc".to_vec()));
        assert_eq!(rx.recv().unwrap(), StdinMessage::Closed);
    }
}
