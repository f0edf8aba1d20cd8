//! The threads that talk to the roboRIO
//!
//! Each connection runs on its own thread and polls a shared shutdown channel between blocking
//! calls. Nothing is ever sent on that channel, dropping the sender is the stop signal.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, error};

use crate::config::DsConfig;
use crate::ds::state::DsState;

mod backoff;
mod log;
mod sim;
mod status;
mod transmit;

/// Whether the owner of `shutdown` asked the thread to stop
pub(crate) fn stopped(shutdown: &Receiver<()>) -> bool {
    match shutdown.try_recv() {
        Err(TryRecvError::Empty) => false,
        Ok(()) | Err(TryRecvError::Disconnected) => true,
    }
}

/// Sleeps for up to `timeout`, returning true early if the thread should stop
pub(crate) fn wait(shutdown: &Receiver<()>, timeout: Duration) -> bool {
    match shutdown.recv_timeout(timeout) {
        Err(RecvTimeoutError::Timeout) => false,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
    }
}

type ThreadFn = fn(Arc<DsState>, DsConfig, Receiver<()>);

/// The running connection threads of a driver station
pub(crate) struct Workers {
    shutdown: Option<Sender<()>>,
    handles: Vec<JoinHandle<()>>,
}

impl Workers {
    pub fn spawn(state: &Arc<DsState>, config: &DsConfig) -> io::Result<Workers> {
        let (tx, rx) = bounded::<()>(0);
        let mut workers = Workers {
            shutdown: Some(tx),
            handles: Vec::with_capacity(3),
        };

        let threads: [(&str, ThreadFn); 3] = [
            ("ds-transmit", transmit::transmit_thread),
            ("ds-status", status::status_thread),
            ("ds-log", log::log_thread),
        ];
        for &(name, body) in threads.iter() {
            let state = state.clone();
            let config = config.clone();
            let rx = rx.clone();
            // On error, dropping `workers` stops whatever was already started
            let handle = thread::Builder::new()
                .name(name.to_string())
                .spawn(move || body(state, config, rx))?;
            workers.handles.push(handle);
        }

        Ok(workers)
    }

    /// Signals every thread to stop and waits for them to exit
    pub fn stop(&mut self) {
        self.shutdown = None;
        for handle in self.handles.drain(..) {
            let name = handle.thread().name().unwrap_or("ds").to_string();
            match handle.join() {
                Ok(()) => debug!("{} joined", name),
                Err(_) => error!("{} panicked", name),
            }
        }
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        self.stop();
    }
}
