//! Blocking line channel
//!
//! Lines submitted at the prompt are pushed here by the render thread and
//! handed to whichever thread is blocked in `wait_get`. Shutdown wakes every
//! waiter and makes later reads return immediately.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct PipeState {
    lines: VecDeque<String>,
    shutdown: bool,
}

/// Multi-producer, multi-consumer queue of submitted lines
#[derive(Debug, Default)]
pub struct LinePipe {
    state: Mutex<PipeState>,
    ready: Condvar,
}

impl LinePipe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line and wake one reader. Ignored after shutdown.
    pub fn push(&self, line: String) -> bool {
        let mut state = self.lock();
        if state.shutdown {
            return false;
        }
        state.lines.push_back(line);
        self.ready.notify_one();
        true
    }

    /// Block until a line is available or the pipe shuts down
    pub fn wait_get(&self) -> Option<String> {
        let mut state = self.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(line) = state.lines.pop_front() {
                return Some(line);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    /// Take a line if one is queued
    pub fn try_get(&self) -> Option<String> {
        let mut state = self.lock();
        if state.shutdown {
            return None;
        }
        state.lines.pop_front()
    }

    /// Release every waiter; pending lines are discarded
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.shutdown = true;
        state.lines.clear();
        self.ready.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }

    pub fn pending(&self) -> usize {
        self.lock().lines.len()
    }

    fn lock(&self) -> MutexGuard<'_, PipeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
