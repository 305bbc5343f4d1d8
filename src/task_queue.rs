//! Cross-thread work queue drained once per frame
//!
//! Any thread may `push`. Only the render thread drains. A relaxed-cost
//! `has_work` flag lets the render thread skip the lock on idle frames.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Thread-safe FIFO of work items
#[derive(Debug)]
pub struct TaskQueue<T> {
    items: Mutex<VecDeque<T>>,
    has_work: AtomicBool,
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            has_work: AtomicBool::new(false),
        }
    }

    /// Append an item; callable from any thread
    pub fn push(&self, item: T) {
        let mut items = self.lock();
        items.push_back(item);
        self.has_work.store(true, Ordering::Release);
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&self) -> Vec<T> {
        if !self.has_work.load(Ordering::Acquire) {
            return Vec::new();
        }

        let mut items = self.lock();
        self.has_work.store(false, Ordering::Release);
        items.drain(..).collect()
    }

    /// Run `f` on every queued item. Items pushed while this runs wait for
    /// the next call.
    pub fn drain_and_run<F: FnMut(T)>(&self, mut f: F) -> usize {
        let batch = self.drain();
        let count = batch.len();
        for item in batch {
            f(item);
        }
        count
    }

    pub fn has_work(&self) -> bool {
        self.has_work.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything queued without running it
    pub fn clear(&self) {
        let mut items = self.lock();
        items.clear();
        self.has_work.store(false, Ordering::Release);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<T>> {
        // A panicking producer cannot leave the deque half-modified
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert!(queue.has_work());
        assert_eq!(queue.drain(), vec![1, 2, 3]);
        assert!(!queue.has_work());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_items_pushed_during_drain_run_next_tick() {
        let queue = Arc::new(TaskQueue::new());
        queue.push("first");

        let mut ran = Vec::new();
        let q = queue.clone();
        queue.drain_and_run(|item| {
            ran.push(item);
            q.push("late");
        });
        assert_eq!(ran, vec!["first"]);
        assert_eq!(queue.len(), 1);

        let mut next = Vec::new();
        queue.drain_and_run(|item| next.push(item));
        assert_eq!(next, vec!["late"]);
    }

    #[test]
    fn test_concurrent_producers() {
        let queue = Arc::new(TaskQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let q = queue.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        q.push((t, i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let items = queue.drain();
        assert_eq!(items.len(), 400);
        // Per-producer order is preserved
        for t in 0..4 {
            let seq: Vec<_> = items.iter().filter(|(p, _)| *p == t).map(|(_, i)| *i).collect();
            assert_eq!(seq, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_clear() {
        let queue = TaskQueue::new();
        queue.push(1);
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.has_work());
    }
}
