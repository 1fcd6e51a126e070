use std::{collections::VecDeque, sync::Arc};

use tokio::sync::Mutex;

/// Shared FIFO of work items.
///
/// Cloning produces another handle to the same queue. Every operation holds
/// the lock only for the duration of one `VecDeque` call, so items are never
/// lost or handed out twice.
#[derive(Debug)]
pub struct WorkQueue<T> {
    items: Arc<Mutex<VecDeque<T>>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    pub async fn push(&self, item: T) {
        self.items.lock().await.push_back(item);
    }

    pub async fn extend(&self, items: impl IntoIterator<Item = T>) {
        self.items.lock().await.extend(items);
    }

    /// Takes the next item, or `None` when the queue is empty. Never waits
    /// for a producer.
    pub async fn pop(&self) -> Option<T> {
        self.items.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// Discards every pending item and returns how many were dropped.
    pub async fn drain_all(&self) -> usize {
        let mut items = self.items.lock().await;
        let dropped = items.len();
        items.clear();
        dropped
    }
}
