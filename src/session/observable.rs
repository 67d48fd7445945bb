//! Single-writer, multi-reader value with change notification.

use futures::channel::mpsc;
use std::cell::RefCell;

/// Current value plus live subscribers. Readers call [`Observable::get`] or
/// [`Observable::subscribe`]; only the owning session publishes.
pub struct Observable<T: Clone> {
    value: RefCell<T>,
    watchers: RefCell<Vec<mpsc::UnboundedSender<T>>>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self { value: RefCell::new(value), watchers: RefCell::new(Vec::new()) }
    }

    pub fn get(&self) -> T { self.value.borrow().clone() }

    /// Yields the current value first, then every published value.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded();
        let _ = tx.unbounded_send(self.get());
        self.watchers.borrow_mut().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize { self.watchers.borrow().len() }

    pub(crate) fn set(&self, value: T) {
        *self.value.borrow_mut() = value.clone();
        // Dropped receivers are pruned on publish
        self.watchers.borrow_mut().retain(|tx| tx.unbounded_send(value.clone()).is_ok());
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self { Self::new(T::default()) }
}

impl<T: Clone + std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable").field("value", &*self.value.borrow()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn subscriber_sees_current_then_updates() {
        let flag = Observable::new(false);
        let mut rx = flag.subscribe();
        flag.set(true);
        flag.set(false);
        let seen: Vec<bool> = futures::executor::block_on(async {
            vec![rx.next().await.unwrap(), rx.next().await.unwrap(), rx.next().await.unwrap()]
        });
        assert_eq!(seen, vec![false, true, false]);
        assert!(!flag.get());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let value = Observable::new(0u32);
        let rx = value.subscribe();
        let _kept = value.subscribe();
        drop(rx);
        value.set(1);
        assert_eq!(value.subscriber_count(), 1);
    }
}
