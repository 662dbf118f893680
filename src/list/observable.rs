use tokio::sync::watch;

/// Push-based value holder for controller outputs.
///
/// Backed by a `watch` channel: every subscriber sees the latest value and is
/// woken on each change. Writes happen only on the controller's context, after
/// its state is fully updated.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx }
    }

    /// Borrow the current value. Do not hold across an `.await`.
    pub fn get(&self) -> watch::Ref<'_, T> {
        self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Replace the value and notify unconditionally.
    pub fn replace(&self, value: T) {
        self.tx.send_replace(value);
    }
}

impl<T: PartialEq> Observable<T> {
    /// Store `value`, notifying only if it differs from the current one.
    pub fn set(&self, value: T) {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }
}

impl<T: Clone> Observable<T> {
    pub fn value(&self) -> T {
        self.tx.borrow().clone()
    }
}
