use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::warn;

/// Delivers exactly one result. Anything completed after the first value is
/// dropped.
pub struct Completion<T> {
    sender: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Completion<T> {
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(sender)),
            },
            receiver,
        )
    }

    /// Returns false if this was already completed.
    pub fn complete(&self, value: T) -> bool {
        let Some(sender) = self.sender.lock().take() else {
            warn!("tried to complete a probe more than once, ignoring");
            return false;
        };
        // the receiver going away just means nobody cares about the result
        let _ = sender.send(value);
        true
    }

    #[cfg(test)]
    fn is_complete(&self) -> bool {
        self.sender.lock().is_none()
    }
}
