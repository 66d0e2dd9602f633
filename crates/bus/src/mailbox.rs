use tokio::sync::mpsc;

/// The sending half of a component's inbox. Cheap to clone — every other
/// component that wants to publish to or request from this one holds a copy.
#[derive(Debug)]
pub struct Mailbox<M> {
    tx: mpsc::Sender<M>,
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Mailbox { tx: self.tx.clone() }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("mailbox closed — destination component is gone")]
pub struct SendError;

impl<M> Mailbox<M> {
    /// Enqueue a message. Fails only if the destination component's run
    /// loop has stopped and dropped its `Inbox`.
    pub async fn send(&self, msg: M) -> Result<(), SendError> {
        self.tx.send(msg).await.map_err(|_| SendError)
    }

    /// Non-async enqueue for callers that cannot await (e.g. a southbound
    /// callback running on a non-tokio thread).
    pub fn try_send(&self, msg: M) -> Result<(), SendError> {
        self.tx.try_send(msg).map_err(|_| SendError)
    }
}

/// The receiving half. One per component; polled in a `loop { inbox.recv().await }`.
pub struct Inbox<M> {
    rx: mpsc::Receiver<M>,
}

impl<M> Inbox<M> {
    pub async fn recv(&mut self) -> Option<M> {
        self.rx.recv().await
    }
}

/// Create a bounded mailbox. `capacity` bounds in-flight messages to the
/// owning component, applying backpressure to publishers.
pub fn mailbox<M>(capacity: usize) -> (Mailbox<M>, Inbox<M>) {
    let (tx, rx) = mpsc::channel(capacity);
    (Mailbox { tx }, Inbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_in_send_order() {
        let (mailbox, mut inbox) = mailbox::<i32>(8);
        mailbox.send(1).await.unwrap();
        mailbox.send(2).await.unwrap();
        mailbox.send(3).await.unwrap();
        assert_eq!(inbox.recv().await, Some(1));
        assert_eq!(inbox.recv().await, Some(2));
        assert_eq!(inbox.recv().await, Some(3));
    }

    #[tokio::test]
    async fn send_fails_once_inbox_dropped() {
        let (mailbox, inbox) = mailbox::<i32>(1);
        drop(inbox);
        assert!(mailbox.send(1).await.is_err());
    }
}
