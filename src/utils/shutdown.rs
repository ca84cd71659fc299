use std::sync::Arc;

use tokio::sync::watch;

/// Resolves once a stop is requested, or once nobody is left to request one.
pub async fn terminated(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stop| *stop).await;
}

pub fn is_terminated(stop: &watch::Receiver<bool>) -> bool {
    *stop.borrow() || stop.has_changed().is_err()
}

/// Cloneable handle that asks a running game to stop.
#[derive(Clone)]
pub struct Terminator {
    sender: Arc<watch::Sender<bool>>,
}

impl Terminator {
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender: Arc::new(sender) }, receiver)
    }

    pub fn terminate(&self) {
        self.sender.send_replace(true);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}
