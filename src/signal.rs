use tokio_util::sync::CancellationToken;

/// One-shot gate an external party can block on until the bridge produces
/// its first payload frame.
///
/// Clonable; every clone observes the same gate. The bridge fires it at
/// most once, when the fragment starts.
#[derive(Debug, Clone, Default)]
pub struct StartSignal {
    token: CancellationToken,
}

impl StartSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.token.cancel();
    }

    /// Non-blocking poll.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the signal fires; returns immediately once set.
    /// Cancel-safe.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_after_notify() {
        let signal = StartSignal::new();
        assert!(!signal.is_set());

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.wait().await;
        });

        signal.notify();
        handle.await.unwrap();
        assert!(signal.is_set());

        // Setting again is a no-op, waiting again returns immediately.
        signal.notify();
        signal.wait().await;
    }
}
