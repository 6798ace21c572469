//! Hierarchical cancellation scopes.
//!
//! A scope is cancelled when it, or any of its ancestors, is cancelled.
//! Each scope owns a watch channel; waiters subscribe to the whole lineage.

use std::sync::Arc;

use futures_util::future::select_all;
use tokio::sync::watch;

/// A cancellation scope shared by cloning.
#[derive(Debug, Clone)]
pub struct CancelScope {
    inner: Arc<ScopeInner>,
}

#[derive(Debug)]
struct ScopeInner {
    tx: watch::Sender<bool>,
    parent: Option<CancelScope>,
}

impl CancelScope {
    /// Create a new root scope.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<CancelScope>) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(ScopeInner { tx, parent }),
        }
    }

    /// Derive a child scope. Cancelling the child leaves this scope untouched.
    pub fn child(&self) -> CancelScope {
        Self::with_parent(Some(self.clone()))
    }

    /// Cancel this scope and every scope derived from it.
    pub fn cancel(&self) {
        self.inner.tx.send_replace(true);
    }

    /// Returns true if this scope or an ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.lineage().any(|scope| *scope.inner.tx.borrow())
    }

    /// Wait until this scope or an ancestor is cancelled.
    pub async fn cancelled(&self) {
        let mut receivers: Vec<watch::Receiver<bool>> =
            self.lineage().map(|scope| scope.inner.tx.subscribe()).collect();

        loop {
            if receivers.iter().any(|rx| *rx.borrow()) {
                return;
            }
            // Senders live as long as `self`, so changed() only resolves on a send.
            let changes = receivers.iter_mut().map(|rx| Box::pin(rx.changed()));
            let _ = select_all(changes).await;
        }
    }

    /// Guard that cancels this scope when dropped.
    pub fn guard(&self) -> CancelGuard {
        CancelGuard {
            scope: self.clone(),
        }
    }

    fn lineage(&self) -> impl Iterator<Item = &CancelScope> {
        std::iter::successors(Some(self), |scope| scope.inner.parent.as_ref())
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels its scope on drop.
#[derive(Debug)]
pub struct CancelGuard {
    scope: CancelScope,
}

impl CancelGuard {
    pub fn scope(&self) -> &CancelScope {
        &self.scope
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.scope.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_child_observes_parent() {
        let parent = CancelScope::new();
        let child = parent.child();
        let grandchild = child.child();
        assert!(!grandchild.is_cancelled());

        parent.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
    }

    #[test]
    fn test_parent_ignores_child() {
        let parent = CancelScope::new();
        let child = parent.child();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_guard_cancels_on_drop() {
        let scope = CancelScope::new();
        let observer = scope.clone();
        {
            let _guard = scope.guard();
            assert!(!observer.is_cancelled());
        }
        assert!(observer.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_on_ancestor() {
        let root = CancelScope::new();
        let child = root.child().child();

        let waiter = tokio::spawn(async move {
            child.cancelled().await;
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        root.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let scope = CancelScope::new();
        scope.cancel();
        tokio::time::timeout(Duration::from_millis(100), scope.child().cancelled())
            .await
            .expect("already cancelled");
    }
}
