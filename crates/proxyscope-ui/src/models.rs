//! Toast notifications shown alongside the blocking alert.

/// Upper bound on toasts kept on screen; older ones are dropped first.
pub const MAX_TOASTS: usize = 5;

/// Milliseconds before a toast dismisses itself.
pub const TOAST_TIMEOUT_MS: u32 = 4_000;

/// Toast severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    /// Informational toast.
    Info,
    /// Success toast.
    Success,
    /// Error toast.
    Error,
}

impl ToastKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Toast payload used by the host and app state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic toast identifier.
    pub id: u64,
    /// Display message for the toast.
    pub message: String,
    /// Severity classification.
    pub kind: ToastKind,
}

/// Ordered toasts with stable ids.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ToastQueue {
    next_id: u64,
    items: Vec<Toast>,
}

impl ToastQueue {
    /// Append a toast and return its id, evicting the oldest past
    /// [`MAX_TOASTS`].
    pub fn push(&mut self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast {
            id,
            message: message.into(),
            kind,
        });
        if self.items.len() > MAX_TOASTS {
            let excess = self.items.len() - MAX_TOASTS;
            self.items.drain(..excess);
        }
        id
    }

    /// Remove a toast; unknown ids are ignored.
    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|toast| toast.id != id);
    }

    /// Toasts oldest first.
    #[must_use]
    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_stay_unique_after_dismissal() {
        let mut queue = ToastQueue::default();
        let first = queue.push("one", ToastKind::Info);
        queue.dismiss(first);
        let second = queue.push("two", ToastKind::Error);
        assert_ne!(first, second);
        assert_eq!(queue.items().len(), 1);
        assert_eq!(queue.items()[0].message, "two");
        queue.dismiss(999);
        assert_eq!(queue.items().len(), 1);
    }

    #[test]
    fn oldest_toasts_are_evicted() {
        let mut queue = ToastQueue::default();
        for index in 0..MAX_TOASTS + 2 {
            queue.push(format!("toast {index}"), ToastKind::Success);
        }
        assert_eq!(queue.items().len(), MAX_TOASTS);
        assert_eq!(queue.items()[0].message, "toast 2");
    }
}
