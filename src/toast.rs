use std::time::{Duration, Instant};

pub const TOAST_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub description: String,
    shown_at: Instant,
}

impl Toast {
    pub fn title(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "Success",
            ToastKind::Error => "Error",
        }
    }
}

/// One-shot notifications. Only the newest toast is kept.
#[derive(Debug)]
pub struct Toaster {
    current: Option<Toast>,
    ttl: Duration,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(TOAST_TTL)
    }
}

impl Toaster {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn success(&mut self, description: impl Into<String>) {
        self.show(ToastKind::Success, description.into());
    }

    pub fn error(&mut self, description: impl Into<String>) {
        self.show(ToastKind::Error, description.into());
    }

    fn show(&mut self, kind: ToastKind, description: String) {
        self.current = Some(Toast {
            kind,
            description,
            shown_at: Instant::now(),
        });
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn prune(&mut self, now: Instant) {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|toast| now.saturating_duration_since(toast.shown_at) >= self.ttl);
        if expired {
            self.current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_toast_replaces_previous() {
        let mut toaster = Toaster::default();
        toaster.success("Task deleted.");
        toaster.error("Failed to update task.");

        let toast = toaster.current().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title(), "Error");
        assert_eq!(toast.description, "Failed to update task.");
    }

    #[test]
    fn expires_after_ttl() {
        let mut toaster = Toaster::new(Duration::from_millis(100));
        toaster.success("New task created.");
        let now = Instant::now();

        toaster.prune(now);
        assert!(toaster.current().is_some());
        toaster.prune(now + Duration::from_millis(150));
        assert!(toaster.current().is_none());
    }
}
