use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            text: text.into(),
        }
    }
}

/// Transient notifications, each visible until its lifetime runs out.
#[derive(Debug)]
pub struct Toasts {
    lifetime: Duration,
    active: Vec<(Notification, Instant)>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(TOAST_LIFETIME)
    }
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            active: Vec::new(),
        }
    }

    pub fn push(&mut self, notification: Notification, now: Instant) {
        self.active.push((notification, now + self.lifetime));
    }

    pub fn prune(&mut self, now: Instant) {
        self.active.retain(|(_, expires_at)| *expires_at > now);
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.active.iter().map(|(notification, _)| notification)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Notification, Toasts};
    use std::time::{Duration, Instant};

    #[test]
    fn toasts_expire_after_lifetime() {
        let mut toasts = Toasts::new(Duration::from_secs(3));
        let start = Instant::now();
        toasts.push(Notification::info("New chat started"), start);
        toasts.push(Notification::error("later"), start + Duration::from_secs(2));

        toasts.prune(start + Duration::from_secs(1));
        assert_eq!(toasts.active().count(), 2);

        toasts.prune(start + Duration::from_secs(3));
        let remaining: Vec<&str> = toasts.active().map(|n| n.text.as_str()).collect();
        assert_eq!(remaining, vec!["later"]);

        toasts.prune(start + Duration::from_secs(6));
        assert!(toasts.is_empty());
    }
}
