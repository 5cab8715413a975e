use chrono::{DateTime, Utc};

/// Externally supplied access state for the gated `training` category.
///
/// The boolean/expiry pair comes from whatever authentication surface sits
/// outside the engine; nothing here reads ambient globals. The default is
/// closed, so an engine constructed without access refuses training working
/// sets until one is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingAccess {
    granted: bool,
    expires_at: Option<DateTime<Utc>>,
}

impl TrainingAccess {
    #[must_use]
    pub fn new(granted: bool, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            granted,
            expires_at,
        }
    }

    /// Access that never expires.
    #[must_use]
    pub fn granted() -> Self {
        Self::new(true, None)
    }

    /// Access valid up to and including `expires_at`.
    #[must_use]
    pub fn granted_until(expires_at: DateTime<Utc>) -> Self {
        Self::new(true, Some(expires_at))
    }

    /// No access; the gate is closed.
    #[must_use]
    pub fn denied() -> Self {
        Self::default()
    }

    /// Whether the gate is open at `now`.
    #[must_use]
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.granted && self.expires_at.is_none_or(|expiry| now <= expiry)
    }
}
