use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, Default)]
pub struct OtaStatus {
    pub enabled: bool,
    pub last_toggled: Option<DateTime<Utc>>,
}

/// Process-wide go/no-go flag the sensor polls before accepting a firmware
/// update. Not persisted; a restart resets it to off.
#[derive(Clone, Default)]
pub struct OtaSwitch {
    inner: Arc<Mutex<OtaStatus>>,
}

impl OtaSwitch {
    pub fn status(&self) -> OtaStatus {
        *self.lock()
    }

    pub fn set(&self, enabled: bool) -> OtaStatus {
        let mut guard = self.lock();
        guard.enabled = enabled;
        guard.last_toggled = Some(Utc::now());
        *guard
    }

    pub fn toggle(&self) -> OtaStatus {
        let mut guard = self.lock();
        guard.enabled = !guard.enabled;
        guard.last_toggled = Some(Utc::now());
        *guard
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OtaStatus> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_off_with_no_toggle_time() {
        let switch = OtaSwitch::default();
        let status = switch.status();
        assert!(!status.enabled);
        assert!(status.last_toggled.is_none());
    }

    #[test]
    fn toggle_flips_and_records_time() {
        let switch = OtaSwitch::default();
        let status = switch.toggle();
        assert!(status.enabled);
        assert!(status.last_toggled.is_some());

        let status = switch.toggle();
        assert!(!status.enabled);
    }

    #[test]
    fn set_overwrites_current_state() {
        let switch = OtaSwitch::default();
        assert!(switch.set(true).enabled);
        assert!(switch.set(true).enabled);
        assert!(!switch.set(false).enabled);
    }
}
