//! Persisted theme preference and effective color scheme.
//!
//! # Responsibility
//! - Hold the process-wide theme mode, initialized from the key-value
//!   store.
//! - Derive the effective scheme from the mode and the device-reported
//!   scheme.
//!
//! # Invariants
//! - The in-memory mode never diverges from the persisted value: a failed
//!   persist keeps the previous mode in place.
//! - `system` resolves against the last device-reported scheme at read
//!   time, falling back to light.

use crate::kv::{lock, SharedKv};
use crate::model::theme::{ColorScheme, ThemeMode};
use log::{error, warn};

/// Key holding the persisted mode string.
pub const THEME_KEY: &str = "theme_mode";

/// Process-wide theme preference store.
pub struct ThemeState {
    kv: SharedKv,
    mode: ThemeMode,
    device_scheme: Option<ColorScheme>,
}

impl ThemeState {
    /// Restores the persisted mode. Missing and unparseable values fall
    /// back to `System`; an unreachable medium is logged and treated the
    /// same way.
    pub fn load(kv: SharedKv) -> Self {
        let mode = match lock(&kv) {
            Ok(guard) => match guard.get(THEME_KEY) {
                Some(raw) => ThemeMode::parse(raw).unwrap_or_else(|| {
                    warn!("event=theme_load module=state status=fallback raw={raw}");
                    ThemeMode::System
                }),
                None => ThemeMode::System,
            },
            Err(err) => {
                error!("event=theme_load module=state status=error error={err}");
                ThemeMode::System
            }
        };

        Self {
            kv,
            mode,
            device_scheme: None,
        }
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.mode
    }

    /// Persists then adopts the new mode. A failed persist keeps the
    /// previous mode so memory and storage cannot diverge; the failure is
    /// logged and swallowed.
    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        let persisted = lock(&self.kv).and_then(|mut guard| guard.set(THEME_KEY, mode.as_str()));
        match persisted {
            Ok(()) => self.mode = mode,
            Err(err) => error!(
                "event=theme_set module=state status=error mode={} error={err}",
                mode.as_str()
            ),
        }
    }

    /// Records the platform-reported native scheme; `None` means the
    /// platform has not reported one.
    pub fn set_device_scheme(&mut self, scheme: Option<ColorScheme>) {
        self.device_scheme = scheme;
    }

    /// Effective scheme: explicit modes pass through verbatim; `system`
    /// resolves to the device-reported scheme with a light fallback.
    pub fn color_scheme(&self) -> ColorScheme {
        match self.mode {
            ThemeMode::Light => ColorScheme::Light,
            ThemeMode::Dark => ColorScheme::Dark,
            ThemeMode::System => self.device_scheme.unwrap_or(ColorScheme::Light),
        }
    }
}
