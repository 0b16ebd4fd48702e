//! Process-wide presentation state.
//!
//! The theme is held in a `watch` channel so any number of views can follow
//! it. The auth gate resolves which user id an operation acts on.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    /// `System` toggles to `Dark`, matching a light default.
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light | Theme::System => Theme::Dark,
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(anyhow::anyhow!("Invalid theme: {}", s)),
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::System => write!(f, "system"),
        }
    }
}

/// Shared, observable theme selection
#[derive(Debug, Clone)]
pub struct ThemeContext {
    tx: watch::Sender<Theme>,
}

impl ThemeContext {
    pub fn new(initial: Theme) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_theme)
    }

    pub fn current(&self) -> Theme {
        *self.tx.borrow()
    }

    pub fn set(&self, theme: Theme) {
        self.tx.send_if_modified(|current| {
            if *current == theme {
                return false;
            }
            *current = theme;
            true
        });
        tracing::debug!(theme = %theme, "Theme changed");
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.tx.subscribe()
    }
}

impl Default for ThemeContext {
    fn default() -> Self {
        Self::new(Theme::System)
    }
}

/// Resolves the acting user for an operation
#[derive(Debug, Clone, Default)]
pub struct AuthGate {
    bypass_user: Option<Uuid>,
}

impl AuthGate {
    /// Bypass is honored only when enabled, a user is configured and the
    /// environment is not production.
    pub fn from_config(config: &Config) -> Self {
        let bypass_user = if config.bypass_auth && !config.is_production() {
            config.bypass_user_id
        } else {
            None
        };
        if let Some(user) = bypass_user {
            tracing::warn!(user_id = %user, "Auth bypass enabled");
        }
        Self { bypass_user }
    }

    pub fn with_bypass(user: Uuid) -> Self {
        Self {
            bypass_user: Some(user),
        }
    }

    pub fn bypass_enabled(&self) -> bool {
        self.bypass_user.is_some()
    }

    pub fn resolve_user(&self, session_user: Option<Uuid>) -> Result<Uuid, AppError> {
        session_user
            .or(self.bypass_user)
            .ok_or_else(|| AppError::Unauthorized("No authenticated user".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::local(
            "postgresql://localhost/atelier",
            "/tmp/atelier",
            "http://localhost:3000/media",
        )
    }

    #[test]
    fn theme_parses_and_toggles() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::System.toggled(), Theme::Dark);
    }

    #[tokio::test]
    async fn subscribers_see_theme_changes() {
        let ctx = ThemeContext::new(Theme::Light);
        let mut rx = ctx.subscribe();

        assert_eq!(ctx.toggle(), Theme::Dark);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Theme::Dark);

        ctx.set(Theme::Dark);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn session_user_wins_over_bypass() {
        let bypass = Uuid::new_v4();
        let session = Uuid::new_v4();
        let gate = AuthGate::with_bypass(bypass);

        assert_eq!(gate.resolve_user(Some(session)).unwrap(), session);
        assert_eq!(gate.resolve_user(None).unwrap(), bypass);
    }

    #[test]
    fn no_user_is_unauthorized() {
        let gate = AuthGate::from_config(&config());
        assert!(!gate.bypass_enabled());
        assert!(matches!(
            gate.resolve_user(None),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn bypass_refused_in_production() {
        let mut config = config();
        config.bypass_auth = true;
        config.bypass_user_id = Some(Uuid::new_v4());
        assert!(AuthGate::from_config(&config).bypass_enabled());

        config.environment = "production".into();
        assert!(!AuthGate::from_config(&config).bypass_enabled());
    }
}
