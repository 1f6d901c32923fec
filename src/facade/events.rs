//! Change notifications for UI bindings

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use crate::locale::Locale;

/// Events delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationEvent {
    /// The current locale changed; re-render with the fallback or stale data
    LocaleChanged { locale: Locale },
    /// Translations for the current locale are ready
    Ready { locale: Locale },
    /// Loading translations for the current locale failed
    LoadFailed { locale: Locale, error: String },
}

impl TranslationEvent {
    pub fn locale(&self) -> &Locale {
        match self {
            Self::LocaleChanged { locale }
            | Self::Ready { locale }
            | Self::LoadFailed { locale, .. } => locale,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::LoadFailed { .. })
    }
}

/// Handle registered by a binding; dropping it unregisters
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<TranslationEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<TranslationEvent>) -> Self {
        Self { rx }
    }

    /// Next event, `None` once the facade is gone
    ///
    /// A subscriber that falls behind skips the events it missed; only the
    /// latest state matters for re-rendering.
    pub async fn recv(&mut self) -> Option<TranslationEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Subscriber lagged, skipping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<TranslationEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
