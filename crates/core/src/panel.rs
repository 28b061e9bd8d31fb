//! Integration panel actions.
//!
//! A panel (QuickBooks, Kong, ...) exposes a handful of optional actions.
//! They are collected once into a [`PanelActions`] and checked for
//! consistency at construction time, so call sites can simply ask whether
//! an action exists.

use std::sync::Arc;

use crate::error::CoreError;

/// A UI action callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// The optional actions of an integration panel.
#[derive(Clone, Default)]
pub struct PanelActions {
    on_back: Option<Callback>,
    on_connect: Option<Callback>,
    on_disconnect: Option<Callback>,
    on_sync: Option<Callback>,
}

impl std::fmt::Debug for PanelActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelActions")
            .field("on_back", &self.on_back.is_some())
            .field("on_connect", &self.on_connect.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .field("on_sync", &self.on_sync.is_some())
            .finish()
    }
}

/// Panel action identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Back,
    Connect,
    Disconnect,
    Sync,
}

impl PanelActions {
    pub fn builder(panel: &'static str) -> PanelActionsBuilder {
        PanelActionsBuilder {
            panel,
            actions: Self::default(),
        }
    }

    pub fn has(&self, action: PanelAction) -> bool {
        self.slot(action).is_some()
    }

    /// Run an action. Returns `false` when the panel does not offer it.
    pub fn trigger(&self, action: PanelAction) -> bool {
        match self.slot(action) {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    fn slot(&self, action: PanelAction) -> Option<&Callback> {
        match action {
            PanelAction::Back => self.on_back.as_ref(),
            PanelAction::Connect => self.on_connect.as_ref(),
            PanelAction::Disconnect => self.on_disconnect.as_ref(),
            PanelAction::Sync => self.on_sync.as_ref(),
        }
    }
}

pub struct PanelActionsBuilder {
    panel: &'static str,
    actions: PanelActions,
}

impl PanelActionsBuilder {
    pub fn on_back(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.actions.on_back = Some(Arc::new(f));
        self
    }

    pub fn on_connect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.actions.on_connect = Some(Arc::new(f));
        self
    }

    pub fn on_disconnect(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.actions.on_disconnect = Some(Arc::new(f));
        self
    }

    pub fn on_sync(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.actions.on_sync = Some(Arc::new(f));
        self
    }

    /// Validate and finish.
    ///
    /// Disconnect and sync only make sense on a panel that can connect.
    pub fn build(self) -> Result<PanelActions, CoreError> {
        let a = &self.actions;
        if a.on_connect.is_none() && (a.on_disconnect.is_some() || a.on_sync.is_some()) {
            return Err(CoreError::Validation(format!(
                "Panel '{}' offers disconnect or sync without connect",
                self.panel
            )));
        }
        Ok(self.actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn missing_actions_are_reported_not_called() {
        let actions = PanelActions::builder("kong").on_back(|| {}).build().unwrap();
        assert!(actions.has(PanelAction::Back));
        assert!(!actions.trigger(PanelAction::Connect));
    }

    #[test]
    fn trigger_invokes_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let actions = PanelActions::builder("quickbooks")
            .on_connect(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();
        assert!(actions.trigger(PanelAction::Connect));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn disconnect_without_connect_is_rejected() {
        let result = PanelActions::builder("quickbooks")
            .on_disconnect(|| {})
            .build();
        assert!(result.is_err());
    }
}
