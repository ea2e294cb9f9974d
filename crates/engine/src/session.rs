//! Per-page hiding session.
//!
//! One session lives for the lifetime of a page. It toggles between
//! [`Activation::Inactive`] and [`Activation::Active`]; while active the
//! platform adapter feeds it [`Command`]s translated from pointer and keyboard
//! events. Hides are kept in a linear undo/redo log until the user accepts
//! them (they become per-domain selector rules) or cancels them (everything
//! touched by the session is restored).

use crate::config::HiderConfig;
use crate::dom::{PageDom, DISPLAY_NONE};
use crate::hidden::HiddenElements;
use crate::history::{HideAction, History};
use crate::overlay::{HistoryState, Notification, Overlay};
use crate::rules::{merge_selectors, RuleStore};
use crate::selector::generate_selector;
use contracts::storage::storage_key;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Inactive,
    Active,
}

/// Typed input of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<H> {
    Toggle,
    Hide(H),
    HoverIn(H),
    HoverOut(H),
    Undo,
    Redo,
    Accept,
    Cancel,
    Reset,
}

pub struct HidingSession<D: PageDom, S, O> {
    dom: D,
    store: S,
    overlay: O,
    config: HiderConfig,
    domain: String,
    activation: Activation,
    history: History<D::Handle>,
    hidden: HiddenElements<D::Handle>,
    /// Selectors known to be stored for the domain; only feeds notifications
    persisted: BTreeSet<String>,
    hovered: Option<D::Handle>,
}

impl<D, S, O> HidingSession<D, S, O>
where
    D: PageDom,
    S: RuleStore,
    O: Overlay,
{
    pub fn new(dom: D, store: S, overlay: O, domain: impl Into<String>, config: HiderConfig) -> Self {
        Self {
            dom,
            store,
            overlay,
            config,
            domain: domain.into(),
            activation: Activation::Inactive,
            history: History::new(),
            hidden: HiddenElements::new(),
            persisted: BTreeSet::new(),
            hovered: None,
        }
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn is_active(&self) -> bool {
        self.activation == Activation::Active
    }

    pub fn history(&self) -> &History<D::Handle> {
        &self.history
    }

    /// Position of the last applied hide, `-1` when none is applied
    pub fn history_index(&self) -> isize {
        self.history.index()
    }

    pub fn hidden(&self) -> &HiddenElements<D::Handle> {
        &self.hidden
    }

    pub fn persisted_selectors(&self) -> &BTreeSet<String> {
        &self.persisted
    }

    pub fn hovered(&self) -> Option<&D::Handle> {
        self.hovered.as_ref()
    }

    pub fn history_state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
            hidden_count: self.hidden.len(),
        }
    }

    /// Runs one command. Only `Toggle` and `Reset` are honoured while inactive.
    pub async fn dispatch(&mut self, command: Command<D::Handle>) {
        match command {
            Command::Toggle => self.toggle(),
            Command::Reset => {
                self.reset_all_rules().await;
            }
            other if !self.is_active() => {
                log::debug!("Ignoring {:?} while inactive", other);
            }
            Command::Hide(element) => {
                self.hide_element(&element);
            }
            Command::HoverIn(element) => self.hover_in(&element),
            Command::HoverOut(element) => self.hover_out(&element),
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::Accept => {
                self.accept().await;
            }
            Command::Cancel => {
                self.cancel();
            }
        }
    }

    // ── Rule loading ─────────────────────────────────────────────────────────

    /// Applies the stored rules of the domain to the page.
    ///
    /// Runs outside any interactive session. A storage failure reads as "no
    /// rules", a selector that does not parse is skipped. Returns the number of
    /// elements hidden.
    pub async fn load_rules(&mut self) -> usize {
        let key = self.rules_key();
        let selectors = match self.store.read(&key).await {
            Ok(selectors) => selectors,
            Err(err) => {
                log::warn!("Could not load hiding rules for {}: {}", self.domain, err);
                return 0;
            }
        };

        let mut hidden_count = 0;
        for selector in selectors {
            let matches = match self.dom.query_all(&selector) {
                Ok(matches) => matches,
                Err(err) => {
                    log::warn!("Skipping stored rule: {}", err);
                    continue;
                }
            };

            let mut applied = false;
            for element in matches {
                if self.dom.computed_display(&element).as_deref() == Some(DISPLAY_NONE) {
                    continue;
                }
                self.dom.set_inline_display(&element, DISPLAY_NONE);
                applied = true;
                hidden_count += 1;
            }
            if applied {
                self.persisted.insert(selector);
            }
        }

        log::info!(
            "Applied {} stored rule(s) to {} element(s) on {}",
            self.persisted.len(),
            hidden_count,
            self.domain
        );
        hidden_count
    }

    // ── Activation ───────────────────────────────────────────────────────────

    /// Flips between inactive and active. Re-activation keeps the history.
    pub fn toggle(&mut self) {
        match self.activation {
            Activation::Inactive => self.activate(),
            Activation::Active => self.deactivate(),
        }
    }

    fn activate(&mut self) {
        if self.is_active() {
            return;
        }
        self.activation = Activation::Active;
        self.overlay.attach();
        self.dom.set_crosshair(true);
        self.refresh_overlay();
        log::debug!("Hiding session active on {}", self.domain);
    }

    fn deactivate(&mut self) {
        if !self.is_active() {
            return;
        }
        self.activation = Activation::Inactive;
        self.overlay.detach();
        self.dom.set_crosshair(false);
        self.clear_hover();
        log::debug!("Hiding session inactive on {}", self.domain);
    }

    // ── Hover highlight ──────────────────────────────────────────────────────

    pub fn hover_in(&mut self, element: &D::Handle) {
        if let Some(previous) = self.hovered.take() {
            if &previous != element && self.dom.is_live(&previous) {
                self.dom.set_outline(&previous, "");
            }
        }
        if !self.dom.is_live(element) {
            return;
        }
        self.dom.set_outline(element, &self.config.highlight.outline);
        self.hovered = Some(element.clone());
    }

    pub fn hover_out(&mut self, element: &D::Handle) {
        if self.hovered.as_ref() == Some(element) {
            self.clear_hover();
        }
    }

    fn clear_hover(&mut self) {
        if let Some(previous) = self.hovered.take() {
            if self.dom.is_live(&previous) {
                self.dom.set_outline(&previous, "");
            }
        }
    }

    // ── Hide / undo / redo ───────────────────────────────────────────────────

    /// Hides the element and records the action. Returns `false` when nothing
    /// happened: the element is gone or is already not displayed.
    pub fn hide_element(&mut self, element: &D::Handle) -> bool {
        if !self.dom.is_live(element) {
            log::debug!("Ignoring hide of detached element {:?}", element);
            return false;
        }
        let Some(original_display) = self.dom.computed_display(element) else {
            return false;
        };
        if original_display == DISPLAY_NONE {
            return false;
        }

        if self.hovered.as_ref() == Some(element) {
            self.clear_hover();
        }

        self.hidden.insert(element.clone(), original_display.clone());
        self.dom.set_inline_display(element, DISPLAY_NONE);
        self.history.record(HideAction {
            element: element.clone(),
            original_display,
        });
        self.refresh_overlay();
        true
    }

    /// Reverts the last applied hide.
    ///
    /// The display value comes from the action itself, not from the hidden
    /// map, so the log alone is enough to restore the page.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.history.step_back().cloned() else {
            return false;
        };
        if self.dom.is_live(&action.element) {
            self.dom
                .set_inline_display(&action.element, &action.original_display);
        }
        self.hidden.remove(&action.element);
        self.refresh_overlay();
        true
    }

    /// Re-applies the next undone hide and rebuilds its map entry from the action.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.history.step_forward().cloned() else {
            return false;
        };
        if self.dom.is_live(&action.element) {
            self.dom.set_inline_display(&action.element, DISPLAY_NONE);
        }
        self.hidden.insert(action.element, action.original_display);
        self.refresh_overlay();
        true
    }

    fn refresh_overlay(&mut self) {
        let state = self.history_state();
        self.overlay.refresh(state);
    }

    // ── Finalization ─────────────────────────────────────────────────────────

    /// Turns the hidden elements into stored rules for the domain.
    ///
    /// Stored selectors are merged, never replaced. On a storage failure the
    /// session is left exactly as it was so the user can retry.
    pub async fn accept(&mut self) -> Notification {
        if self.hidden.is_empty() {
            self.history.clear();
            self.deactivate();
            return self.emit(Notification::NothingToSave);
        }

        let mut fresh = Vec::with_capacity(self.hidden.len());
        for element in self.hidden.iter() {
            match generate_selector(&self.dom, element) {
                Ok(selector) => fresh.push(selector),
                Err(err) => log::warn!("Not persisting {:?}: {}", element, err),
            }
        }

        let key = self.rules_key();
        let existing = match self.store.read(&key).await {
            Ok(existing) => existing,
            Err(err) => {
                log::error!("Could not read rules before saving: {}", err);
                return self.emit(Notification::SaveFailed);
            }
        };
        let merged = merge_selectors(existing, fresh);
        if let Err(err) = self.store.write(&key, &merged).await {
            log::error!("Could not save rules: {}", err);
            return self.emit(Notification::SaveFailed);
        }

        log::info!("Saved {} rule(s) for {}", merged.len(), self.domain);
        let persisted = merged.len();
        self.persisted = merged.into_iter().collect();
        self.history.clear();
        self.hidden.clear();
        self.deactivate();
        self.emit(Notification::Accepted { persisted })
    }

    /// Restores everything hidden by the session and discards the log.
    pub fn cancel(&mut self) -> usize {
        let restored = self.restore_session_elements();
        self.history.clear();
        self.deactivate();
        self.emit(Notification::Cancelled { restored });
        restored
    }

    /// Removes every stored rule of the domain and un-hides what they matched,
    /// together with anything hidden by the current session. Irreversible.
    pub async fn reset_all_rules(&mut self) -> usize {
        let key = self.rules_key();
        let selectors = match self.store.read(&key).await {
            Ok(selectors) => selectors,
            Err(err) => {
                log::warn!("Could not read rules to reset: {}", err);
                Vec::new()
            }
        };

        let mut cleared = 0;
        for selector in &selectors {
            match self.dom.query_all(selector) {
                Ok(matches) => {
                    for element in matches {
                        self.dom.set_inline_display(&element, "");
                        cleared += 1;
                    }
                }
                Err(err) => log::warn!("Skipping stored rule during reset: {}", err),
            }
        }
        cleared += self.restore_session_elements();

        let removed = self.store.remove(&key).await;
        self.history.clear();
        self.persisted.clear();
        self.deactivate();

        match removed {
            Ok(()) => {
                log::info!("Reset hiding rules for {}", self.domain);
                self.emit(Notification::RulesReset { cleared });
            }
            Err(err) => {
                log::error!("Could not remove rules for {}: {}", self.domain, err);
                self.emit(Notification::ResetFailed);
            }
        }
        cleared
    }

    fn restore_session_elements(&mut self) -> usize {
        let mut restored = 0;
        for (element, display) in self.hidden.drain_for_restore() {
            if self.dom.is_live(&element) {
                self.dom.set_inline_display(&element, &display);
                restored += 1;
            }
        }
        restored
    }

    fn rules_key(&self) -> String {
        storage_key(&self.config.storage.key_prefix, &self.domain)
    }

    fn emit(&self, notification: Notification) -> Notification {
        self.overlay.notify(&notification);
        notification
    }
}
