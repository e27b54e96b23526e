//! Per-frame hover tracking state.
//!
//! `HoverState` knows nothing about documents; callers pass closures that
//! perform the DOM lookups so throttled events never pay for them.

use crate::CursorPosition;

/// Minimum spacing between accepted pointer-over/focus updates.
pub const HOVER_THROTTLE_MS: u64 = 100;
/// Nominal period of the hover-stack fallback poll.
pub const HOVER_POLL_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverUpdate {
    /// Arrived inside the throttle window; nothing was recomputed.
    Throttled,
    /// Accepted, but the target has no enclosing anchor.
    NoLink,
    /// `last_href` was overwritten.
    Updated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverState {
    last_href: String,
    last_update_ms: Option<u64>,
    pointer: Option<CursorPosition>,
    throttle_ms: u64,
}

impl Default for HoverState {
    fn default() -> Self {
        Self::with_throttle(HOVER_THROTTLE_MS)
    }
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_throttle(throttle_ms: u64) -> Self {
        Self {
            last_href: String::new(),
            last_update_ms: None,
            pointer: None,
            throttle_ms,
        }
    }

    pub fn last_href(&self) -> &str {
        &self.last_href
    }

    pub fn last_update_ms(&self) -> Option<u64> {
        self.last_update_ms
    }

    pub fn pointer(&self) -> Option<CursorPosition> {
        self.pointer
    }

    /// Applies a pointer-over or focus-change event observed at `now_ms`.
    ///
    /// An accepted event consumes the throttle window even when `target_href`
    /// finds no anchor.
    pub fn record_event<F>(&mut self, now_ms: u64, target_href: F) -> HoverUpdate
    where
        F: FnOnce() -> Option<String>,
    {
        if let Some(last) = self.last_update_ms {
            if now_ms.saturating_sub(last) < self.throttle_ms {
                return HoverUpdate::Throttled;
            }
        }
        self.last_update_ms = Some(now_ms);
        match target_href().filter(|href| !href.is_empty()) {
            Some(href) => {
                self.last_href = href;
                HoverUpdate::Updated
            }
            None => HoverUpdate::NoLink,
        }
    }

    pub fn record_pointer(&mut self, position: CursorPosition) {
        self.pointer = Some(position);
    }

    /// Result of the fallback poll. Returns true when `last_href` changed.
    pub fn record_poll(&mut self, href: Option<String>) -> bool {
        match href.filter(|href| !href.is_empty()) {
            Some(href) if href != self.last_href => {
                self.last_href = href;
                true
            }
            _ => false,
        }
    }

    /// Answers a hovered-link query: element under the pointer, then the cached
    /// href, then the focused element. Empty when nothing resolves.
    pub fn resolve<P, F>(&self, at_pointer: P, focused: F) -> String
    where
        P: FnOnce(CursorPosition) -> Option<String>,
        F: FnOnce() -> Option<String>,
    {
        if let Some(href) = self
            .pointer
            .and_then(at_pointer)
            .filter(|href| !href.is_empty())
        {
            return href;
        }
        if !self.last_href.is_empty() {
            return self.last_href.clone();
        }
        focused()
            .filter(|href| !href.is_empty())
            .unwrap_or_default()
    }

    /// Frame teardown or navigation.
    pub fn reset(&mut self) {
        *self = Self::with_throttle(self.throttle_ms);
    }
}
