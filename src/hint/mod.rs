//! Scroll-hint driver: the state machine wired to persistence and time.
//!
//! The machine itself ([`state`]) is pure; this driver persists every
//! transition, answers "what timer should be pending", suppresses
//! chunk-change detection while the initial layout settles, and keeps the
//! affordance rendered briefly after hiding so the exit animation can play.

mod state;

pub use state::{seed, timer_delay, transition, HintEvent, HintState};

use crate::config::ScrollHintConfig;
use crate::store::KeyValueStore;

/// Local-storage key holding the persisted hint state.
pub const SCROLL_HINT_STORAGE_KEY: &str = "scroll-hint-state";

/// Window after seeding or an after-interaction transition during which
/// active-chunk changes are not treated as interaction. The boundary map
/// shifts a few times while the document first lays out, flapping the active
/// index without any reader involvement.
pub const CHUNK_CHANGE_SUPPRESSION_MS: f64 = 2_000.0;

/// How long the affordance stays rendered (for its exit animation) after it
/// stops being visible.
pub const RENDER_LINGER_MS: f64 = 200.0;

/// The scroll-hint controller for one document view.
pub struct ScrollHint {
    state: HintState,
    config: ScrollHintConfig,
    store: Box<dyn KeyValueStore>,
    suppress_chunk_changes_until: f64,
    render_linger_until: f64,
}

impl ScrollHint {
    /// Seed from persisted storage and persist the seeded state immediately.
    pub fn new(store: Box<dyn KeyValueStore>, config: ScrollHintConfig, now_ms: f64) -> Self {
        let persisted = store.get(SCROLL_HINT_STORAGE_KEY);
        let state = seed(persisted.as_deref());
        let mut hint = Self {
            state,
            config,
            store,
            suppress_chunk_changes_until: now_ms + CHUNK_CHANGE_SUPPRESSION_MS,
            render_linger_until: 0.0,
        };
        hint.persist();
        hint
    }

    pub fn state(&self) -> HintState {
        self.state
    }

    /// Whether the affordance is on screen.
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    /// Whether the affordance should stay in the tree (visible, or hidden
    /// within the exit-animation window).
    pub fn should_render(&self, now_ms: f64) -> bool {
        self.is_visible() || now_ms < self.render_linger_until
    }

    /// Delay of the timer the embedding should have pending for the current
    /// state, or `None` for sticky states.
    pub fn pending_timer_ms(&self) -> Option<u64> {
        timer_delay(self.state, &self.config)
    }

    /// The pending timer elapsed.
    pub fn fire_timer(&mut self, now_ms: f64) {
        self.apply(transition(self.state, HintEvent::TimerElapsed), now_ms);
    }

    /// The reader engaged: scrolled, navigated, tapped the hint away.
    pub fn on_focus(&mut self, now_ms: f64) {
        self.apply(transition(self.state, HintEvent::Focus), now_ms);
    }

    /// The active chunk index changed. Counts as interaction unless it falls
    /// inside the layout-settling suppression window.
    pub fn on_active_chunk_change(&mut self, now_ms: f64) {
        if now_ms < self.suppress_chunk_changes_until {
            return;
        }
        self.on_focus(now_ms);
    }

    fn apply(&mut self, next: HintState, now_ms: f64) {
        if next == self.state {
            return;
        }
        if self.state.is_visible() && !next.is_visible() {
            self.render_linger_until = now_ms + RENDER_LINGER_MS;
        }
        if next.is_after_interaction() {
            self.suppress_chunk_changes_until = now_ms + CHUNK_CHANGE_SUPPRESSION_MS;
        }
        self.state = next;
        self.persist();
    }

    fn persist(&mut self) {
        self.store.set(SCROLL_HINT_STORAGE_KEY, self.state.as_str());
    }
}
