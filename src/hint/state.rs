//! The scroll-hint state machine, as pure data.
//!
//! Nine states, two events. The transition function and the timer table are
//! side-effect free; persistence and timer scheduling live in the driver
//! ([`super::ScrollHint`]), so the machine's correctness is testable without
//! any timers.

use crate::config::ScrollHintConfig;

/// States of the scroll-hint affordance. The hint shows at most twice per
/// document; whether this device has ever interacted it away is remembered
/// across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintState {
    /// Seeded: a previous session already dismissed or ignored the hint.
    /// Terminal — the hint never shows again on this device.
    InitiallyHiddenSeenBefore,
    /// Seeded: no prior exposure. The first-appearance timer is pending.
    InitiallyHiddenNotSeen,
    /// The reader interacted before the hint ever showed. Terminal for this
    /// session.
    InitiallyHiddenAfterInteraction,
    /// First appearance, on screen.
    FirstTimeVisible,
    /// First appearance dismissed by interaction. Terminal for this session.
    FirstTimeHiddenAfterInteraction,
    /// First appearance timed out with no interaction; the second-appearance
    /// timer is pending.
    FirstTimeHiddenIgnored,
    /// Second appearance, on screen.
    SecondTimeVisible,
    /// Second appearance dismissed by interaction. Terminal.
    SecondTimeHiddenAfterInteraction,
    /// Second appearance timed out. Terminal — no further timers.
    SecondTimeHiddenIgnored,
}

/// Events the machine reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintEvent {
    /// The timer pending for the current state elapsed.
    TimerElapsed,
    /// The reader scrolled, navigated, or otherwise engaged.
    Focus,
}

impl HintState {
    /// Stable string form, used as the persisted value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitiallyHiddenSeenBefore => "InitiallyHiddenSeenBefore",
            Self::InitiallyHiddenNotSeen => "InitiallyHiddenNotSeen",
            Self::InitiallyHiddenAfterInteraction => "InitiallyHiddenAfterInteraction",
            Self::FirstTimeVisible => "FirstTimeVisible",
            Self::FirstTimeHiddenAfterInteraction => "FirstTimeHiddenAfterInteraction",
            Self::FirstTimeHiddenIgnored => "FirstTimeHiddenIgnored",
            Self::SecondTimeVisible => "SecondTimeVisible",
            Self::SecondTimeHiddenAfterInteraction => "SecondTimeHiddenAfterInteraction",
            Self::SecondTimeHiddenIgnored => "SecondTimeHiddenIgnored",
        }
    }

    /// Parse a persisted value. Unrecognized input is `None` (treated as
    /// never-seen by the seeding logic, not an error).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "InitiallyHiddenSeenBefore" => Some(Self::InitiallyHiddenSeenBefore),
            "InitiallyHiddenNotSeen" => Some(Self::InitiallyHiddenNotSeen),
            "InitiallyHiddenAfterInteraction" => Some(Self::InitiallyHiddenAfterInteraction),
            "FirstTimeVisible" => Some(Self::FirstTimeVisible),
            "FirstTimeHiddenAfterInteraction" => Some(Self::FirstTimeHiddenAfterInteraction),
            "FirstTimeHiddenIgnored" => Some(Self::FirstTimeHiddenIgnored),
            "SecondTimeVisible" => Some(Self::SecondTimeVisible),
            "SecondTimeHiddenAfterInteraction" => Some(Self::SecondTimeHiddenAfterInteraction),
            "SecondTimeHiddenIgnored" => Some(Self::SecondTimeHiddenIgnored),
            _ => None,
        }
    }

    /// Whether the affordance is on screen in this state.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::FirstTimeVisible | Self::SecondTimeVisible)
    }

    /// Whether an interaction has dismissed the hint in this state.
    pub fn is_after_interaction(self) -> bool {
        matches!(
            self,
            Self::InitiallyHiddenAfterInteraction
                | Self::FirstTimeHiddenAfterInteraction
                | Self::SecondTimeHiddenAfterInteraction
        )
    }
}

/// Pure transition function.
pub fn transition(state: HintState, event: HintEvent) -> HintState {
    use HintState as S;
    match event {
        HintEvent::TimerElapsed => match state {
            S::InitiallyHiddenNotSeen => S::FirstTimeVisible,
            S::FirstTimeVisible => S::FirstTimeHiddenIgnored,
            S::FirstTimeHiddenIgnored => S::SecondTimeVisible,
            S::SecondTimeVisible => S::SecondTimeHiddenIgnored,
            // No timer is ever pending here; a stray firing is a no-op.
            other => other,
        },
        HintEvent::Focus => match state {
            S::InitiallyHiddenNotSeen => S::InitiallyHiddenAfterInteraction,
            S::FirstTimeVisible => S::FirstTimeHiddenAfterInteraction,
            S::FirstTimeHiddenIgnored | S::FirstTimeHiddenAfterInteraction => {
                S::SecondTimeHiddenAfterInteraction
            }
            S::SecondTimeVisible | S::SecondTimeHiddenIgnored => {
                S::SecondTimeHiddenAfterInteraction
            }
            other => other,
        },
    }
}

/// Which timer should be pending for `state`, if any. States beyond the
/// second cycle and all interaction states are sticky.
pub fn timer_delay(state: HintState, config: &ScrollHintConfig) -> Option<u64> {
    match state {
        HintState::InitiallyHiddenNotSeen => Some(config.first_appear_after_inactivity_ms),
        HintState::FirstTimeVisible => Some(config.first_disappear_after_inactivity_ms),
        HintState::FirstTimeHiddenIgnored => Some(config.second_appear_after_inactivity_ms),
        HintState::SecondTimeVisible => Some(config.second_disappear_after_inactivity_ms),
        _ => None,
    }
}

/// Seed the machine from the persisted value. Prior exposure — any
/// after-interaction or ignored value, or a persisted seen-before marker —
/// collapses to [`HintState::InitiallyHiddenSeenBefore`]; anything else
/// (absent, unrecognized, mid-cycle) seeds [`HintState::InitiallyHiddenNotSeen`].
pub fn seed(persisted: Option<&str>) -> HintState {
    match persisted.and_then(HintState::parse) {
        Some(state)
            if state.is_after_interaction()
                || matches!(
                    state,
                    HintState::FirstTimeHiddenIgnored
                        | HintState::SecondTimeHiddenIgnored
                        | HintState::InitiallyHiddenSeenBefore
                ) =>
        {
            HintState::InitiallyHiddenSeenBefore
        }
        _ => HintState::InitiallyHiddenNotSeen,
    }
}
