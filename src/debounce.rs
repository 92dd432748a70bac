//! Interrupt-masking debounce.
//!
//! The first edge on the button line masks further edge notifications and arms
//! the settle timer. Whatever the contacts do during the settle period is never
//! seen. When the timer expires the transition is confirmed, the line is made
//! sensitive to the opposite edge and notifications are enabled again.
//!
//! The state machine itself is the pure [`transition`] function; the
//! [`DebounceController`] applies its effects to a button line and a settle timer.

use heapless::Vec;

use crate::hardware::traits::{Edge, EdgeNotifier, TimerChannel};
use crate::settle::SettleTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    /// Released and watching for a press edge.
    #[default]
    Idle,
    /// A press edge was seen; the settle timer is running.
    AwaitingFallingEdge,
    /// The press is confirmed; watching for and then settling the release edge.
    AwaitingRisingEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input {
    RawEdge,
    SettleExpired,
}

/// A debounced button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Confirmed {
    Press,
    Release,
}

/// Side effect of a transition, in the order it must be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    DisableNotification,
    ArmSettle,
    ClearPending,
    SetEdge(Edge),
    Confirm(Confirmed),
    EnableNotification,
    FinishSettle,
}

pub type Effects = Vec<Effect, 5>;

/// Next state and effects for `input` in `state`.
///
/// `settling` tells whether a settle period is running, which is when the
/// line is masked: a raw edge during it yields no effects, in either the
/// press or the release settle, and an expiry outside it is spurious and
/// yields none either. `press_edge` is the electrical edge a press produces
/// (falling for a button against a pull-up).
pub fn transition(
    state: ButtonState,
    input: Input,
    settling: bool,
    press_edge: Edge,
) -> (ButtonState, Effects) {
    let mut effects = Effects::new();
    let mut emit = |effect| {
        // Capacity covers the longest branch below.
        let _ = effects.push(effect);
    };

    let next = match (state, input, settling) {
        (_, Input::RawEdge, true) | (_, Input::SettleExpired, false) => state,
        (ButtonState::Idle, Input::RawEdge, false) => {
            emit(Effect::DisableNotification);
            emit(Effect::ArmSettle);
            ButtonState::AwaitingFallingEdge
        }
        (ButtonState::AwaitingRisingEdge, Input::RawEdge, false) => {
            emit(Effect::DisableNotification);
            emit(Effect::ArmSettle);
            ButtonState::AwaitingRisingEdge
        }
        // Never reached: this state is only entered by arming the timer.
        (ButtonState::AwaitingFallingEdge, Input::RawEdge, false) => state,
        (ButtonState::AwaitingFallingEdge, Input::SettleExpired, true) => {
            emit(Effect::SetEdge(press_edge.opposite()));
            emit(Effect::Confirm(Confirmed::Press));
            emit(Effect::EnableNotification);
            emit(Effect::FinishSettle);
            ButtonState::AwaitingRisingEdge
        }
        (ButtonState::AwaitingRisingEdge, Input::SettleExpired, true) => {
            emit(Effect::ClearPending);
            emit(Effect::SetEdge(press_edge));
            emit(Effect::Confirm(Confirmed::Release));
            emit(Effect::EnableNotification);
            emit(Effect::FinishSettle);
            ButtonState::Idle
        }
        (ButtonState::Idle, Input::SettleExpired, true) => ButtonState::Idle,
    };

    (next, effects)
}

/// Applies [`transition`] to a button line and its settle timer.
pub struct DebounceController<L, T> {
    state: ButtonState,
    press_edge: Edge,
    line: L,
    settle: SettleTimer<T>,
}

impl<L, T> DebounceController<L, T>
where
    L: EdgeNotifier,
    T: TimerChannel,
{
    /// Takes over `line`, making it sensitive to `press_edge` with notifications on.
    pub fn new(mut line: L, settle: SettleTimer<T>, press_edge: Edge) -> Self {
        line.clear_pending();
        line.set_edge(press_edge);
        line.enable_notification();

        Self {
            state: ButtonState::Idle,
            press_edge,
            line,
            settle,
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn settle(&self) -> &SettleTimer<T> {
        &self.settle
    }

    pub fn line(&self) -> &L {
        &self.line
    }

    /// Handles an edge notification. Returns `true` if it started a settle period.
    pub fn on_raw_edge(&mut self) -> bool {
        let started = self.step(Input::RawEdge, |_| {});
        if !started {
            trace!("raw edge masked while settling");
        }
        started
    }

    /// Handles the settle timer expiry. An expiry with no countdown running is ignored.
    ///
    /// `on_confirm` runs for a confirmed transition before the timer is reset
    /// and the line is re-enabled, so everything it does is complete before
    /// the next edge can be observed.
    pub fn on_settle_expired(&mut self, on_confirm: impl FnMut(Confirmed)) -> bool {
        let finished = self.step(Input::SettleExpired, on_confirm);
        if !finished {
            warn!("settle expiry in {:?} without a running countdown", self.state);
        }
        finished
    }

    fn step(&mut self, input: Input, mut on_confirm: impl FnMut(Confirmed)) -> bool {
        let settling = self.settle.is_armed();
        let (next, effects) = transition(self.state, input, settling, self.press_edge);
        self.state = next;

        for effect in &effects {
            match *effect {
                Effect::DisableNotification => self.line.disable_notification(),
                Effect::ArmSettle => {
                    self.settle.arm();
                }
                Effect::ClearPending => self.line.clear_pending(),
                Effect::SetEdge(edge) => self.line.set_edge(edge),
                Effect::Confirm(confirmed) => on_confirm(confirmed),
                Effect::EnableNotification => self.line.enable_notification(),
                Effect::FinishSettle => {
                    self.settle.finish();
                }
            }
        }

        !effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec as StdVec;

    use super::*;
    use crate::hardware::mock::{LineOp, MockLine, MockTimer};

    fn controller() -> DebounceController<MockLine, MockTimer> {
        let settle = SettleTimer::new(MockTimer::default(), 250_000, 2_500);
        DebounceController::new(MockLine::default(), settle, Edge::Falling)
    }

    #[test]
    fn press_settles_into_awaiting_release() {
        let (next, effects) = transition(ButtonState::Idle, Input::RawEdge, false, Edge::Falling);
        assert_eq!(next, ButtonState::AwaitingFallingEdge);
        assert_eq!(effects, [Effect::DisableNotification, Effect::ArmSettle]);

        let (next, effects) = transition(next, Input::SettleExpired, true, Edge::Falling);
        assert_eq!(next, ButtonState::AwaitingRisingEdge);
        assert_eq!(
            effects,
            [
                Effect::SetEdge(Edge::Rising),
                Effect::Confirm(Confirmed::Press),
                Effect::EnableNotification,
                Effect::FinishSettle,
            ]
        );
    }

    #[test]
    fn release_returns_to_idle() {
        let (next, _) =
            transition(ButtonState::AwaitingRisingEdge, Input::RawEdge, false, Edge::Falling);
        assert_eq!(next, ButtonState::AwaitingRisingEdge);

        let (next, effects) = transition(next, Input::SettleExpired, true, Edge::Falling);
        assert_eq!(next, ButtonState::Idle);
        assert_eq!(
            effects,
            [
                Effect::ClearPending,
                Effect::SetEdge(Edge::Falling),
                Effect::Confirm(Confirmed::Release),
                Effect::EnableNotification,
                Effect::FinishSettle,
            ]
        );
    }

    #[test]
    fn active_high_button_flips_the_other_way() {
        let (_, effects) =
            transition(ButtonState::AwaitingFallingEdge, Input::SettleExpired, true, Edge::Rising);
        assert_eq!(effects[0], Effect::SetEdge(Edge::Falling));
    }

    #[test]
    fn masked_and_spurious_inputs_have_no_effect() {
        let (next, effects) =
            transition(ButtonState::AwaitingFallingEdge, Input::RawEdge, true, Edge::Falling);
        assert_eq!(next, ButtonState::AwaitingFallingEdge);
        assert!(effects.is_empty());

        let (next, effects) =
            transition(ButtonState::Idle, Input::SettleExpired, false, Edge::Falling);
        assert_eq!(next, ButtonState::Idle);
        assert!(effects.is_empty());

        let (next, effects) =
            transition(ButtonState::AwaitingRisingEdge, Input::SettleExpired, false, Edge::Falling);
        assert_eq!(next, ButtonState::AwaitingRisingEdge);
        assert!(effects.is_empty());
    }

    #[test]
    fn release_bounces_are_masked_while_settling() {
        let (next, effects) =
            transition(ButtonState::AwaitingRisingEdge, Input::RawEdge, false, Edge::Falling);
        assert_eq!(next, ButtonState::AwaitingRisingEdge);
        assert_eq!(effects, [Effect::DisableNotification, Effect::ArmSettle]);

        for _ in 0..10 {
            let (again, effects) = transition(next, Input::RawEdge, true, Edge::Falling);
            assert_eq!(again, ButtonState::AwaitingRisingEdge);
            assert!(effects.is_empty());
        }

        let (next, effects) = transition(next, Input::SettleExpired, true, Edge::Falling);
        assert_eq!(next, ButtonState::Idle);
        assert!(effects.contains(&Effect::Confirm(Confirmed::Release)));
    }

    #[test]
    fn controller_starts_watching_press_edge() {
        let c = controller();
        assert_eq!(c.state(), ButtonState::Idle);
        assert!(c.line().enabled);
        assert!(!c.line().rising);
    }

    #[test]
    fn bounces_within_settle_period_confirm_one_press() {
        let mut c = controller();
        let mut confirmed = StdVec::new();

        assert!(c.on_raw_edge());
        for _ in 0..25 {
            assert!(!c.on_raw_edge());
        }
        assert!(c.settle().is_armed());
        assert!(!c.line().enabled);

        c.on_settle_expired(|t| confirmed.push(t));
        assert_eq!(confirmed, [Confirmed::Press]);
        assert!(!c.settle().is_armed());
        assert!(c.line().enabled);
        assert!(c.line().rising);
    }

    #[test]
    fn press_and_release_strictly_alternate() {
        let mut c = controller();
        let mut confirmed = StdVec::new();

        for _ in 0..4 {
            for _ in 0..3 {
                c.on_raw_edge();
            }
            c.on_settle_expired(|t| confirmed.push(t));
            // Spurious expiry with nothing armed.
            c.on_settle_expired(|t| confirmed.push(t));
        }

        assert_eq!(
            confirmed,
            [Confirmed::Press, Confirmed::Release, Confirmed::Press, Confirmed::Release]
        );
        assert_eq!(c.state(), ButtonState::Idle);
    }

    #[test]
    fn press_flips_line_to_release_edge() {
        let mut c = controller();
        c.on_raw_edge();
        assert_eq!(c.line().ops.last(), Some(&LineOp::Disable));
        let before = c.line().ops.len();

        c.on_settle_expired(|_| {});
        assert_eq!(&c.line().ops[before..], [LineOp::Edge(Edge::Rising), LineOp::Enable]);
    }

    #[test]
    fn release_clears_pending_flag() {
        let mut c = controller();
        c.on_raw_edge();
        c.on_settle_expired(|_| {});
        c.on_raw_edge();
        let before = c.line().ops.len();
        c.on_settle_expired(|_| {});

        assert_eq!(
            &c.line().ops[before..],
            [LineOp::ClearPending, LineOp::Edge(Edge::Falling), LineOp::Enable]
        );
    }
}
