//! Pointer tracking across mouse and touch input
//!
//! Mouse and touch events are folded into one logical drag session. Only one
//! pointer is tracked at a time: the first press wins and every other
//! pointer is ignored until it ends.
//!
//! The tracker only *decides* what an input means ([`PointerTracker::interpret`]);
//! the engine applies the resulting [`Transition`] so that geometry and
//! callbacks stay in one place.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::Vec2;

/// Logical pointer identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerId {
    /// The single implicit mouse pointer
    Mouse,
    /// Native multi-touch identifier
    Touch(i64),
}

/// One touch contact inside a touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i64,
    pub position: Vec2,
}

impl TouchPoint {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
        }
    }
}

/// Raw input delivered by the host, in client coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    MouseDown { position: Vec2 },
    /// `primary_down: Some(false)` reports that the button was released
    /// somewhere the host could not observe (outside the window).
    MouseMove { position: Vec2, primary_down: Option<bool> },
    MouseUp { position: Vec2 },
    TouchStart { changed: Vec<TouchPoint> },
    /// `active` lists every touch still on the screen, when the host knows it.
    TouchMove { changed: Vec<TouchPoint>, active: Option<Vec<i64>> },
    TouchEnd { changed: Vec<TouchPoint> },
    TouchCancel { changed: Vec<TouchPoint> },
    /// Focus or pointer capture lost; ends whatever is tracked
    Lost,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Released,
    Cancelled,
    Lost,
}

/// What an accepted input does to the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Press { pointer: PointerId, position: Vec2 },
    Move { position: Vec2 },
    Release { pointer: PointerId, reason: EndReason },
}

/// Active interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Session {
    pub pointer: PointerId,
    /// Point displacement is measured from
    pub anchor: Vec2,
    /// Last raw pointer position, kept for resize reprojection
    pub last_position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Active(Session),
}

/// Single-pointer state machine
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    state: InteractionState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            InteractionState::Active(session) => Some(session),
            InteractionState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session().is_some()
    }

    fn tracked(&self) -> Option<PointerId> {
        self.session().map(|s| s.pointer)
    }

    /// Decide what `input` means for the current state.
    ///
    /// Returns `None` for inputs that do not belong to the tracked pointer
    /// (or presses while already active); those are dropped silently.
    pub fn interpret(&self, input: &PointerInput) -> Option<Transition> {
        let tracked = self.tracked();

        let transition = match (input, tracked) {
            (PointerInput::MouseDown { position }, None) => Some(Transition::Press {
                pointer: PointerId::Mouse,
                position: *position,
            }),
            (PointerInput::MouseMove { primary_down: Some(false), .. }, Some(PointerId::Mouse)) => {
                Some(Transition::Release {
                    pointer: PointerId::Mouse,
                    reason: EndReason::Lost,
                })
            }
            (PointerInput::MouseMove { position, .. }, Some(PointerId::Mouse)) => {
                Some(Transition::Move { position: *position })
            }
            (PointerInput::MouseUp { .. }, Some(PointerId::Mouse)) => Some(Transition::Release {
                pointer: PointerId::Mouse,
                reason: EndReason::Released,
            }),

            (PointerInput::TouchStart { changed }, None) => changed.first().map(|touch| Transition::Press {
                pointer: PointerId::Touch(touch.id),
                position: touch.position,
            }),
            (PointerInput::TouchMove { changed, active }, Some(PointerId::Touch(id))) => {
                let still_down = active.as_ref().map_or(true, |ids| ids.contains(&id));
                if still_down {
                    find_touch(changed, id).map(|touch| Transition::Move {
                        position: touch.position,
                    })
                } else {
                    Some(Transition::Release {
                        pointer: PointerId::Touch(id),
                        reason: EndReason::Lost,
                    })
                }
            }
            (PointerInput::TouchEnd { changed }, Some(PointerId::Touch(id))) => {
                find_touch(changed, id).map(|_| Transition::Release {
                    pointer: PointerId::Touch(id),
                    reason: EndReason::Released,
                })
            }
            (PointerInput::TouchCancel { changed }, Some(PointerId::Touch(id))) => {
                find_touch(changed, id).map(|_| Transition::Release {
                    pointer: PointerId::Touch(id),
                    reason: EndReason::Cancelled,
                })
            }

            (PointerInput::Lost, Some(pointer)) => Some(Transition::Release {
                pointer,
                reason: EndReason::Lost,
            }),

            _ => None,
        };

        if transition.is_none() {
            trace!(?input, ?tracked, "Dropped pointer input");
        }

        transition
    }

    /// Enter `Active`; ignored when a session already exists
    pub fn begin(&mut self, pointer: PointerId, anchor: Vec2, position: Vec2) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = InteractionState::Active(Session {
            pointer,
            anchor,
            last_position: position,
        });
        true
    }

    /// Record the latest raw position of the tracked pointer
    pub fn record_position(&mut self, position: Vec2) {
        if let InteractionState::Active(session) = &mut self.state {
            session.last_position = position;
        }
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        if let InteractionState::Active(session) = &mut self.state {
            session.anchor = anchor;
        }
    }

    /// Return to `Idle`, yielding the session that ended
    pub fn end(&mut self) -> Option<Session> {
        match std::mem::take(&mut self.state) {
            InteractionState::Active(session) => Some(session),
            InteractionState::Idle => None,
        }
    }
}

fn find_touch(changed: &[TouchPoint], id: i64) -> Option<&TouchPoint> {
    changed.iter().find(|touch| touch.id == id)
}
