use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;

use super::*;
use crate::config::{ConfigPatch, LockAxis, StickConfig, StickMode, ZoneSpec};
use crate::error::StickError;
use crate::geometry::{Rect, Vec2};
use crate::haptics::{CountingHaptics, NoHaptics};
use crate::pointer::{PointerId, PointerInput, TouchPoint};
use crate::snapshot::Snapshot;
use crate::surface::{HeadlessProbe, HeadlessSurface};
use crate::zones::ZoneWarning;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Start(Snapshot),
    Change(Snapshot),
    End(Snapshot),
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    fn callbacks(&self) -> Callbacks {
        let start = self.events.clone();
        let change = self.events.clone();
        let end = self.events.clone();
        Callbacks {
            on_start: Some(Arc::new(move |s: &Snapshot| start.lock().push(Event::Start(s.clone())))),
            on_change: Some(Arc::new(move |s: &Snapshot| change.lock().push(Event::Change(s.clone())))),
            on_end: Some(Arc::new(move |s: &Snapshot| end.lock().push(Event::End(s.clone())))),
        }
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn starts(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, Event::Start(_))).count()
    }

    fn ends(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, Event::End(_))).count()
    }

    fn changes(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, Event::Change(_))).count()
    }

    fn clear(&self) {
        self.events.lock().clear();
    }
}

fn config() -> StickConfig {
    StickConfig {
        width: 140.0,
        height: 140.0,
        handle_radius: 20.0,
        ..StickConfig::default()
    }
}

struct Fixture {
    joystick: Joystick,
    probe: HeadlessProbe,
    haptics: CountingHaptics,
    recorder: Recorder,
}

fn fixture_with(config: StickConfig, container: Rect) -> Fixture {
    let surface = HeadlessSurface::new(container);
    let probe = surface.probe();
    let haptics = CountingHaptics::new();
    let recorder = Recorder::default();

    let mut joystick = Joystick::new(Box::new(surface), Box::new(haptics.clone()), config).unwrap();
    joystick.set_callbacks(recorder.callbacks());

    Fixture {
        joystick,
        probe,
        haptics,
        recorder,
    }
}

fn fixture(config: StickConfig) -> Fixture {
    fixture_with(config, Rect::new(0.0, 0.0, 140.0, 140.0))
}

fn mouse_down(x: f64, y: f64) -> PointerInput {
    PointerInput::MouseDown {
        position: Vec2::new(x, y),
    }
}

fn mouse_move(x: f64, y: f64) -> PointerInput {
    PointerInput::MouseMove {
        position: Vec2::new(x, y),
        primary_down: None,
    }
}

fn mouse_up(x: f64, y: f64) -> PointerInput {
    PointerInput::MouseUp {
        position: Vec2::new(x, y),
    }
}

fn touch_start(id: i64, x: f64, y: f64) -> PointerInput {
    PointerInput::TouchStart {
        changed: vec![TouchPoint::new(id, x, y)],
    }
}

fn touch_move(id: i64, x: f64, y: f64) -> PointerInput {
    PointerInput::TouchMove {
        changed: vec![TouchPoint::new(id, x, y)],
        active: None,
    }
}

fn touch_end(id: i64, x: f64, y: f64) -> PointerInput {
    PointerInput::TouchEnd {
        changed: vec![TouchPoint::new(id, x, y)],
    }
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 140.0, 140.0));
    let probe = surface.probe();
    let bad = StickConfig {
        deadzone: 1.5,
        ..config()
    };

    let result = Joystick::new(Box::new(surface), Box::new(NoHaptics), bad);
    assert!(matches!(result, Err(StickError::Configuration(_))));
    // Nothing was attached
    assert!(!probe.state().attached);
}

#[test]
fn test_new_rejects_missing_attach_point() {
    let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 0.0, 0.0));
    let result = Joystick::new(Box::new(surface), Box::new(NoHaptics), config());
    assert!(matches!(result, Err(StickError::Configuration(_))));
}

#[test]
fn test_new_skips_invalid_zones() {
    let cfg = StickConfig {
        zones: vec![
            ZoneSpec::new("inner", 0.0, 0.5),
            ZoneSpec::new("inverted", 0.9, 0.2),
            ZoneSpec::new("inner", 0.5, 1.0),
        ],
        ..config()
    };
    let f = fixture(cfg);

    assert_eq!(f.joystick.zone_warnings().len(), 2);
    assert_eq!(f.probe.state().zones.len(), 1);
    assert_eq!(f.probe.state().zones[0].outer_radius, 25.0);
}

#[test]
fn test_initial_state_is_neutral() {
    let f = fixture(config());
    let state = f.joystick.state();

    assert!(state.is_neutral());
    assert!(!state.pressed);
    assert!(!f.joystick.is_active());
    assert_eq!(f.joystick.max_radius(), 50.0);
    assert!(f.recorder.events().is_empty());
}

// =============================================================================
// Input
// =============================================================================

#[test]
fn test_drag_right_reports_expected_vector() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));

    let state = f.joystick.state();
    assert!((state.delta.x - 0.8).abs() < EPS);
    assert_eq!(state.delta.y, 0.0);
    assert!((state.distance - 0.8).abs() < EPS);
    assert_eq!(state.angle, 0.0);
    assert_eq!(state.position, Vec2::new(40.0, 0.0));
    assert!(state.pressed);
    assert_eq!(f.probe.state().handle_offset, Vec2::new(40.0, 0.0));
}

#[test]
fn test_press_emits_change_then_start() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));

    let events = f.recorder.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], Event::Change(s) if s.pressed));
    assert!(matches!(&events[1], Event::Start(s) if s.pressed && s.is_neutral()));
}

#[test]
fn test_one_start_and_one_end_per_session() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_down(80.0, 70.0));
    for x in [80.0, 90.0, 100.0] {
        f.joystick.handle_input(&mouse_move(x, 70.0));
    }
    f.joystick.handle_input(&mouse_up(100.0, 70.0));
    f.joystick.handle_input(&mouse_up(100.0, 70.0));

    assert_eq!(f.recorder.starts(), 1);
    assert_eq!(f.recorder.ends(), 1);
    assert!(!f.joystick.is_active());
}

#[test]
fn test_release_with_auto_center_ends_neutral() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    f.recorder.clear();
    f.joystick.handle_input(&mouse_up(110.0, 70.0));

    let events = f.recorder.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], Event::Change(s) if s.is_neutral() && !s.pressed));
    assert!(matches!(&events[1], Event::End(s) if s.is_neutral() && !s.pressed));
    assert_eq!(f.probe.state().handle_offset, Vec2::ZERO);
    assert!(!f.probe.state().pressed);
}

#[test]
fn test_release_without_auto_center_keeps_vector() {
    let mut f = fixture(StickConfig {
        auto_center: false,
        ..config()
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    f.recorder.clear();
    f.joystick.handle_input(&mouse_up(110.0, 70.0));

    let events = f.recorder.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], Event::End(s) if !s.pressed && (s.delta.x - 0.8).abs() < EPS));
}

#[test]
fn test_second_touch_is_ignored() {
    let mut f = fixture(config());

    f.joystick.handle_input(&touch_start(1, 70.0, 70.0));
    f.joystick.handle_input(&touch_start(2, 10.0, 10.0));
    f.joystick.handle_input(&touch_move(2, 10.0, 70.0));
    assert!(f.joystick.state().is_neutral());

    f.joystick.handle_input(&touch_end(2, 10.0, 70.0));
    assert!(f.joystick.is_active());
    assert_eq!(f.joystick.tracked_pointer(), Some(PointerId::Touch(1)));

    f.joystick.handle_input(&touch_move(1, 70.0, 100.0));
    assert!((f.joystick.state().delta.y - 0.6).abs() < EPS);

    f.joystick.handle_input(&touch_end(1, 70.0, 100.0));
    assert!(!f.joystick.is_active());
    assert_eq!(f.recorder.starts(), 1);
    assert_eq!(f.recorder.ends(), 1);
}

#[test]
fn test_mouse_ignored_while_touch_active() {
    let mut f = fixture(config());

    f.joystick.handle_input(&touch_start(7, 70.0, 70.0));
    f.joystick.handle_input(&mouse_down(0.0, 0.0));
    f.joystick.handle_input(&mouse_move(0.0, 70.0));
    f.joystick.handle_input(&mouse_up(0.0, 70.0));

    assert_eq!(f.joystick.tracked_pointer(), Some(PointerId::Touch(7)));
    assert!(f.joystick.state().is_neutral());
}

#[test]
fn test_lost_contact_ends_session() {
    let mut f = fixture(config());

    f.joystick.handle_input(&touch_start(3, 70.0, 70.0));
    f.joystick.handle_input(&PointerInput::TouchMove {
        changed: vec![TouchPoint::new(9, 0.0, 0.0)],
        active: Some(vec![9]),
    });

    assert!(!f.joystick.is_active());
    assert_eq!(f.recorder.ends(), 1);

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&PointerInput::MouseMove {
        position: Vec2::new(90.0, 70.0),
        primary_down: Some(false),
    });
    assert!(!f.joystick.is_active());
    assert_eq!(f.recorder.ends(), 2);
}

#[test]
fn test_axis_lock_x_zeroes_vertical() {
    let mut f = fixture(StickConfig {
        lock_axis: LockAxis::X,
        ..config()
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(100.0, 110.0));

    let state = f.joystick.state();
    assert!((state.delta.x - 0.6).abs() < EPS);
    assert_eq!(state.delta.y, 0.0);
    assert_eq!(state.position.y, 0.0);
}

#[test]
fn test_axis_lock_survives_clamp_in_negative_direction() {
    let mut f = fixture(StickConfig {
        lock_axis: LockAxis::X,
        boundaries: true,
        ..config()
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(-100.0, 90.0));

    let state = f.joystick.state();
    assert_eq!(state.delta.y, 0.0);
    assert_eq!(state.position.y, 0.0);
    assert!((state.delta.x + 1.0).abs() < EPS);
    assert_eq!(state.distance, 1.0);

    f.joystick.set_option("lockAxis", json!("y")).unwrap();
    f.joystick.handle_input(&mouse_move(90.0, -100.0));

    let state = f.joystick.state();
    assert_eq!(state.delta.x, 0.0);
    assert_eq!(state.position.x, 0.0);
    assert!((state.delta.y + 1.0).abs() < EPS);
}

#[test]
fn test_boundaries_clamp_handle() {
    let mut f = fixture(StickConfig {
        boundaries: true,
        ..config()
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(70.0, 170.0));

    let state = f.joystick.state();
    assert_eq!(state.distance, 1.0);
    assert!((state.delta.y - 1.0).abs() < EPS);
    assert!((state.position.y - 50.0).abs() < EPS);
}

#[test]
fn test_deadzone_zeroes_small_moves() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(72.0, 70.0));

    let state = f.joystick.state();
    assert_eq!(state.delta, Vec2::ZERO);
    assert_eq!(state.distance, 0.0);
}

#[test]
fn test_dynamic_mode_anchors_at_press_point() {
    let mut f = fixture_with(
        StickConfig {
            mode: StickMode::Dynamic,
            ..config()
        },
        Rect::new(0.0, 0.0, 400.0, 400.0),
    );

    f.joystick.handle_input(&mouse_down(300.0, 300.0));
    assert!(f.joystick.state().is_neutral());
    assert_eq!(f.joystick.layout().center(), Vec2::new(300.0, 300.0));

    f.joystick.handle_input(&mouse_move(300.0, 270.0));
    let state = f.joystick.state();
    assert!((state.delta.y + 0.6).abs() < EPS);
    assert!((state.angle + std::f64::consts::FRAC_PI_2).abs() < EPS);
}

// =============================================================================
// Zones and haptics
// =============================================================================

fn zoned() -> StickConfig {
    StickConfig {
        zones: vec![
            ZoneSpec::new("walk", 0.1, 0.5),
            ZoneSpec::new("run", 0.5, 1.0),
        ],
        ..config()
    }
}

#[test]
fn test_zone_changes_pulse_once_each() {
    let mut f = fixture(zoned());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    assert_eq!(f.joystick.state().zone, None);
    assert_eq!(f.haptics.pulses(), 0);

    f.joystick.handle_input(&mouse_move(85.0, 70.0));
    assert_eq!(f.joystick.state().zone.as_deref(), Some("walk"));
    assert_eq!(f.haptics.pulses(), 1);

    f.joystick.handle_input(&mouse_move(88.0, 70.0));
    assert_eq!(f.haptics.pulses(), 1);

    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    assert_eq!(f.joystick.state().zone.as_deref(), Some("run"));
    assert_eq!(f.haptics.pulses(), 2);

    // Leaving every zone is a change too
    f.joystick.handle_input(&mouse_move(71.0, 70.0));
    assert_eq!(f.joystick.state().zone, None);
    assert_eq!(f.haptics.pulses(), 3);
}

#[test]
fn test_vibration_disabled_suppresses_pulses() {
    let mut f = fixture(StickConfig {
        vibration: false,
        ..zoned()
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));

    assert_eq!(f.joystick.state().zone.as_deref(), Some("run"));
    assert_eq!(f.haptics.pulses(), 0);
}

#[test]
fn test_zone_indicators_follow_max_radius() {
    let f = fixture(zoned());
    let zones = f.probe.state().zones;

    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].inner_radius, 5.0);
    assert_eq!(zones[0].outer_radius, 25.0);
    assert_eq!(zones[1].outer_radius, 50.0);
}

// =============================================================================
// Operations
// =============================================================================

#[test]
fn test_reset_position_broadcasts_neutral() {
    let mut f = fixture(zoned());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    f.recorder.clear();

    f.joystick.reset_position();

    let events = f.recorder.events();
    assert_eq!(events.len(), 1);
    let Event::Change(state) = &events[0] else {
        panic!("expected a change event, got {:?}", events[0]);
    };
    assert!(state.is_neutral());
    assert!(state.pressed);
    assert!(f.joystick.is_active());
    assert_eq!(f.probe.state().handle_offset, Vec2::ZERO);
}

#[test]
fn test_tick_emits_only_while_active() {
    let mut f = fixture(config());

    f.joystick.tick();
    assert_eq!(f.recorder.changes(), 0);

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.recorder.clear();
    f.joystick.tick();
    f.joystick.tick();
    assert_eq!(f.recorder.changes(), 2);

    f.joystick.handle_input(&mouse_up(70.0, 70.0));
    f.recorder.clear();
    f.joystick.tick();
    assert!(f.recorder.events().is_empty());
}

#[test]
fn test_resize_reprojects_active_session() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    assert!((f.joystick.state().delta.x - 0.8).abs() < EPS);

    // Container doubles around the same center
    f.probe.set_container(Rect::new(-70.0, -70.0, 280.0, 280.0));
    f.joystick.rescale();

    assert_eq!(f.joystick.max_radius(), 120.0);
    assert_eq!(f.joystick.layout().center(), Vec2::new(70.0, 70.0));
    let state = f.joystick.state();
    assert!((state.delta.x - 40.0 / 120.0).abs() < EPS);
    assert!(state.pressed);
    assert!(f.joystick.is_active());
}

#[test]
fn test_resize_broadcasts_reprojected_vector() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    f.recorder.clear();

    f.probe.set_container(Rect::new(-70.0, -70.0, 280.0, 280.0));
    f.joystick.rescale();

    assert_eq!(f.recorder.events(), vec![Event::Change(f.joystick.state())]);
}

#[test]
fn test_idle_rescale_with_auto_center_recenters_once() {
    let mut f = fixture(StickConfig {
        auto_center: false,
        ..config()
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    f.joystick.handle_input(&mouse_up(110.0, 70.0));
    assert!(!f.joystick.state().is_neutral());
    f.recorder.clear();

    assert_eq!(f.joystick.set_option("autoCenter", json!(true)), Ok(true));

    assert!(f.joystick.state().is_neutral());
    assert_eq!(f.recorder.changes(), 1);
    assert_eq!(f.recorder.events().len(), 1);
    assert_eq!(f.probe.state().handle_offset, Vec2::ZERO);

    f.joystick.rescale();
    assert_eq!(f.recorder.events().len(), 1);
}

#[test]
fn test_rescale_is_idempotent() {
    let mut f = fixture(config());
    f.probe.set_container(Rect::new(0.0, 0.0, 420.0, 280.0));

    f.joystick.handle_input(&mouse_down(210.0, 140.0));
    f.joystick.handle_input(&mouse_move(240.0, 160.0));

    f.joystick.rescale();
    let first = (f.joystick.state(), f.joystick.layout(), f.joystick.max_radius());
    f.joystick.rescale();
    let second = (f.joystick.state(), f.joystick.layout(), f.joystick.max_radius());

    assert_eq!(first, second);
    assert_eq!(first.1.width, 280.0);
}

#[test]
fn test_rescale_without_responsive_keeps_size() {
    let mut f = fixture(StickConfig {
        responsive: false,
        ..config()
    });

    f.probe.set_container(Rect::new(0.0, 0.0, 500.0, 500.0));
    f.joystick.rescale();

    assert_eq!(f.joystick.layout().width, 140.0);
    assert_eq!(f.joystick.max_radius(), 50.0);
}

#[test]
fn test_set_option_applies_known_names() {
    let mut f = fixture(config());

    assert_eq!(f.joystick.set_option("sensitivity", json!(2.0)), Ok(true));
    assert_eq!(f.joystick.set_option("lockAxis", json!("y")), Ok(true));
    assert_eq!(f.joystick.set_option("handle_radius", json!(30.0)), Ok(true));

    assert_eq!(f.joystick.config().sensitivity, 2.0);
    assert_eq!(f.joystick.config().lock_axis, LockAxis::Y);
    assert_eq!(f.joystick.max_radius(), 40.0);

    assert_eq!(f.joystick.set_option("lockAxis", serde_json::Value::Null), Ok(true));
    assert_eq!(f.joystick.config().lock_axis, LockAxis::None);
}

#[test]
fn test_set_option_unknown_name_is_noop() {
    let mut f = fixture(config());
    let before = f.joystick.config().clone();

    assert_eq!(f.joystick.set_option("color", json!("red")), Ok(false));
    assert_eq!(f.joystick.config(), &before);
}

#[test]
fn test_set_option_invalid_value_is_rejected() {
    let mut f = fixture(config());
    let before = f.joystick.config().clone();

    assert!(matches!(
        f.joystick.set_option("deadzone", json!(2.0)),
        Err(StickError::Configuration(_))
    ));
    assert!(matches!(
        f.joystick.set_option("width", json!("wide")),
        Err(StickError::Configuration(_))
    ));
    assert_eq!(f.joystick.config(), &before);
}

#[test]
fn test_set_option_skips_zone_with_non_numeric_bound() {
    let mut f = fixture(config());

    let zones = json!([
        { "id": "ok", "min": 0, "max": 1 },
        { "id": "bad", "min": "x", "max": 1 }
    ]);
    assert_eq!(f.joystick.set_option("zones", zones), Ok(true));

    assert_eq!(f.probe.state().zones.len(), 1);
    assert_eq!(f.probe.state().zones[0].id, "ok");
    assert!(matches!(
        f.joystick.zone_warnings(),
        [ZoneWarning::MissingBounds { index: 1, .. }]
    ));
}

#[test]
fn test_update_config_rebuilds_zones() {
    let mut f = fixture(config());
    assert!(f.probe.state().zones.is_empty());

    let patch = ConfigPatch {
        zones: Some(vec![ZoneSpec::new("full", 0.0, 1.0).with_color("#f00")]),
        ..ConfigPatch::default()
    };
    f.joystick.update_config(patch).unwrap();

    let zones = f.probe.state().zones;
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].color.as_deref(), Some("#f00"));
}

#[test]
fn test_destroy_stops_callbacks_and_detaches() {
    let mut f = fixture(config());

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.recorder.clear();

    f.joystick.destroy();
    f.joystick.destroy();

    f.joystick.handle_input(&mouse_move(110.0, 70.0));
    f.joystick.tick();
    f.joystick.reset_position();

    assert!(f.recorder.events().is_empty());
    assert!(f.joystick.is_destroyed());
    assert!(!f.probe.state().attached);
    assert_eq!(f.probe.state().detach_count, 1);
    assert_eq!(
        f.joystick.update_config(ConfigPatch::default()),
        Err(StickError::ActorClosed)
    );
}

#[test]
fn test_callbacks_receive_copies() {
    let mut f = fixture(config());
    let seen: Arc<Mutex<Option<Snapshot>>> = Arc::default();
    let sink = seen.clone();

    f.joystick.on_change(move |s| {
        let mut copy = s.clone();
        copy.delta = Vec2::new(9.0, 9.0);
        *sink.lock() = Some(copy);
    });

    f.joystick.handle_input(&mouse_down(70.0, 70.0));
    f.joystick.handle_input(&mouse_move(110.0, 70.0));

    assert_eq!(seen.lock().as_ref().map(|s| s.delta), Some(Vec2::new(9.0, 9.0)));
    assert!((f.joystick.state().delta.x - 0.8).abs() < EPS);
}

// =============================================================================
// Actor
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_actor_reemits_at_refresh_rate() {
    let f = fixture(StickConfig {
        refresh_hz: 10,
        ..config()
    });
    let recorder = f.recorder.clone();
    let handle = JoystickActor::spawn(f.joystick);

    handle.send_input(mouse_down(70.0, 70.0));
    handle.send_input(mouse_move(110.0, 70.0));
    let state = handle.get_state().await.unwrap();
    assert!((state.delta.x - 0.8).abs() < EPS);

    recorder.clear();
    tokio::time::sleep(Duration::from_millis(1050)).await;
    let ticks = recorder.changes();
    assert!((9..=11).contains(&ticks), "got {} ticks", ticks);

    handle.send_input(mouse_up(110.0, 70.0));
    handle.get_state().await.unwrap();
    recorder.clear();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(recorder.changes(), 0);

    handle.destroy().await;
}

#[tokio::test(start_paused = true)]
async fn test_actor_applies_options_and_rescale() {
    let f = fixture(config());
    let probe = f.probe.clone();
    let handle = JoystickActor::spawn(f.joystick);

    assert_eq!(handle.set_option("refreshHz", json!(30)).await, Ok(true));
    assert_eq!(handle.set_option("nope", json!(1)).await, Ok(false));
    assert!(handle.set_option("refreshHz", json!(0)).await.is_err());

    handle.send_input(mouse_down(70.0, 70.0));
    handle.send_input(mouse_move(110.0, 70.0));
    probe.set_container(Rect::new(-70.0, -70.0, 280.0, 280.0));
    handle.rescale();

    let state = handle.get_state().await.unwrap();
    assert!((state.delta.x - 40.0 / 120.0).abs() < EPS);

    handle.reset_position();
    assert!(handle.get_state().await.unwrap().is_neutral());

    handle.destroy().await;
}

#[tokio::test(start_paused = true)]
async fn test_actor_destroy_is_final() {
    let f = fixture(config());
    let probe = f.probe.clone();
    let recorder = f.recorder.clone();
    let handle = JoystickActor::spawn(f.joystick);

    handle.send_input(mouse_down(70.0, 70.0));
    handle.get_state().await.unwrap();

    handle.destroy().await;
    handle.destroy().await;
    recorder.clear();

    handle.send_input(mouse_move(110.0, 70.0));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(!handle.is_alive());
    assert!(recorder.events().is_empty());
    assert_eq!(probe.state().detach_count, 1);
    assert_eq!(handle.get_state().await, Err(StickError::ActorClosed));
}
