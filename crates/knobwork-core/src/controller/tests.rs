use std::{cell::RefCell, rc::Rc, vec::Vec};

use super::*;
use crate::{
    input::{PinId, mock::MockPins},
    value::EncoderMode,
};

type Events = Vec<EncoderEvent>;
type Controller<'a> = EncoderController<'a, MockPins<8>, Events, 4>;

const FORWARD: [QuadState; 4] = [
    QuadState::OnlyB,
    QuadState::BothLow,
    QuadState::OnlyA,
    QuadState::BothHigh,
];

const KNOB_1: EncoderDef = EncoderDef::new(1, 22, 23, 24, 270, 4, false);
const KNOB_2: EncoderDef = EncoderDef::new(2, 18, 19, 24, 270, 4, false);

fn pins_for(defs: &[EncoderDef]) -> MockPins<8> {
    let mut pins = MockPins::new();
    for def in defs {
        assert!(pins.declare(def.pin_a));
        assert!(pins.declare(def.pin_b));
    }
    pins
}

fn controller<'a>(defs: &[EncoderDef]) -> Controller<'a> {
    EncoderController::init(pins_for(defs), defs, ControllerConfig::default()).unwrap()
}

fn record_all(controller: &mut Controller<'_>, defs: &[EncoderDef]) {
    for def in defs {
        controller
            .on_encoder(def.id)
            .unwrap()
            .turn()
            .then(|events: &mut Events, event| events.push(event));
    }
}

/// Drives `ticks` quadrature steps on `def`, polling after each one.
/// Pins rest high, so the phase walk starts from `BothHigh`.
fn turn(
    controller: &mut Controller<'_>,
    events: &mut Events,
    def: &EncoderDef,
    phase: &mut usize,
    ticks: i32,
) {
    for _ in 0..ticks.unsigned_abs() {
        *phase = if ticks > 0 { (*phase + 1) % 4 } else { (*phase + 3) % 4 };
        controller
            .pins_mut()
            .set_phase(def.pin_a, def.pin_b, FORWARD[*phase]);
        controller.update(events);
    }
}

#[test]
fn init_configures_pull_ups_on_every_pin() {
    let mut controller = controller(&[KNOB_1, KNOB_2]);
    assert_eq!(controller.len(), 2);
    assert_eq!(controller.ids().collect::<Vec<_>>(), [1, 2]);
    for pin in [22, 23, 18, 19] {
        assert!(controller.pins_mut().is_pulled_up(pin));
    }
}

#[test]
fn init_rejects_invalid_tables() {
    let cases: [(&[EncoderDef], ConfigError); 4] = [
        (&[KNOB_1, EncoderDef { pin_a: 30, pin_b: 31, ..KNOB_1 }], ConfigError::DuplicateId(1)),
        (&[KNOB_1, EncoderDef { pin_a: 23, ..KNOB_2 }], ConfigError::PinConflict(23)),
        (&[EncoderDef { ppr: 0, ..KNOB_1 }], ConfigError::InvalidPpr(1)),
        (&[KNOB_1, KNOB_2, KNOB_1, KNOB_2, KNOB_1], ConfigError::TooManyEncoders),
    ];

    for (defs, expected) in cases {
        let result = EncoderController::<_, Events, 4>::init(
            MockPins::<8>::new().with_pins(&[22, 23, 18, 19, 30, 31]),
            defs,
            ControllerConfig::default(),
        );
        assert_eq!(result.err(), Some(expected));
    }
}

#[test]
fn init_fails_on_missing_pin_without_running() {
    let pins = MockPins::<8>::new().with_pins(&[22]);
    let result =
        EncoderController::<_, Events, 4>::init(pins, &[KNOB_1], ControllerConfig::default());
    assert_eq!(result.err(), Some(ConfigError::InvalidPin(23)));
}

#[test]
fn empty_table_is_valid_and_idle() {
    let mut controller = controller(&[]);
    let mut events = Events::new();
    assert!(controller.is_empty());
    assert_eq!(controller.update(&mut events), 0);
}

#[test]
fn idle_update_fires_nothing() {
    let mut controller = controller(&[KNOB_1, KNOB_2]);
    record_all(&mut controller, &[KNOB_1, KNOB_2]);
    let mut events = Events::new();
    for _ in 0..100 {
        assert_eq!(controller.update(&mut events), 0);
    }
    assert!(events.is_empty());
}

#[test]
fn only_the_moving_encoder_notifies() {
    let mut controller = controller(&[KNOB_1, KNOB_2]);
    let sent = Rc::new(RefCell::new(Vec::new()));
    for (offset, def) in [KNOB_1, KNOB_2].iter().enumerate() {
        let sent = Rc::clone(&sent);
        let cc = 16 + offset as u8;
        controller
            .on_encoder(def.id)
            .unwrap()
            .turn()
            .then(move |_: &mut Events, event| sent.borrow_mut().push((cc, event.id)));
    }

    let mut events = Events::new();
    let mut phase = 3;
    turn(&mut controller, &mut events, &KNOB_2, &mut phase, 4);

    assert_eq!(*sent.borrow(), [(17, 2)]);
}

#[test]
fn normalized_scenario_rises_monotonically_and_clamps() {
    let mut controller = controller(&[KNOB_1]);
    record_all(&mut controller, &[KNOB_1]);
    let mut events = Events::new();
    let mut phase = 3;

    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 24);
    let values: Vec<f32> = events
        .iter()
        .map(|e| e.value.as_normalized().unwrap())
        .collect();
    assert_eq!(values.len(), 6);
    assert!(values.windows(2).all(|w| w[0] < w[1]));
    assert!(values.iter().all(|v| *v <= 1.0));

    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 400);
    assert_eq!(controller.value(1), Ok(EncoderValue::Normalized(1.0)));
    let notified = events.len();
    assert_eq!(notified, 18);

    // Pinned at the limit: further turning changes nothing.
    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 40);
    assert_eq!(events.len(), notified);
}

#[test]
fn one_notification_per_change_within_a_detent() {
    let mut controller = controller(&[KNOB_1]);
    record_all(&mut controller, &[KNOB_1]);
    let mut events = Events::new();
    let mut phase = 3;

    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 3);
    assert!(events.is_empty());
    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 1);
    assert_eq!(events.len(), 1);
    for _ in 0..10 {
        controller.update(&mut events);
    }
    assert_eq!(events.len(), 1);
}

#[test]
fn bounce_between_opposite_phases_is_ignored() {
    let mut controller = controller(&[KNOB_1]);
    record_all(&mut controller, &[KNOB_1]);
    let mut events = Events::new();

    for _ in 0..50 {
        controller
            .pins_mut()
            .set_phase(22, 23, QuadState::BothLow);
        controller.update(&mut events);
        controller
            .pins_mut()
            .set_phase(22, 23, QuadState::BothHigh);
        controller.update(&mut events);
    }
    assert!(events.is_empty());
    assert_eq!(controller.value(1), Ok(EncoderValue::Normalized(0.0)));
}

#[test]
fn inverted_encoder_mirrors_raw_count() {
    let plain = KNOB_1.with_mode(EncoderMode::Raw);
    let inverted = EncoderDef {
        invert_direction: true,
        ..KNOB_2.with_mode(EncoderMode::Raw)
    };
    let mut controller = controller(&[plain, inverted]);
    let mut events = Events::new();
    let mut phase_1 = 3;
    let mut phase_2 = 3;

    for ticks in [5, -9, 13, 2, -1] {
        turn(&mut controller, &mut events, &plain, &mut phase_1, ticks);
        turn(&mut controller, &mut events, &inverted, &mut phase_2, ticks);
    }

    let raw_1 = controller.value(1).unwrap().as_steps().unwrap();
    let raw_2 = controller.value(2).unwrap().as_steps().unwrap();
    assert_eq!(raw_1, 2);
    assert_eq!(raw_2, -raw_1);
}

#[test]
fn relative_mode_reports_batched_deltas_once() {
    let def = KNOB_1.with_mode(EncoderMode::Relative);
    let mut controller = controller(&[def]);
    record_all(&mut controller, &[def]);
    let mut events = Events::new();
    let mut phase = 3;

    turn(&mut controller, &mut events, &def, &mut phase, 8);
    turn(&mut controller, &mut events, &def, &mut phase, -4);
    let deltas: Vec<i32> = events.iter().map(|e| e.value.as_steps().unwrap()).collect();
    assert_eq!(deltas, [1, 1, -1]);
    assert!(events.iter().all(|e| e.value.mode() == EncoderMode::Relative));
    assert_eq!(deltas.iter().sum::<i32>(), 1);

    controller.update(&mut events);
    assert_eq!(events.len(), 3);
}

#[test]
fn listeners_for_one_encoder_run_in_registration_order() {
    let mut controller = controller(&[KNOB_1]);
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = Rc::clone(&order);
        controller
            .set_callback(1, move |_: &mut Events, _| order.borrow_mut().push(tag))
            .unwrap();
    }

    let mut events = Events::new();
    let mut phase = 3;
    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 4);
    assert_eq!(*order.borrow(), ["first", "second", "third"]);
}

#[test]
fn binding_unknown_id_fails_at_bind_time() {
    let mut controller = controller(&[KNOB_1]);
    let result = controller.set_callback(7, |_: &mut Events, _| {});
    assert_eq!(result, Err(ConfigError::UnknownId(7)));
    assert_eq!(controller.binding_count(7), Err(ConfigError::UnknownId(7)));
}

#[test]
fn unbind_and_clear_stop_notifications() {
    let mut controller = controller(&[KNOB_1]);
    let keep = controller
        .set_callback(1, |events: &mut Events, event| events.push(event))
        .unwrap();
    let dropped = controller
        .set_callback(1, |events: &mut Events, event| events.push(event))
        .unwrap();

    assert!(controller.unbind(dropped));
    assert!(!controller.unbind(dropped));
    assert_eq!(controller.binding_count(1), Ok(1));

    let mut events = Events::new();
    let mut phase = 3;
    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 4);
    assert_eq!(events.len(), 1);

    controller.clear_bindings();
    assert!(!controller.unbind(keep));
    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 4);
    assert_eq!(events.len(), 1);
}

#[test]
fn read_fault_skips_encoder_for_the_pass() {
    let mut controller = controller(&[KNOB_1, KNOB_2]);
    record_all(&mut controller, &[KNOB_1, KNOB_2]);
    let mut events = Events::new();

    controller.pins_mut().set_read_failure(22, true);
    controller
        .pins_mut()
        .set_phase(18, 19, QuadState::OnlyB);
    controller.pins_mut().set_phase(22, 23, QuadState::OnlyB);
    controller.update(&mut events);
    assert_eq!(controller.read_faults(), 1);

    controller.pins_mut().set_read_failure(22, false);
    controller.update(&mut events);
    assert_eq!(controller.read_faults(), 1);
    assert!(events.is_empty());
}

#[test]
fn descriptors_and_config_are_queryable() {
    let raw = KNOB_2.with_mode(EncoderMode::Raw);
    let config = ControllerConfig::default().with_epsilon(0.01);
    let controller: Controller<'_> =
        EncoderController::init(pins_for(&[KNOB_1, raw]), &[KNOB_1, raw], config).unwrap();

    assert_eq!(controller.config(), config);
    assert_eq!(controller.def(2), Ok(&raw));
    assert_eq!(controller.def(9), Err(ConfigError::UnknownId(9)));
    assert_eq!(controller.value(1), Ok(EncoderValue::Normalized(0.0)));
    assert_eq!(controller.value(2), Ok(EncoderValue::Raw(0)));
}

#[test]
fn epsilon_suppresses_sub_threshold_changes() {
    let fine = EncoderDef::new(3, 5, 6, 24, 270, 1, false);
    let pins: MockPins<8> = pins_for(&[fine]);
    let mut controller: Controller<'_> =
        EncoderController::init(pins, &[fine], ControllerConfig::default().with_epsilon(0.1))
            .unwrap();
    record_all(&mut controller, &[fine]);
    let mut events = Events::new();
    let mut phase = 3;

    // One detent is 1/18 (< 0.1); the second crosses the threshold.
    turn(&mut controller, &mut events, &fine, &mut phase, 1);
    assert!(events.is_empty());
    turn(&mut controller, &mut events, &fine, &mut phase, 1);
    assert_eq!(events.len(), 1);
}

#[test]
fn init_rejects_negative_or_non_finite_epsilon() {
    for epsilon in [-0.1, f32::NAN, f32::INFINITY] {
        let result = EncoderController::<_, Events, 4>::init(
            pins_for(&[KNOB_1]),
            &[KNOB_1],
            ControllerConfig::default().with_epsilon(epsilon),
        );
        assert_eq!(result.err(), Some(ConfigError::InvalidEpsilon), "{epsilon}");
    }

    // Zero still reports every detent and stays silent when idle.
    let mut controller: Controller<'_> = EncoderController::init(
        pins_for(&[KNOB_1]),
        &[KNOB_1],
        ControllerConfig::default().with_epsilon(0.0),
    )
    .unwrap();
    record_all(&mut controller, &[KNOB_1]);
    let mut events = Events::new();
    for _ in 0..5 {
        assert_eq!(controller.update(&mut events), 0);
    }
    let mut phase = 3;
    turn(&mut controller, &mut events, &KNOB_1, &mut phase, 8);
    assert_eq!(events.len(), 2);
}

#[test]
fn release_returns_the_pin_bank() {
    let controller = controller(&[KNOB_1]);
    let mut pins = controller.release();
    let pin: PinId = 22;
    assert_eq!(pins.is_high(pin), Ok(true));
}
