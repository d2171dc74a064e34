//! Host build of the control surface: two detented knobs on simulated GPIO
//! lines, each mapped to a MIDI Control Change.

use std::{thread, time::Duration};

use knobwork_core::{ControllerConfig, EncoderController, EncoderDef};
use knobwork_hal::{GpioPinBank, RegisterError};
use log::{error, info};

use context::MainContext;
use midi_out::WireMidiOut;
use sim::{KnobSim, SCRIPT, SimPin};

#[path = "main/context.rs"]
mod context;
#[path = "main/midi_out.rs"]
mod midi_out;
#[path = "main/sim.rs"]
mod sim;

const MAX_ENCODERS: usize = 4;
const MAX_PINS: usize = MAX_ENCODERS * 2;
const MIDI_CHANNEL: u8 = 0;
const CC_BASE: u8 = 16;
const POLL_ITERATIONS: u32 = 600;
const POLL_INTERVAL_US: u64 = 500;

// Both knobs are wired with A/B swapped relative to the panel direction.
const ENCODERS: [EncoderDef; 2] = [
    EncoderDef::new(1, 22, 23, 24, 270, 4, true),
    EncoderDef::new(2, 18, 19, 24, 270, 4, true),
];

type Controller = EncoderController<
    'static,
    GpioPinBank<SimPin, MAX_PINS>,
    MainContext<WireMidiOut>,
    MAX_ENCODERS,
>;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut knobs: Vec<KnobSim> = ENCODERS
        .iter()
        .map(|def| KnobSim::new(def.invert_direction))
        .collect();

    let pins = match pin_bank(&knobs) {
        Ok(pins) => pins,
        Err(err) => {
            error!("gpio: pin bank setup failed: {:?}", err);
            halt();
        }
    };

    let mut controller: Controller =
        match EncoderController::init(pins, &ENCODERS, ControllerConfig::default()) {
            Ok(controller) => controller,
            Err(err) => {
                error!("encoders: init failed: {}", err);
                halt();
            }
        };

    for (index, def) in ENCODERS.iter().enumerate() {
        let cc = CC_BASE + index as u8;
        if let Err(err) = MainContext::bind(&mut controller, def.id, cc) {
            error!("encoders: bind id={} failed: {}", def.id, err);
            halt();
        }
    }

    let mut ctx = MainContext::new(WireMidiOut::new(), MIDI_CHANNEL);
    info!(
        "{}: ready, CC {}-{} on channel {} epsilon={}",
        MainContext::<WireMidiOut>::NAME,
        CC_BASE,
        CC_BASE + ENCODERS.len() as u8 - 1,
        MIDI_CHANNEL,
        controller.config().epsilon
    );

    let mut changes = 0;
    for iteration in 0..POLL_ITERATIONS {
        for &(_, knob, detents) in SCRIPT.iter().filter(|(at, ..)| *at == iteration) {
            let ticks = detents * i32::from(ENCODERS[knob].ticks_per_event);
            knobs[knob].turn(ticks);
        }
        for knob in &mut knobs {
            knob.step();
        }

        changes += controller.update(&mut ctx);
        thread::sleep(Duration::from_micros(POLL_INTERVAL_US));
    }

    info!(
        "demo: done iterations={} changes={} sent={} dropped={} read_faults={} knobs_idle={}",
        POLL_ITERATIONS,
        changes,
        ctx.sent(),
        ctx.dropped(),
        controller.read_faults(),
        knobs.iter().all(KnobSim::is_idle)
    );
    info!(
        "midi: wire messages={} last={:02x?}",
        ctx.midi().sent(),
        ctx.midi().last_bytes()
    );
    for id in controller.ids() {
        if let (Ok(def), Ok(value)) = (controller.def(id), controller.value(id)) {
            info!(
                "encoder: id={} pins={}/{} final={:?}",
                id, def.pin_a, def.pin_b, value
            );
        }
    }

    ctx.cleanup(&mut controller);
    let released = controller.release().release();
    info!("gpio: released {} pins", released.len());
}

fn pin_bank(knobs: &[KnobSim]) -> Result<GpioPinBank<SimPin, MAX_PINS>, RegisterError> {
    let mut bank = GpioPinBank::new();
    for (def, knob) in ENCODERS.iter().zip(knobs) {
        bank.register(def.pin_a, knob.pin_a())?;
        bank.register(def.pin_b, knob.pin_b())?;
    }
    Ok(bank)
}

fn halt() -> ! {
    loop {
        thread::park();
    }
}
