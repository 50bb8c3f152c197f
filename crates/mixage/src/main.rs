//! Mapping monitor.
//!
//! Connects to a Reloop Mixage over MIDI and runs the full mapping session
//! against the simulated host engine, logging every engine call a control
//! event produces. Useful for verifying a unit's control ids and LED
//! wiring without a running DJ application. Run with `RUST_LOG=debug` to
//! see the translated calls.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{debug, info, warn};
use midir::{MidiInput, MidiOutput, MidiOutputConnection};
use mixage_core::{MidiMessage, MidiOut, SimEngine};
use mixage_surface::{MixageSession, Revision, SurfaceConfig};

/// Reloop Mixage mapping monitor.
#[derive(Parser, Debug)]
#[command(name = "mixage")]
#[command(about = "Mixage mapping monitor")]
struct Args {
    /// List available MIDI ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Substring to match when picking the controller's MIDI ports
    #[arg(long, default_value = "Mixage")]
    port: String,

    /// Hardware revision (a or b); overrides the config file
    #[arg(long, value_parser = parse_revision)]
    revision: Option<Revision>,

    /// Path to a surface config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timer resolution in milliseconds
    #[arg(long, default_value = "25")]
    tick_ms: u64,
}

fn parse_revision(s: &str) -> Result<Revision, String> {
    s.parse()
}

/// LED feedback sink: a real output port when one matched, otherwise the
/// messages just go to the log.
struct LedOut(Option<MidiOutputConnection>);

impl MidiOut for LedOut {
    fn send_short(&mut self, status: u8, data1: u8, data2: u8) {
        match &mut self.0 {
            Some(conn) => {
                if let Err(e) = conn.send(&[status, data1, data2]) {
                    warn!("LED send failed: {e}");
                }
            }
            None => debug!("led: {status:02X} {data1:02X} {data2:02X}"),
        }
    }
}

fn list_ports() -> anyhow::Result<()> {
    let midi_in = MidiInput::new("mixage-monitor")?;
    println!("Input ports:");
    for port in midi_in.ports() {
        println!("  {}", midi_in.port_name(&port)?);
    }
    let midi_out = MidiOutput::new("mixage-monitor")?;
    println!("Output ports:");
    for port in midi_out.ports() {
        println!("  {}", midi_out.port_name(&port)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_ports {
        return list_ports();
    }

    let mut config = match &args.config {
        Some(path) => SurfaceConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SurfaceConfig::default(),
    };
    if let Some(revision) = args.revision {
        config.revision = revision;
    }
    info!("using mapping revision {:?}", config.revision);

    // controller input
    let midi_in = MidiInput::new("mixage-monitor")?;
    let in_ports = midi_in.ports();
    let in_port = in_ports
        .iter()
        .find(|p| {
            midi_in
                .port_name(p)
                .map(|n| n.contains(&args.port))
                .unwrap_or(false)
        })
        .ok_or_else(|| anyhow!("no MIDI input port matching '{}'", args.port))?;
    info!("input: {}", midi_in.port_name(in_port)?);

    let (tx, rx) = mpsc::channel();
    let _input = midi_in
        .connect(
            in_port,
            "mixage-input",
            move |_timestamp, bytes, tx: &mut mpsc::Sender<Vec<u8>>| {
                let _ = tx.send(bytes.to_vec());
            },
            tx,
        )
        .map_err(|e| anyhow!("MIDI input connect failed: {e}"))?;

    // LED output is optional
    let midi_out = MidiOutput::new("mixage-monitor")?;
    let out_ports = midi_out.ports();
    let out_port = out_ports.iter().find(|p| {
        midi_out
            .port_name(p)
            .map(|n| n.contains(&args.port))
            .unwrap_or(false)
    });
    let led_out = match out_port {
        Some(port) => {
            info!("output: {}", midi_out.port_name(port)?);
            LedOut(Some(
                midi_out
                    .connect(port, "mixage-output")
                    .map_err(|e| anyhow!("MIDI output connect failed: {e}"))?,
            ))
        }
        None => {
            warn!("no MIDI output matching '{}'; logging LED traffic", args.port);
            LedOut(None)
        }
    };

    let mut session = MixageSession::new(config, SimEngine::new(), led_out);
    session.init();
    info!("session running; feed it knobs (ctrl-c to quit)");

    let tick = Duration::from_millis(args.tick_ms.max(1));
    let mut last = Instant::now();
    loop {
        match rx.recv_timeout(tick) {
            Ok(bytes) => {
                if let Some(msg) = MidiMessage::parse(&bytes) {
                    session.handle_midi(msg);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        let now = Instant::now();
        for id in session.engine_mut().advance(now - last) {
            session.on_timer(id);
        }
        last = now;
    }

    session.shutdown();
    Ok(())
}
