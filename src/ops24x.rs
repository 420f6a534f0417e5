// src/ops24x.rs
//
// Serial link to the OmniPreSense OPS24x radar module: port setup, the
// configuration command handshake, and line-by-line velocity parsing.

use crate::types::SpeedUnits;
use anyhow::{bail, Context, Result};
use serialport::{ClearBuffer, SerialPort};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// Module settings sent at startup. Each command is answered with a JSON
// reply before the next one goes out.
const CMD_SAMPLING_FREQUENCY: &str = "SX"; // 10 Ksps
const CMD_TRANSMIT_POWER: &str = "PX"; // max power
const CMD_MAGNITUDE_CONTROL: &str = "M>20\n"; // magnitude must be > 20
const CMD_SUBINTEGER_DIGITS: &str = "F0"; // no decimal reporting
const CMD_MIN_TO_REPORT: &str = "R>10\n";
const CMD_MAX_TO_REPORT: &str = "R<200\n";
const CMD_SEND_ZEROS: &str = "BZ";

/// How long one blocking read may stall before we hand the engine an
/// empty tick.
const READ_TIMEOUT: Duration = Duration::from_millis(250);
/// How long to wait for the module to acknowledge a settings command.
const ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// Anything that can hand the tracker one velocity sample at a time.
///
/// `Ok(None)` means "no valid reading this tick" (noise, a command reply,
/// a timeout); `Err` is a transport failure for the host to surface. The
/// tracking engine itself never sees an error.
pub trait VelocitySource {
    fn next_sample(&mut self) -> Result<Option<f64>>;
}

pub struct Ops24xSensor {
    port: Box<dyn SerialPort>,
    rx_buf: Vec<u8>,
    lines: VecDeque<String>,
}

impl Ops24xSensor {
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .with_context(|| format!("failed to open radar serial port {path} @ {baud_rate}"))?;

        Ok(Self {
            port,
            rx_buf: Vec::with_capacity(1024),
            lines: VecDeque::new(),
        })
    }

    /// Push the module settings, waiting for each acknowledgement.
    pub fn configure(&mut self, units: SpeedUnits) -> Result<()> {
        info!("initializing OPS24x module");
        self.send_command("sampling frequency", CMD_SAMPLING_FREQUENCY)?;
        self.send_command("transmit power", CMD_TRANSMIT_POWER)?;
        self.send_command("magnitude control", CMD_MAGNITUDE_CONTROL)?;
        self.send_command("fractional digits", CMD_SUBINTEGER_DIGITS)?;
        self.send_command("min speed to report", CMD_MIN_TO_REPORT)?;
        self.send_command("max speed to report", CMD_MAX_TO_REPORT)?;
        self.send_command("units preference", units.command())?;
        self.send_command("zero reporting", CMD_SEND_ZEROS)?;

        // Drop whatever accumulated during the handshake so the stream
        // starts clean.
        self.port
            .clear(ClearBuffer::All)
            .context("failed to clear radar serial buffers")?;
        self.rx_buf.clear();
        self.lines.clear();
        Ok(())
    }

    fn send_command(&mut self, label: &str, command: &str) -> Result<()> {
        debug!("set {label}: {}", command.trim_end());
        self.port
            .write_all(command.as_bytes())
            .with_context(|| format!("failed to send {label} command"))?;
        self.port.flush()?;

        let deadline = Instant::now() + ACK_TIMEOUT;
        loop {
            if let Some(line) = self.poll_line()? {
                if line.contains('{') {
                    debug!("module replied: {line}");
                    return Ok(());
                }
                // Stale speed readings can be interleaved with the reply.
                debug!("discarding line during handshake: {line}");
            }
            if Instant::now() > deadline {
                bail!("no acknowledgement from radar for {label} command");
            }
        }
    }

    /// One bounded read from the port, then the next complete line if any.
    fn poll_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.lines.pop_front() {
            return Ok(Some(line));
        }

        let mut chunk = [0u8; 256];
        match self.port.read(&mut chunk) {
            Ok(0) => {}
            Ok(n) => {
                self.rx_buf.extend_from_slice(&chunk[..n]);
                self.lines.extend(drain_lines(&mut self.rx_buf));
                if self.rx_buf.len() > 4096 {
                    // Getting bytes but no newlines; the link is garbage.
                    warn!("discarding {} unframed bytes", self.rx_buf.len());
                    self.rx_buf.clear();
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e).context("radar serial read failed"),
        }

        Ok(self.lines.pop_front())
    }
}

impl VelocitySource for Ops24xSensor {
    fn next_sample(&mut self) -> Result<Option<f64>> {
        Ok(self.poll_line()?.and_then(|line| parse_velocity(&line)))
    }
}

/// Split complete lines out of the receive buffer, leaving any partial
/// trailing line in place.
fn drain_lines(rx_buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = rx_buf.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = rx_buf.drain(..=pos).collect();
        lines.push(String::from_utf8_lossy(&raw).trim().to_string());
    }
    lines
}

/// Parse one line from the module into a signed velocity.
///
/// Positive means approaching, negative means receding. Command replies
/// (JSON), blank lines, and anything unparsable all mean "no reading".
fn parse_velocity(line: &str) -> Option<f64> {
    let line = line.trim();
    if line.is_empty() || line.contains('{') {
        return None;
    }
    line.parse::<f64>().ok()
}
