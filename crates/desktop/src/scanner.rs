//! Scanner contract and duplicate-decode suppression.
//!
//! The camera and decoder live outside this crate. After each accepted decode
//! the scanner is paused for a cooldown window, so one physical item held in
//! front of the camera produces one form fill. Time is passed in explicitly,
//! which keeps the gate testable without a real clock.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use stockscan_core::Barcode;
use stockscan_inventory::ItemForm;

/// Default pause after an accepted decode.
pub const DEFAULT_SCAN_COOLDOWN_MS: i64 = 2_000;

/// Longest configurable pause (ten minutes).
pub const MAX_SCAN_COOLDOWN_MS: i64 = 600_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScannerError {
    #[error("scanner unavailable: {0}")]
    Unavailable(String),
}

/// External camera/decoder capability.
pub trait Scanner {
    fn start(&mut self) -> Result<(), ScannerError>;
    fn stop(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
}

/// Scanner that types each barcode as a line of text, like a USB
/// keyboard-wedge reader. Pausing only marks decodes as unwanted; the caller
/// still reads every line and the gate drops the ones that arrive paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardWedge {
    running: bool,
    paused: bool,
}

impl KeyboardWedge {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Scanner for KeyboardWedge {
    fn start(&mut self) -> Result<(), ScannerError> {
        self.running = true;
        self.paused = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDecision {
    Accepted(Barcode),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Accepting,
    Paused { until: DateTime<Utc> },
}

/// Accept/ignore decision for each decode event.
#[derive(Debug, Clone)]
pub struct ScanGate {
    state: GateState,
    cooldown: Duration,
}

impl Default for ScanGate {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_SCAN_COOLDOWN_MS))
    }
}

impl ScanGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: GateState::Accepting,
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, GateState::Paused { .. })
    }

    pub fn on_decode(&mut self, text: &str, now: DateTime<Utc>) -> ScanDecision {
        self.poll(now);
        if self.is_paused() {
            return ScanDecision::Ignored;
        }

        match Barcode::parse(text) {
            Ok(code) => {
                let until = now
                    .checked_add_signed(self.cooldown)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                self.state = GateState::Paused { until };
                ScanDecision::Accepted(code)
            }
            Err(_) => ScanDecision::Ignored,
        }
    }

    /// Returns `true` exactly when the cooldown has just elapsed.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            GateState::Paused { until } if now >= until => {
                self.state = GateState::Accepting;
                true
            }
            _ => false,
        }
    }
}

/// Drives an external [`Scanner`] through a [`ScanGate`].
#[derive(Debug)]
pub struct ScanSession<S: Scanner> {
    scanner: S,
    gate: ScanGate,
    active: bool,
}

impl<S: Scanner> ScanSession<S> {
    pub fn new(scanner: S, gate: ScanGate) -> Self {
        Self {
            scanner,
            gate,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    pub fn start(&mut self) -> Result<(), ScannerError> {
        if self.active {
            return Ok(());
        }
        self.scanner.start()?;
        self.active = true;
        tracing::info!("scanner started");
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.scanner.stop();
        self.active = false;
        self.gate = ScanGate::new(self.gate.cooldown());
        tracing::info!("scanner stopped");
    }

    /// Decode callback. An accepted barcode comes back as a pre-filled form.
    pub fn on_decode(&mut self, text: &str, now: DateTime<Utc>) -> Option<ItemForm> {
        if !self.active {
            return None;
        }
        match self.gate.on_decode(text, now) {
            ScanDecision::Accepted(code) => {
                self.scanner.pause();
                tracing::info!(barcode = %code, "scanned");
                Some(ItemForm::scanned(&code))
            }
            ScanDecision::Ignored => None,
        }
    }

    /// Resume the scanner once the cooldown is over.
    pub fn poll(&mut self, now: DateTime<Utc>) {
        if self.active && self.gate.poll(now) {
            self.scanner.resume();
        }
    }
}
