//! Reader polling loop
//!
//! All serial I/O happens on one dedicated thread. Each cycle runs the same
//! fixed sequence:
//!
//! 1. Copy the shared configuration out of the bridge
//! 2. Every `locate_every` cycles, re-identify the reader and follow it
//! 3. If connected and scanning is enabled, poll the reader
//! 4. Debounce the read and publish / push accepted scans
//! 5. Apply the pending control command, if any
//! 6. Count the cycle against the debounce cooldown
//!
//! The thread then sleeps for the rest of the cycle. A stop flag is checked
//! once per cycle, so shutdown latency is one cycle plus an in-flight read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use badge_detect::PortLocator;
use badge_protocol::{poll, Outbound, ScanEvent};
use tracing::{debug, error, info, trace, warn};

use crate::bridge::ScanBridge;
use crate::debounce::{DebounceFilter, DEFAULT_COOLDOWN};
use crate::error::LinkError;
use crate::port::{PortManager, PortOpener, RetryPolicy};
use crate::state::{PortState, ScannerConfig};

/// Synchronous consumer of accepted scans, called on the polling thread
///
/// Implementations may block (e.g. an HTTP call); the polling loop stalls
/// for as long as delivery takes.
pub trait ScanSink: Send {
    /// Deliver one accepted scan
    fn deliver(&mut self, event: &ScanEvent, config: &ScannerConfig);
}

/// Polling loop timing
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Target length of one cycle
    pub cycle: Duration,
    /// Re-identify the reader every this many cycles
    pub locate_every: u32,
    /// How long a repeated badge is held back
    pub cooldown: Duration,
    /// Open retry schedule
    pub retry: RetryPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cycle: Duration::from_millis(200),
            locate_every: 10,
            cooldown: DEFAULT_COOLDOWN,
            retry: RetryPolicy::default(),
        }
    }
}

/// The polling loop and everything it owns
pub struct ScanWorker<L: PortLocator, O: PortOpener> {
    locator: L,
    ports: PortManager<O>,
    debounce: DebounceFilter,
    bridge: Arc<ScanBridge>,
    sink: Option<Box<dyn ScanSink>>,
    config: WorkerConfig,
    /// Cycles until the next identification (0 = due now)
    locate_countdown: u32,
    /// Last connected state reported to the transport
    reported_connected: Option<bool>,
}

impl<L, O> ScanWorker<L, O>
where
    L: PortLocator + 'static,
    O: PortOpener + 'static,
{
    /// Create a worker; nothing runs until [`spawn`](Self::spawn) or
    /// [`run_cycle`](Self::run_cycle) is called
    pub fn new(locator: L, opener: O, bridge: Arc<ScanBridge>, config: WorkerConfig) -> Self {
        Self {
            locator,
            ports: PortManager::with_policy(opener, config.retry),
            debounce: DebounceFilter::with_window(config.cooldown, config.cycle),
            bridge,
            sink: None,
            config,
            locate_countdown: 0,
            reported_connected: None,
        }
    }

    /// Push accepted scans to a synchronous sink as well as the bridge
    pub fn with_sink(mut self, sink: Box<dyn ScanSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Current port lifecycle state
    pub fn port_state(&self) -> PortState {
        self.ports.state()
    }

    /// Run one polling cycle
    pub fn run_cycle(&mut self) {
        let config = self.bridge.config();

        if self.locate_countdown == 0 {
            self.identify();
            self.locate_countdown = self.config.locate_every.max(1);
        }
        self.locate_countdown -= 1;

        if config.should_scan() {
            self.scan(&config);
        }

        self.apply_command();
        self.debounce.tick();
    }

    fn identify(&mut self) {
        let located = self.locator.locate();
        self.bridge.set_port(located.clone());
        let state = self.ports.sync(located);
        self.report_connected(state.is_connected());
    }

    /// Publish a scanner state message when the connected state changes
    fn report_connected(&mut self, connected: bool) {
        if self.reported_connected == Some(connected) {
            return;
        }
        self.reported_connected = Some(connected);
        if !connected {
            self.debounce.reset();
        }
        self.bridge
            .publish(Outbound::ScannerState { state: connected });
    }

    fn scan(&mut self, config: &ScannerConfig) {
        let Some(port) = self.ports.port_mut() else {
            return;
        };

        match poll(port) {
            Ok(Some(code)) => {
                if !self.debounce.accept(&code) {
                    trace!("Repeat of {} held back", code);
                    return;
                }

                let event = ScanEvent::now(code);
                debug!("Badge {} read at {}", event.code, event.timestamp);
                if config.push_enabled() {
                    if let Some(sink) = self.sink.as_mut() {
                        sink.deliver(&event, config);
                    }
                }
                self.bridge.publish(Outbound::Read(event));
            }
            Ok(None) => {}
            Err(e) => {
                info!("Port detached, {}", e);
                self.ports.detach();
                self.bridge.set_port(None);
                self.report_connected(false);
            }
        }
    }

    fn apply_command(&mut self) {
        let Some(command) = self.bridge.try_take_command() else {
            return;
        };
        info!("Received command {:?}", command);
        if let Some(active) = command.status {
            self.bridge.set_active(active);
        }
    }

    /// Run cycles until `stop` is set, then close the port
    pub fn run(mut self, stop: &AtomicBool) {
        info!(
            "Polling loop started (cycle {:?}, locate every {} cycles)",
            self.config.cycle, self.config.locate_every
        );

        while !stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.run_cycle();
            if let Some(rest) = self.config.cycle.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }

        self.ports.close();
        info!("Polling loop stopped");
    }

    /// Start the polling loop on its own thread
    pub fn spawn(self) -> Result<WorkerHandle, LinkError> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("badge-poller".to_string())
            .spawn(move || self.run(&flag))
            .map_err(LinkError::Spawn)?;

        Ok(WorkerHandle { stop, thread })
    }
}

/// Handle to a running polling thread
pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Whether the thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Signal the loop to stop and wait up to `timeout` for it
    ///
    /// Returns `false` if the thread was still running at the deadline; it
    /// is then left to finish on its own.
    pub fn shutdown(self, timeout: Duration) -> bool {
        self.stop.store(true, Ordering::Relaxed);

        let deadline = Instant::now() + timeout;
        while !self.thread.is_finished() {
            if Instant::now() >= deadline {
                warn!("Polling thread still running after {:?}, continuing", timeout);
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }

        if self.thread.join().is_err() {
            error!("Polling thread panicked");
        }
        true
    }
}
