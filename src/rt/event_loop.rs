//! The per-channel event loop: demultiplexes fifo-readiness, timers and file
//! descriptors with a strict priority order (fifo > timer > file) and
//! stable ties, broken by declaration order.
//!
//! `crossbeam_channel::Select` is fair/randomized internally, which is the
//! opposite of what the priority contract needs, so it is used only to
//! block until *something* is ready. Once woken, the loop does its own
//! priority-ordered, non-blocking scan and restarts from the top every time
//! a source fires, so a burst of fifo traffic can never starve behind a
//! timer that happens to be ready at the same instant.

use std::time::{Duration, Instant};

use crossbeam_channel::Select;

use crate::error::RtError;
use crate::rt::fifo::FifoReceiver;

/// Priority class of an event source. Ordered: `Fifo` fires before `Timer`
/// before `File`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventClass {
    Fifo,
    Timer,
    File,
}

/// One source the event loop can wait on.
pub trait EventSource {
    fn name(&self) -> &str;
    fn class(&self) -> EventClass;
    /// Returns `true` if the source was ready and has been drained/fired.
    fn is_ready(&self) -> bool;
    /// Invoked once the source has been found ready. Errors are surfaced to
    /// the loop's caller; the loop itself never decides how to react.
    fn fire(&mut self) -> Result<(), RtError>;
    /// The fifo receiver backing this source, if it is a fifo source. Lets
    /// the loop register real wakeups with `Select` without knowing the
    /// concrete source type.
    fn as_fifo_receiver(&self) -> Option<&FifoReceiver> {
        None
    }
}

/// A periodic timer source, fired on a fixed tick.
pub struct TimerSource {
    name: String,
    period: Duration,
    next_due: Instant,
    on_fire: Box<dyn FnMut() -> Result<(), RtError> + Send>,
}

impl TimerSource {
    pub fn new(name: impl Into<String>, period: Duration, on_fire: Box<dyn FnMut() -> Result<(), RtError> + Send>) -> Self {
        TimerSource {
            name: name.into(),
            period,
            next_due: Instant::now() + period,
            on_fire,
        }
    }

    fn due_in(&self) -> Duration {
        self.next_due.saturating_duration_since(Instant::now())
    }
}

impl EventSource for TimerSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn class(&self) -> EventClass {
        EventClass::Timer
    }

    fn is_ready(&self) -> bool {
        Instant::now() >= self.next_due
    }

    fn fire(&mut self) -> Result<(), RtError> {
        self.next_due = Instant::now() + self.period;
        (self.on_fire)()
    }
}

/// A fifo-readiness source: fires once per drained message.
pub struct FifoSource {
    name: String,
    rx: FifoReceiver,
    on_message: Box<dyn FnMut(crate::rt::message::InternalMessage) -> Result<(), RtError> + Send>,
}

impl FifoSource {
    fn receiver(&self) -> &FifoReceiver {
        &self.rx
    }
}

impl FifoSource {
    pub fn new(
        name: impl Into<String>,
        rx: FifoReceiver,
        on_message: Box<dyn FnMut(crate::rt::message::InternalMessage) -> Result<(), RtError> + Send>,
    ) -> Self {
        FifoSource { name: name.into(), rx, on_message }
    }
}

impl EventSource for FifoSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn class(&self) -> EventClass {
        EventClass::Fifo
    }

    fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }

    fn fire(&mut self) -> Result<(), RtError> {
        if let Some(msg) = self.rx.try_pop() {
            (self.on_message)(msg)?;
        }
        Ok(())
    }

    fn as_fifo_receiver(&self) -> Option<&FifoReceiver> {
        Some(self.receiver())
    }
}

/// Runs sources in priority order, declaration order breaking ties, until
/// `should_stop` returns `true`. Blocks (via `Select` over the registered
/// fifos, or a short sleep if none are registered) only when a full pass
/// finds nothing ready.
pub struct EventLoop {
    sources: Vec<Box<dyn EventSource + Send>>,
}

impl EventLoop {
    pub fn new() -> Self {
        EventLoop { sources: Vec::new() }
    }

    pub fn register(&mut self, source: Box<dyn EventSource + Send>) {
        self.sources.push(source);
    }

    /// One full priority pass: fires at most one ready source and returns
    /// its index, or `None` if nothing was ready. Restarting from the top
    /// on every fire (rather than round-robining) is what gives fifo
    /// traffic strict precedence over timers and files.
    fn fire_highest_ready(&mut self) -> Result<Option<usize>, RtError> {
        let mut best: Option<usize> = None;
        for (i, s) in self.sources.iter().enumerate() {
            if s.is_ready() && (best.is_none() || s.class() < self.sources[best.unwrap()].class()) {
                best = Some(i);
            }
        }
        if let Some(i) = best {
            self.sources[i].fire()?;
        }
        Ok(best)
    }

    pub fn run_until(&mut self, mut should_stop: impl FnMut() -> bool) -> Result<(), RtError> {
        let mut next_timer_check = Duration::from_millis(5);
        while !should_stop() {
            loop {
                match self.fire_highest_ready()? {
                    Some(_) => continue,
                    None => break,
                }
            }
            if should_stop() {
                break;
            }
            self.block_until_ready(next_timer_check);
            next_timer_check = Duration::from_millis(5);
        }
        Ok(())
    }

    fn block_until_ready(&self, timeout: Duration) {
        let fifo_receivers: Vec<&FifoReceiver> = self.sources.iter().filter_map(|s| s.as_fifo_receiver()).collect();
        if fifo_receivers.is_empty() {
            std::thread::sleep(timeout);
            return;
        }
        // Select only detects "something is ready" so the thread can sleep;
        // which source actually fires next is still decided by the
        // priority scan in `fire_highest_ready`.
        let mut select = Select::new();
        for rx in &fifo_receivers {
            select.recv(rx.selectable());
        }
        let _ = select.ready_timeout(timeout.min(Duration::from_millis(20)));
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rt::fifo::fifo;
    use crate::rt::message::InternalMessage;
    use std::sync::{Arc, Mutex};

    #[test]
    fn fifo_fires_before_timer_when_both_ready() {
        let (tx, rx) = fifo("f", 4);
        tx.push(InternalMessage::link_up()).unwrap();

        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let order_fifo = order.clone();
        let order_timer = order.clone();

        let mut loop_ = EventLoop::new();
        loop_.register(Box::new(TimerSource::new(
            "t",
            Duration::from_millis(0),
            Box::new(move || {
                order_timer.lock().unwrap().push("timer");
                Ok(())
            }),
        )));
        loop_.register(Box::new(FifoSource::new(
            "f",
            rx,
            Box::new(move |_msg| {
                order_fifo.lock().unwrap().push("fifo");
                Ok(())
            }),
        )));

        // Drain one full priority pass manually (avoids real blocking in tests).
        loop_.fire_highest_ready().unwrap();
        loop_.fire_highest_ready().unwrap();

        let seen = order.lock().unwrap();
        assert_eq!(seen[0], "fifo");
    }
}
