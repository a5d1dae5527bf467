//! `Block`: the unit of the dataplane's thread topology. Each block owns an
//! upward channel (terminal-to-gateway direction) and a downward channel
//! (gateway-to-terminal direction), each running its handler on its own OS
//! thread. Two adjacent blocks are wired together by `connect`, which
//! creates the pair of fifos carrying messages across the boundary.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::RtError;
use crate::rt::channel::{ChannelHandler, NextRouting};
use crate::rt::event_loop::{EventLoop, FifoSource, TimerSource};
use crate::rt::fifo::{fifo, FifoReceiver, FifoSender, DEFAULT_FIFO_CAPACITY};

/// The two fifos created by `connect` between adjacent blocks: one for
/// upward traffic (low block -> high block) and one for downward traffic
/// (high block -> low block).
pub struct Link {
    pub upward: (FifoSender, FifoReceiver),
    pub downward: (FifoSender, FifoReceiver),
}

/// Creates the fifo pair wiring `lower` to `upper`, per the blocks'
/// adjacency in the protocol stack.
pub fn connect(link_name: &str, capacity: usize) -> Link {
    Link {
        upward: fifo(format!("{link_name}.up"), capacity),
        downward: fifo(format!("{link_name}.down"), capacity),
    }
}

/// Spawns one direction of a block as its own OS thread, running an event
/// loop that feeds every incoming message to `handler` and routes every
/// message the handler produces to `next`.
pub fn spawn_channel_thread<K, H>(
    name: String,
    previous: Vec<FifoReceiver>,
    next: NextRouting<K>,
    handler: H,
    tick_period: Option<Duration>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<Result<(), RtError>>
where
    K: Eq + Hash + std::fmt::Debug + Send + Sync + 'static,
    H: ChannelHandler<K> + 'static,
{
    std::thread::Builder::new()
        .name(name.clone())
        .spawn(move || -> Result<(), RtError> {
            let next = Arc::new(next);
            let handler = Arc::new(Mutex::new(handler));
            let mut event_loop = EventLoop::new();

            for (i, rx) in previous.into_iter().enumerate() {
                let next = next.clone();
                let handler = handler.clone();
                event_loop.register(Box::new(FifoSource::new(
                    format!("{name}.in[{i}]"),
                    rx,
                    Box::new(move |msg| {
                        let outputs = handler.lock().unwrap().handle(msg)?;
                        dispatch(&next, outputs)
                    }),
                )));
            }

            if let Some(period) = tick_period {
                let next = next.clone();
                let handler = handler.clone();
                event_loop.register(Box::new(TimerSource::new(
                    format!("{name}.tick"),
                    period,
                    Box::new(move || {
                        let outputs = handler.lock().unwrap().on_tick()?;
                        dispatch(&next, outputs)
                    }),
                )));
            }

            event_loop.run_until(|| stop.load(Ordering::Relaxed))
        })
        .expect("failed to spawn channel thread")
}

fn dispatch<K: Eq + Hash + std::fmt::Debug>(
    next: &NextRouting<K>,
    outputs: Vec<(Option<K>, crate::rt::message::InternalMessage)>,
) -> Result<(), RtError> {
    let mut first_err = None;
    for (key, msg) in outputs {
        if let Err(e) = next.send(key.as_ref(), msg) {
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Owns the join handles of a block's two channel threads and the shared
/// stop flag used to unwind them.
pub struct Block {
    pub name: String,
    stop: Arc<AtomicBool>,
    threads: Vec<JoinHandle<Result<(), RtError>>>,
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            stop: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
        }
    }

    pub fn add_thread(&mut self, handle: JoinHandle<Result<(), RtError>>) {
        self.threads.push(handle);
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Requests shutdown and waits for both channel threads to exit.
    pub fn shutdown(self) -> Result<(), RtError> {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.threads {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err(RtError::ChannelFailed(format!("{} thread panicked", self.name))),
            }
        }
        Ok(())
    }
}

pub const DEFAULT_LINK_CAPACITY: usize = DEFAULT_FIFO_CAPACITY;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rt::message::InternalMessage;
    use std::time::Duration as StdDuration;

    struct EchoHandler;

    impl ChannelHandler<u16> for EchoHandler {
        fn handle(&mut self, msg: InternalMessage) -> Result<Vec<(Option<u16>, InternalMessage)>, RtError> {
            Ok(vec![(None, msg)])
        }
    }

    #[test]
    fn connect_creates_independent_up_and_down_fifos() {
        let link = connect("gw-sat", 4);
        link.upward.0.push(InternalMessage::link_up()).unwrap();
        assert!(link.downward.1.try_pop().is_none());
        assert!(link.upward.1.try_pop().is_some());
    }

    #[test]
    fn spawned_channel_echoes_input_to_output() {
        let (in_tx, in_rx) = fifo("in", 4);
        let (out_tx, out_rx) = fifo("out", 4);
        let stop = Arc::new(AtomicBool::new(false));
        let handle = spawn_channel_thread(
            "echo".into(),
            vec![in_rx],
            NextRouting::Single(out_tx),
            EchoHandler,
            None,
            stop.clone(),
        );

        in_tx.push(InternalMessage::link_up()).unwrap();
        let received = out_rx.pop_timeout(StdDuration::from_secs(1)).unwrap();
        assert!(received.is_some());

        stop.store(true, Ordering::Relaxed);
        drop(in_tx);
        handle.join().unwrap().unwrap();
    }
}
