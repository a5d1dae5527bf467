//! Named integer-sample probes: the "no format mandated beyond numeric
//! sample streams" observability surface. `DvbFifo` users, schedulers and
//! the Slotted-Aloha NCC push samples through a `&dyn ProbeSink`; the
//! default sink just logs them, matching the teacher's leveled-logging
//! style rather than wiring in an external metrics system.

use std::sync::Mutex;

/// Receives named integer samples. Implementations must not block the
/// caller for long — probes are pushed from inside scheduler passes and
/// channel handlers.
pub trait ProbeSink: Send + Sync {
    fn record(&self, name: &str, value: i64);
}

/// Default sink: logs every sample at `debug`.
pub struct LogProbeSink;

impl ProbeSink for LogProbeSink {
    fn record(&self, name: &str, value: i64) {
        log::debug!(target: "opensand_dataplane::probes", "{name} = {value}");
    }
}

/// Test double that records every sample for later assertions.
#[derive(Default)]
pub struct VecProbeSink {
    samples: Mutex<Vec<(String, i64)>>,
}

impl VecProbeSink {
    pub fn new() -> Self {
        VecProbeSink::default()
    }

    pub fn samples(&self) -> Vec<(String, i64)> {
        self.samples.lock().unwrap().clone()
    }

    pub fn last(&self, name: &str) -> Option<i64> {
        self.samples.lock().unwrap().iter().rev().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

impl ProbeSink for VecProbeSink {
    fn record(&self, name: &str, value: i64) {
        self.samples.lock().unwrap().push((name.to_string(), value));
    }
}
