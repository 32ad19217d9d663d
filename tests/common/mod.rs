#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use restart_supervisor::{Logger, SharedLogger, SupervisorEvent, Worker, WorkerResult};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Stopped,
    Crashed(String),
    Restarting(Duration),
}

/// Keeps every event so tests can inspect crash notices and waits.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<Recorded>>,
}

#[allow(unused)]
impl RecordingLogger {
    pub fn shared() -> (Arc<Self>, SharedLogger) {
        let logger = Arc::new(Self::default());
        let shared: SharedLogger = logger.clone();
        (logger, shared)
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Recorded::Restarting(delay) => Some(delay),
                _ => None,
            })
            .collect()
    }

    pub fn crashes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Recorded::Crashed(crash) => Some(crash),
                _ => None,
            })
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, event: &SupervisorEvent<'_>) {
        let recorded = match event {
            SupervisorEvent::Stopped => Recorded::Stopped,
            SupervisorEvent::Crashed { crash } => Recorded::Crashed(crash.to_string()),
            SupervisorEvent::Restarting { delay } => Recorded::Restarting(*delay),
        };
        self.events.lock().unwrap().push(recorded);
    }
}

/// Invocation start times, shared across restarts.
#[derive(Debug, Clone, Default)]
pub struct Runs(Arc<Mutex<Vec<Instant>>>);

#[allow(unused)]
impl Runs {
    /// Records a new invocation and returns its 1-based number.
    pub fn record(&self) -> usize {
        let mut runs = self.0.lock().unwrap();
        runs.push(Instant::now());
        runs.len()
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn gaps(&self) -> Vec<Duration> {
        let runs = self.0.lock().unwrap();
        runs.windows(2).map(|pair| pair[1] - pair[0]).collect()
    }
}

/// Panics on every invocation.
#[derive(Clone, Default)]
pub struct CrashingWorker {
    pub runs: Runs,
}

impl Worker for CrashingWorker {
    async fn run(&mut self, _token: CancellationToken) -> WorkerResult {
        let run = self.runs.record();
        panic!("boom #{run}")
    }
}

/// Panics on the first invocation, then waits for cancellation.
#[derive(Clone, Default)]
pub struct CrashOnceWorker {
    pub runs: Runs,
}

impl Worker for CrashOnceWorker {
    async fn run(&mut self, token: CancellationToken) -> WorkerResult {
        if self.runs.record() == 1 {
            panic!("boom");
        }
        token.cancelled().await;
        Ok(())
    }
}

/// Waits for cancellation, then returns.
#[derive(Clone, Default)]
pub struct CooperativeWorker {
    pub runs: Runs,
}

impl Worker for CooperativeWorker {
    async fn run(&mut self, token: CancellationToken) -> WorkerResult {
        self.runs.record();
        token.cancelled().await;
        Ok(())
    }
}

/// Returns immediately without doing anything.
#[derive(Clone, Default)]
pub struct ImmediateWorker {
    pub runs: Runs,
}

impl Worker for ImmediateWorker {
    async fn run(&mut self, _token: CancellationToken) -> WorkerResult {
        self.runs.record();
        Ok(())
    }
}

/// Ignores the token and never returns.
#[derive(Clone, Default)]
pub struct StubbornWorker {
    pub runs: Runs,
}

impl Worker for StubbornWorker {
    async fn run(&mut self, _token: CancellationToken) -> WorkerResult {
        self.runs.record();
        std::future::pending::<()>().await;
        Ok(())
    }
}

/// Fails every run, counting through an `Arc` and through an owned field.
#[derive(Clone, Default)]
pub struct CountingWorker {
    pub total: Arc<AtomicUsize>,
    pub local: usize,
    pub seen_local: Arc<Mutex<Vec<usize>>>,
}

impl Worker for CountingWorker {
    async fn run(&mut self, _token: CancellationToken) -> WorkerResult {
        self.total.fetch_add(1, Ordering::SeqCst);
        self.local += 1;
        self.seen_local.lock().unwrap().push(self.local);
        Err(std::io::Error::other("counted").into())
    }
}
