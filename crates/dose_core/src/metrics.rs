//! Run metrics and logging setup.
//!
//! Counters are atomics so genome execution can update them from the rayon
//! pool without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Metrics collector for one simulation run.
pub struct Metrics {
    generations: AtomicU64,
    organisms_executed: AtomicU64,
    faults: AtomicU64,
    instructions: AtomicU64,
    organisms: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: AtomicU64::new(0),
            organisms_executed: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            instructions: AtomicU64::new(0),
            organisms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records one organism run and the dispatches it performed.
    pub fn record_execution(&self, instructions: usize) {
        self.organisms_executed.fetch_add(1, Ordering::Relaxed);
        self.instructions
            .fetch_add(instructions as u64, Ordering::Relaxed);
    }

    pub fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Records completion of simulation generation `generation` and returns
    /// whether a summary was logged for it.
    ///
    /// The report cadence follows `generation`, which may start above zero
    /// after a revive; [`Metrics::generations`] counts steps taken by this run.
    pub fn record_generation(
        &self,
        generation: u64,
        duration: Duration,
        organisms: usize,
        report_frequency: u64,
    ) -> bool {
        self.generations.fetch_add(1, Ordering::Relaxed);
        self.organisms.store(organisms as u64, Ordering::Relaxed);

        if report_frequency > 0 && generation % report_frequency == 0 {
            tracing::info!(
                generation,
                organisms,
                faults = self.faults(),
                instructions = self.instructions(),
                duration_ms = duration.as_millis() as u64,
                "Generation complete"
            );
            return true;
        }
        false
    }

    #[must_use]
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn organisms_executed(&self) -> u64 {
        self.organisms_executed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn instructions(&self) -> u64 {
        self.instructions.load(Ordering::Relaxed)
    }

    /// Organisms alive at the end of the last generation.
    #[must_use]
    pub fn organisms(&self) -> u64 {
        self.organisms.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging.
pub fn init_logging() {
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(tracing::Level::INFO)
            .finish(),
    )
    .ok();
}
