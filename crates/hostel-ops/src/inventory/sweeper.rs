//! Background eviction of residents whose tenancy has ended.
//!
//! A pass re-evaluates who is expired from scratch, so there is no cursor to persist and
//! a failed eviction is simply picked up again by the next scheduled pass.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::repository::{HostelRepository, ResidentRepository};
use super::residents::ResidentId;
use super::service::InventoryService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweeperState {
    Idle,
    Sweeping,
}

/// Outcome of a single pass.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub evicted: Vec<ResidentId>,
    pub degraded: usize,
    pub failed: usize,
}

/// Counters accumulated across passes, shared with status endpoints.
#[derive(Debug, Default)]
pub struct SweepTotals {
    sweeping: AtomicBool,
    passes: AtomicU64,
    evicted: AtomicU64,
    degraded: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepTotalsSnapshot {
    pub state: SweeperState,
    pub passes: u64,
    pub evicted: u64,
    pub degraded: u64,
    pub failed: u64,
}

impl SweepTotals {
    pub fn state(&self) -> SweeperState {
        if self.sweeping.load(Ordering::Acquire) {
            SweeperState::Sweeping
        } else {
            SweeperState::Idle
        }
    }

    pub fn snapshot(&self) -> SweepTotalsSnapshot {
        SweepTotalsSnapshot {
            state: self.state(),
            passes: self.passes.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    fn record(&self, report: &SweepReport) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.evicted
            .fetch_add(report.evicted.len() as u64, Ordering::Relaxed);
        self.degraded
            .fetch_add(report.degraded as u64, Ordering::Relaxed);
        self.failed.fetch_add(report.failed as u64, Ordering::Relaxed);
    }
}

/// Flips the state back to idle however the pass ends.
struct SweepingGuard<'a>(&'a AtomicBool);

impl Drop for SweepingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ExpirySweeper<H, R> {
    service: Arc<InventoryService<H, R>>,
    totals: Arc<SweepTotals>,
}

impl<H, R> ExpirySweeper<H, R>
where
    H: HostelRepository + 'static,
    R: ResidentRepository + 'static,
{
    pub fn new(service: Arc<InventoryService<H, R>>) -> Self {
        Self {
            service,
            totals: Arc::new(SweepTotals::default()),
        }
    }

    pub fn state(&self) -> SweeperState {
        self.totals.state()
    }

    pub fn totals(&self) -> Arc<SweepTotals> {
        self.totals.clone()
    }

    /// Runs one pass against `today`. Returns `None` if a pass is already in flight.
    ///
    /// Per-resident failures are logged and counted; they never abort the pass.
    pub async fn run_once(&self, today: NaiveDate) -> Option<SweepReport> {
        if self
            .totals
            .sweeping
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(%today, "expiry sweep already running; skipping");
            return None;
        }
        let _state = SweepingGuard(&self.totals.sweeping);

        let mut report = SweepReport::default();
        let expired = match self.service.expired_residents(today) {
            Ok(expired) => expired,
            Err(err) => {
                error!(%today, error = %err, "expiry sweep could not list residents");
                report.failed += 1;
                self.totals.record(&report);
                return Some(report);
            }
        };
        report.examined = expired.len();

        for resident in expired {
            match self.service.evict(&resident).await {
                Ok(Some(discharge)) => {
                    if discharge.is_degraded() {
                        report.degraded += 1;
                    }
                    info!(
                        hostel_id = %resident.hostel_id,
                        resident_id = %resident.id,
                        end_date = %resident.end_date(),
                        degraded = discharge.is_degraded(),
                        "expired resident evicted"
                    );
                    report.evicted.push(resident.id);
                }
                Ok(None) => {}
                Err(err) => {
                    error!(
                        hostel_id = %resident.hostel_id,
                        resident_id = %resident.id,
                        error = %err,
                        "expired resident could not be evicted"
                    );
                    report.failed += 1;
                }
            }
        }

        self.totals.record(&report);
        info!(
            %today,
            examined = report.examined,
            evicted = report.evicted.len(),
            degraded = report.degraded,
            failed = report.failed,
            "expiry sweep finished"
        );
        Some(report)
    }

    /// Starts the recurring loop. The first pass runs immediately; ticks missed while a
    /// pass is slow are skipped rather than replayed.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.run_once(Local::now().date_naive()).await;
            }
        })
    }
}
