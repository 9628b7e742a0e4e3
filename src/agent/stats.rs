//! Per-agent runtime statistics
//!
//! Perceptions carry a step id modulo 1000, so gaps between consecutive ids
//! reveal packets the agent never saw. Processing time per cycle is summed
//! and reported together with the loss rate every few thousand cycles.

use tracing::{info, warn};

/// Step ids wrap at this value
const STEP_MODULUS: u32 = 1000;
/// Smoothing weight of the loss factor
const LOSS_WEIGHT: f64 = 0.5;
/// Smoothed loss above this is reported
const LOSS_WARN_FACTOR: f64 = 2.0;

/// Cycles between two idle-time reports
pub const REPORT_CYCLES: u64 = 5000;
/// Agents assumed to share the machine
const AGENTS_PER_HOST: f64 = 22.0;
/// Share of each step left to the agents
const AGENT_TIME_SHARE: f64 = 0.5;

/// Lost-perception detection
#[derive(Debug, Default, Clone)]
pub struct PacketLossTracker {
    previous: Option<u32>,
    /// Perceptions lost since the last report
    pub lost: u64,
    /// Exponentially smoothed loss per perception
    pub factor: f64,
}

impl PacketLossTracker {
    /// Record a perception's step id; returns the number of steps missed
    /// since the previous one
    pub fn record(&mut self, time: u32) -> u32 {
        let time = time % STEP_MODULUS;
        let Some(previous) = self.previous.replace(time) else {
            return 0;
        };

        let gap = (time as i64 - previous as i64 - 1).rem_euclid(STEP_MODULUS as i64) as u32;
        // Huge gaps are reordered or duplicated packets
        let delta = if gap > STEP_MODULUS / 2 { 0 } else { gap };

        self.lost += delta as u64;
        self.factor = LOSS_WEIGHT * delta as f64 + (1.0 - LOSS_WEIGHT) * self.factor;

        if self.factor > LOSS_WARN_FACTOR {
            warn!(delta, factor = self.factor, "losing perceptions");
        }

        delta
    }
}

/// Processing-time accounting for the idle report
#[derive(Debug, Default, Clone)]
pub struct IdleStats {
    cycles: u64,
    processing_ms: f64,
}

/// One periodic report
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdleReport {
    /// Mean processing time per cycle
    pub processing_ms: f64,
    /// Estimated share of the agent's budget spent idle (negative: overrun)
    pub idle_percent: f64,
    pub lost_percent: f64,
}

impl IdleStats {
    /// Account one cycle; every [`REPORT_CYCLES`] cycles a report is
    /// produced and the counters (including `loss.lost`) restart
    pub fn record(
        &mut self,
        elapsed_ms: f64,
        step_seconds: f64,
        loss: &mut PacketLossTracker,
    ) -> Option<IdleReport> {
        self.cycles += 1;
        self.processing_ms += elapsed_ms;

        if self.cycles % REPORT_CYCLES != 0 {
            return None;
        }

        let processing_ms = self.processing_ms / REPORT_CYCLES as f64;
        let budget_ms = AGENT_TIME_SHARE * step_seconds * 1000.0 / AGENTS_PER_HOST;
        let idle_ms = budget_ms - processing_ms;
        let report = IdleReport {
            processing_ms,
            idle_percent: 100.0 * idle_ms / (idle_ms + processing_ms),
            lost_percent: 100.0 * loss.lost as f64 / REPORT_CYCLES as f64,
        };

        self.processing_ms = 0.0;
        loss.lost = 0;

        info!(
            proc_ms = report.processing_ms,
            idle_pct = report.idle_percent,
            lost_pct = report.lost_percent,
            "agent timing"
        );
        Some(report)
    }
}
