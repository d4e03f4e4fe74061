//! Cycle-accurate testbench around [`AddSubUnit`]
//!
//! One loop iteration is one clock cycle. Stalls are injected on the source side
//! (TVALID low) and on both sinks (TREADY low) with a fixed probability, and every
//! result is matched back to the cycle its operands were accepted in.

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, Ordering},
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::{
    addsub::{AddSubUnit, PortsIn},
    axis::{AxisCplx, Operands, Results},
    capture::Source,
    error::{Error, Result},
    monitoring::Summary,
    scoreboard::Scoreboard,
};

/// Timing observed by the cycle testbench
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    /// Cycles in which operands were waiting but not accepted
    pub input_stalls: u64,
    /// Cycles from acceptance to the transfer of the later of `add`/`sub`
    pub min_latency: u64,
    pub max_latency: u64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self {
            cycles: 0,
            input_stalls: 0,
            min_latency: u64::MAX,
            max_latency: 0,
        }
    }
}

impl CycleStats {
    fn record_latency(&mut self, latency: u64) {
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
    }
}

/// Drive `source` through an [`AddSubUnit`] until it runs dry and the unit drains.
///
/// `stall` is the probability that any one handshake wire is held low in a cycle.
///
/// # Errors
/// [`Error::InvalidStall`] if `stall` is outside `[0, 1)`; at 1 nothing would ever move.
pub fn run_cycle(
    source: Source,
    mut scoreboard: Scoreboard,
    stall: f64,
    seed: u64,
    stop: &AtomicBool,
) -> Result<(Summary, CycleStats)> {
    if !(0.0..1.0).contains(&stall) {
        return Err(Error::InvalidStall(stall));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut source = source.peekable();
    let mut unit = AddSubUnit::new();
    let mut stats = CycleStats::default();

    // Operands accepted but not yet fully delivered, with their accept cycle
    let mut in_flight: VecDeque<(Operands, u64)> = VecDeque::new();
    let mut adds: VecDeque<(AxisCplx, u64)> = VecDeque::new();
    let mut subs: VecDeque<(AxisCplx, u64)> = VecDeque::new();

    info!(stall, "Starting cycle testbench");
    loop {
        if stop.load(Ordering::Acquire) {
            info!(cycles = stats.cycles, "Stop requested");
            break;
        }
        let pending = source.peek().copied();
        if pending.is_none() && unit.is_idle() {
            break;
        }
        let offered = pending.filter(|_| !rng.gen_bool(stall));
        let add_ready = !rng.gen_bool(stall);
        let sub_ready = !rng.gen_bool(stall);

        let out = unit.tick(PortsIn {
            a: offered.map(|ops| ops.a),
            b: offered.map(|ops| ops.b),
            add_ready,
            sub_ready,
        });

        let cycle = stats.cycles;
        if let (Some(ops), true) = (offered, out.accepted()) {
            source.next();
            in_flight.push_back((ops, cycle));
        } else if pending.is_some() {
            stats.input_stalls += 1;
        }
        if let (Some(add), true) = (out.add, add_ready) {
            adds.push_back((add, cycle));
        }
        if let (Some(sub), true) = (out.sub, sub_ready) {
            subs.push_back((sub, cycle));
        }

        while let (Some(&(add, add_cycle)), Some(&(sub, sub_cycle))) = (adds.front(), subs.front()) {
            adds.pop_front();
            subs.pop_front();
            let (ops, accepted) = match in_flight.pop_front() {
                Some(entry) => entry,
                // The unit can't emit more than it accepted
                None => unreachable!("result without operands"),
            };
            stats.record_latency(add_cycle.max(sub_cycle) - accepted);
            scoreboard.check(ops, Results { add, sub })?;
        }
        stats.cycles += 1;
    }

    if stats.min_latency == u64::MAX {
        stats.min_latency = 0;
    }
    debug!(?stats, "Cycle testbench finished");
    Ok((scoreboard.finish()?, stats))
}
