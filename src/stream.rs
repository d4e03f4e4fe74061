//! Threaded streaming runtime
//!
//! Every AXI-Stream port is an `rtrb` ring: a full ring is backpressure, an empty
//! ring is "not valid". Three threads share the work:
//!
//! - `source`: stimulus onto the `a`/`b` rings (see [`crate::capture`])
//! - `unit`: [`addsub`] from the input rings to the `add`/`sub` rings
//! - `sink`: scoreboard and result dump (see [`crate::exfil`])
//!
//! Shutdown flows downstream. When a producer is dropped, its consumer drains
//! what's left and exits, dropping its own producers in turn.

use std::{
    hint,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use rtrb::{PushError, RingBuffer};
use tracing::{debug, info};

use crate::{
    addsub::addsub,
    axis::AxisCplx,
    capture::{capture_stimulus, Source},
    error::{Error, Result},
    exfil::exfil_results,
    monitoring::Summary,
    scoreboard::Scoreboard,
};

/// Push, spinning while the ring is full.
///
/// Returns false if the value can never be delivered: the consumer is gone or `stop` was raised.
pub(crate) fn push_blocking<T>(producer: &mut rtrb::Producer<T>, value: T, stop: &AtomicBool) -> bool {
    let mut value = value;
    loop {
        match producer.push(value) {
            Ok(()) => return true,
            Err(PushError::Full(v)) => {
                if producer.is_abandoned() || stop.load(Ordering::Acquire) {
                    return false;
                }
                value = v;
                // Yielding costs a whole scheduler slice, spin instead
                hint::spin_loop();
            }
        }
    }
}

/// Pop, spinning while the ring is empty. `None` once the producer is gone and the ring is drained.
pub(crate) fn pop_blocking<T>(consumer: &mut rtrb::Consumer<T>) -> Option<T> {
    loop {
        if let Ok(value) = consumer.pop() {
            return Some(value);
        }
        if consumer.is_abandoned() {
            // The producer may have pushed right before leaving
            return consumer.pop().ok();
        }
        hint::spin_loop();
    }
}

/// The unit's activation loop: one item from each input port in, one item on each output port out
pub fn run_unit(
    a_port: &mut rtrb::Consumer<AxisCplx>,
    b_port: &mut rtrb::Consumer<AxisCplx>,
    add_port: &mut rtrb::Producer<AxisCplx>,
    sub_port: &mut rtrb::Producer<AxisCplx>,
    stop: &AtomicBool,
) -> u64 {
    let mut activations = 0u64;
    loop {
        let (a, b) = match (pop_blocking(a_port), pop_blocking(b_port)) {
            (Some(a), Some(b)) => (a, b),
            _ => break,
        };
        let (add, sub) = addsub(a, b);
        if !push_blocking(add_port, add, stop) || !push_blocking(sub_port, sub, stop) {
            break;
        }
        activations += 1;
    }
    debug!(activations, "Unit finished");
    activations
}

fn join<T>(handle: thread::JoinHandle<T>, name: &'static str) -> Result<T> {
    handle.join().map_err(|_| Error::ThreadPanicked(name))
}

/// Run `source` through the unit on three threads, `capacity` items per port ring
pub fn run_threaded(
    source: Source,
    capacity: usize,
    scoreboard: Scoreboard,
    stop: Arc<AtomicBool>,
) -> Result<Summary> {
    let (mut a_tx, mut a_rx) = RingBuffer::new(capacity);
    let (mut b_tx, mut b_rx) = RingBuffer::new(capacity);
    let (mut add_tx, mut add_rx) = RingBuffer::new(capacity);
    let (mut sub_tx, mut sub_rx) = RingBuffer::new(capacity);
    // Roomy enough that the scoreboard ring is never what stalls the source
    let (mut exp_tx, mut exp_rx) = RingBuffer::new(4 * capacity + 2);

    info!(capacity, "Starting threaded runtime");

    let source_stop = stop.clone();
    let source = thread::Builder::new()
        .name("source".into())
        .spawn(move || capture_stimulus(source, &mut a_tx, &mut b_tx, &mut exp_tx, &source_stop))?;

    let unit = thread::Builder::new().name("unit".into()).spawn(move || {
        run_unit(&mut a_rx, &mut b_rx, &mut add_tx, &mut sub_tx, &stop)
    })?;

    let sink = thread::Builder::new()
        .name("sink".into())
        .spawn(move || exfil_results(&mut add_rx, &mut sub_rx, &mut exp_rx, scoreboard))?;

    let pushed = join(source, "source")?;
    let activations = join(unit, "unit")?;
    let summary = join(sink, "sink")??;
    info!(pushed, activations, checked = summary.beats, "Threaded runtime finished");
    Ok(summary)
}
