//! The complex add/subtract unit
//!
//! [`addsub`] is the whole behavioural contract: two complex items in, their sum and
//! difference out, with `a`'s TLAST copied to both outputs. [`AddSubUnit`] wraps it in
//! the registered AXI-Stream realization so testbenches can drive it cycle by cycle.

use crate::axis::{AxisCplx, Operands, Results};

/// Complex add / subtract with TLAST passthrough from `a`.
///
/// Arithmetic is 16-bit two's-complement and wraps silently. `b.last` is ignored.
pub fn addsub(a: AxisCplx, b: AxisCplx) -> (AxisCplx, AxisCplx) {
    let add = AxisCplx {
        data: a.data + b.data,
        last: a.last,
    };
    let sub = AxisCplx {
        data: a.data - b.data,
        last: a.last,
    };
    (add, sub)
}

/// [`addsub`] over bundled operands
pub fn evaluate(ops: Operands) -> Results {
    let (add, sub) = addsub(ops.a, ops.b);
    Results { add, sub }
}

/// Wires driven into the unit for one clock cycle
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct PortsIn {
    /// `a` TVALID + payload
    pub a: Option<AxisCplx>,
    /// `b` TVALID + payload
    pub b: Option<AxisCplx>,
    pub add_ready: bool,
    pub sub_ready: bool,
}

/// Wires driven out of the unit for one clock cycle
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct PortsOut {
    pub a_ready: bool,
    pub b_ready: bool,
    /// `add` TVALID + payload presented this cycle
    pub add: Option<AxisCplx>,
    /// `sub` TVALID + payload presented this cycle
    pub sub: Option<AxisCplx>,
}

impl PortsOut {
    /// True if operands were consumed this cycle
    pub fn accepted(&self) -> bool {
        self.a_ready && self.b_ready
    }
}

/// Registered realization of [`addsub`].
///
/// Each output port has its own register. Operands are taken only when both are
/// valid and both output registers are free after this cycle's transfers, so a
/// result shows up on `add`/`sub` exactly one cycle after its operands were accepted.
#[derive(Clone, Debug, Default)]
pub struct AddSubUnit {
    add_reg: Option<AxisCplx>,
    sub_reg: Option<AxisCplx>,
}

impl AddSubUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.add_reg = None;
        self.sub_reg = None;
    }

    /// No result is waiting on either output
    pub fn is_idle(&self) -> bool {
        self.add_reg.is_none() && self.sub_reg.is_none()
    }

    /// Evaluate one clock cycle. The returned wires are the ones seen during the
    /// cycle; register updates take effect on the closing edge.
    pub fn tick(&mut self, ports: PortsIn) -> PortsOut {
        let add = self.add_reg;
        let sub = self.sub_reg;

        let add_free = add.is_none() || ports.add_ready;
        let sub_free = sub.is_none() || ports.sub_ready;
        let can_accept = add_free && sub_free;

        // Operands move together; never take one without the other
        let a_ready = can_accept && ports.b.is_some();
        let b_ready = can_accept && ports.a.is_some();

        if ports.add_ready {
            self.add_reg = None;
        }
        if ports.sub_ready {
            self.sub_reg = None;
        }
        if let (true, Some(a), Some(b)) = (a_ready, ports.a, ports.b) {
            let (sum, diff) = addsub(a, b);
            self.add_reg = Some(sum);
            self.sub_reg = Some(diff);
        }

        PortsOut {
            a_ready,
            b_ready,
            add,
            sub,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::complex::ComplexShort;

    fn item() -> impl Strategy<Value = AxisCplx> {
        (any::<i16>(), any::<i16>(), any::<bool>()).prop_map(|(re, im, last)| AxisCplx::new(re, im, last))
    }

    #[test]
    fn test_scenario() {
        let a = AxisCplx::new(3, 4, true);
        let b = AxisCplx::new(1, 2, false);
        let (add, sub) = addsub(a, b);
        assert_eq!(add, AxisCplx::new(4, 6, true));
        assert_eq!(sub, AxisCplx::new(2, 2, true));
    }

    #[test]
    fn test_overflow_wraps() {
        let a = AxisCplx::new(32767, -32768, false);
        let b = AxisCplx::new(1, 1, false);
        let (add, sub) = addsub(a, b);
        assert_eq!(add.data.re, -32768);
        assert_eq!(sub.data.im, 32767);
    }

    proptest! {
        #[test]
        fn prop_componentwise(a in item(), b in item()) {
            let (add, sub) = addsub(a, b);
            prop_assert_eq!(add.data.re, a.data.re.wrapping_add(b.data.re));
            prop_assert_eq!(add.data.im, a.data.im.wrapping_add(b.data.im));
            prop_assert_eq!(sub.data.re, a.data.re.wrapping_sub(b.data.re));
            prop_assert_eq!(sub.data.im, a.data.im.wrapping_sub(b.data.im));
        }

        #[test]
        fn prop_last_follows_a(a in item(), b in item()) {
            let (add, sub) = addsub(a, b);
            prop_assert_eq!(add.last, a.last);
            prop_assert_eq!(sub.last, a.last);
        }

        #[test]
        fn prop_linearity(a in item(), b in item()) {
            let (add, sub) = addsub(a, b);
            prop_assert_eq!(add.data - sub.data, b.data + b.data);
        }

        #[test]
        fn prop_zero_identity(a in item(), last in any::<bool>()) {
            let zero = AxisCplx { data: ComplexShort::default(), last };
            let (add, sub) = addsub(a, zero);
            prop_assert_eq!(add, a);
            prop_assert_eq!(sub, a);
        }

        #[test]
        fn prop_register_matches_function(a in item(), b in item()) {
            let mut unit = AddSubUnit::new();
            let first = unit.tick(PortsIn { a: Some(a), b: Some(b), add_ready: true, sub_ready: true });
            prop_assert!(first.accepted());
            prop_assert_eq!(first.add, None);
            let second = unit.tick(PortsIn { add_ready: true, sub_ready: true, ..Default::default() });
            let (add, sub) = addsub(a, b);
            prop_assert_eq!(second.add, Some(add));
            prop_assert_eq!(second.sub, Some(sub));
        }
    }

    #[test]
    fn test_full_throughput() {
        let mut unit = AddSubUnit::new();
        let mut seen = Vec::new();
        for i in 0..8i16 {
            let out = unit.tick(PortsIn {
                a: Some(AxisCplx::new(i, 0, i == 7)),
                b: Some(AxisCplx::new(1, 1, false)),
                add_ready: true,
                sub_ready: true,
            });
            assert!(out.accepted());
            seen.extend(out.add);
        }
        let out = unit.tick(PortsIn {
            add_ready: true,
            sub_ready: true,
            ..Default::default()
        });
        seen.extend(out.add);
        assert!(unit.is_idle());
        let re: Vec<i16> = seen.iter().map(|x| x.data.re).collect();
        assert_eq!(re, (1..9).collect::<Vec<_>>());
        assert!(seen.last().map(|x| x.last).unwrap_or(false));
    }

    #[test]
    fn test_waits_for_both_operands() {
        let mut unit = AddSubUnit::new();
        let out = unit.tick(PortsIn {
            a: Some(AxisCplx::new(1, 1, false)),
            b: None,
            add_ready: true,
            sub_ready: true,
        });
        // `b` could go, but `a` is held back until its partner shows up
        assert!(!out.accepted());
        assert!(!out.a_ready);
        assert!(out.b_ready);
        assert!(unit.is_idle());

        let out = unit.tick(PortsIn {
            a: Some(AxisCplx::new(1, 1, false)),
            b: Some(AxisCplx::new(2, 3, true)),
            add_ready: true,
            sub_ready: true,
        });
        assert!(out.a_ready && out.b_ready);
        assert!(out.accepted());
        let out = unit.tick(PortsIn {
            add_ready: true,
            sub_ready: true,
            ..Default::default()
        });
        assert_eq!(out.add, Some(AxisCplx::new(3, 4, false)));
        assert_eq!(out.sub, Some(AxisCplx::new(-1, -2, false)));
    }

    #[test]
    fn test_backpressure_holds_result() {
        let mut unit = AddSubUnit::new();
        let a = AxisCplx::new(5, 5, true);
        let b = AxisCplx::new(2, 2, false);
        unit.tick(PortsIn {
            a: Some(a),
            b: Some(b),
            add_ready: true,
            sub_ready: true,
        });
        // `sub` stalls: `add` drains, `sub` is held and nothing new is accepted
        let next = AxisCplx::new(9, 9, false);
        let out = unit.tick(PortsIn {
            a: Some(next),
            b: Some(next),
            add_ready: true,
            sub_ready: false,
        });
        assert_eq!(out.add, Some(AxisCplx::new(7, 7, true)));
        assert_eq!(out.sub, Some(AxisCplx::new(3, 3, true)));
        assert!(!out.accepted());
        let out = unit.tick(PortsIn {
            a: Some(next),
            b: Some(next),
            add_ready: true,
            sub_ready: true,
        });
        assert_eq!(out.add, None);
        assert_eq!(out.sub, Some(AxisCplx::new(3, 3, true)));
        assert!(out.accepted());
        let out = unit.tick(PortsIn {
            add_ready: true,
            sub_ready: true,
            ..Default::default()
        });
        assert_eq!(out.add, Some(AxisCplx::new(18, 18, false)));
        assert_eq!(out.sub, Some(AxisCplx::new(0, 0, false)));
    }

    #[test]
    fn test_reset() {
        let mut unit = AddSubUnit::new();
        unit.tick(PortsIn {
            a: Some(AxisCplx::default()),
            b: Some(AxisCplx::default()),
            ..Default::default()
        });
        assert!(!unit.is_idle());
        unit.reset();
        assert!(unit.is_idle());
    }
}
