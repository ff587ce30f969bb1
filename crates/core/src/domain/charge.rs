// Resource charges debited after a command runs

use std::fmt;

/// A fixed cost unit attached to a command class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Charge {
    cost: u32,
    label: &'static str,
}

impl Charge {
    pub const fn new(cost: u32, label: &'static str) -> Self {
        Self { cost, label }
    }

    pub const fn cost(&self) -> u32 {
        self.cost
    }

    pub const fn label(&self) -> &'static str {
        self.label
    }
}

impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.cost)
    }
}

/// Default cost of any RPC command
pub const FEE_REFERENCE_RPC: Charge = Charge::new(20, "reference RPC");
/// Command failed with an internal error
pub const FEE_EXCEPTION_RPC: Charge = Charge::new(100, "exceptioned RPC");
pub const FEE_LOW_BURDEN_RPC: Charge = Charge::new(250, "low RPC");
pub const FEE_MEDIUM_BURDEN_RPC: Charge = Charge::new(400, "medium RPC");
pub const FEE_HIGH_BURDEN_RPC: Charge = Charge::new(3000, "heavy RPC");
