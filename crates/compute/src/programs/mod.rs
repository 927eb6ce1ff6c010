//! Built-in demo programs with their default input environments and the
//! values a correct run must produce.

mod latency_chain;
mod rms_norm;
mod sum_product;

use serde::Serialize;
use vliw_core::{Result, Value, VliwError};

use crate::executor::RegisterFile;
use crate::program::{Inputs, Program};

pub use latency_chain::latency_chain;
pub use rms_norm::{rms_norm_fast_inv_sqrt, rms_norm_newton, RMS_EPSILON, RMS_GAMMA, RMS_X};
pub use sum_product::sum_product;

pub const DEMO_NAMES: [&str; 4] = ["sum-product", "latency-chain", "rms-newton", "rms-fast"];

/// A value a run must produce, read from a labelled channel or, with
/// `channel = None`, from the output sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Expected {
    pub channel: Option<String>,
    pub value: f64,
}

impl Expected {
    pub fn output(value: f64) -> Self {
        Self { channel: None, value }
    }

    pub fn channel(name: &str, value: f64) -> Self {
        Self { channel: Some(name.to_string()), value }
    }
}

#[derive(Debug, Clone)]
pub struct DemoProgram {
    pub name: &'static str,
    pub description: &'static str,
    pub program: Program,
    pub inputs: Inputs,
    pub expected: Vec<Expected>,
    /// Absolute tolerance for every comparison.
    pub tolerance: f64,
}

/// One expected-vs-actual pair from [`DemoProgram::check`].
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub channel: String,
    pub expected: f64,
    pub actual: Option<f64>,
    pub within_tolerance: bool,
}

impl DemoProgram {
    pub fn check(&self, file: &RegisterFile) -> Vec<Comparison> {
        self.expected
            .iter()
            .map(|e| {
                let actual = match &e.channel {
                    Some(name) => file.output_named(name),
                    None => file.output(),
                }
                .map(Value::as_f64);
                Comparison {
                    channel: e.channel.clone().unwrap_or_else(|| "output".to_string()),
                    expected: e.value,
                    actual,
                    within_tolerance: actual.is_some_and(|a| (a - e.value).abs() <= self.tolerance),
                }
            })
            .collect()
    }

    pub fn passes(&self, file: &RegisterFile) -> bool {
        self.check(file).iter().all(|c| c.within_tolerance)
    }
}

pub fn by_name(name: &str) -> Result<DemoProgram> {
    match name {
        "sum-product" => sum_product(),
        "latency-chain" => latency_chain(),
        "rms-newton" => rms_norm_newton(),
        "rms-fast" => rms_norm_fast_inv_sqrt(),
        other => Err(VliwError::InvalidArgument(format!(
            "unknown demo '{}' (expected one of: {})",
            other,
            DEMO_NAMES.join(", ")
        ))),
    }
}

pub fn all() -> Result<Vec<DemoProgram>> {
    DEMO_NAMES.iter().map(|name| by_name(name)).collect()
}

pub(crate) fn inputs<V: Into<Value> + Copy>(pairs: &[(&str, V)]) -> Inputs {
    pairs.iter().map(|(k, v)| (k.to_string(), (*v).into())).collect()
}
