use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use vliw_core::{Reg, RegisterTable, Value};

/// Register values produced by one replay, plus the sink outputs.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    registers: Arc<RegisterTable>,
    values: Vec<Option<Value>>,
    output: Option<Value>,
    outputs: IndexMap<String, Value>,
    cycles: u64,
}

impl RegisterFile {
    pub(crate) fn new(registers: Arc<RegisterTable>) -> Self {
        let values = vec![None; registers.len()];
        Self {
            registers,
            values,
            output: None,
            outputs: IndexMap::new(),
            cycles: 0,
        }
    }

    /// Value of a written register, by name. External registers that were
    /// only read are not recorded.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.registers.lookup(name).and_then(|r| self.get_reg(r))
    }

    pub fn get_reg(&self, reg: Reg) -> Option<Value> {
        self.values.get(reg.index()).copied().flatten()
    }

    pub(crate) fn set(&mut self, reg: Reg, value: Value) {
        if reg.index() >= self.values.len() {
            self.values.resize(reg.index() + 1, None);
        }
        self.values[reg.index()] = Some(value);
    }

    /// The designated output: the value of the last sink in schedule order.
    pub fn output(&self) -> Option<Value> {
        self.output
    }

    /// Labelled sink channels, in first-write order.
    pub fn outputs(&self) -> &IndexMap<String, Value> {
        &self.outputs
    }

    pub fn output_named(&self, label: &str) -> Option<Value> {
        self.outputs.get(label).copied()
    }

    pub(crate) fn emit(&mut self, label: Option<Reg>, value: Value) {
        self.output = Some(value);
        if let Some(label) = label {
            let name = self.registers.name(label).to_string();
            self.outputs.insert(name, value);
        }
    }

    /// Simulated cycle count of the replay.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub(crate) fn set_cycles(&mut self, cycles: u64) {
        self.cycles = cycles;
    }

    pub fn registers(&self) -> &Arc<RegisterTable> {
        &self.registers
    }

    /// Written registers, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.map(|v| (self.registers.name(Reg::from_index(idx)), v)))
    }

    pub fn snapshot(&self) -> ExecutionReport {
        ExecutionReport {
            output: self.output,
            outputs: self.outputs.clone(),
            cycles: self.cycles,
            registers: self.iter().map(|(n, v)| (n.to_string(), v)).collect(),
        }
    }
}

/// Serializable view of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub output: Option<Value>,
    pub outputs: IndexMap<String, Value>,
    pub cycles: u64,
    pub registers: IndexMap<String, Value>,
}
