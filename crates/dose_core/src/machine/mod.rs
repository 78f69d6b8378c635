//! Circular-tape register machine that executes codon-decoded genomes.
//!
//! A genome is read `codon_length` symbols at a time. Each codon is looked up
//! in an [`InstructionTable`] and its handler mutates a single
//! [`ExecutionContext`] in place. Execution stops when the source is
//! exhausted, a handler halts, or `max_instructions` dispatches have run.
//! The instruction set has no loop construct, so the dispatch cap is the only
//! guard against runaway programs.

pub mod instructions;
pub mod table;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

pub use table::{
    Category, Dispatch, Handler, Instruction, InstructionSet, InstructionTable, RagarajaVersion,
    WeightedInstruction,
};

/// Symbol used to pad a genome to a whole number of codons.
pub const SENTINEL: char = '#';

/// Runtime faults raised by instruction handlers.
///
/// These are organism-level noise: the orchestrator records them on the
/// organism and carries on with the generation.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionFault {
    #[error("tape index {index} out of range for tape of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow")]
    Overflow,

    #[error("invalid numeric conversion of {0}")]
    InvalidConversion(f64),

    #[error("operation requires a non-empty tape")]
    EmptyTape,
}

/// Control-flow signal returned by every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Run state shared by the machine and its handlers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    pub tape: Vec<f64>,
    /// Array pointer. Handlers may move it freely; the machine wraps it into
    /// `[0, capacity)` after every dispatch.
    pub pointer: isize,
    pub capacity: usize,
    pub input: VecDeque<f64>,
    pub output: Vec<f64>,
    pub source: Vec<char>,
    pub source_pointer: usize,
    /// Number of dispatches performed so far.
    pub executed: usize,
}

impl ExecutionContext {
    /// Tape index the pointer refers to.
    #[must_use]
    pub fn index(&self) -> usize {
        self.offset(0)
    }

    /// Tape index `delta` cells away from the pointer, wrapped by capacity.
    #[must_use]
    pub fn offset(&self, delta: isize) -> usize {
        if self.capacity == 0 {
            return 0;
        }
        (self.pointer + delta).rem_euclid(self.capacity as isize) as usize
    }

    pub fn read(&self, index: usize) -> Result<f64, ExecutionFault> {
        self.tape
            .get(index)
            .copied()
            .ok_or(ExecutionFault::OutOfRange {
                index,
                len: self.tape.len(),
            })
    }

    /// Stores `value`, rejecting non-finite results.
    pub fn write(&mut self, index: usize, value: f64) -> Result<(), ExecutionFault> {
        let value = finite(value)?;
        let len = self.tape.len();
        let cell = self
            .tape
            .get_mut(index)
            .ok_or(ExecutionFault::OutOfRange { index, len })?;
        *cell = value;
        Ok(())
    }

    pub fn current(&self) -> Result<f64, ExecutionFault> {
        self.read(self.index())
    }

    pub fn set_current(&mut self, value: f64) -> Result<(), ExecutionFault> {
        self.write(self.index(), value)
    }

    /// Applies `op` to the current cell.
    pub fn update_current<F>(&mut self, op: F) -> Result<(), ExecutionFault>
    where
        F: FnOnce(f64) -> Result<f64, ExecutionFault>,
    {
        let value = op(self.current()?)?;
        self.set_current(value)
    }

    /// Value of the cell after the current one.
    pub fn next(&self) -> Result<f64, ExecutionFault> {
        self.read(self.offset(1))
    }

    pub fn emit(&mut self, value: f64) -> Result<(), ExecutionFault> {
        self.output.push(finite(value)?);
        Ok(())
    }
}

pub(crate) fn finite(value: f64) -> Result<f64, ExecutionFault> {
    if value.is_nan() {
        Err(ExecutionFault::InvalidConversion(value))
    } else if value.is_infinite() {
        Err(ExecutionFault::Overflow)
    } else {
        Ok(value)
    }
}

/// Interpreter bound to one instruction table and resource limits.
#[derive(Debug, Clone, Copy)]
pub struct TapeMachine<'t> {
    table: &'t InstructionTable,
    tape_capacity: usize,
    max_instructions: usize,
}

impl<'t> TapeMachine<'t> {
    #[must_use]
    pub fn new(table: &'t InstructionTable, tape_capacity: usize, max_instructions: usize) -> Self {
        Self {
            table,
            tape_capacity,
            max_instructions,
        }
    }

    #[must_use]
    pub fn table(&self) -> &InstructionTable {
        self.table
    }

    #[must_use]
    pub fn tape_capacity(&self) -> usize {
        self.tape_capacity
    }

    #[must_use]
    pub fn max_instructions(&self) -> usize {
        self.max_instructions
    }

    /// Drops symbols that cannot start a codon and pads to a codon boundary.
    #[must_use]
    pub fn prepare_source(&self, source: &[char]) -> Vec<char> {
        let codon_length = self.table.codon_length().max(1);
        let mut prepared: Vec<char> = source
            .iter()
            .copied()
            .filter(|symbol| self.table.starts_codon(*symbol))
            .collect();
        while prepared.len() % codon_length != 0 {
            prepared.push(SENTINEL);
        }
        prepared
    }

    /// A zeroed tape of the configured capacity.
    #[must_use]
    pub fn blank_tape(&self) -> Vec<f64> {
        vec![0.0; self.tape_capacity]
    }

    /// Runs `source` against `tape`, consuming `input`.
    ///
    /// A tape shorter than the capacity is padded with zeros. Faults raised
    /// by a handler abort this run and are returned to the caller; unknown
    /// codons are logged and skipped.
    pub fn execute(
        &self,
        source: &[char],
        input: Vec<f64>,
        mut tape: Vec<f64>,
        rng: &mut dyn RngCore,
    ) -> Result<ExecutionContext, ExecutionFault> {
        if self.tape_capacity == 0 {
            return Err(ExecutionFault::EmptyTape);
        }
        if tape.len() < self.tape_capacity {
            tape.resize(self.tape_capacity, 0.0);
        }

        let codon_length = self.table.codon_length().max(1);
        let mut ctx = ExecutionContext {
            tape,
            pointer: 0,
            capacity: self.tape_capacity,
            input: input.into(),
            output: Vec::new(),
            source: self.prepare_source(source),
            source_pointer: 0,
            executed: 0,
        };

        let mut codon = String::with_capacity(codon_length);
        while ctx.source_pointer < ctx.source.len() && ctx.executed < self.max_instructions {
            let end = (ctx.source_pointer + codon_length).min(ctx.source.len());
            codon.clear();
            codon.extend(&ctx.source[ctx.source_pointer..end]);
            ctx.executed += 1;

            let flow = match self.table.resolve(&codon, rng) {
                Some(instruction) => (instruction.handler)(&mut ctx, rng)?,
                None => {
                    tracing::debug!(
                        codon = %codon,
                        position = ctx.source_pointer,
                        "Unknown codon treated as no-op"
                    );
                    Flow::Continue
                }
            };

            ctx.pointer = ctx.pointer.rem_euclid(self.tape_capacity as isize);
            ctx.source_pointer += codon_length;

            if flow == Flow::Halt {
                break;
            }
        }

        Ok(ctx)
    }
}
