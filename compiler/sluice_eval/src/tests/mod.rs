//! Interpreter tests, grouped by concern.
//!
//! Programs are built with [`sluice_semantic::build`] and run through a
//! full [`Interpreter`], so every test also passes type inference.

mod interpreter_tests;
mod multi_phase_tests;
mod side_effects_tests;

use sluice_diagnostic::Error;
use sluice_semantic::{build, Expr, Statement};

use crate::{Interpreter, SideEffect, Value};

/// Run `body` as one phase of `interp`.
fn run_in(interp: &mut Interpreter, body: Vec<Statement>) -> Result<Vec<SideEffect>, Error> {
    crate::init_tracing();
    interp.eval(&mut build::package(body))
}

/// Run `body` as the only phase of a fresh interpreter.
fn run(body: Vec<Statement>) -> Result<Vec<SideEffect>, Error> {
    let mut interp = Interpreter::new().unwrap();
    run_in(&mut interp, body)
}

fn run_err(body: Vec<Statement>) -> Error {
    run(body).unwrap_err()
}

fn values(effects: &[SideEffect]) -> Vec<Value> {
    effects.iter().map(|e| e.value.clone()).collect()
}

/// Evaluate `body` and return the value of its last expression statement.
fn eval_last(body: Vec<Statement>) -> Value {
    run(body).unwrap().pop().unwrap().value
}

fn eval_one(e: Expr) -> Value {
    eval_last(vec![build::expr_stmt(e)])
}
