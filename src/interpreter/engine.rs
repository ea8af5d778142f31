//! Statement execution
//!
//! The interpreter threads a current-environment reference through the tree
//! walk, pushing a scope on entry to each compound (and `for` header) and
//! popping it on every exit path. `break` and `continue` are modelled by the
//! [`Flow`] value each statement returns: loops consume `Break`/`Continue`,
//! everything else propagates them, so there are no non-local exits to
//! unwind past a scope pop.

use std::io::Write;

use crate::interpreter::env::RuntimeEnvironment;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::ops;
use crate::parser::ast::{Expr, Stmt};
use crate::parser::token::Token;

/// How a statement finished: fell through normally or requested a jump that
/// an enclosing loop or switch must service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
}

pub(crate) struct Interpreter<'a> {
    pub(crate) env: &'a mut RuntimeEnvironment,
    pub(crate) output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(env: &'a mut RuntimeEnvironment, output: &'a mut dyn Write) -> Self {
        Interpreter { env, output }
    }

    /// Run a whole program. A `Break`/`Continue` escaping the top level is
    /// impossible after type checking.
    pub(crate) fn run(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        self.execute_statements(statements)?;
        Ok(())
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for statement in statements {
            let flow = self.execute(statement)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    /// Run `body` in a fresh scope, restoring the previous scope on every
    /// path out, including faults.
    fn with_scope(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<Flow, RuntimeError>,
    ) -> Result<Flow, RuntimeError> {
        self.env.push_scope();
        let result = body(self);
        self.env.pop_scope();
        result
    }

    fn execute(&mut self, statement: &Stmt) -> Result<Flow, RuntimeError> {
        match statement {
            Stmt::Compound(items) => self.with_scope(|this| this.execute_statements(items)),

            Stmt::Expression(expression) => {
                self.evaluate(expression)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expression) => {
                let value = self.evaluate(expression)?;
                if value.is_some() {
                    writeln!(self.output, "({}){}", value.type_name(), value)?;
                } else {
                    write!(self.output, "invalid")?;
                }
                Ok(Flow::Normal)
            }

            Stmt::VarDeclaration { declarators, .. } => {
                for (name, initialiser) in declarators {
                    let value = match initialiser {
                        Some(initialiser) => self.evaluate(initialiser)?,
                        None => Default::default(),
                    };
                    self.env.define(name, value)?;
                }
                Ok(Flow::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if ops::is_truthy(self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while ops::is_truthy(self.evaluate(condition)?) {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Do { body, condition } => {
                loop {
                    match self.execute(body)? {
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                    }
                    if !ops::is_truthy(self.evaluate(condition)?) {
                        break;
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::For {
                initialiser,
                condition,
                increment,
                body,
            } => self.with_scope(|this| {
                if let Some(initialiser) = initialiser {
                    this.execute(initialiser)?;
                }

                loop {
                    if let Some(condition) = condition {
                        if !ops::is_truthy(this.evaluate(condition)?) {
                            break;
                        }
                    }

                    match this.execute(body)? {
                        Flow::Break => break,
                        // continue still runs the step expression
                        Flow::Continue | Flow::Normal => {}
                    }

                    if let Some(increment) = increment {
                        this.evaluate(increment)?;
                    }
                }

                Ok(Flow::Normal)
            }),

            Stmt::Switch {
                keyword,
                condition,
                body,
            } => self.execute_switch(keyword, condition, body),

            // Reached only during switch fall-through; the label itself is
            // inert at execution time
            Stmt::Labelled { body, .. } => self.execute(body),

            Stmt::Break { .. } => Ok(Flow::Break),

            Stmt::Continue { .. } => Ok(Flow::Continue),
        }
    }

    /// Switch execution: one pre-pass collects `(case value, statement
    /// index)` jumps and the optional default index, the discriminator and
    /// case values are evaluated once in order, and execution then falls
    /// through from the chosen index until a `break` or the end of the body.
    fn execute_switch(
        &mut self,
        keyword: &Token,
        condition: &Expr,
        body: &Stmt,
    ) -> Result<Flow, RuntimeError> {
        let items = match body {
            Stmt::Compound(items) => items,
            _ => {
                // The checker rejects this shape; keep a defensive fault
                return Err(RuntimeError::UnsupportedOperation {
                    message: "switch body must be a compound statement".to_string(),
                    line: keyword.line,
                });
            }
        };

        let mut case_jumps: Vec<(&Expr, usize)> = Vec::new();
        let mut default_jump: Option<usize> = None;
        for (index, item) in items.iter().enumerate() {
            collect_labels(item, index, &mut case_jumps, &mut default_jump);
        }

        let discriminator = self.evaluate(condition)?;

        let mut target = None;
        for (value, index) in &case_jumps {
            let case_value = self.evaluate(value)?;
            if ops::values_equal(discriminator, case_value) {
                target = Some(*index);
                break;
            }
        }
        let target = target.or(default_jump);

        match target {
            Some(start) => self.with_scope(|this| {
                for item in &items[start..] {
                    match this.execute(item)? {
                        // A break terminates the switch itself
                        Flow::Break => return Ok(Flow::Normal),
                        // A continue belongs to an enclosing loop
                        Flow::Continue => return Ok(Flow::Continue),
                        Flow::Normal => {}
                    }
                }
                Ok(Flow::Normal)
            }),
            None => Ok(Flow::Normal),
        }
    }
}

/// Record the labels under `statement` against the index of the top-level
/// switch-body statement containing them. Nested switches keep their own
/// labels.
fn collect_labels<'s>(
    statement: &'s Stmt,
    index: usize,
    case_jumps: &mut Vec<(&'s Expr, usize)>,
    default_jump: &mut Option<usize>,
) {
    match statement {
        Stmt::Labelled { value, body, .. } => {
            match value {
                Some(value) => case_jumps.push((value, index)),
                None => {
                    // First default wins; the checker rejects duplicates
                    default_jump.get_or_insert(index);
                }
            }
            collect_labels(body, index, case_jumps, default_jump);
        }

        Stmt::Compound(items) => {
            for item in items {
                collect_labels(item, index, case_jumps, default_jump);
            }
        }

        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_labels(then_branch, index, case_jumps, default_jump);
            if let Some(else_branch) = else_branch {
                collect_labels(else_branch, index, case_jumps, default_jump);
            }
        }

        Stmt::While { body, .. } | Stmt::Do { body, .. } | Stmt::For { body, .. } => {
            collect_labels(body, index, case_jumps, default_jump);
        }

        // A nested switch owns its labels
        Stmt::Switch { .. } => {}

        _ => {}
    }
}
