//! Function call evaluation.
//!
//! Arguments are evaluated in call order, the piped value first, before the
//! callee's frame is pushed. Failures inside the call are attributed to the
//! call site; an error already attributed to a deeper call keeps its
//! original attribution, so a failing pipe stage is reported once, at the
//! stage that failed.

use sluice_diagnostic::{Error, Result};
use sluice_ir::{SourceLocation, Symbol, PIPE_PLACEHOLDER};
use sluice_semantic::{CallExpr, Expr, FunctionBody};

use super::{Interpreter, SideEffect};
use crate::builtins::{Arguments, CallContext};
use crate::scope::Scope;
use crate::stack::StackEntry;
use crate::value::{Function, UserFunction, Value};

impl Interpreter {
    pub(super) fn eval_call(&mut self, scope: &Scope, c: &CallExpr) -> Result<Value> {
        let function = match self.eval_expr(scope, &c.callee)? {
            Value::Function(f) => f,
            other => {
                return Err(Error::type_mismatch(format!(
                    "cannot call a value of type {}",
                    other.type_name()
                ))
                .at(&c.loc));
            }
        };

        let piped = match &c.pipe {
            Some(p) => Some(self.eval_expr(scope, p)?),
            None => None,
        };
        let mut args = Vec::with_capacity(c.arguments.len());
        for arg in &c.arguments {
            args.push((arg.key.name.clone(), self.eval_expr(scope, &arg.value)?));
        }

        let name = c.callee_name();
        let loc = self.locate(&c.loc);
        tracing::trace!(callee = %name, depth = self.stack.depth(), "call");
        let value = self
            .call_function(&function, args, piped, c, &name, &loc)
            .map_err(|e| e.attribute_call(&name, &loc))?;

        if function.has_side_effect() {
            self.side_effects.push(SideEffect {
                value: value.clone(),
                node: Expr::Call(Box::new(c.clone())),
            });
        }
        Ok(value)
    }

    fn call_function(
        &mut self,
        function: &Function,
        args: Vec<(Symbol, Value)>,
        piped: Option<Value>,
        c: &CallExpr,
        name: &str,
        loc: &SourceLocation,
    ) -> Result<Value> {
        let mut call = self.enter_call(StackEntry {
            function_name: name.to_owned(),
            location: loc.clone(),
        })?;
        match function {
            Function::User(f) => call.apply_user(f, args, piped),
            Function::Builtin(b) => {
                let arguments = Arguments::bind(&b.ty, args, piped)?;
                let ctx = CallContext {
                    stack: &call.stack,
                    location: loc,
                    ret_type: &c.typ,
                };
                (b.func)(&ctx, &arguments)
            }
        }
    }

    /// Bind parameters in a fresh frame over the captured scope and run the
    /// body.
    ///
    /// Defaults are evaluated only for parameters the call left unbound, in
    /// the callee's frame, so they see the captured scope and every
    /// parameter bound before them. A piped value sent to a function with no
    /// pipe parameter is bound as `<-` for those defaults.
    fn apply_user(
        &mut self,
        f: &UserFunction,
        args: Vec<(Symbol, Value)>,
        piped: Option<Value>,
    ) -> Result<Value> {
        let expr = &f.expr;
        let mut frame = f.scope.nest();
        tracing::trace!(params = expr.params.len(), "push function frame");

        for (name, value) in args {
            let Some(param) = expr.param(name.as_str()) else {
                return Err(Error::invalid(format!("unexpected argument \"{name}\"")));
            };
            if frame.is_bound_locally(name.as_str()) || (param.is_pipe && piped.is_some()) {
                return Err(Error::duplicate_argument(name.as_str()));
            }
            frame.set(name, value);
        }
        if let Some(value) = piped {
            let name = match expr.pipe_param() {
                Some(param) => param.key.name.clone(),
                None => Symbol::new(PIPE_PLACEHOLDER),
            };
            frame.set(name, value);
        }

        for param in &expr.params {
            if frame.is_bound_locally(param.key.name.as_str()) {
                continue;
            }
            match &param.default {
                Some(default) => {
                    let value = self.eval_expr(&frame, default)?;
                    frame.set(param.key.name.clone(), value);
                }
                None => return Err(Error::missing_argument(param.key.name.as_str())),
            }
        }

        match &expr.body {
            FunctionBody::Expr(body) => self.eval_expr(&frame, body),
            FunctionBody::Block(block) => self.eval_block(&mut frame, block),
        }
    }
}
