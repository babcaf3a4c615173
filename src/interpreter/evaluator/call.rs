use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::{Argument, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Interpreter},
            scope::FrameId,
        },
        signature::{ArgumentMatch, Signature, match_arguments},
        value::core::{Closure, Constructor, GenericFunction, Instance, Value},
    },
    util::span::Span,
};

impl Interpreter {
    /// Evaluates a call expression.
    ///
    /// The callee is evaluated first, then its signature is matched against
    /// the argument list, then the argument expressions are evaluated in the
    /// caller's frame in source order. Flags bind `true` and enum arguments
    /// bind the member name as a string.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            arguments: &[Argument],
                            span: Span,
                            frame: FrameId)
                            -> EvalResult<Value> {
        let callee = self.eval(callee, frame)?;
        match &callee {
            Value::Native(native) => {
                let matched = bind_shape(native.name, &native.signature, arguments, span)?;
                let values = self.eval_arguments(arguments, frame)?;
                let bound = matched.sources
                                   .iter()
                                   .map(|source| source.map_or(Value::None, |i| values[i].clone()))
                                   .collect::<Vec<_>>();
                (native.func)(&bound, span)
            },
            Value::Function(closure) => {
                let name = closure.def.name.as_deref().unwrap_or("<fn>");
                let matched = bind_shape(name, &closure.signature, arguments, span)?;
                let values = self.eval_arguments(arguments, frame)?;
                self.invoke(closure, &matched, values, span)
            },
            Value::Generic(generic) => self.dispatch(generic, arguments, span, frame),
            Value::Constructor(constructor) => {
                let matched =
                    bind_shape(&constructor.name, &constructor.signature, arguments, span)?;
                let values = self.eval_arguments(arguments, frame)?;
                self.construct(constructor, &matched, values, span)
            },
            other => Err(RuntimeError::NotCallable { found: other.type_name().to_string(),
                                                     span }),
        }
    }

    /// Evaluates every argument once, in source order.
    fn eval_arguments(&mut self, arguments: &[Argument], frame: FrameId) -> EvalResult<Vec<Value>> {
        arguments.iter()
                 .map(|argument| match argument {
                     Argument::Positional(value) | Argument::Named { value, .. } => {
                         self.eval(value, frame)
                     },
                     Argument::Flag { .. } => Ok(Value::Bool(true)),
                     Argument::Enum { value, .. } => Ok(Value::from(value.as_str())),
                 })
                 .collect()
    }

    /// Calls the first instance whose signature accepts the argument shape
    /// and whose parameter annotations accept the argument values.
    fn dispatch(&mut self,
                generic: &Rc<GenericFunction>,
                arguments: &[Argument],
                span: Span,
                frame: FrameId)
                -> EvalResult<Value> {
        let candidates: Vec<_> =
            generic.instances
                   .iter()
                   .filter_map(|instance| {
                       Some((instance, match_arguments(&instance.signature, arguments).ok()?))
                   })
                   .collect();
        if candidates.is_empty() {
            return Err(RuntimeError::NoMatchingInstance { name: generic.name.clone(),
                                                          span });
        }

        let values = self.eval_arguments(arguments, frame)?;
        for (index, (instance, matched)) in candidates.into_iter().enumerate() {
            if accepts_values(&instance.signature, &matched, &values) {
                trace!(name = %generic.name, candidate = index, "dispatching generic call");
                return self.invoke(instance, &matched, values, span);
            }
        }

        Err(RuntimeError::NoMatchingInstance { name: generic.name.clone(),
                                               span })
    }

    /// Runs an interpreted function in a fresh child frame of its closure
    /// frame.
    ///
    /// Parameters are bound in declaration order; a parameter without an
    /// argument gets its default, evaluated in the new frame so it can refer
    /// to the parameters bound before it.
    fn invoke(&mut self,
              closure: &Rc<Closure>,
              matched: &ArgumentMatch,
              values: Vec<Value>,
              span: Span)
              -> EvalResult<Value> {
        self.enter_call(span)?;
        let frame = self.scope.push(closure.scope.id());
        let result = self.bind_parameters(&closure.signature, matched, values, frame)
                         .and_then(|()| {
                             self.eval_statements(&closure.def.body.statements, frame)
                         });
        self.scope.release(frame);
        self.leave_call();
        result
    }

    /// Builds an instance; field defaults are evaluated like parameter
    /// defaults, in a child frame of the frame that declared the type.
    fn construct(&mut self,
                 constructor: &Rc<Constructor>,
                 matched: &ArgumentMatch,
                 values: Vec<Value>,
                 span: Span)
                 -> EvalResult<Value> {
        self.enter_call(span)?;
        let frame = self.scope.push(constructor.scope.id());
        let result = self.bind_parameters(&constructor.signature, matched, values, frame)
                         .map(|()| {
                             constructor.signature
                                        .parameters
                                        .iter()
                                        .map(|field| {
                                            let value = self.scope
                                                            .lookup(frame, &field.name)
                                                            .cloned()
                                                            .unwrap_or(Value::None);
                                            (field.name.clone(), value)
                                        })
                                        .collect::<Vec<_>>()
                         });
        self.scope.release(frame);
        self.leave_call();

        Ok(Value::Instance(Rc::new(Instance { type_name:   constructor.type_name.clone(),
                                              constructor: constructor.name.clone(),
                                              fields:      result?, })))
    }

    fn bind_parameters(&mut self,
                       signature: &Signature,
                       matched: &ArgumentMatch,
                       mut values: Vec<Value>,
                       frame: FrameId)
                       -> EvalResult<()> {
        for (parameter, source) in signature.parameters.iter().zip(&matched.sources) {
            let value = match (source, &parameter.default) {
                (Some(index), _) => std::mem::replace(&mut values[*index], Value::None),
                (None, Some(default)) => self.eval(default, frame)?,
                (None, None) => Value::None,
            };
            self.scope.define(frame, &parameter.name, value);
        }
        Ok(())
    }
}

/// Runs the matcher, turning a mismatch into a runtime error naming the
/// callee.
fn bind_shape(name: &str,
              signature: &Signature,
              arguments: &[Argument],
              span: Span)
              -> EvalResult<ArgumentMatch> {
    match_arguments(signature, arguments).map_err(|reason| RuntimeError::ArgumentMismatch {
        name: name.to_string(),
        reason,
        span,
    })
}

/// Whether every annotated parameter that received an argument got a value
/// of the annotated type.
fn accepts_values(signature: &Signature, matched: &ArgumentMatch, values: &[Value]) -> bool {
    signature.parameters
             .iter()
             .zip(&matched.sources)
             .all(|(parameter, source)| match (&parameter.type_name, source) {
                 (Some(annotation), Some(index)) => values[*index].satisfies(annotation),
                 _ => true,
             })
}
