use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::Parameter,
    interpreter::{
        evaluator::function::builtin,
        signature::Signature,
        value::core::{NativeFn, NativeFunction, Value},
    },
    util::span::Span,
};

/// Defines native functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - its positional parameter names,
/// - a function pointer implementing the native.
///
/// The macro produces:
/// - `NativeDef` (internal metadata),
/// - `NATIVE_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of native names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                params: [$($param:literal),* $(,)?],
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct NativeDef {
            name:   &'static str,
            params: &'static [&'static str],
            func:   NativeFn,
        }
        static NATIVE_TABLE: &[NativeDef] = &[
            $(
                NativeDef { name: $name, params: &[$($param),*], func: $func },
            )*
        ];
        /// Names of all native functions, in table order.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "print"  => { params: ["value"],  func: builtin::print },
    "assert" => { params: ["value"],  func: builtin::assert_fn },
    "abs"    => { params: ["x"],      func: builtin::abs },
    "sqrt"   => { params: ["x"],      func: builtin::sqrt },
    "floor"  => { params: ["x"],      func: builtin::floor },
    "min"    => { params: ["a", "b"], func: builtin::min },
    "max"    => { params: ["a", "b"], func: builtin::max },
    "length" => { params: ["text"],   func: builtin::length },
    "string" => { params: ["value"],  func: builtin::string },
}

impl NativeDef {
    fn signature(&self) -> Signature {
        Signature::new(self.params
                           .iter()
                           .map(|name| Parameter { name:         (*name).to_string(),
                                                   positional:   true,
                                                   default:      None,
                                                   enum_members: None,
                                                   type_name:    None,
                                                   span:         Span::default(), })
                           .collect())
    }
}

/// Builds the global bindings every program starts with: one native
/// function value per table entry.
///
/// # Example
/// ```
/// use lilt::interpreter::evaluator::function::core::{BUILTIN_FUNCTIONS, prelude};
///
/// let globals = prelude();
/// assert_eq!(globals.len(), BUILTIN_FUNCTIONS.len());
/// assert!(globals.contains_key("print"));
/// ```
#[must_use]
pub fn prelude() -> HashMap<String, Value> {
    NATIVE_TABLE.iter()
                .map(|def| {
                    let native = NativeFunction { name:      def.name,
                                                  signature: def.signature(),
                                                  func:      def.func, };
                    (def.name.to_string(), Value::Native(Rc::new(native)))
                })
                .collect()
}
