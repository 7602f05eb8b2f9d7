//! AST → code lowering and literal-object materialization.
//!
//! Literal objects are built while compiling: constant slots take their
//! value from a `Lit` or `Mth` initializer directly, anything else is
//! executed right away in the lobby. Data-slot initializers are always
//! executed. This is why lowering lives in the `vm` crate — the
//! evaluator must be available during compilation.

use object::{
    Code, Obj, ObjHandle, Slot, SlotTags, Value, BLOCK_PARENT_SLOT,
    LEXICAL_PARENT_SLOT,
};
use parser::{Expr, ExprKind, ParseError, SlotDeclKind, SlotDescriptor};

use crate::interpreter::{self, top_level_method};
use crate::{Error, Runtime};

pub struct Compiler<'rt> {
    rt: &'rt mut Runtime,
}

impl<'rt> Compiler<'rt> {
    pub fn new(rt: &'rt mut Runtime) -> Self {
        Self { rt }
    }

    /// Compile a top-level program into its synthetic method: one
    /// parent-argument `self`, filled with the lobby at execution time.
    pub fn compile_program(
        &mut self,
        exprs: &[Expr],
    ) -> Result<ObjHandle, Error> {
        let mut code = Vec::with_capacity(exprs.len());
        for expr in exprs {
            code.push(self.compile_expr(expr)?);
        }
        Ok(top_level_method(code, &self.rt.specials.nil))
    }

    pub fn compile_expr(&mut self, expr: &Expr) -> Result<Code, Error> {
        match &expr.kind {
            ExprKind::Integer(n) => Ok(Code::Lit(Value::Int(*n))),
            ExprKind::Float(x) => Ok(Code::Lit(Value::Float(*x))),
            ExprKind::Str(s) => Ok(Code::Lit(Value::string(s))),

            ExprKind::Message {
                receiver,
                selector,
                args,
            } => {
                let receiver = match receiver {
                    Some(receiver) => {
                        Some(Box::new(self.compile_expr(receiver)?))
                    }
                    None => None,
                };
                let mut code_args = Vec::with_capacity(args.len());
                for arg in args {
                    code_args.push(self.compile_expr(arg)?);
                }
                Ok(Code::Msg {
                    receiver,
                    selector: selector.as_str().into(),
                    args: code_args,
                })
            }

            ExprKind::Object { slots, body } => {
                self.compile_object(slots, body)
            }

            ExprKind::Block { slots, body } => self.compile_block(slots, body),

            ExprKind::Return(inner) => {
                Ok(Code::Ret(Box::new(self.compile_expr(inner)?)))
            }
        }
    }

    /// A parenthesized object: slots only → a plain data object
    /// (`Lit`); any body → a method, wrapped in `Mth` so that using it
    /// as an expression evaluates it in place.
    fn compile_object(
        &mut self,
        slots: &[SlotDescriptor],
        body: &[Expr],
    ) -> Result<Code, Error> {
        let built = self.build_slots(slots)?;

        if body.is_empty() && !slots.is_empty() {
            return Ok(Code::Lit(Value::Obj(
                Obj::with_slots(built).handle(),
            )));
        }

        let mut code = Vec::with_capacity(body.len());
        for expr in body {
            code.push(self.compile_expr(expr)?);
        }
        let method = Obj::method(order_for_method(built), code).handle();
        Ok(Code::Mth(method))
    }

    /// A block literal: the method gets the synthesized `(parent)`
    /// parent-argument at slot 0; the block object pairs `traitsBlock`,
    /// the `lexicalParent` cell and the arity-encoding `value…` slot.
    fn compile_block(
        &mut self,
        slots: &[SlotDescriptor],
        body: &[Expr],
    ) -> Result<Code, Error> {
        let built = self.build_slots(slots)?;
        let arg_count = built.iter().filter(|s| s.is_argument()).count();

        let nil = Value::Obj(self.rt.specials.nil.clone());
        let mut method_slots = Vec::with_capacity(built.len() + 1);
        method_slots.push(Slot::new(
            SlotTags::ARGUMENT | SlotTags::PARENT,
            BLOCK_PARENT_SLOT,
            nil.clone(),
        ));
        method_slots.extend(order_for_method(built));

        let mut code = Vec::with_capacity(body.len().max(1));
        for expr in body {
            code.push(self.compile_expr(expr)?);
        }
        if code.is_empty() {
            // An empty block evaluates to nil.
            code.push(Code::Lit(nil.clone()));
        }
        let method = Obj::method(method_slots, code).handle();

        let proto = Obj::with_slots(vec![
            Slot::constant(
                "parent",
                Value::Obj(self.rt.specials.block_traits.clone()),
            )
            .parent(),
            Slot::argument(LEXICAL_PARENT_SLOT, nil),
            Slot::constant(&value_selector(arg_count), Value::Obj(method)),
        ])
        .handle();

        Ok(Code::Blk(proto))
    }

    /// Build the slot vector of a literal object, in declaration order,
    /// emitting paired mutators for data slots.
    fn build_slots(
        &mut self,
        descriptors: &[SlotDescriptor],
    ) -> Result<Vec<Slot>, Error> {
        let nil = Value::Obj(self.rt.specials.nil.clone());
        let mut obj = Obj::new();

        for desc in descriptors {
            let parent_tag = if desc.is_parent {
                SlotTags::PARENT
            } else {
                SlotTags::empty()
            };

            let added = match desc.kind {
                SlotDeclKind::Argument => {
                    let value = match &desc.init {
                        Some(init) => self.eval_initializer(init)?,
                        None => nil.clone(),
                    };
                    obj.add_slot(Slot::new(
                        SlotTags::ARGUMENT | parent_tag,
                        &desc.name,
                        value,
                    ))
                }

                SlotDeclKind::Data => {
                    let value = match &desc.init {
                        Some(init) => self.eval_initializer(init)?,
                        None => nil.clone(),
                    };
                    obj.add_data_slot(&desc.name, parent_tag, value)
                }

                SlotDeclKind::Constant => {
                    let init = desc
                        .init
                        .as_ref()
                        .expect("constant slots always carry an initializer");
                    let code = self.compile_expr(init)?;
                    let value = if desc.params.is_empty() {
                        match code {
                            Code::Lit(value) => value,
                            Code::Mth(method) => Value::Obj(
                                into_named_method(&method, &[], &nil),
                            ),
                            other => self.eval_code(other)?,
                        }
                    } else {
                        // Inline parameters force the method reading of
                        // the initializer.
                        let method = match code {
                            Code::Mth(method) => into_named_method(
                                &method,
                                &desc.params,
                                &nil,
                            ),
                            other => {
                                synthesize_method(other, &desc.params, &nil)
                            }
                        };
                        Value::Obj(method)
                    };
                    obj.add_slot(Slot::new(parent_tag, &desc.name, value))
                }
            };

            if !added {
                return Err(Error::Syntax(ParseError::new(
                    format!("duplicate slot name: {}", desc.name),
                    desc.span,
                )));
            }
        }

        Ok(obj.slots)
    }

    /// Run an initializer expression at compile time, in the lobby.
    fn eval_initializer(&mut self, expr: &Expr) -> Result<Value, Error> {
        let code = self.compile_expr(expr)?;
        self.eval_code(code)
    }

    fn eval_code(&mut self, code: Code) -> Result<Value, Error> {
        let method = top_level_method(vec![code], &self.rt.specials.nil);
        let lobby = Value::Obj(self.rt.specials.lobby.clone());
        interpreter::activate(self.rt, &method, &[lobby])
            .map_err(Error::Runtime)
    }
}

/// Method slot order: argument slots first (selector order), locals
/// after — activation writes `arg_i` into slot `i`.
fn order_for_method(slots: Vec<Slot>) -> Vec<Slot> {
    let (args, locals): (Vec<_>, Vec<_>) =
        slots.into_iter().partition(|slot| slot.is_argument());
    let mut ordered = args;
    ordered.extend(locals);
    ordered
}

/// Turn a compiled method literal into a storable, callable method:
/// prepend the parent-argument `self` and the inline parameters.
fn into_named_method(
    method: &ObjHandle,
    params: &[String],
    nil: &Value,
) -> ObjHandle {
    let inner = method.borrow();
    let mut slots = Vec::with_capacity(inner.slots.len() + params.len() + 1);
    slots.push(Slot::new(
        SlotTags::ARGUMENT | SlotTags::PARENT,
        "self",
        nil.clone(),
    ));
    for param in params {
        slots.push(Slot::argument(param, nil.clone()));
    }
    slots.extend(inner.slots.iter().cloned());
    Obj {
        slots,
        code: inner.code.clone(),
    }
    .handle()
}

/// Wrap a single code node into an argument-bearing method body.
fn synthesize_method(code: Code, params: &[String], nil: &Value) -> ObjHandle {
    let mut slots = Vec::with_capacity(params.len() + 1);
    slots.push(Slot::new(
        SlotTags::ARGUMENT | SlotTags::PARENT,
        "self",
        nil.clone(),
    ));
    for param in params {
        slots.push(Slot::argument(param, nil.clone()));
    }
    Obj::method(slots, vec![code]).handle()
}

/// `value` for a niladic block, `value:` for one argument, one `With:`
/// per argument past the first.
fn value_selector(arg_count: usize) -> String {
    match arg_count {
        0 => "value".to_string(),
        n => {
            let mut selector = String::from("value:");
            for _ in 1..n {
                selector.push_str("With:");
            }
            selector
        }
    }
}
