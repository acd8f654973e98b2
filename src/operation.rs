use std::rc::Rc;

use crate::{
    error::{GradError, Result},
    Value,
};

/// One recorded step of how a [`Value`] was produced from its operands.
///
/// Operands are shared handles: an operation keeps them alive for as long as it exists.
#[derive(Clone, Debug)]
pub enum Operation {
    Add(Rc<Value>, Rc<Value>),
    Sub(Rc<Value>, Rc<Value>),
    Mul(Rc<Value>, Rc<Value>),
    /// Base and a constant exponent. The exponent does not receive a gradient.
    Pow(Rc<Value>, f64),
    /// Forward-only quotient. It has no gradient rule, so backpropagating through it fails.
    Div(Rc<Value>, Rc<Value>),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        use Operation::*;
        match self {
            Add(..) => "add",
            Sub(..) => "sub",
            Mul(..) => "mul",
            Pow(..) => "pow",
            Div(..) => "div",
        }
    }

    /// The left (or only) operand and the right operand, if any.
    pub fn operands(&self) -> (&Value, Option<&Value>) {
        use Operation::*;
        match self {
            Add(lhs, rhs) | Sub(lhs, rhs) | Mul(lhs, rhs) | Div(lhs, rhs) => {
                (&**lhs, Some(&**rhs))
            }
            Pow(base, _) => (&**base, None),
        }
    }

    pub(crate) fn into_operands(self) -> (Rc<Value>, Option<Rc<Value>>) {
        use Operation::*;
        match self {
            Add(lhs, rhs) | Sub(lhs, rhs) | Mul(lhs, rhs) | Div(lhs, rhs) => (lhs, Some(rhs)),
            Pow(base, _) => (base, None),
        }
    }

    pub fn has_grad_rule(&self) -> bool {
        !matches!(self, Operation::Div(..))
    }

    /// Forward value from the operands' current data.
    pub(crate) fn eval(&self) -> f64 {
        use Operation::*;
        match self {
            Add(lhs, rhs) => lhs.value() + rhs.value(),
            Sub(lhs, rhs) => lhs.value() - rhs.value(),
            Mul(lhs, rhs) => lhs.value() * rhs.value(),
            Pow(base, exp) => base.value().powf(*exp),
            Div(lhs, rhs) => lhs.value() / rhs.value(),
        }
    }

    /// Add this operation's local gradient, scaled by `seed`, into the operands.
    ///
    /// `seed` is the gradient of the final output with respect to this operation's
    /// result. Operands are not recursed into.
    pub fn back(&self, seed: f64) -> Result<()> {
        use Operation::*;
        match self {
            Add(lhs, rhs) => {
                lhs.cell().accum_grad(seed);
                rhs.cell().accum_grad(seed);
            }
            Sub(lhs, rhs) => {
                lhs.cell().accum_grad(seed);
                rhs.cell().accum_grad(-seed);
            }
            Mul(lhs, rhs) => {
                let (l, r) = (lhs.value(), rhs.value());
                lhs.cell().accum_grad(r * seed);
                rhs.cell().accum_grad(l * seed);
            }
            Pow(base, exp) => {
                let b = base.value();
                base.cell().accum_grad(exp * b.powf(exp - 1.) * seed);
            }
            Div(..) => return Err(GradError::UnsupportedOperation { op: self.name() }),
        }
        Ok(())
    }
}
