use std::{
    cmp::Ordering,
    fmt::{self, Display},
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    rc::Rc,
};

use crate::{
    cell::ScalarCell,
    history::{Entry, History},
    operation::Operation,
};

/// A scalar node in the computation graph.
///
/// Arithmetic on `Value`s evaluates eagerly and records how the result was produced, so
/// that [`Value::backward`] can later distribute gradients to every contributing leaf.
///
/// `clone()` is a shallow copy: the new handle aliases the same data and gradient.
/// Use [`Value::deep_copy`] to get an independent scalar with the same history.
#[derive(Clone, Debug)]
pub struct Value {
    cell: Rc<ScalarCell>,
    history: History,
}

impl Value {
    pub fn new(data: f64) -> Self {
        Self {
            cell: Rc::new(ScalarCell::new(data)),
            history: History::default(),
        }
    }

    /// Create the result node of `op`, evaluating it from the operands' current data.
    pub(crate) fn record(op: Operation) -> Self {
        let mut value = Self::new(op.eval());
        value.history.push(op);
        value
    }

    /// Append `op` as the newest step of this node and adopt its result in place.
    fn record_in_place(&mut self, op: Operation) {
        self.cell.set_data(op.eval());
        self.history.push(op);
    }

    /// Snapshot the receiver, then record `self = variant(snapshot, rhs)`.
    ///
    /// If other handles still share the receiver's cell, the receiver moves to a fresh
    /// cell and the old one keeps the state those handles were built from.
    fn compound(&mut self, rhs: &Value, variant: fn(Rc<Value>, Rc<Value>) -> Operation) {
        let prior = Rc::new(self.deep_copy());
        // `x op= x` must see the old data on both sides, not the updated cell.
        let rhs = if rhs.same_node(self) {
            prior.clone()
        } else {
            Rc::new(rhs.clone())
        };
        if Rc::strong_count(&self.cell) > 1 {
            self.cell = Rc::new(ScalarCell::new(self.value()));
        }
        self.record_in_place(variant(prior, rhs));
    }

    pub fn value(&self) -> f64 {
        self.cell.data()
    }

    pub fn grad(&self) -> f64 {
        self.cell.grad()
    }

    /// Overwrite the data of this node. Every handle aliasing it sees the new data.
    ///
    /// Results already computed from this node keep their old data; rebuild them to
    /// pick up the change.
    pub fn set_value(&self, data: f64) {
        self.cell.set_data(data);
    }

    /// A handle backed by a fresh cell holding the current data and gradient.
    /// The history is shared up to this point; its operations still point at the same
    /// operands.
    pub fn deep_copy(&self) -> Self {
        Self {
            cell: Rc::new(ScalarCell::with_grad(self.value(), self.grad())),
            history: self.history.clone(),
        }
    }

    /// Operations that produced this node.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The operation backpropagation walks through, if any.
    pub fn last_op(&self) -> Option<&Operation> {
        self.history.last()
    }

    pub fn is_leaf(&self) -> bool {
        self.history.is_empty()
    }

    /// Whether both handles are backed by the same cell.
    pub fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn pow(&self, exp: f64) -> Self {
        Self::record(Operation::Pow(Rc::new(self.clone()), exp))
    }

    pub fn powi(&self, exp: i32) -> Self {
        self.pow(exp as f64)
    }

    pub(crate) fn cell(&self) -> &ScalarCell {
        &self.cell
    }

    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.cell) as usize
    }
}

impl Drop for Value {
    // Nested `Rc` drops recurse once per graph level, so unlink what this handle owns
    // alone with an explicit stack.
    fn drop(&mut self) {
        let mut entries: Vec<Rc<Entry>> = self.history.take_head().into_iter().collect();
        while let Some(entry) = entries.pop() {
            let Ok(Entry { op, prev, .. }) = Rc::try_unwrap(entry) else {
                continue;
            };
            entries.extend(prev);
            let (lhs, rhs) = op.into_operands();
            for operand in std::iter::once(lhs).chain(rhs) {
                if let Ok(mut operand) = Rc::try_unwrap(operand) {
                    entries.extend(operand.history.take_head());
                }
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::new(0.)
    }
}

impl From<f64> for Value {
    fn from(data: f64) -> Self {
        Self::new(data)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

trait Operand {
    fn into_operand(self) -> Rc<Value>;
}

impl Operand for Value {
    fn into_operand(self) -> Rc<Value> {
        Rc::new(self)
    }
}

impl Operand for &Value {
    fn into_operand(self) -> Rc<Value> {
        Rc::new(self.clone())
    }
}

impl Operand for f64 {
    fn into_operand(self) -> Rc<Value> {
        Rc::new(Value::new(self))
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl_binary_op!(@impl $trait, $method, $variant, Value, Value);
        impl_binary_op!(@impl $trait, $method, $variant, Value, &Value);
        impl_binary_op!(@impl $trait, $method, $variant, &Value, Value);
        impl_binary_op!(@impl $trait, $method, $variant, &Value, &Value);
        impl_binary_op!(@impl $trait, $method, $variant, Value, f64);
        impl_binary_op!(@impl $trait, $method, $variant, &Value, f64);
        impl_binary_op!(@impl $trait, $method, $variant, f64, Value);
        impl_binary_op!(@impl $trait, $method, $variant, f64, &Value);
    };
    (@impl $trait:ident, $method:ident, $variant:ident, $lhs:ty, $rhs:ty) => {
        impl $trait<$rhs> for $lhs {
            type Output = Value;
            fn $method(self, rhs: $rhs) -> Value {
                Value::record(Operation::$variant(self.into_operand(), rhs.into_operand()))
            }
        }
    };
}

impl_binary_op!(Add, add, Add);
impl_binary_op!(Sub, sub, Sub);
impl_binary_op!(Mul, mul, Mul);
impl_binary_op!(Div, div, Div);

macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl $trait<&Value> for Value {
            fn $method(&mut self, rhs: &Value) {
                self.compound(rhs, Operation::$variant);
            }
        }

        impl $trait<Value> for Value {
            fn $method(&mut self, rhs: Value) {
                self.compound(&rhs, Operation::$variant);
            }
        }

        impl $trait<f64> for Value {
            fn $method(&mut self, rhs: f64) {
                self.compound(&Value::new(rhs), Operation::$variant);
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, Add);
impl_assign_op!(SubAssign, sub_assign, Sub);
impl_assign_op!(MulAssign, mul_assign, Mul);
impl_assign_op!(DivAssign, div_assign, Div);

impl Neg for &Value {
    type Output = Value;
    fn neg(self) -> Value {
        self * -1.
    }
}

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Value {
        self * -1.
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value().partial_cmp(&other.value())
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        self.value() == *other
    }
}

impl PartialOrd<f64> for Value {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.value().partial_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_values() {
        let a = Value::new(7.5);
        let b = Value::new(-2.);
        assert_eq!((&a + &b).value(), 5.5);
        assert_eq!((&a - &b).value(), 9.5);
        assert_eq!((&a * &b).value(), -15.);
        assert_eq!((&a / &b).value(), -3.75);
        assert_eq!(b.pow(3.).value(), -8.);
        assert_eq!(a.powi(2).value(), 56.25);
        assert_eq!((-&a).value(), -7.5);
        assert_eq!((2. * &a + 1.).value(), 16.);
    }

    #[test]
    fn binary_ops_alias_operands() {
        let a = Value::new(2.);
        let b = Value::new(3.);
        let c = &a * &b;
        let (lhs, rhs) = c.last_op().unwrap().operands();
        assert!(lhs.same_node(&a));
        assert!(rhs.is_some_and(|rhs| rhs.same_node(&b)));
        assert_eq!(c.history().len(), 1);
        assert!(a.is_leaf());
    }

    #[test]
    fn shallow_and_deep_copy() {
        let a = Value::new(1.) + Value::new(2.);
        let shallow = a.clone();
        let deep = a.deep_copy();
        assert!(shallow.same_node(&a));
        assert!(!deep.same_node(&a));
        assert_eq!(deep.history().len(), a.history().len());

        a.set_value(10.);
        assert_eq!(shallow.value(), 10.);
        assert_eq!(deep.value(), 3.);
    }

    #[test]
    fn compound_snapshots_receiver() {
        let mut acc = Value::new(1.);
        let x = Value::new(4.);
        acc += &x;
        assert_eq!(acc.value(), 5.);
        assert_eq!(acc.history().len(), 1);
        acc *= &x;
        assert_eq!(acc.value(), 20.);
        assert_eq!(acc.history().len(), 2);

        let (prior, rhs) = acc.last_op().unwrap().operands();
        assert!(!prior.same_node(&acc));
        assert_eq!(prior.value(), 5.);
        assert!(rhs.is_some_and(|rhs| rhs.same_node(&x)));

        acc -= 2.;
        assert_eq!(acc.value(), 18.);
        acc /= 3.;
        assert_eq!(acc.value(), 6.);
        assert_eq!(acc.history().len(), 4);
    }

    #[test]
    fn self_compound_uses_prior_data() {
        let mut a = Value::new(3.);
        a *= a.clone();
        assert_eq!(a.value(), 9.);
        let (lhs, rhs) = a.last_op().unwrap().operands();
        assert_eq!(lhs.value(), 3.);
        assert_eq!(rhs.map(Value::value), Some(3.));
    }

    #[test]
    fn compound_leaves_aliases_on_old_state() {
        let mut x = Value::new(2.) * 3.;
        let alias = x.clone();
        x += 1.;
        assert_eq!(x.value(), 7.);
        assert_eq!(alias.value(), 6.);
        assert!(!alias.same_node(&x));
        assert_eq!(alias.history().len(), 1);

        // Without other handles the receiver keeps its cell.
        let mut acc = Value::new(0.);
        let before = acc.id();
        acc += &x;
        assert_eq!(acc.id(), before);
    }

    #[test]
    fn comparisons_use_data_only() {
        let a = Value::new(1.);
        let b = Value::new(2.);
        let c = &a + &a;
        assert!(a < b);
        assert!(b > a);
        assert!(a <= a.clone());
        assert!(b >= c);
        assert!(b == c);
        assert!(a != b);
        assert!(c == 2.);
        assert!(c > 1.5);
        assert!(Value::new(f64::NAN) != Value::new(f64::NAN));
    }
}
