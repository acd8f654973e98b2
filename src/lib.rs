//! Scalar reverse-mode automatic differentiation.
//!
//! Arithmetic on [`Value`] computes results immediately and records how each result was
//! produced. [`Value::backward`] then walks that record from an output back to its
//! inputs and accumulates `d(output)/d(input)` into every contributing value.
//!
//! ```
//! use scalargrad::Value;
//!
//! let a = Value::new(1.5);
//! let b = Value::new(-2.);
//! let c = Value::new(0.5);
//! let f = 4.32 * (&a + &b) + &c;
//!
//! f.backward(1.).unwrap();
//! assert_eq!(a.grad(), 4.32);
//! assert_eq!(b.grad(), 4.32);
//! assert_eq!(c.grad(), 1.);
//! ```
//!
//! Values are `Rc`-shared and not thread safe. Division only computes a forward value;
//! backpropagating through it returns [`GradError::UnsupportedOperation`].

mod backward;
mod cell;
pub mod config;
pub mod data;
mod dot;
pub mod error;
mod history;
mod operation;
pub mod regression;
mod value;

pub use error::GradError;
pub use history::History;
pub use operation::Operation;
pub use value::Value;
