//! Reverse-mode traversal of the recorded graph.
//!
//! Each node is reached through the newest entry of its history. Nodes are keyed by
//! their cell, so a node feeding several consumers is visited once and only after all of
//! its consumers have contributed to its gradient.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::{
    error::{GradError, Result},
    Value,
};

/// Nodes reachable from `root`, operands before the results consuming them.
fn topological_order(root: &Value) -> Vec<&Value> {
    let mut visited = HashSet::new();
    let mut order = vec![];
    let mut stack = vec![(root, false)];
    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            order.push(node);
            continue;
        }
        if !visited.insert(node.id()) {
            continue;
        }
        stack.push((node, true));
        if let Some(op) = node.last_op() {
            let (lhs, rhs) = op.operands();
            if let Some(rhs) = rhs {
                stack.push((rhs, false));
            }
            stack.push((lhs, false));
        }
    }
    order
}

impl Value {
    /// Propagate `seed` (use `1.` for a scalar loss) from this node to every node it
    /// was computed from, adding into their gradients.
    ///
    /// Gradients accumulate across calls. Call [`Value::zero_grad`] first when the
    /// same leaves take part in repeated passes, e.g. in an optimization loop.
    ///
    /// Fails without modifying any gradient if the graph contains a division.
    pub fn backward(&self, seed: f64) -> Result<()> {
        let order = topological_order(self);
        if let Some(op) = order
            .iter()
            .filter_map(|node| node.last_op())
            .find(|op| !op.has_grad_rule())
        {
            return Err(GradError::UnsupportedOperation { op: op.name() });
        }

        self.cell().accum_grad(seed);
        for node in order.iter().rev() {
            if let Some(op) = node.last_op() {
                let grad = node.grad();
                trace!(op = op.name(), data = node.value(), grad, "backprop");
                op.back(grad)?;
            }
        }
        debug!(nodes = order.len(), seed, "backward pass finished");
        Ok(())
    }

    /// Reset the gradient of every node reachable from this one to zero.
    pub fn zero_grad(&self) {
        let order = topological_order(self);
        for node in &order {
            node.cell().clear_grad();
        }
        debug!(nodes = order.len(), "gradients cleared");
    }
}
