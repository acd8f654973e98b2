use std::{collections::HashMap, io::Write};

use crate::Value;

impl Value {
    /// Write graphviz dot file to the given writer.
    ///
    /// Each node shows the operation that produced it along with its current data and
    /// gradient. Edges point from operands to results.
    pub fn dot(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let mut map = HashMap::new();
        let mut order = vec![];
        self.accum(&mut map, &mut order);
        writeln!(writer, "digraph G {{\nrankdir=\"LR\";")?;
        for id in &order {
            let (node, _) = &map[id];
            let label = node.last_op().map_or("leaf", |op| op.name());
            writeln!(
                writer,
                "a{} [label=\"{} \\ndata:{}, grad:{}\"];",
                *id,
                label,
                node.value(),
                node.grad()
            )?;
        }
        for id in &order {
            let (_, parents) = &map[id];
            for pid in parents {
                writeln!(writer, "a{} -> a{};", pid, *id)?;
            }
        }
        writeln!(writer, "}}")?;
        Ok(())
    }

    fn accum<'a>(
        &'a self,
        map: &mut HashMap<usize, (&'a Value, Vec<usize>)>,
        order: &mut Vec<usize>,
    ) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if map.contains_key(&node.id()) {
                continue;
            }
            let parents = match node.last_op().map(|op| op.operands()) {
                None => vec![],
                Some((lhs, None)) => {
                    stack.push(lhs);
                    vec![lhs.id()]
                }
                Some((lhs, Some(rhs))) => {
                    stack.push(lhs);
                    stack.push(rhs);
                    vec![lhs.id(), rhs.id()]
                }
            };
            map.insert(node.id(), (node, parents));
            order.push(node.id());
        }
    }
}
