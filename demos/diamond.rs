//! Backpropagation through a graph where one leaf feeds several consumers.
//! Writes the resulting graph to `graph.dot`.

use scalargrad::Value;

fn main() -> anyhow::Result<()> {
    let a = Value::new(1.);
    let b = Value::new(3.);
    let c = Value::new(5.);
    let ab = &a * &b;
    let ac = &a + &c;
    let mut loss = (&ab + &ac).pow(2.);
    loss -= &b;

    loss.backward(1.)?;
    println!("loss: {loss}");
    println!("a: {a}, grad: {}", a.grad());
    println!("b: {b}, grad: {}", b.grad());
    println!("c: {c}, grad: {}", c.grad());

    let mut dotfile = std::io::BufWriter::new(std::fs::File::create("graph.dot")?);
    loss.dot(&mut dotfile)?;
    Ok(())
}
