use std::cell::Cell;

/// The storage behind a [`Value`](crate::Value): its current data and the gradient
/// accumulated into it. Handles that alias the same scalar share one `ScalarCell`.
#[derive(Debug)]
pub(crate) struct ScalarCell {
    data: Cell<f64>,
    grad: Cell<f64>,
}

impl ScalarCell {
    pub(crate) fn new(data: f64) -> Self {
        Self {
            data: Cell::new(data),
            grad: Cell::new(0.),
        }
    }

    pub(crate) fn with_grad(data: f64, grad: f64) -> Self {
        Self {
            data: Cell::new(data),
            grad: Cell::new(grad),
        }
    }

    pub(crate) fn data(&self) -> f64 {
        self.data.get()
    }

    pub(crate) fn set_data(&self, data: f64) {
        self.data.set(data);
    }

    pub(crate) fn grad(&self) -> f64 {
        self.grad.get()
    }

    pub(crate) fn accum_grad(&self, grad: f64) {
        self.grad.set(self.grad.get() + grad);
    }

    pub(crate) fn clear_grad(&self) {
        self.grad.set(0.);
    }
}
