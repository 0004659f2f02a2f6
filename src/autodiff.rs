//! Reverse-mode auto-differentiation on a tape of scalar operations.

use std::{
    cell::{Cell, RefCell},
    ops::{Add, Div, Mul, Sub},
};

/// A node in the computation graph holding the index of the nodes it depends on and the gradients
/// of the output with respect to each of the input.
#[derive(Debug)]
struct Node {
    from: [usize; 2],
    grad: [f64; 2],
}

/// A tape recording the computation graph where each element holds the local derivatives
/// of a variable with respect to variables that it directly depends on.
#[derive(Debug, Default)]
pub struct Tape {
    nodes: RefCell<Vec<Node>>,
    marked_position: Cell<usize>,
}

impl Tape {
    /// Get the number of nodes in the tape.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Check if the tape is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Save the current size of the tape.
    pub fn mark(&self) {
        self.marked_position.set(self.len());
    }

    /// Remove all nodes recorded after the last call to [`Tape::mark`].
    pub fn clean(&self) {
        self.nodes.borrow_mut().drain(self.marked_position.get()..);
    }

    /// Add a node to the tape and return its index.
    fn add_node(&self, from_x: usize, from_y: usize, grad_x: f64, grad_y: f64) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        let index = nodes.len();
        nodes.push(Node {
            grad: [grad_x, grad_y],
            from: [from_x, from_y],
        });
        index
    }

    /// Add a variable to the tape and return it. A variable created this way does not depend on
    /// any other variable.
    pub fn add_variable(&self, value: f64) -> Variable<'_> {
        let index = {
            let id = self.len();
            self.add_node(id, id, 0.0, 0.0)
        };
        Variable {
            index,
            value,
            tape: self,
        }
    }
}

/// A variable in the computation graph. Operations on variables return new variables and do not
/// mutate the original ones.
#[derive(Debug, Clone, Copy)]
pub struct Variable<'ctx> {
    /// The current scalar value of the variable.
    pub value: f64,
    index: usize,
    tape: &'ctx Tape,
}

impl<'ctx> Variable<'ctx> {
    /// Compute the gradients of this variable with respect to every node on the tape by
    /// back-propagating through the recorded graph.
    pub fn gradients(&self) -> Vec<f64> {
        let mut gradients = vec![0.0; self.tape.len()];
        gradients[self.index] = 1.0;
        for (idx, n) in self.tape.nodes.borrow().iter().enumerate().rev() {
            gradients[n.from[0]] += n.grad[0] * gradients[idx];
            gradients[n.from[1]] += n.grad[1] * gradients[idx];
        }
        gradients
    }

    /// Look up the gradient of this variable in a list returned by [`Variable::gradients`].
    pub fn gradient(&self, gradients: &[f64]) -> f64 {
        gradients[self.index]
    }

    /// The identity function.
    pub fn identity(&self) -> Self {
        self.unary(self.value, 1.0)
    }

    /// The logistic sigmoid.
    pub fn sigmoid(&self) -> Self {
        let exp = self.value.exp();
        let value = exp / (1.0 + exp);
        self.unary(value, value * (1.0 - value))
    }

    /// The hyperbolic tangent.
    pub fn tanh(&self) -> Self {
        let value = self.value.tanh();
        self.unary(value, 1.0 - value * value)
    }

    /// The rectified linear unit.
    pub fn relu(&self) -> Self {
        if self.value > 0.0 {
            self.unary(self.value, 1.0)
        } else {
            self.unary(0.0, 0.0)
        }
    }

    /// Record a node depending on this variable alone.
    fn unary(&self, value: f64, grad: f64) -> Self {
        Variable {
            value,
            index: self.tape.add_node(self.index, self.index, grad, 0.0),
            tape: self.tape,
        }
    }

    /// Record a node depending on this variable and `rhs`.
    fn binary(&self, rhs: &Self, value: f64, grad_l: f64, grad_r: f64) -> Self {
        assert_eq!(self.tape as *const Tape, rhs.tape as *const Tape);
        Variable {
            value,
            index: self.tape.add_node(self.index, rhs.index, grad_l, grad_r),
            tape: self.tape,
        }
    }
}

impl<'ctx> Add for Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn add(self, rhs: Self) -> Self::Output {
        self.binary(&rhs, self.value + rhs.value, 1.0, 1.0)
    }
}

impl<'ctx> Add for &Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn add(self, rhs: Self) -> Self::Output {
        self.binary(rhs, self.value + rhs.value, 1.0, 1.0)
    }
}

impl<'ctx> Sub for Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.binary(&rhs, self.value - rhs.value, 1.0, -1.0)
    }
}

impl<'ctx> Sub for &Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.binary(rhs, self.value - rhs.value, 1.0, -1.0)
    }
}

impl<'ctx> Mul for Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(&rhs, self.value * rhs.value, rhs.value, self.value)
    }
}

impl<'ctx> Mul for &Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.binary(rhs, self.value * rhs.value, rhs.value, self.value)
    }
}

impl<'ctx> Div for Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn div(self, rhs: Self) -> Self::Output {
        self.binary(
            &rhs,
            self.value / rhs.value,
            1.0 / rhs.value,
            -self.value / (rhs.value * rhs.value),
        )
    }
}

impl<'ctx> Div for &Variable<'ctx> {
    type Output = Variable<'ctx>;

    fn div(self, rhs: Self) -> Self::Output {
        self.binary(
            rhs,
            self.value / rhs.value,
            1.0 / rhs.value,
            -self.value / (rhs.value * rhs.value),
        )
    }
}
