//! Graph operators.
//!
//! Every operator knows how to add its node to a graph (`f`), how to add the
//! nodes of its local derivative (`cr`), how to compute its value (`fv`) and
//! how to size its output (`set_size`). Derivatives are graph nodes too, which
//! is what makes repeated differentiation possible.

use tracing::trace;

use super::{
    VarId, VariableMap,
    variable_map::{set_size_cxux_by_x, set_size_y_by_x, set_size_y_by_x_single},
};
use crate::{
    algebra::Set,
    ops::{self, elementwise},
    tensor::Tensor,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sin,
    Cos,
    Exp,
    /// Elementwise product of all inputs.
    Multiply,
    /// Elementwise sum of all inputs.
    Sum,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Exp => "exp",
            Function::Multiply => "multiply",
            Function::Sum => "sum",
        }
    }

    fn is_unary(self) -> bool {
        matches!(self, Function::Sin | Function::Cos | Function::Exp)
    }

    /// Adds a node computing this operator over `x_set` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics on an empty input set, or on more than one input to a unary operator.
    pub fn f(self, x_set: &Set<VarId>, data: &mut VariableMap) -> VarId {
        tensor_assert!(!x_set.is_empty(), "{} needs an input", self.name());
        tensor_assert!(
            !self.is_unary() || x_set.len() == 1,
            "{} takes one input, got {}",
            self.name(),
            x_set.len()
        );
        let name = format!("{}(x)", self.name());
        let y = data.create_v(&name);
        if data.config().set_size {
            set_size_y_by_x_single(x_set.get(1), y, data);
        }
        data.at_mut(y).set_function(self);
        for &x in x_set {
            data.at_mut(y).add_input(x);
            data.at_mut(x).add_consumer(y);
        }
        trace!(op = self.name(), %y, inputs = %x_set, "applied");
        y
    }

    /// Adds the nodes of `∂self/∂x * dy` for the node with inputs `x_set`
    /// and returns the id of the product.
    pub fn cr(self, x_set: &Set<VarId>, x: VarId, dy: VarId, data: &mut VariableMap) -> VarId {
        let set_size = data.config().set_size;
        let dx = match self {
            Function::Sin => {
                let d = Function::Cos.f(x_set, data);
                data.at_mut(d).set_name("d(sin(x))");
                Function::Multiply.f(&Set::from([d, dy]), data)
            }
            Function::Cos => {
                let d = Function::Sin.f(x_set, data);
                data.at_mut(d).set_name("-d(cos(x))");
                let k = data.create_c(-1.0, "-1");
                if set_size {
                    set_size_y_by_x_single(x_set.get(1), k, data);
                }
                Function::Multiply.f(&Set::from([d, k, dy]), data)
            }
            Function::Exp => {
                let d = Function::Exp.f(x_set, data);
                data.at_mut(d).set_name("d(exp(x))");
                Function::Multiply.f(&Set::from([d, dy]), data)
            }
            Function::Multiply => {
                let others = x_set.without(x);
                let d = match others.len() {
                    0 => {
                        let one = data.create_c(1.0, "1=d(multiply(x))");
                        if set_size {
                            set_size_y_by_x_single(x, one, data);
                        }
                        one
                    }
                    1 => others.get(1),
                    _ => {
                        let d = Function::Multiply.f(&others, data);
                        data.at_mut(d).set_name("d(multiply(x))");
                        d
                    }
                };
                Function::Multiply.f(&Set::from([d, dy]), data)
            }
            Function::Sum => {
                let one = data.create_c(1.0, "1=d(sum(x))");
                if set_size {
                    set_size_y_by_x_single(x, one, data);
                }
                Function::Multiply.f(&Set::from([one, dy]), data)
            }
        };
        data.at_mut(dx)
            .set_name(&format!("dx = d({}(x)) * dy", self.name()));
        dx
    }

    /// Computes the value of every node in `y_set` from the current values of `x_set`.
    pub fn fv(self, x_set: &Set<VarId>, y_set: &Set<VarId>, data: &mut VariableMap) {
        let mut out = Tensor::empty();
        match self {
            Function::Sin => elementwise::sin(data.value(x_set.get(1)), &mut out),
            Function::Cos => elementwise::cos(data.value(x_set.get(1)), &mut out),
            Function::Exp => elementwise::exp(data.value(x_set.get(1)), &mut out),
            Function::Multiply | Function::Sum => {
                data.value(x_set.get(1)).copy_to(&mut out);
                for &x in x_set.iter().skip(1) {
                    if self == Function::Multiply {
                        elementwise::schur_product_to_a(&mut out, data.value(x));
                    } else {
                        elementwise::add_to_a(&mut out, data.value(x));
                    }
                }
            }
        }
        for &y in y_set {
            ops::write_into(&out, data.at_mut(y).value_mut());
        }
    }

    /// Shapes the nodes of `y_set` from `x_set`.
    pub fn set_size(self, x_set: &Set<VarId>, y_set: &Set<VarId>, data: &mut VariableMap) {
        if !self.is_unary() {
            set_size_cxux_by_x(x_set, data);
        }
        set_size_y_by_x(x_set, y_set, data);
    }
}
