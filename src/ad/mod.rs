//! Symbolic reverse-mode automatic differentiation over a [`VariableMap`].

mod derivative;
mod function;
mod variable;
mod variable_map;

pub use derivative::Derivative;
pub use function::Function;
pub use variable::{VarId, Variable, VariableType};
pub use variable_map::{
    GraphConfig, VariableMap, set_size_cxux_by_x, set_size_y_by_x, set_size_y_by_x_single,
};
