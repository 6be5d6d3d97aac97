use std::fmt::Display;

use tracing::trace;

use super::{VarId, Variable, VariableType};
use crate::{algebra::Set, tensor::Tensor};

/// Settings consulted while building and differentiating a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Propagate shapes eagerly when nodes are created.
    pub set_size: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { set_size: true }
    }
}

/// Arena owning every [`Variable`] of a graph.
///
/// Ids are handed out densely from 1 and never reused, so an id stays valid
/// for the lifetime of the map.
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    variables: Vec<Variable>,
    all: Set<VarId>,
    config: GraphConfig,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> GraphConfig {
        self.config
    }

    pub fn config_mut(&mut self) -> &mut GraphConfig {
        &mut self.config
    }

    /// Creates a fresh node and registers its id.
    pub fn create_v(&mut self, name: &str) -> VarId {
        let id = VarId::from_position(self.variables.len() + 1);
        self.variables.push(Variable::new(id, name));
        self.all.add(id);
        trace!(%id, name, "created variable");
        id
    }

    /// Creates a constant holding the scalar `value`.
    pub fn create_c(&mut self, value: f64, name: &str) -> VarId {
        let id = self.create_v(name);
        let v = self.at_mut(id);
        v.set_type(VariableType::Constant);
        *v.value_mut() = Tensor::scalar(value);
        id
    }

    /// Creates an input leaf with the given value.
    pub fn create_input(&mut self, value: Tensor<f64>, name: &str) -> VarId {
        let id = self.create_v(name);
        let v = self.at_mut(id);
        v.set_type(VariableType::Input);
        *v.value_mut() = value;
        id
    }

    /// Replaces the value of a leaf; dependent nodes pick it up on the next evaluation.
    ///
    /// # Panics
    ///
    /// Panics for a node computed by an operator, or when a sized leaf would
    /// change shape: constants already built from it keep the old shape.
    pub fn set_input(&mut self, id: VarId, value: Tensor<f64>) {
        tensor_assert!(
            self.at(id).function().is_none(),
            "variable {id} is computed by an operator"
        );
        let current = self.value(id);
        tensor_assert!(
            current.is_empty() || current.is_same_size(value.shape()),
            "input {id} holds {} and cannot take {}",
            current.shape(),
            value.shape()
        );
        *self.at_mut(id).value_mut() = value;
    }

    pub fn at(&self, id: VarId) -> &Variable {
        tensor_assert_index!(
            id.get() <= self.variables.len(),
            "unknown variable {id}"
        );
        &self.variables[id.index()]
    }

    pub fn at_mut(&mut self, id: VarId) -> &mut Variable {
        tensor_assert_index!(
            id.get() <= self.variables.len(),
            "unknown variable {id}"
        );
        &mut self.variables[id.index()]
    }

    pub fn value(&self, id: VarId) -> &Tensor<f64> {
        self.at(id).value()
    }

    /// Every id created so far.
    pub fn all(&self) -> &Set<VarId> {
        &self.all
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variable> {
        self.variables.iter()
    }
}

impl Display for VariableMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for v in &self.variables {
            writeln!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Sizes the members of `x_set` against their first sized non-constant member:
/// scalar constants are broadcast to its shape, empty non-constants are zero-filled.
///
/// Only a scalar constant is promoted, and only when that reference is not itself scalar.
pub fn set_size_cxux_by_x(x_set: &Set<VarId>, data: &mut VariableMap) {
    let mut reference = None;
    for &x in x_set {
        let v = data.at(x);
        if !v.is_constant() {
            reference = Some(x);
            if !v.value().is_empty() {
                break;
            }
        }
    }
    let Some(reference) = reference else {
        return;
    };
    let shape = data.value(reference).shape().clone();
    if shape.is_empty() {
        return;
    }
    let reference_is_scalar = data.value(reference).is_scalar();

    for &x in x_set {
        let v = data.at_mut(x);
        if v.is_constant() {
            if v.value().is_scalar() && !reference_is_scalar {
                let c = v.value().at(1);
                v.value_mut().set_size(shape.clone());
                v.value_mut().fill(c);
            }
        } else if v.value().is_empty() {
            v.value_mut().set_size(shape.clone());
            v.value_mut().zeros();
        }
    }
}

/// Gives every member of `y_set` the shape of the first member of `x_set`.
pub fn set_size_y_by_x(x_set: &Set<VarId>, y_set: &Set<VarId>, data: &mut VariableMap) {
    let Some(x) = x_set.first() else {
        return;
    };
    let shape = data.value(x).shape().clone();
    for &y in y_set {
        data.at_mut(y).value_mut().set_size(shape.clone());
    }
}

/// Gives `y` the shape of `x`. A constant keeps its scalar value across the
/// resize, or becomes 0 if it was not scalar. Nothing happens while `x` is unsized.
pub fn set_size_y_by_x_single(x: VarId, y: VarId, data: &mut VariableMap) {
    let shape = data.value(x).shape().clone();
    if shape.is_empty() || data.value(y).is_same_size(&shape) {
        return;
    }
    let v = data.at_mut(y);
    if v.is_constant() {
        let c = if v.value().is_scalar() {
            v.value().at(1)
        } else {
            0.0
        };
        v.value_mut().set_size(shape);
        v.value_mut().fill(c);
    } else {
        v.value_mut().set_size(shape);
    }
}
