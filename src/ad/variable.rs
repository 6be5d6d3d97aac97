use std::fmt::Display;

use super::Function;
use crate::{algebra::Set, tensor::Tensor};

/// Dense, 1-based node id inside one [`super::VariableMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(usize);

impl VarId {
    pub(crate) fn from_position(position: usize) -> Self {
        debug_assert!(position >= 1);
        VarId(position)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 - 1
    }
}

impl Display for VarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariableType {
    #[default]
    Default,
    Input,
    Output,
    /// Holds a fixed value; never realized by evaluation.
    Constant,
}

/// One node of the computation graph.
#[derive(Debug, Clone)]
pub struct Variable {
    id: VarId,
    name: String,
    ty: VariableType,
    f: Option<Function>,
    value: Tensor<f64>,
    x: Set<VarId>,
    y: Set<VarId>,
}

impl Variable {
    pub(crate) fn new(id: VarId, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
            ty: VariableType::Default,
            f: None,
            value: Tensor::empty(),
            x: Set::new(),
            y: Set::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    #[inline]
    pub fn var_type(&self) -> VariableType {
        self.ty
    }

    pub fn set_type(&mut self, ty: VariableType) {
        self.ty = ty;
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.ty == VariableType::Constant
    }

    /// The operator that produced this node; `None` for leaves.
    pub fn function(&self) -> Option<Function> {
        self.f
    }

    pub(crate) fn set_function(&mut self, f: Function) {
        self.f = Some(f);
    }

    pub fn value(&self) -> &Tensor<f64> {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Tensor<f64> {
        &mut self.value
    }

    /// Direct inputs of the producing operator.
    pub fn inputs(&self) -> &Set<VarId> {
        &self.x
    }

    /// Nodes consuming this one.
    pub fn consumers(&self) -> &Set<VarId> {
        &self.y
    }

    pub(crate) fn add_input(&mut self, x: VarId) {
        self.x.add(x);
    }

    pub(crate) fn add_consumer(&mut self, y: VarId) {
        self.y.add(y);
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "id: {}, name: {}, type: {:?}, f: {}, X: {}, Y: {}, value: {}",
            self.id,
            self.name,
            self.ty,
            self.f.map_or("none", Function::name),
            self.x,
            self.y,
            self.value
        )
    }
}
