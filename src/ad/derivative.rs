//! Reverse-mode differentiation that extends the graph.
//!
//! [`Derivative::cds`] adds the nodes of `∂y/∂x` for each requested input and
//! returns their ids. Nothing is evaluated until [`Derivative::fvs`] runs, so
//! the same derivative graph can be evaluated again after new leaf values are
//! injected with [`VariableMap::set_input`], and differentiated again for
//! higher orders.

use tracing::{debug, instrument, trace};

use super::{Function, VarId, VariableMap, variable_map::set_size_y_by_x_single};
use crate::algebra::{Map, Set};

/// Differentiation and evaluation passes over one [`VariableMap`].
pub struct Derivative<'a> {
    data: &'a mut VariableMap,
}

impl<'a> Derivative<'a> {
    pub fn new(data: &'a mut VariableMap) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &VariableMap {
        self.data
    }

    fn function_of(&self, y: VarId) -> Function {
        match self.data.at(y).function() {
            Some(f) => f,
            None => panic!(
                "fatal error: variable {y} ({}) has no operator but is not a given input",
                self.data.at(y).name()
            ),
        }
    }

    /// Nodes lying on some directed path from `x_set` to `y_set`, both ends included.
    pub fn restrict_set(&self, x_set: &Set<VarId>, y_set: &Set<VarId>) -> Set<VarId> {
        let mut reaches = vec![None; self.data.len()];
        let mut v0 = Set::new();
        for &x in x_set {
            self.pass(x, y_set, &mut reaches, &mut v0);
        }
        v0
    }

    /// Post-order walk along consumer edges deciding whether each node reaches
    /// `targets`. Targets are not expanded further.
    fn pass(
        &self,
        start: VarId,
        targets: &Set<VarId>,
        reaches: &mut [Option<bool>],
        v0: &mut Set<VarId>,
    ) {
        let mut stack = vec![(start, false)];
        while let Some((n, expanded)) = stack.pop() {
            if reaches[n.index()].is_some() {
                continue;
            }
            if targets.contains(&n) {
                reaches[n.index()] = Some(true);
                v0.add(n);
                continue;
            }
            let consumers = self.data.at(n).consumers();
            if expanded {
                let found = consumers.iter().any(|y| reaches[y.index()] == Some(true));
                reaches[n.index()] = Some(found);
                if found {
                    v0.add(n);
                }
            } else {
                stack.push((n, true));
                stack.extend(
                    consumers
                        .iter()
                        .filter(|y| reaches[y.index()].is_none())
                        .map(|y| (*y, false)),
                );
            }
        }
    }

    /// Derivative node of the differentiation target with respect to `x`.
    ///
    /// `dt` maps each node already handled to its derivative node and must
    /// hold the seed of the target. Every node reached from `x` inside `v0`
    /// gets an entry, so shared subgraphs are differentiated once.
    ///
    /// # Panics
    ///
    /// Panics if `x` does not lead to the target inside `v0`.
    pub fn cd(&mut self, x: VarId, v0: &Set<VarId>, dt: &mut Map<VarId, VarId>) -> VarId {
        let mut stack = vec![(x, false)];
        while let Some((n, expanded)) = stack.pop() {
            if dt.has(&n) {
                continue;
            }
            let ys = self.data.at(n).consumers().intersect(v0);
            if !expanded {
                stack.push((n, true));
                stack.extend(ys.iter().rev().filter(|y| !dt.has(y)).map(|y| (*y, false)));
                continue;
            }

            let mut contributions = Set::new();
            for &y in &ys {
                let Some(&dy) = dt.get(&y) else {
                    panic!("fatal error: derivative of consumer {y} missing while at {n}");
                };
                let f = self.function_of(y);
                let x_y = self.data.at(y).inputs().clone();
                let dxi = f.cr(&x_y, n, dy, self.data);
                trace!(node = %n, through = %y, op = f.name(), contribution = %dxi);
                contributions.add(dxi);
            }
            tensor_assert!(
                !contributions.is_empty(),
                "variable {n} does not lead to the differentiation target"
            );
            let dn = if contributions.len() == 1 {
                contributions.get(1)
            } else {
                let sum = Function::Sum.f(&contributions, self.data);
                self.data.at_mut(sum).set_name("dx=sum_dxi");
                sum
            };
            dt.add(n, dn);
        }
        match dt.get(&x) {
            Some(&dx) => dx,
            None => panic!("fatal error: derivative of {x} was not recorded"),
        }
    }

    /// Adds the derivative nodes of `y` with respect to every `x` in `x_set`.
    ///
    /// Inputs that do not influence `y` get a constant 0. The result lists the
    /// connected inputs in the order of `x_set`, then the disconnected ones.
    #[instrument(level = "debug", skip(self), fields(nodes_before = self.data.len()))]
    pub fn cds(&mut self, x_set: &Set<VarId>, y: VarId) -> Map<VarId, VarId> {
        let set_size = self.data.config().set_size;
        let v0 = self.restrict_set(x_set, &Set::from([y]));

        let mut dt = Map::new();
        let seed = self.data.create_c(1.0, "dy");
        if set_size {
            set_size_y_by_x_single(y, seed, self.data);
        }
        dt.add(y, seed);
        for &x in x_set {
            if v0.contains(&x) {
                self.cd(x, &v0, &mut dt);
            }
        }

        let mut dx = dt.restrict_to(x_set);
        for &x in &x_set.difference(&v0) {
            let zero = self.data.create_c(0.0, "0");
            if set_size {
                set_size_y_by_x_single(x, zero, self.data);
            }
            dx.add(x, zero);
        }
        debug!(
            restricted = v0.len(),
            nodes_after = self.data.len(),
            "derivative graph built"
        );
        dx
    }

    /// Id of the `n`-th derivative of `y` with respect to `x`, built by
    /// differentiating the previous derivative `n` times.
    pub fn nth_derivative(&mut self, x: VarId, y: VarId, n: usize) -> VarId {
        let x_set = Set::from([x]);
        let mut current = y;
        for _ in 0..n {
            let dx = self.cds(&x_set, current);
            current = *dx.value_at(1);
        }
        current
    }

    /// Post-order walk along input edges applying `action` to every node
    /// outside `x_set` that is not a constant.
    fn visit(
        &mut self,
        x_set: &Set<VarId>,
        root: VarId,
        done: &mut [bool],
        action: fn(Function, &Set<VarId>, &Set<VarId>, &mut VariableMap),
    ) {
        let mut stack = vec![(root, false)];
        while let Some((n, expanded)) = stack.pop() {
            if done[n.index()] || x_set.contains(&n) || self.data.at(n).is_constant() {
                continue;
            }
            if !expanded {
                stack.push((n, true));
                stack.extend(
                    self.data
                        .at(n)
                        .inputs()
                        .iter()
                        .rev()
                        .filter(|x| !done[x.index()])
                        .map(|x| (*x, false)),
                );
                continue;
            }
            let f = self.function_of(n);
            let inputs = self.data.at(n).inputs().clone();
            action(f, &inputs, &Set::from([n]), self.data);
            done[n.index()] = true;
        }
    }

    /// Evaluates `y` and everything it depends on, treating `x_set` as given.
    pub fn fv(&mut self, x_set: &Set<VarId>, y: VarId) {
        self.fvs(x_set, &Set::from([y]));
    }

    /// Evaluates every node of `y_set`; shared dependencies are computed once per call.
    #[instrument(level = "debug", skip(self))]
    pub fn fvs(&mut self, x_set: &Set<VarId>, y_set: &Set<VarId>) {
        let mut done = vec![false; self.data.len()];
        for &y in y_set {
            self.visit(x_set, y, &mut done, Function::fv);
        }
    }

    /// Runs shape propagation over `y` and its dependencies.
    pub fn set_sizes_all_related(&mut self, x_set: &Set<VarId>, y: VarId) {
        let mut done = vec![false; self.data.len()];
        self.visit(x_set, y, &mut done, Function::set_size);
    }

    /// Shape propagation over several outputs, oldest first.
    #[instrument(level = "debug", skip(self))]
    pub fn set_sizes_all_related_set(&mut self, x_set: &Set<VarId>, y_set: &Set<VarId>) {
        let mut ordered = y_set.clone();
        ordered.sort();
        let mut done = vec![false; self.data.len()];
        for &y in &ordered {
            self.visit(x_set, y, &mut done, Function::set_size);
        }
    }

    /// Shape propagation over the nodes between `x_set` and `y_set`, in creation order.
    pub fn set_sizes_x_to_y(&mut self, x_set: &Set<VarId>, y_set: &Set<VarId>) {
        let mut v0 = self.restrict_set(x_set, y_set);
        v0.sort();
        for &n in &v0 {
            if x_set.contains(&n) || self.data.at(n).is_constant() {
                continue;
            }
            let f = self.function_of(n);
            let inputs = self.data.at(n).inputs().clone();
            f.set_size(&inputs, &Set::from([n]), self.data);
        }
    }
}
