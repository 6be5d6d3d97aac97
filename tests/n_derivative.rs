#![allow(clippy::approx_constant)]

use approx::assert_abs_diff_eq;
use symtensor::prelude::*;

const EPS: f64 = 1e-6;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn vector(values: &[f64]) -> Tensor<f64> {
    Tensor::from_vec(values.len(), values.to_vec()).unwrap()
}

/// Builds `d^n y / dx^n`, evaluates it and returns its values.
fn derivative_values(data: &mut VariableMap, x: VarId, y: VarId, n: usize) -> Vec<f64> {
    let mut d = Derivative::new(data);
    let dx = d.nth_derivative(x, y, n);
    d.fv(&Set::from([x]), dx);
    data.value(dx).to_vec()
}

fn assert_all_close(actual: &[f64], expected: impl IntoIterator<Item = f64>) {
    let expected: Vec<f64> = expected.into_iter().collect();
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, e, epsilon = EPS);
    }
}

const POINTS: [f64; 2] = [2.0, 3.14];

#[test]
fn derivative_of_sin_is_cos() {
    init_tracing();
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let y = Function::Sin.f(&Set::from([x]), &mut data);

    let values = derivative_values(&mut data, x, y, 1);
    assert_all_close(&values, POINTS.map(f64::cos));
    assert_abs_diff_eq!(values[0], -0.4161468, epsilon = EPS);
    assert_abs_diff_eq!(values[1], -0.9999987, epsilon = EPS);
}

#[test]
fn constant_factor_scales_the_derivative() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let two = data.create_c(2.0, "2");
    let s = Function::Sin.f(&Set::from([x]), &mut data);
    let y = Function::Multiply.f(&Set::from([two, s]), &mut data);

    let values = derivative_values(&mut data, x, y, 1);
    assert_all_close(&values, POINTS.map(|v| 2.0 * v.cos()));
}

#[test]
fn chain_of_two_functions() {
    // y = sin(cos(x)), y' = -cos(cos(x)) sin(x)
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let c = Function::Cos.f(&Set::from([x]), &mut data);
    let y = Function::Sin.f(&Set::from([c]), &mut data);

    let values = derivative_values(&mut data, x, y, 1);
    assert_all_close(&values, POINTS.map(|v| -v.cos().cos() * v.sin()));
}

#[test]
fn deep_chain_with_constant() {
    // y = 2 cos(sin(cos(x)))
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let two = data.create_c(2.0, "2");
    let c = Function::Cos.f(&Set::from([x]), &mut data);
    let s = Function::Sin.f(&Set::from([c]), &mut data);
    let cc = Function::Cos.f(&Set::from([s]), &mut data);
    let y = Function::Multiply.f(&Set::from([two, cc]), &mut data);

    let values = derivative_values(&mut data, x, y, 1);
    let expected = POINTS.map(|v| 2.0 * v.cos().sin().sin() * v.cos().cos() * v.sin());
    assert_all_close(&values, expected);
}

#[test]
fn higher_derivatives_of_sin_cycle() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let y = Function::Sin.f(&Set::from([x]), &mut data);

    let second = derivative_values(&mut data, x, y, 2);
    assert_all_close(&second, POINTS.map(|v| -v.sin()));

    let third = derivative_values(&mut data, x, y, 3);
    assert_all_close(&third, POINTS.map(|v| -v.cos()));

    let fourth = derivative_values(&mut data, x, y, 4);
    assert_all_close(&fourth, POINTS.map(f64::sin));
}

#[test]
fn second_derivative_of_exp() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&[0.0, 1.0, -0.5]), "x");
    let y = Function::Exp.f(&Set::from([x]), &mut data);
    let values = derivative_values(&mut data, x, y, 2);
    assert_all_close(&values, [0.0f64, 1.0, -0.5].map(f64::exp));
}

#[test]
fn product_with_a_constant() {
    for k in [1.0, 2.0, 3.0] {
        let mut data = VariableMap::new();
        let x = data.create_input(vector(&POINTS), "x");
        let c = data.create_c(k, "k");
        let y = Function::Multiply.f(&Set::from([x, c]), &mut data);

        let first = derivative_values(&mut data, x, y, 1);
        assert_all_close(&first, [k, k]);

        // the first derivative no longer depends on x
        let second = derivative_values(&mut data, x, y, 2);
        assert_all_close(&second, [0.0, 0.0]);
    }
}

#[test]
fn product_of_one_and_two_inputs() {
    let a_values = [1.5, -2.0, 0.5];
    let b_values = [4.0, 3.0, -1.0];

    let mut data = VariableMap::new();
    let a = data.create_input(vector(&a_values), "a");
    let alone = Function::Multiply.f(&Set::from([a]), &mut data);
    assert_all_close(&derivative_values(&mut data, a, alone, 1), [1.0; 3]);

    let b = data.create_input(vector(&b_values), "b");
    let inputs = Set::from([a, b]);
    let y = Function::Multiply.f(&inputs, &mut data);
    let mut d = Derivative::new(&mut data);
    let dx = d.cds(&inputs, y);
    d.fvs(&inputs, &dx.values().iter().copied().collect());
    assert_all_close(&data.value(*dx.get(&a).unwrap()).to_vec(), b_values);
    assert_all_close(&data.value(*dx.get(&b).unwrap()).to_vec(), a_values);
}

#[test]
fn partial_derivatives_of_a_product() {
    let a_values = [2.0, 1.0, -1.0];
    let b_values = [3.0, 0.5, 4.0];
    let c_values = [5.0, 2.0, 0.25];

    let mut data = VariableMap::new();
    let a = data.create_input(vector(&a_values), "a");
    let b = data.create_input(vector(&b_values), "b");
    let c = data.create_input(vector(&c_values), "c");
    let inputs = Set::from([a, b, c]);
    let y = Function::Multiply.f(&inputs, &mut data);

    let mut d = Derivative::new(&mut data);
    let dx = d.cds(&inputs, y);
    d.fvs(&inputs, &dx.values().iter().copied().collect());

    let product = |u: [f64; 3], v: [f64; 3]| [u[0] * v[0], u[1] * v[1], u[2] * v[2]];
    assert_all_close(&data.value(*dx.get(&a).unwrap()).to_vec(), product(b_values, c_values));
    assert_all_close(&data.value(*dx.get(&b).unwrap()).to_vec(), product(a_values, c_values));
    assert_all_close(&data.value(*dx.get(&c).unwrap()).to_vec(), product(a_values, b_values));
}

#[test]
fn sum_passes_the_seed_through() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let s = Function::Sin.f(&Set::from([x]), &mut data);
    let y = Function::Sum.f(&Set::from([x, s]), &mut data);

    let values = derivative_values(&mut data, x, y, 1);
    assert_all_close(&values, POINTS.map(|v| 1.0 + v.cos()));
}

#[test]
fn disconnected_input_gets_zero() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let z = data.create_input(vector(&[7.0, 8.0]), "z");
    let y = Function::Sin.f(&Set::from([x]), &mut data);

    let inputs = Set::from([z, x]);
    let mut d = Derivative::new(&mut data);
    let dx = d.cds(&inputs, y);
    assert_eq!(dx.keys(), &[x, z]);

    let dz = *dx.get(&z).unwrap();
    assert!(data.at(dz).is_constant());
    assert_eq!(data.value(dz).to_vec(), vec![0.0, 0.0]);
}

#[test]
fn derivative_graph_is_reevaluated_with_new_inputs() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let y = Function::Sin.f(&Set::from([x]), &mut data);

    let x_set = Set::from([x]);
    let dx = *Derivative::new(&mut data).cds(&x_set, y).get(&x).unwrap();
    let nodes = data.len();

    Derivative::new(&mut data).fv(&x_set, dx);
    assert_all_close(&data.value(dx).to_vec(), POINTS.map(f64::cos));

    let moved = [0.5, -1.25];
    data.set_input(x, vector(&moved));
    Derivative::new(&mut data).fvs(&x_set, &Set::from([y, dx]));
    assert_all_close(&data.value(y).to_vec(), moved.map(f64::sin));
    assert_all_close(&data.value(dx).to_vec(), moved.map(f64::cos));
    assert_eq!(data.len(), nodes);
}

#[test]
#[should_panic(expected = "cannot take Shape(3)")]
fn reevaluation_keeps_the_input_shape() {
    let mut data = VariableMap::new();
    let x = data.create_input(vector(&POINTS), "x");
    let y = Function::Sin.f(&Set::from([x]), &mut data);
    Derivative::new(&mut data).cds(&Set::from([x]), y);
    data.set_input(x, vector(&[0.1, 0.2, 0.3]));
}

#[test]
fn lazily_sized_graph_matches_eager_one() {
    let mut data = VariableMap::with_config(GraphConfig { set_size: false });
    let x = data.create_input(vector(&POINTS), "x");
    let two = data.create_c(2.0, "2");
    let s = Function::Sin.f(&Set::from([x]), &mut data);
    let y = Function::Multiply.f(&Set::from([s, two]), &mut data);

    let x_set = Set::from([x]);
    let mut d = Derivative::new(&mut data);
    let dx = *d.cds(&x_set, y).get(&x).unwrap();
    d.set_sizes_all_related(&x_set, dx);
    d.fv(&x_set, dx);

    assert_all_close(&data.value(dx).to_vec(), POINTS.map(|v| 2.0 * v.cos()));
}
