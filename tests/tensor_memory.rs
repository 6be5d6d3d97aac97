use proptest::prelude::*;
use symtensor::{Tensor, TensorError, ops::elementwise, shape::Shape};

fn matrix_2x3() -> Tensor<f64> {
    Tensor::from_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap()
}

#[test]
fn plain_copy_does_not_alias() {
    let a = matrix_2x3();
    let mut b = Tensor::empty();
    a.copy_to(&mut b);
    b.set(&[2, 2], 9.0);

    assert_eq!(a.get(&[2, 2]), 5.0);
    assert_eq!(b.get(&[2, 2]), 9.0);
    assert!(a.is_independent());
    assert!(b.is_independent());
}

#[test]
fn share_reshape_aliases_on_purpose() {
    let a = matrix_2x3();
    let mut v = a.share_reshape(6);
    v.set_at(5, 9.0);
    assert_eq!(a.get(&[2, 2]), 9.0);
    assert_eq!(a.ref_count(), 2);
}

#[test]
fn shared_storage_outlives_one_owner() {
    let a = matrix_2x3();
    let b = a.share_reshape((3, 2));
    let watcher = a.space().unwrap();
    assert_eq!(b.ref_count(), 3);

    drop(a);
    assert_eq!(watcher.ref_count(), 2);
    assert_eq!(b.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(b.get(&[3, 2]), 6.0);

    drop(b);
    assert_eq!(watcher.ref_count(), 1);
}

#[test]
fn copy_into_a_shared_destination_detaches_it() {
    let a = matrix_2x3();
    let view = a.share_reshape(6);
    let mut dst = view.share_reshape((3, 2));
    Tensor::from_vec(2, vec![7.0, 8.0]).unwrap().copy_to(&mut dst);

    assert_eq!(dst.to_vec(), vec![7.0, 8.0]);
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(a.ref_count(), 2);
}

#[test]
fn sub_tensors_view_rows() {
    let a = matrix_2x3();
    let mut row = a.sub_tensor(2);
    assert_eq!(row.shape(), &Shape::from(3));
    row.fill(0.0);
    assert_eq!(a.to_vec(), vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
}

#[test]
fn external_space_backs_several_tensors() {
    let pool = Tensor::<f64>::with_shape(10);
    let mut left = Tensor::empty();
    let mut right = Tensor::empty();
    left.set_size_with_space((2, 2), &pool.space_at(0, 4).unwrap())
        .unwrap();
    right
        .set_size_with_space(6, &pool.space_at(4, 6).unwrap())
        .unwrap();
    left.fill(1.0);
    right.fill(2.0);

    let mut expected = vec![1.0; 4];
    expected.extend([2.0; 6]);
    assert_eq!(pool.to_vec(), expected);

    let err = pool.space_at(8, 4).unwrap_err();
    assert_eq!(
        err,
        TensorError::OutOfRange {
            offset: 8,
            len: 4,
            available: 10
        }
    );
    assert!(matches!(
        Tensor::<f64>::empty().space_at(0, 1),
        Err(TensorError::MemoryViolation { .. })
    ));
}

#[test]
fn kernels_write_through_views() {
    let a = matrix_2x3();
    let mut view = a.share_reshape(6);
    elementwise::scale_to(2.0, &mut view);
    assert_eq!(a.to_vec(), vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0]);
}

proptest! {
    #[test]
    fn writes_through_a_reshape_are_visible(
        values in prop::collection::vec(-1e3f64..1e3, 1..64),
        pick in any::<prop::sample::Index>(),
        value in -1e3f64..1e3,
    ) {
        let n = values.len();
        let a = Tensor::from_vec(n, values.clone()).unwrap();
        let mut view = a.share_reshape((1, n));
        let i = pick.index(n) + 1;
        view.set(&[1, i], value);

        let mut expected = values;
        expected[i - 1] = value;
        prop_assert_eq!(a.to_vec(), expected);
    }

    #[test]
    fn clones_never_alias(values in prop::collection::vec(-1e3f64..1e3, 1..64)) {
        let a = Tensor::from_vec(values.len(), values.clone()).unwrap();
        let mut b = a.clone();
        b.fill(0.0);
        prop_assert_eq!(a.to_vec(), values);
        prop_assert!(a.is_independent());
    }
}
