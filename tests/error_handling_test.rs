/// Comprehensive error handling tests for LimbKit
use limbkit::*;
use num_bigint::BigInt;
mod common;
use common::*;

#[test]
fn test_build_errors() {
    // No limb arrays
    assert!(matches!(CompositeArray::build(&[]), Err(LimbKitError::Shape(_))));

    // Ragged limb arrays
    let result = CompositeArray::build(&[
        FixedArray::from_u64(vec![1, 2]),
        FixedArray::from_u64(vec![1]),
    ]);
    assert!(matches!(result, Err(LimbKitError::Shape(_))));

    // Non-uint64 limb arrays
    let result = CompositeArray::build(&[FixedArray::from_i64(vec![1])]);
    assert!(matches!(result, Err(LimbKitError::Type(_))));
    let result = CompositeArray::build(&[FixedArray::from_f64(vec![1.0])]);
    assert!(matches!(result, Err(LimbKitError::Type(_))));
}

#[test]
fn test_cast_from_signed_errors() {
    for input in [
        FixedArray::from_u64(vec![1]),
        FixedArray::from_bool(vec![true]),
        FixedArray::from_f64(vec![1.0]),
    ] {
        assert!(matches!(
            CompositeArray::cast_from_signed(&input),
            Err(LimbKitError::Type(_))
        ));
    }
}

#[test]
fn test_resize_errors() {
    let a = big_str(&["1", "-1", "36893488147419103232"], true);
    let c = a.as_composite().unwrap();
    assert_eq!(c.limb_count(), 2);

    assert!(matches!(c.resize(0), Err(LimbKitError::Shape(_))));
    let err = c.resize(1).unwrap_err();
    assert_eq!(err, LimbKitError::PrecisionLoss { index: 2, new_limbs: 1 });
    assert_eq!(
        err.to_string(),
        "Precision loss: value at index 2 does not fit in 1 limbs"
    );

    // -1 and 1 shrink fine once the wide value is gone.
    let small = big_str(&["1", "-1"], true).as_composite().unwrap().resize(4).unwrap();
    let shrunk = small.resize(1).unwrap();
    assert_eq!(
        to_bigints(&shrunk.into()),
        vec![BigInt::from(1), BigInt::from(-1)]
    );
}

#[test]
fn test_unsigned_resize_checks_high_limbs() {
    let a = CompositeBuilder::new()
        .with_limb(vec![0, 1])
        .with_limb(vec![u64::MAX, 0])
        .build();
    let c = a.as_composite().unwrap();
    // u64::MAX fits one unsigned limb; 2^64 does not.
    assert!(matches!(
        c.resize(1),
        Err(LimbKitError::PrecisionLoss { index: 1, new_limbs: 1 })
    ));
}

#[test]
fn test_zeros_and_from_bigints_errors() {
    assert!(matches!(CompositeArray::zeros(3, 0, false), Err(LimbKitError::Shape(_))));
    assert!(matches!(
        CompositeArray::from_bigints(&[BigInt::from(-1)], false),
        Err(LimbKitError::Type(_))
    ));
}

#[test]
fn test_equals_errors() {
    let a = ints(vec![1, 2]);
    let b = ints(vec![1]);
    assert!(matches!(a.equals(&b), Err(LimbKitError::Shape(_))));

    let f = floats(vec![1.0, 2.0]);
    assert!(matches!(a.equals(&f), Err(LimbKitError::Type(_))));

    let big = big_str(&["1", "2"], false);
    assert!(matches!(big.equals(&f), Err(LimbKitError::Type(_))));
    assert_eq!(big.equals(&a).unwrap().as_bool(), Some(vec![true, true]));
}

#[test]
fn test_assign_errors() {
    let mut target = CompositeArray::zeros(3, 2, false).unwrap();
    let source = CompositeArray::zeros(2, 1, false).unwrap();
    let before = target.clone();
    assert!(matches!(target.assign(&source), Err(LimbKitError::Shape(_))));
    assert_eq!(target, before);
}

#[test]
fn test_gather_errors() {
    let a = ints(vec![1, 2, 3]);
    assert_eq!(
        gather(&a, &ints(vec![0, -1])),
        Err(LimbKitError::IndexOutOfBounds { index: -1, len: 3 })
    );
    assert_eq!(
        gather(&a, &uints(vec![3])),
        Err(LimbKitError::IndexOutOfBounds { index: 3, len: 3 })
    );
    assert!(matches!(gather(&a, &floats(vec![0.0])), Err(LimbKitError::Type(_))));
    assert!(matches!(gather(&a, &bools(vec![true])), Err(LimbKitError::Type(_))));

    // Empty source: every index is out of bounds.
    assert!(gather(&ints(vec![]), &ints(vec![0])).is_err());
    assert!(gather(&ints(vec![]), &ints(vec![])).unwrap().is_empty());
}

#[test]
fn test_scatter_leaves_target_on_error() {
    let mut target = big_str(&["1", "2", "3"], true);
    let before = target.clone();

    // Index check fails after an earlier valid index.
    let result = scatter(&mut target, &ints(vec![0, 5]), &ints(vec![9, 9]));
    assert!(matches!(result, Err(LimbKitError::IndexOutOfBounds { index: 5, len: 3 })));
    assert_eq!(target, before);

    // Float values cannot go into a composite target.
    let result = scatter(&mut target, &ints(vec![0]), &floats(vec![1.0]));
    assert!(matches!(result, Err(LimbKitError::Type(_))));
    assert_eq!(target, before);

    // Composite values cannot go into a fixed target.
    let mut fixed = ints(vec![0]);
    let result = scatter(&mut fixed, &ints(vec![0]), &big_str(&["1"], true));
    assert!(matches!(result, Err(LimbKitError::Type(_))));
}

#[test]
fn test_groupby_errors() {
    assert!(matches!(GroupBy::new(&[], true), Err(LimbKitError::Shape(_))));
    let k1 = ints(vec![1, 2, 3]);
    let k2 = ints(vec![1, 2]);
    assert!(matches!(GroupBy::new(&[&k1, &k2], false), Err(LimbKitError::Shape(_))));

    let g = GroupBy::new(&[&k1], false).unwrap();
    assert!(matches!(g.aggregate(&k2, Reduction::Sum), Err(LimbKitError::Shape(_))));
    assert!(matches!(
        g.aggregate_str(&k1, "median"),
        Err(LimbKitError::UnsupportedOperation(_))
    ));
    assert!(matches!(
        g.aggregate(&floats(vec![0.0; 3]), Reduction::Any),
        Err(LimbKitError::Type(_))
    ));
}

#[test]
fn test_reduce_segments_errors() {
    let values = ints(vec![1, 2, 3]);
    let config = EngineConfig::default();
    assert!(matches!(
        reduce_segments(&values, &[0, 4], Reduction::Sum, &config),
        Err(LimbKitError::Shape(_))
    ));
    assert!(matches!(
        reduce_segments(&values, &[0, 2, 1], Reduction::Sum, &config),
        Err(LimbKitError::Shape(_))
    ));
    // Offsets must start at 0.
    for segments in [&[1][..], &[1, 2], &[3]] {
        assert!(matches!(
            reduce_segments(&values, segments, Reduction::Sum, &config),
            Err(LimbKitError::Shape(_))
        ));
    }
    let err = reduce_segments(&values, &[0, 3], Reduction::Max, &config).unwrap_err();
    assert!(matches!(err, LimbKitError::NoGroups(_)));
    assert_eq!(err.to_string(), "Reduction 'max' is undefined on an empty group");
}

#[test]
fn test_unsupported_operation_names() {
    for name in ["median", "SUM", " sum", "", "count", "std"] {
        let err = name.parse::<Reduction>().unwrap_err();
        assert_eq!(err, LimbKitError::UnsupportedOperation(name.to_string()));
    }
}

#[test]
fn test_error_display() {
    assert_eq!(
        LimbKitError::IndexOutOfBounds { index: -2, len: 4 }.to_string(),
        "Index -2 out of bounds (len: 4)"
    );
    assert_eq!(LimbKitError::UnknownHandle(3).to_string(), "Unknown handle: 3");
    let boxed: Box<dyn std::error::Error> = Box::new(LimbKitError::Type("x".to_string()));
    assert!(boxed.to_string().contains('x'));
}
