//! Fatal-precondition macros.
//!
//! A failed check aborts the current computation with a diagnostic carrying
//! the source location, the failing expression and a message.

/// Always-on precondition check.
macro_rules! tensor_assert {
    ($cond:expr $(,)?) => {
        tensor_assert!($cond, "precondition violated")
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            panic!(
                "fatal error at {}:{}\n  expression: {}\n  message: {}",
                file!(),
                line!(),
                stringify!($cond),
                format_args!($($arg)+)
            );
        }
    };
}

/// Index check, compiled in for debug builds or with the `checked-index` feature.
macro_rules! tensor_assert_index {
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(any(debug_assertions, feature = "checked-index")) {
            tensor_assert!($cond, $($arg)+);
        }
    };
}

/// Finite check applied after kernels that can introduce NaN or infinity.
macro_rules! tensor_assert_finite {
    ($value:expr, $what:expr) => {{
        let value = $value;
        tensor_assert!(
            num_traits::Float::is_finite(value),
            "{} produced a non-finite value",
            $what
        );
        value
    }};
}
