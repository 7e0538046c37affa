use std::fmt::Debug;

pub use ::num::{One, Saturating};

/// T values are primitive integers
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// T values are non-negative primitive integers
pub trait PrimUInt: PrimInt + ::num::Unsigned {}

impl<T: PrimInt + ::num::Unsigned> PrimUInt for T {}

/// Arithmetic mean of the values, or `None` for an empty input.
pub fn mean<T: PrimUInt>(values: impl IntoIterator<Item = T>) -> Option<f64> {
    let (mut total, mut count) = (0.0, 0usize);
    for value in values {
        total += value.to_f64()?;
        count += 1;
    }
    match count {
        0 => None,
        _ => Some(total / count as f64),
    }
}
