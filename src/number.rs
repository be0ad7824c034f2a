//! Checked conversions between numeric primitives, used by forced copies.

use facet_core::Shape;
use facet_reflect::{Partial, Peek, ReflectError};

/// A numeric value widened to the largest type of its family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Signed(i128),
    Unsigned(u128),
    Float(f64),
}

impl Number {
    /// Reads a numeric primitive out of `value`, or `None` if it isn't one.
    pub(crate) fn read(value: Peek<'_, 'static>) -> Option<Number> {
        let shape = value.shape();

        macro_rules! read_as {
            ($variant:ident, $wide:ty: $($ty:ty),*) => {
                $(
                    if shape.is_type::<$ty>() {
                        return value.get::<$ty>().ok().map(|v| Number::$variant(*v as $wide));
                    }
                )*
            };
        }

        read_as!(Unsigned, u128: u8, u16, u32, u64, u128, usize);
        read_as!(Signed, i128: i8, i16, i32, i64, i128, isize);
        read_as!(Float, f64: f32, f64);
        None
    }

    /// Converts into `target` and, if `wip` is given, sets it there.
    ///
    /// Returns `Ok(false)` if `target` isn't numeric or the value doesn't fit.
    pub(crate) fn store(
        self,
        target: &Shape,
        wip: Option<&mut Partial<'static>>,
    ) -> Result<bool, ReflectError> {
        macro_rules! store_as {
            ($($ty:ty),*) => {
                $(
                    if target.is_type::<$ty>() {
                        let Some(converted) = <$ty as FromNumber>::from_number(self) else {
                            return Ok(false);
                        };
                        if let Some(wip) = wip {
                            wip.set(converted)?;
                        }
                        return Ok(true);
                    }
                )*
            };
        }

        store_as!(
            u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64
        );
        Ok(false)
    }

    fn same_integer(self, other: Number) -> bool {
        match (self, other) {
            (Number::Signed(a), Number::Signed(b)) => a == b,
            (Number::Unsigned(a), Number::Unsigned(b)) => a == b,
            (Number::Signed(a), Number::Unsigned(b)) | (Number::Unsigned(b), Number::Signed(a)) => {
                u128::try_from(a) == Ok(b)
            }
            _ => false,
        }
    }
}

const TWO_POW_127: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
const TWO_POW_128: f64 = 340_282_366_920_938_463_463_374_607_431_768_211_456.0;

/// `v` as an integer, if it is a whole number within 128 bits.
fn whole(v: f64) -> Option<Number> {
    // bounds first: `as` saturates out of range and maps NaN to 0
    if v < 0.0 {
        if v < -TWO_POW_127 {
            return None;
        }
        let w = v as i128;
        (w as f64 == v).then_some(Number::Signed(w))
    } else {
        if v.is_nan() || v >= TWO_POW_128 {
            return None;
        }
        let w = v as u128;
        (w as f64 == v).then_some(Number::Unsigned(w))
    }
}

trait FromNumber: Sized {
    fn from_number(number: Number) -> Option<Self>;
}

macro_rules! impl_from_number_int {
    ($($ty:ty),*) => {
        $(
            impl FromNumber for $ty {
                fn from_number(number: Number) -> Option<Self> {
                    match number {
                        Number::Signed(v) => v.try_into().ok(),
                        Number::Unsigned(v) => v.try_into().ok(),
                        Number::Float(v) => whole(v).and_then(Self::from_number),
                    }
                }
            }
        )*
    };
}

impl_from_number_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl FromNumber for f32 {
    fn from_number(number: Number) -> Option<Self> {
        match number {
            Number::Signed(v) => {
                let c = v as f32;
                whole(c as f64)
                    .is_some_and(|w| w.same_integer(number))
                    .then_some(c)
            }
            Number::Unsigned(v) => {
                let c = v as f32;
                whole(c as f64)
                    .is_some_and(|w| w.same_integer(number))
                    .then_some(c)
            }
            Number::Float(v) => {
                let c = v as f32;
                (c.is_finite() && c as f64 == v).then_some(c)
            }
        }
    }
}

impl FromNumber for f64 {
    fn from_number(number: Number) -> Option<Self> {
        match number {
            Number::Signed(v) => {
                let c = v as f64;
                whole(c).is_some_and(|w| w.same_integer(number)).then_some(c)
            }
            Number::Unsigned(v) => {
                let c = v as f64;
                whole(c).is_some_and(|w| w.same_integer(number)).then_some(c)
            }
            Number::Float(v) => v.is_finite().then_some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_convert_when_in_range() {
        assert_eq!(u8::from_number(Number::Signed(200)), Some(200));
        assert_eq!(u8::from_number(Number::Signed(300)), None);
        assert_eq!(u32::from_number(Number::Signed(-1)), None);
        assert_eq!(i64::from_number(Number::Unsigned(42)), Some(42));
    }

    #[test]
    fn floats_convert_only_when_whole() {
        assert_eq!(i32::from_number(Number::Float(12.0)), Some(12));
        assert_eq!(i32::from_number(Number::Float(12.5)), None);
        assert_eq!(u8::from_number(Number::Float(f64::NAN)), None);
        assert_eq!(u8::from_number(Number::Float(-1.0)), None);
        assert_eq!(f64::from_number(Number::Signed(-3)), Some(-3.0));
    }

    #[test]
    fn out_of_range_floats_are_rejected() {
        assert_eq!(i128::from_number(Number::Float(TWO_POW_127)), None);
        assert_eq!(
            i128::from_number(Number::Float(-TWO_POW_127)),
            Some(i128::MIN)
        );
        assert_eq!(u128::from_number(Number::Float(TWO_POW_128)), None);
        assert_eq!(
            u128::from_number(Number::Float(TWO_POW_127)),
            Some(1 << 127)
        );
        assert_eq!(i64::from_number(Number::Float(f64::INFINITY)), None);
        assert_eq!(u64::from_number(Number::Float(f64::NEG_INFINITY)), None);
    }

    #[test]
    fn float_targets_need_an_exact_fit() {
        assert_eq!(f32::from_number(Number::Float(1e300)), None);
        assert_eq!(f32::from_number(Number::Float(0.1)), None);
        assert_eq!(f32::from_number(Number::Float(0.5)), Some(0.5));
        assert_eq!(f64::from_number(Number::Float(f64::NAN)), None);
        assert_eq!(f64::from_number(Number::Unsigned((1 << 53) + 1)), None);
        assert_eq!(f64::from_number(Number::Unsigned(1 << 53)), Some(9007199254740992.0));
        assert_eq!(f32::from_number(Number::Unsigned(u128::MAX)), None);
        assert_eq!(f32::from_number(Number::Signed(-16_777_217)), None);
        assert_eq!(f32::from_number(Number::Signed(-16_777_216)), Some(-16_777_216.0));
    }
}
