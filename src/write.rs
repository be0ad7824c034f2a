//! Writes values into a [`Partial`], shape by shape.

use alloc::string::{String, ToString};

use facet_core::{Def, Type, UserType};
use facet_reflect::{Partial, Peek};
use log::trace;
use owo_colors::OwoColorize;

use crate::CopyErrorKind;
use crate::coerce::Plan;

/// Executes `plan` against the current frame of `wip`.
pub(crate) fn apply(wip: &mut Partial<'static>, plan: Plan<'_>) -> Result<(), CopyErrorKind> {
    match plan {
        Plan::Copy(value) => write_value(wip, value),
        Plan::Wrap(inner) => {
            trace!("Wrapping in Some for {}", wip.shape().blue());
            wip.begin_some()?;
            apply(wip, *inner)?;
            wip.end()?;
            Ok(())
        }
        Plan::Newtype(inner) => {
            trace!("Wrapping in newtype {}", wip.shape().blue());
            wip.begin_nth_field(0)?;
            apply(wip, *inner)?;
            wip.end()?;
            Ok(())
        }
        Plan::Number(number) => {
            let target = wip.shape();
            if number.store(target, Some(wip))? {
                Ok(())
            } else {
                Err(CopyErrorKind::UnsupportedShape { got: target })
            }
        }
    }
}

/// Deep-copies `value` into the current frame of `wip`.
///
/// The frame must have the same shape as `value`. Scalars are cloned; options,
/// lists, arrays, maps, boxes, structs and enums are rebuilt element by
/// element. Any other scalar is round-tripped through its `Display` and
/// `FromStr` impls. Anything left is reported as
/// [`CopyErrorKind::UnsupportedShape`].
pub(crate) fn write_value(
    wip: &mut Partial<'static>,
    value: Peek<'_, 'static>,
) -> Result<(), CopyErrorKind> {
    let shape = value.shape();

    macro_rules! clone_scalars {
        ($($ty:ty),*) => {
            $(
                if shape.is_type::<$ty>() {
                    let cloned: $ty = value.get::<$ty>()?.clone();
                    wip.set(cloned)?;
                    return Ok(());
                }
            )*
        };
    }

    clone_scalars!(
        String, bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32,
        f64
    );

    match shape.def {
        Def::Scalar if shape.vtable.has_display() && shape.vtable.has_parse() => {
            trace!("Copying {} through its string form", shape.blue());
            wip.parse_from_str(&value.to_string())?;
            return Ok(());
        }
        Def::Option(_) => {
            match value.into_option()?.value() {
                Some(inner) => {
                    wip.begin_some()?;
                    write_value(wip, inner)?;
                    wip.end()?;
                }
                None => {
                    wip.set_default()?;
                }
            }
            return Ok(());
        }
        Def::List(_) => {
            let list = value.into_list()?;
            wip.begin_list()?;
            for item in list.iter() {
                wip.begin_list_item()?;
                write_value(wip, item)?;
                wip.end()?;
            }
            return Ok(());
        }
        Def::Array(_) => {
            let array = value.into_list_like()?;
            for (index, item) in array.iter().enumerate() {
                wip.begin_nth_element(index)?;
                write_value(wip, item)?;
                wip.end()?;
            }
            return Ok(());
        }
        Def::Map(_) => {
            let map = value.into_map()?;
            wip.begin_map()?;
            for (key, item) in map.iter() {
                wip.begin_key()?;
                write_value(wip, key)?;
                wip.end()?;
                wip.begin_value()?;
                write_value(wip, item)?;
                wip.end()?;
            }
            return Ok(());
        }
        Def::Pointer(pd)
            if pd
                .pointee()
                .is_some_and(|pointee| pointee.layout.sized_layout().is_ok()) =>
        {
            let inner = value
                .into_pointer()?
                .borrow_inner()
                .ok_or(CopyErrorKind::UnsupportedShape { got: shape })?;
            wip.begin_smart_ptr()?;
            write_value(wip, inner)?;
            wip.end()?;
            return Ok(());
        }
        _ => {}
    }

    match shape.ty {
        Type::User(UserType::Struct(st)) => {
            let fields = value.into_struct()?;
            for index in 0..st.fields.len() {
                let field = fields
                    .field(index)
                    .map_err(|_| CopyErrorKind::FieldAccess { index })?;
                wip.begin_nth_field(index)?;
                write_value(wip, field)?;
                wip.end()?;
            }
            Ok(())
        }
        Type::User(UserType::Enum(ed)) => {
            let peek_enum = value.into_enum()?;
            let variant_index = peek_enum
                .variant_index()
                .map_err(|_| CopyErrorKind::UnsupportedShape { got: shape })?;
            wip.select_nth_variant(variant_index)?;

            let variant = &ed.variants[variant_index];
            for index in 0..variant.data.fields.len() {
                let field = peek_enum
                    .field(index)
                    .ok()
                    .flatten()
                    .ok_or(CopyErrorKind::FieldAccess { index })?;
                wip.begin_nth_field(index)?;
                write_value(wip, field)?;
                wip.end()?;
            }
            Ok(())
        }
        _ => Err(CopyErrorKind::UnsupportedShape { got: shape }),
    }
}
