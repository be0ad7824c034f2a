//! Decides how a resolved source value becomes a value of the destination's shape.
//!
//! Nothing here touches the destination: [`coerce`] only returns a [`Plan`],
//! which [`crate::write::apply`] executes later. That way a field that turns
//! out to be incompatible never leaves a half-written frame behind.

use alloc::boxed::Box;

use facet_core::{Def, Field, Shape, StructKind, Type, UserType};
use facet_reflect::Peek;
use log::trace;
use owo_colors::OwoColorize;

use crate::CopyErrorKind;
use crate::number::Number;

/// How to build the destination value from the source.
pub(crate) enum Plan<'mem> {
    /// Shapes are identical: deep-copy the value.
    Copy(Peek<'mem, 'static>),

    /// Build the inner value, then wrap it in `Some`.
    Wrap(Box<Plan<'mem>>),

    /// Build the single field of a newtype.
    Newtype(Box<Plan<'mem>>),

    /// Store a converted number.
    Number(Number),
}

/// Result of trying to fit a value into a destination shape.
pub(crate) enum Coercion<'mem> {
    Assign(Plan<'mem>),

    /// The source is `None`: leave the destination alone.
    Absent,

    Incompatible,
}

/// How many levels of indirection we may still go through.
///
/// Unwrapping is counted per kind. Wrapping draws from one shared pool, so an
/// unforced copy adds at most one layer, `Some` or newtype, to the value.
#[derive(Debug, Clone, Copy)]
struct Budget {
    unwrap_option: u8,
    unwrap_newtype: u8,
    wraps: u8,
}

impl Budget {
    fn new(force: bool) -> Self {
        if force {
            Self {
                unwrap_option: 2,
                unwrap_newtype: 2,
                wraps: 4,
            }
        } else {
            Self {
                unwrap_option: 1,
                unwrap_newtype: 1,
                wraps: 1,
            }
        }
    }
}

/// Plans the conversion of `value` into a value of shape `target`.
///
/// `force` allows deeper `Option`/newtype indirection on both sides and
/// checked numeric conversions.
pub(crate) fn coerce<'mem>(
    value: Peek<'mem, 'static>,
    target: &'static Shape,
    force: bool,
) -> Result<Coercion<'mem>, CopyErrorKind> {
    trace!(
        "Coercing {} into {}{}",
        value.shape().blue(),
        target.yellow(),
        if force { " (forced)" } else { "" }
    );
    step(value, target, Budget::new(force), force)
}

fn step<'mem>(
    value: Peek<'mem, 'static>,
    target: &'static Shape,
    budget: Budget,
    force: bool,
) -> Result<Coercion<'mem>, CopyErrorKind> {
    let shape = value.shape();

    if let Def::Option(_) = shape.def {
        let Some(inner) = value.into_option()?.value() else {
            return Ok(Coercion::Absent);
        };
        if shape == target {
            return Ok(Coercion::Assign(Plan::Copy(value)));
        }
        if budget.unwrap_option > 0 {
            let budget = Budget {
                unwrap_option: budget.unwrap_option - 1,
                ..budget
            };
            match step(inner, target, budget, force)? {
                Coercion::Incompatible => {}
                found => return Ok(found),
            }
        }
    } else if shape == target {
        return Ok(Coercion::Assign(Plan::Copy(value)));
    }

    if budget.wraps > 0 {
        if let Def::Option(od) = target.def {
            let budget = Budget {
                wraps: budget.wraps - 1,
                ..budget
            };
            match step(value, od.t(), budget, force)? {
                Coercion::Assign(plan) => return Ok(Coercion::Assign(Plan::Wrap(Box::new(plan)))),
                Coercion::Absent => return Ok(Coercion::Absent),
                Coercion::Incompatible => {}
            }
        }
    }

    if budget.unwrap_newtype > 0 && newtype_field(shape).is_some() {
        let inner = value
            .into_struct()?
            .field(0)
            .map_err(|_| CopyErrorKind::FieldAccess { index: 0 })?;
        let budget = Budget {
            unwrap_newtype: budget.unwrap_newtype - 1,
            ..budget
        };
        match step(inner, target, budget, force)? {
            Coercion::Incompatible => {}
            found => return Ok(found),
        }
    }

    if budget.wraps > 0 {
        if let Some(field) = newtype_field(target) {
            let budget = Budget {
                wraps: budget.wraps - 1,
                ..budget
            };
            match step(value, field.shape(), budget, force)? {
                Coercion::Assign(plan) => {
                    return Ok(Coercion::Assign(Plan::Newtype(Box::new(plan))));
                }
                Coercion::Absent => return Ok(Coercion::Absent),
                Coercion::Incompatible => {}
            }
        }
    }

    if force {
        if let Some(number) = Number::read(value) {
            if number.store(target, None)? {
                return Ok(Coercion::Assign(Plan::Number(number)));
            }
        }
    }

    Ok(Coercion::Incompatible)
}

/// The wrapped field, if `shape` is a single-field tuple struct.
pub(crate) fn newtype_field(shape: &'static Shape) -> Option<&'static Field> {
    match shape.ty {
        Type::User(UserType::Struct(st))
            if matches!(st.kind, StructKind::TupleStruct) && st.fields.len() == 1 =>
        {
            st.fields.first()
        }
        _ => None,
    }
}
