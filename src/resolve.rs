//! Finds the source value that should populate a destination field.

use facet_core::{Def, Type, UserType};
use facet_reflect::{HeapValue, Peek};
use log::trace;
use owo_colors::OwoColorize;

use crate::{CopyErrorKind, Directive, Registry};

/// Where a destination field's value comes from.
pub(crate) enum Resolved<'mem> {
    /// Nothing to copy.
    Absent,

    /// A field borrowed from the source.
    Field(Peek<'mem, 'static>),

    /// The return value of a registered method.
    Computed(HeapValue<'static>),
}

/// Resolves the value for destination field `name` against `source`.
///
/// The lookup name is the directive's `source_name`, falling back to `name`.
/// A field of that name wins over a method of that name. If a field matched
/// and the source type tags it with its own `source_name`, one more lookup is
/// made inside that field's value.
pub(crate) fn resolve<'mem>(
    registry: &Registry,
    source: Peek<'mem, 'static>,
    name: &str,
    directive: Option<&Directive<'_>>,
) -> Result<Resolved<'mem>, CopyErrorKind> {
    let lookup = directive.and_then(|d| d.source_name).unwrap_or(name);

    let Some((field_name, value)) = find_field(source, lookup)? else {
        return call_method(registry, source, lookup);
    };

    let Some(own) = registry.directive(source.shape(), field_name) else {
        return Ok(Resolved::Field(value));
    };
    if own.skip {
        trace!("Source field {} is tagged skip", field_name.yellow());
        return Ok(Resolved::Absent);
    }
    let Some(inner_name) = own.source_name else {
        return Ok(Resolved::Field(value));
    };

    trace!(
        "Extracting {} from source field {}",
        inner_name.yellow(),
        field_name.yellow()
    );

    let holder = if let Def::Option(_) = value.shape().def {
        match value.into_option()?.value() {
            Some(inner) => inner,
            None => return Ok(Resolved::Absent),
        }
    } else {
        value
    };

    match find_field(holder, inner_name)? {
        Some((_, inner)) => Ok(Resolved::Field(inner)),
        None => call_method(registry, holder, inner_name),
    }
}

/// Looks up a struct field by exact name.
fn find_field<'mem>(
    value: Peek<'mem, 'static>,
    name: &str,
) -> Result<Option<(&'static str, Peek<'mem, 'static>)>, CopyErrorKind> {
    let Type::User(UserType::Struct(st)) = value.shape().ty else {
        return Ok(None);
    };
    let Some(index) = st.fields.iter().position(|f| f.name == name) else {
        return Ok(None);
    };
    let field = value
        .into_struct()?
        .field(index)
        .map_err(|_| CopyErrorKind::FieldAccess { index })?;
    Ok(Some((st.fields[index].name, field)))
}

fn call_method<'mem>(
    registry: &Registry,
    this: Peek<'mem, 'static>,
    name: &str,
) -> Result<Resolved<'mem>, CopyErrorKind> {
    match registry.call(this, name) {
        Some(result) => Ok(Resolved::Computed(result?)),
        None => {
            trace!("No field or method {} on {}", name.yellow(), this.shape().blue());
            Ok(Resolved::Absent)
        }
    }
}
