use alloc::vec::Vec;

use facet_core::{Def, Facet, Field, Shape, Type, UserType};
use facet_reflect::{Partial, Peek};
use log::{debug, trace};
use owo_colors::OwoColorize;

use crate::coerce::{Coercion, coerce};
use crate::resolve::{Resolved, resolve};
use crate::write::{apply, write_value};
use crate::{CopyError, CopyErrorKind, Registry};

/// Starts a copy from `source`. Finish it with [`Copier::to`].
pub fn copy<S>(source: &S) -> Copier<'_, S>
where
    S: Facet<'static>,
{
    Copier {
        source,
        registry: None,
        contexts: Vec::new(),
    }
}

/// Starts a copy into `destination`. Finish it with [`Filler::from`].
pub fn fill<D>(destination: &mut D) -> Filler<'_, D>
where
    D: Facet<'static>,
{
    Filler {
        destination,
        registry: None,
        contexts: Vec::new(),
    }
}

/// A source bound for copying, see [`copy`].
#[derive(Debug)]
pub struct Copier<'a, S> {
    source: &'a S,
    registry: Option<&'a Registry>,
    contexts: Vec<&'a str>,
}

impl<'a, S> Copier<'a, S>
where
    S: Facet<'static>,
{
    /// Uses the directives and methods declared in `registry`.
    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Activates a context. Fields whose directive names contexts are only
    /// copied when one of them is active.
    pub fn context(mut self, name: &'a str) -> Self {
        self.contexts.push(name);
        self
    }

    /// Copies every field it can into `destination`.
    ///
    /// All fields are processed even if one fails; the first failure is
    /// returned and the destination keeps whatever was copied.
    pub fn to<D>(&self, destination: &mut D) -> Result<(), CopyError>
    where
        D: Facet<'static>,
    {
        let empty = Registry::new();
        let registry = self.registry.unwrap_or(&empty);
        copy_struct(registry, &self.contexts, Peek::new(self.source), destination)
    }
}

/// A destination bound for copying, see [`fill`].
#[derive(Debug)]
pub struct Filler<'a, D> {
    destination: &'a mut D,
    registry: Option<&'a Registry>,
    contexts: Vec<&'a str>,
}

impl<'a, D> Filler<'a, D>
where
    D: Facet<'static>,
{
    /// Uses the directives and methods declared in `registry`.
    pub fn with_registry(mut self, registry: &'a Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Activates a context, see [`Copier::context`].
    pub fn context(mut self, name: &'a str) -> Self {
        self.contexts.push(name);
        self
    }

    /// Copies every field it can from `source`. Same semantics as [`Copier::to`].
    pub fn from<S>(self, source: &S) -> Result<(), CopyError>
    where
        S: Facet<'static>,
    {
        let empty = Registry::new();
        let registry = self.registry.unwrap_or(&empty);
        copy_struct(registry, &self.contexts, Peek::new(source), self.destination)
    }
}

enum Outcome {
    Written,
    Kept,
    Failed(CopyError),
}

fn copy_struct<D>(
    registry: &Registry,
    contexts: &[&str],
    source: Peek<'_, 'static>,
    destination: &mut D,
) -> Result<(), CopyError>
where
    D: Facet<'static>,
{
    let Type::User(UserType::Struct(dst_ty)) = D::SHAPE.ty else {
        return Err(CopyErrorKind::DestinationNotStruct { got: D::SHAPE }.into());
    };
    let source = source_struct(source)?;

    trace!("Copying {} into {}", source.shape().blue(), D::SHAPE.yellow());

    let current = Peek::new(&*destination).into_struct()?;
    let mut wip = Partial::alloc_shape(D::SHAPE)?;
    let mut first_error: Option<CopyError> = None;

    for (index, field) in dst_ty.fields.iter().enumerate() {
        wip.begin_nth_field(index)?;

        let outcome = populate(registry, contexts, D::SHAPE, source, field, &mut wip)
            .map_err(|kind| CopyError::from(kind).in_field(field.name))?;

        match outcome {
            Outcome::Written => {}
            Outcome::Kept | Outcome::Failed(_) => {
                let previous = current
                    .field(index)
                    .map_err(|_| CopyError::from(CopyErrorKind::FieldAccess { index }))?;
                write_value(&mut wip, previous)
                    .map_err(|kind| CopyError::from(kind).in_field(field.name))?;
            }
        }

        if let Outcome::Failed(err) = outcome {
            if first_error.is_none() {
                first_error = Some(err);
            } else {
                debug!("Suppressing later copy error: {err}");
            }
        }

        wip.end()?;
    }

    *destination = wip.build()?.materialize::<D>()?;

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Unwraps `Option` layers around the source and checks it is a struct.
fn source_struct<'a>(mut source: Peek<'a, 'static>) -> Result<Peek<'a, 'static>, CopyError> {
    while let Def::Option(_) = source.shape().def {
        source = source
            .into_option()?
            .value()
            .ok_or(CopyErrorKind::NilSource)?;
    }
    match source.shape().ty {
        Type::User(UserType::Struct(_)) => Ok(source),
        _ => Err(CopyErrorKind::SourceNotStruct {
            got: source.shape(),
        }
        .into()),
    }
}

/// Fills one destination field. Hard errors abort the whole copy; a forced
/// mismatch is reported as [`Outcome::Failed`] and the field keeps its value.
fn populate(
    registry: &Registry,
    contexts: &[&str],
    owner: &'static Shape,
    source: Peek<'_, 'static>,
    field: &'static Field,
    wip: &mut Partial<'static>,
) -> Result<Outcome, CopyErrorKind> {
    let directive = registry.directive(owner, field.name);
    let force = directive.is_some_and(|d| d.force);

    if let Some(directive) = directive {
        if directive.skip {
            trace!("Skipping {}", field.name.yellow());
            return Ok(Outcome::Kept);
        }
        if !directive.applies_in(contexts) {
            trace!("Field {} is not in an active context", field.name.yellow());
            return Ok(Outcome::Kept);
        }
    }

    let resolved = resolve(registry, source, field.name, directive)?;
    let value = match &resolved {
        Resolved::Absent => return Ok(Outcome::Kept),
        Resolved::Field(peek) => *peek,
        Resolved::Computed(heap) => heap.peek(),
    };

    match coerce(value, field.shape(), force)? {
        Coercion::Assign(plan) => {
            apply(wip, plan)?;
            Ok(Outcome::Written)
        }
        Coercion::Absent => Ok(Outcome::Kept),
        Coercion::Incompatible if force => Ok(Outcome::Failed(
            CopyError::from(CopyErrorKind::TypeMismatch {
                from: value.shape(),
                to: field.shape(),
            })
            .in_field(field.name),
        )),
        Coercion::Incompatible => {
            trace!(
                "Leaving {}: {} doesn't fit {}",
                field.name.yellow(),
                value.shape().blue(),
                field.shape().blue()
            );
            Ok(Outcome::Kept)
        }
    }
}
