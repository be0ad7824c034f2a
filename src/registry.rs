//! Per-type descriptor tables: field directives and zero-argument methods.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use facet_core::{Facet, Shape};
use facet_reflect::{HeapValue, Partial, Peek, ReflectError};
use log::trace;
use owo_colors::OwoColorize;

use crate::Directive;

type MethodFn =
    dyn Fn(Peek<'_, 'static>) -> Result<HeapValue<'static>, ReflectError> + Send + Sync;

struct Tag {
    owner: &'static Shape,
    field: &'static str,
    directive: Directive<'static>,
}

struct Method {
    owner: &'static Shape,
    name: &'static str,
    call: Box<MethodFn>,
}

/// Directives and methods the copier consults, keyed by type.
///
/// facet reflects fields but not methods or attributes we care about, so
/// both are declared here once and shared by reference across copies.
///
/// ```ignore
/// let registry = Registry::new()
///     .tag::<Entity>("internal", "skip")
///     .tag::<Request>("price", "value:amount")
///     .method::<Money, String>("formatted", |m| m.to_string());
/// ```
#[derive(Default)]
pub struct Registry {
    tags: Vec<Tag>,
    methods: Vec<Method>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a directive string to `field` of type `T`, replacing any earlier one.
    pub fn tag<T>(mut self, field: &'static str, directive: &'static str) -> Self
    where
        T: Facet<'static>,
    {
        let owner = T::SHAPE;
        self.tags.retain(|t| !(t.owner == owner && t.field == field));
        self.tags.push(Tag {
            owner,
            field,
            directive: Directive::parse(directive),
        });
        self
    }

    /// Registers a zero-argument method `name` on type `T`, returning an `R`.
    ///
    /// A method is only found when no field of the same name exists.
    pub fn method<T, R>(mut self, name: &'static str, f: fn(&T) -> R) -> Self
    where
        T: Facet<'static> + 'static,
        R: Facet<'static> + 'static,
    {
        let owner = T::SHAPE;
        let call: Box<MethodFn> = Box::new(move |this: Peek<'_, 'static>| {
            let result = f(this.get::<T>()?);
            let mut partial = Partial::alloc_shape(R::SHAPE)?;
            partial.set(result)?;
            partial.build()
        });
        self.methods.retain(|m| !(m.owner == owner && m.name == name));
        self.methods.push(Method { owner, name, call });
        self
    }

    /// Returns the directive attached to `field` of `owner`, if any.
    pub fn directive(&self, owner: &Shape, field: &str) -> Option<&Directive<'static>> {
        self.tags
            .iter()
            .find(|t| t.owner == owner && t.field == field)
            .map(|t| &t.directive)
    }

    /// Invokes method `name` on `this`. Returns `None` if no such method is registered.
    pub(crate) fn call(
        &self,
        this: Peek<'_, 'static>,
        name: &str,
    ) -> Option<Result<HeapValue<'static>, ReflectError>> {
        let method = self.find_method(this.shape(), name)?;
        trace!("Calling method {} on {}", name.yellow(), this.shape().blue());
        Some((method.call)(this))
    }

    fn find_method(&self, owner: &Shape, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.owner == owner && m.name == name)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field(
                "tags",
                &self
                    .tags
                    .iter()
                    .map(|t| (t.owner.type_identifier, t.field, &t.directive))
                    .collect::<Vec<_>>(),
            )
            .field(
                "methods",
                &self
                    .methods
                    .iter()
                    .map(|m| (m.owner.type_identifier, m.name))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
