//! The per-field directive mini-language.
//!
//! A directive is a comma-separated list of tokens. Each token is either a bare
//! keyword (`force`, `skip`) or a `key:value` pair (`value:Name`,
//! `field:Name`, `context:Name`). Anything else is ignored, so directives can
//! grow new tokens without breaking older readers.

use alloc::collections::BTreeSet;

use log::trace;
use owo_colors::OwoColorize;

/// Parsed copy configuration for one struct field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive<'a> {
    /// Never write this field.
    pub skip: bool,

    /// Try harder to convert, and fail loudly if that is not enough.
    pub force: bool,

    /// Name of the field or method to read from instead of the field's own name.
    ///
    /// Set by either `value:Name` or `field:Name`; the two are synonyms.
    pub source_name: Option<&'a str>,

    /// Contexts this field is copied in. `None` means "always".
    pub context: Option<BTreeSet<&'a str>>,
}

impl<'a> Directive<'a> {
    /// Parses a directive string. Never fails: unknown or malformed tokens are dropped.
    pub fn parse(tag: &'a str) -> Self {
        let mut directive = Directive::default();

        for token in tag.split(',').map(str::trim) {
            match token.split_once(':') {
                Some((key, value)) => {
                    let value = value.trim();
                    if value.is_empty() {
                        trace!("Ignoring directive token {} with empty value", token.yellow());
                        continue;
                    }
                    match key.trim() {
                        "value" | "field" => directive.source_name = Some(value),
                        "context" => {
                            directive
                                .context
                                .get_or_insert_with(BTreeSet::new)
                                .insert(value);
                        }
                        _ => trace!("Ignoring unknown directive key {}", key.yellow()),
                    }
                }
                None => match token {
                    "force" => directive.force = true,
                    "skip" => directive.skip = true,
                    "" => {}
                    _ => trace!("Ignoring unknown directive {}", token.yellow()),
                },
            }
        }

        directive
    }

    /// Returns true if this field takes part in a copy running with the given contexts.
    pub fn applies_in(&self, active: &[&str]) -> bool {
        match &self.context {
            None => true,
            Some(wanted) => active.iter().any(|name| wanted.iter().any(|w| w == name)),
        }
    }
}
