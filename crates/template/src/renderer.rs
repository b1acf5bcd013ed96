//! Minijinja-backed query rendering.
//!
//! Templates are arbitrary strings taken from rule documents, so a fresh
//! [`minijinja::Environment`] is created per call.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use minijinja::value::{Enumerator, Object, Value};
use minijinja::{Environment, ErrorKind, Template, UndefinedBehavior};
use serde::Serialize;
use tracing::debug;

use crate::error::TemplateError;

/// Globals and loop bindings minijinja provides itself; never reported as free.
pub const BUILTIN_GLOBALS: &[&str] = &["range", "dict", "namespace", "debug", "loop"];

/// Renders KQL templates with strict undefined handling.
///
/// Stateless; exists so callers can hold a renderer the same way they hold
/// an executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueryRenderer {
    _private: (),
}

impl QueryRenderer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a configured environment: strict undefined, trailing newline kept.
    fn build_env<'source>() -> Environment<'source> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        env
    }

    /// Names the template references but does not define.
    ///
    /// Loop variables, `set` bindings, macro parameters and builtin globals
    /// are excluded. A template that fails to parse yields an empty set.
    pub fn discover_variables(&self, template: &str) -> BTreeSet<String> {
        let env = Self::build_env();
        match env.template_from_str(template) {
            Ok(tmpl) => tmpl
                .undeclared_variables(false)
                .into_iter()
                .filter(|name| !BUILTIN_GLOBALS.contains(&name.as_str()))
                .collect(),
            Err(err) => {
                debug!(error = %err, "template does not parse; no variables discovered");
                BTreeSet::new()
            }
        }
    }

    /// Render `template` with `variables`.
    ///
    /// Extra variables are ignored. A placeholder-free template renders to
    /// itself, byte for byte.
    pub fn render<V: Serialize>(
        &self,
        template: &str,
        variables: &BTreeMap<String, V>,
    ) -> Result<String, TemplateError> {
        let env = Self::build_env();
        let tmpl = env.template_from_str(template).map_err(syntax_error)?;

        let free: BTreeSet<String> = tmpl
            .undeclared_variables(false)
            .into_iter()
            .filter(|name| !BUILTIN_GLOBALS.contains(&name.as_str()))
            .collect();
        let missing: Vec<&String> = free
            .iter()
            .filter(|name| !variables.contains_key(name.as_str()))
            .collect();
        if !missing.is_empty() {
            debug!(?missing, "template references variables that were not supplied");
        }

        tmpl.render(variables).map_err(|err| match err.kind() {
            ErrorKind::UndefinedError => match blame_missing(&tmpl, variables, &missing) {
                Some(name) => TemplateError::UndefinedVariable { name },
                None => TemplateError::Render(describe(&err)),
            },
            ErrorKind::SyntaxError => syntax_error(err),
            _ => TemplateError::Render(describe(&err)),
        })
    }
}

/// Free-function form of [`QueryRenderer::discover_variables`].
pub fn discover_variables(template: &str) -> BTreeSet<String> {
    QueryRenderer::new().discover_variables(template)
}

/// Free-function form of [`QueryRenderer::render`].
pub fn render<V: Serialize>(
    template: &str,
    variables: &BTreeMap<String, V>,
) -> Result<String, TemplateError> {
    QueryRenderer::new().render(template, variables)
}

/// Stand-in bound to a missing name while isolating which lookup failed.
/// Attribute and item access yield another stand-in; iteration is empty.
#[derive(Debug)]
struct StandIn;

impl Object for StandIn {
    fn get_value(self: &Arc<Self>, _key: &Value) -> Option<Value> {
        Some(Value::from_object(StandIn))
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Empty
    }
}

/// The missing name that still fails rendering when every other missing
/// name is bound to a [`StandIn`]. Names only read behind an `is defined`
/// guard never fail this way. Falls back to the first missing name when no
/// single culprit can be isolated.
fn blame_missing<V: Serialize>(
    tmpl: &Template<'_, '_>,
    variables: &BTreeMap<String, V>,
    missing: &[&String],
) -> Option<String> {
    let supplied: BTreeMap<&str, Value> = variables
        .iter()
        .map(|(name, value)| (name.as_str(), Value::from_serialize(value)))
        .collect();

    let culprit = missing.iter().copied().find(|&candidate| {
        let mut context = supplied.clone();
        for &name in missing.iter().filter(|&&name| name != candidate) {
            context.insert(name.as_str(), Value::from_object(StandIn));
        }
        matches!(tmpl.render(&context), Err(err) if err.kind() == ErrorKind::UndefinedError)
    });
    culprit.or_else(|| missing.first().copied()).cloned()
}

fn syntax_error(err: minijinja::Error) -> TemplateError {
    TemplateError::Syntax {
        line: err.line(),
        message: describe(&err),
    }
}

fn describe(err: &minijinja::Error) -> String {
    err.detail()
        .map(str::to_string)
        .unwrap_or_else(|| err.kind().to_string())
}
