//! Default key-template resolver.
//!
//! Templates name their variables in braces, e.g. `user:{id}:profile`. Each
//! variable is supplied by the parameter declared with `Param::key(name, ..)`.
//! String arguments are substituted as-is, other values in their JSON form.

use std::sync::LazyLock;

use anyhow::{anyhow, bail};
use regex::{Captures, Regex};

use redop_core::{KeyResolver, Method, Value};

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("key variable pattern is valid")
});

/// Substitutes `{name}` placeholders from key-variable parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateKeyResolver;

impl KeyResolver for TemplateKeyResolver {
    fn resolve(&self, template: &str, method: &Method, args: &[Value]) -> anyhow::Result<String> {
        let mut failure = None;
        let key = VARIABLE.replace_all(template, |caps: &Captures<'_>| {
            match substitute(&caps[1], method, args) {
                Ok(part) => part,
                Err(err) => {
                    failure.get_or_insert(err);
                    String::new()
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
        Ok(key.into_owned())
    }
}

fn substitute(name: &str, method: &Method, args: &[Value]) -> anyhow::Result<String> {
    let position = method
        .params()
        .iter()
        .position(|p| p.key_var() == Some(name))
        .ok_or_else(|| anyhow!("no parameter of `{method}` supplies key variable `{name}`"))?;
    let value = args
        .get(position)
        .ok_or_else(|| anyhow!("missing argument {position} for key variable `{name}`"))?;
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => bail!("key variable `{name}` of `{method}` is null"),
        other => Ok(other.to_string()),
    }
}
