//! Per-call invocation context and the shape executors declare for it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{Capability, Tag};
use crate::error::ContextError;
use crate::method::Method;
use crate::traits::KeyResolver;

// ---------------------------------------------------------------------------
// Codec / TimeUnit
// ---------------------------------------------------------------------------

/// Serialization mode for keys and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    #[default]
    String,
    Json,
    Bytes,
}

/// Unit of time arguments, derived from the identity's `Millis`/`Seconds` bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Seconds,
}

// ---------------------------------------------------------------------------
// ContextShape
// ---------------------------------------------------------------------------

/// Where a slot's argument comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgSource {
    /// The first parameter carrying this tag.
    Tagged(Tag),
    /// A fixed parameter position.
    Position(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSlot {
    pub name: &'static str,
    pub source: ArgSource,
    pub required: bool,
}

/// The call-context an executor needs: whether a key must be resolved and
/// which arguments to bind under which slot names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextShape {
    needs_key: bool,
    slots: Vec<ArgSlot>,
}

impl ContextShape {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_key(mut self) -> Self {
        self.needs_key = true;
        self
    }

    /// Binds the parameter tagged with `C` under `name`. Required.
    #[must_use]
    pub fn bind<C: Capability>(self, name: &'static str) -> Self {
        self.slot(name, ArgSource::Tagged(Tag::of::<C>()), true)
    }

    /// Binds the parameter tagged with `C` under `name` if the method has one.
    #[must_use]
    pub fn optional<C: Capability>(self, name: &'static str) -> Self {
        self.slot(name, ArgSource::Tagged(Tag::of::<C>()), false)
    }

    /// Binds the parameter at `position` under `name`. Required.
    #[must_use]
    pub fn bind_position(self, name: &'static str, position: usize) -> Self {
        self.slot(name, ArgSource::Position(position), true)
    }

    #[must_use]
    pub fn slot(mut self, name: &'static str, source: ArgSource, required: bool) -> Self {
        self.slots.push(ArgSlot {
            name,
            source,
            required,
        });
        self
    }

    #[must_use]
    pub fn needs_key(&self) -> bool {
        self.needs_key
    }

    #[must_use]
    pub fn slots(&self) -> &[ArgSlot] {
        &self.slots
    }
}

// ---------------------------------------------------------------------------
// InvocationContext
// ---------------------------------------------------------------------------

/// Ephemeral per-call bundle handed to an executor.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    method: Method,
    key: Option<String>,
    codec: Codec,
    timeout_unit: Option<TimeUnit>,
    bindings: HashMap<&'static str, Value>,
}

impl InvocationContext {
    /// Starts building a context for a call of `method` with `args`.
    ///
    /// `method` must be the actual (annotated) method, so that tagged slots
    /// find the same parameters on every call.
    #[must_use]
    pub fn builder<'a>(method: &'a Method, args: &'a [Value]) -> ContextBuilder<'a> {
        ContextBuilder {
            method,
            args,
            key_template: None,
            codec: Codec::default(),
            timeout_unit: None,
        }
    }

    /// The method whose declaration produced the executor's identity.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    #[must_use]
    pub fn timeout_unit(&self) -> Option<TimeUnit> {
        self.timeout_unit
    }

    #[must_use]
    pub fn arg(&self, slot: &str) -> Option<&Value> {
        self.bindings.get(slot)
    }

    /// Like [`arg`](Self::arg) but fails for a missing slot.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::MissingArgument` if `slot` is not bound.
    pub fn require(&self, slot: &'static str) -> Result<&Value, ContextError> {
        self.bindings
            .get(slot)
            .ok_or_else(|| ContextError::MissingArgument {
                method: self.method.to_string(),
                slot,
            })
    }
}

// ---------------------------------------------------------------------------
// ContextBuilder
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ContextBuilder<'a> {
    method: &'a Method,
    args: &'a [Value],
    key_template: Option<&'a str>,
    codec: Codec,
    timeout_unit: Option<TimeUnit>,
}

impl<'a> ContextBuilder<'a> {
    #[must_use]
    pub fn key_template(mut self, template: Option<&'a str>) -> Self {
        self.key_template = template;
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub fn timeout_unit(mut self, unit: Option<TimeUnit>) -> Self {
        self.timeout_unit = unit;
        self
    }

    /// Resolves the key and binds the slots `shape` asks for.
    ///
    /// # Errors
    ///
    /// - `ContextError::ArityMismatch` if the argument count differs from the declaration
    /// - `ContextError::MissingKeyTemplate` if `shape` needs a key and no template is set
    /// - `ContextError::KeyResolution` if `resolver` fails
    /// - `ContextError::MissingArgument` for an unbindable required slot
    pub fn build(
        self,
        shape: &ContextShape,
        resolver: &dyn KeyResolver,
    ) -> Result<InvocationContext, ContextError> {
        let expected = self.method.params().len();
        if self.args.len() != expected {
            return Err(ContextError::ArityMismatch {
                method: self.method.to_string(),
                expected,
                actual: self.args.len(),
            });
        }

        let key = match self.key_template {
            Some(template) => Some(resolver.resolve(template, self.method, self.args).map_err(
                |source| ContextError::KeyResolution {
                    method: self.method.to_string(),
                    source,
                },
            )?),
            None if shape.needs_key() => {
                return Err(ContextError::MissingKeyTemplate {
                    method: self.method.to_string(),
                    owner: self.method.owner().to_string(),
                });
            }
            None => None,
        };

        let mut bindings = HashMap::with_capacity(shape.slots().len());
        for slot in shape.slots() {
            let position = match slot.source {
                ArgSource::Tagged(tag) => self.method.position_of(&tag),
                ArgSource::Position(i) => (i < self.args.len()).then_some(i),
            };
            match position {
                Some(i) => {
                    bindings.insert(slot.name, self.args[i].clone());
                }
                None if slot.required => {
                    return Err(ContextError::MissingArgument {
                        method: self.method.to_string(),
                        slot: slot.name,
                    });
                }
                None => {}
            }
        }

        Ok(InvocationContext {
            method: self.method.clone(),
            key,
            codec: self.codec,
            timeout_unit: self.timeout_unit,
            bindings,
        })
    }
}
