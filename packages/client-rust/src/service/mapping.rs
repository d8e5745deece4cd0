//! Executors mapping: the per-domain executor table and method resolver.
//!
//! A mapping owns one identity generator and an Identity -> Executor table
//! that is frozen at construction. Callers resolve declared methods against
//! it; every resolved method is cached together with its *actual* method,
//! the declaration whose tags produced the identity.
//!
//! Resolution of a method with no tags of its own falls back to:
//! 1. the method with the same signature on an implemented interface, nearest
//!    first (direct interfaces, then their super-interfaces);
//! 2. failing that, a bridge sibling on the same type whose parameter types
//!    are each assignable from the method's.
//!
//! Both caches are keyed by catalog id and method declaration, so clients
//! declaring types in different catalogs share the executor table but never
//! each other's resolutions.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use redop_core::capability::shared::KeyVar;
use redop_core::identity::has_duplicates;
use redop_core::{
    CapabilityIndex, ConfigError, Executor, Identity, IdentityGenerator, Method, Tag, TypeCatalog,
    TypeRef,
};

use super::operation::DispatchError;
use crate::domain::Domain;

// ---------------------------------------------------------------------------
// MappingBuilder
// ---------------------------------------------------------------------------

/// Collects executors in registration order. Identity collisions resolve to
/// the executor registered last.
pub struct MappingBuilder {
    domain: Domain,
    generator: IdentityGenerator,
    executors: HashMap<Identity, Arc<dyn Executor>>,
}

impl MappingBuilder {
    /// The generator executors use to compute the identity they satisfy.
    #[must_use]
    pub fn generator(&self) -> &IdentityGenerator {
        &self.generator
    }

    /// Shorthand for `generator().identity_of(tags)`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCapability` for a tag outside this domain.
    pub fn identity_of(&self, tags: &[Tag]) -> Result<Identity, ConfigError> {
        self.generator.identity_of(tags)
    }

    pub fn register(&mut self, executor: Arc<dyn Executor>) -> &mut Self {
        let identity = executor.identity();
        if let Some(previous) = self.executors.insert(identity, executor) {
            debug!(
                domain = %self.domain,
                identity = %identity,
                replaced = previous.name(),
                "executor identity registered twice, keeping the later one"
            );
        }
        self
    }

    pub fn register_all<I>(&mut self, executors: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Executor>>,
    {
        for executor in executors {
            self.register(executor);
        }
        self
    }

    /// Freezes the executor table.
    #[must_use]
    pub fn build(self) -> ExecutorsMapping {
        debug!(
            domain = %self.domain,
            executors = self.executors.len(),
            capabilities = self.generator.index().len(),
            "executors mapping built"
        );
        ExecutorsMapping {
            domain: self.domain,
            generator: self.generator,
            executors: self.executors,
            resolved: DashMap::new(),
            actual: DashMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExecutorsMapping
// ---------------------------------------------------------------------------

/// Per-domain registry, resolver and resolution caches.
///
/// The executor table is read-only after [`MappingBuilder::build`]. The two
/// caches fill lazily from any thread; resolution is a pure function of the
/// catalog, the method and the table, so racing first resolutions write the
/// same value.
pub struct ExecutorsMapping {
    domain: Domain,
    generator: IdentityGenerator,
    executors: HashMap<Identity, Arc<dyn Executor>>,
    /// (catalog, method) -> executor.
    resolved: DashMap<CacheKey, Arc<dyn Executor>>,
    /// (catalog, method) -> method whose tags produced the identity.
    actual: DashMap<CacheKey, Method>,
}

type CacheKey = (u64, Method);

impl ExecutorsMapping {
    /// Starts a mapping over the domain's standard capability index.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the domain's tag registration list is defective.
    pub fn builder(domain: Domain) -> Result<MappingBuilder, ConfigError> {
        Ok(Self::builder_with_index(domain, domain.capability_index()?))
    }

    /// Starts a mapping over an explicit capability index.
    #[must_use]
    pub fn builder_with_index(domain: Domain, index: CapabilityIndex) -> MappingBuilder {
        MappingBuilder {
            domain,
            generator: IdentityGenerator::new(index),
            executors: HashMap::new(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn generator(&self) -> &IdentityGenerator {
        &self.generator
    }

    #[must_use]
    pub fn executor_count(&self) -> usize {
        self.executors.len()
    }

    /// Number of (catalog, method) pairs resolved so far.
    #[must_use]
    pub fn cached_methods(&self) -> usize {
        self.resolved.len()
    }

    #[must_use]
    pub fn executor_for(&self, identity: Identity) -> Option<Arc<dyn Executor>> {
        self.executors.get(&identity).cloned()
    }

    /// Bit-presence check of `tag` in `identity`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCapability` for a tag outside this domain.
    pub fn supports(&self, identity: Identity, tag: &Tag) -> Result<bool, ConfigError> {
        self.generator.supports(identity, tag)
    }

    /// Identity of the tags declared directly on `method`, or `None` when it
    /// declares none.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnsupportedOperation` if a tag is not part of this domain.
    pub fn identity_of_method(&self, method: &Method) -> Result<Option<Identity>, DispatchError> {
        let tags = collect_tags(method);
        if tags.is_empty() {
            return Ok(None);
        }
        self.identity_of_tags(method, &tags).map(Some)
    }

    /// Resolves `method` to the executor that must run it.
    ///
    /// `catalog` supplies the declaring types used by the interface and bridge
    /// fallbacks; methods that carry their own tags never consult it.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnsupportedOperation` if neither the method nor
    /// its interface/bridge chain matches a registered executor.
    pub fn resolve(
        &self,
        catalog: &TypeCatalog,
        method: &Method,
    ) -> Result<Arc<dyn Executor>, DispatchError> {
        let mut visiting = Vec::new();
        self.resolve_inner(catalog, method, &mut visiting)
    }

    /// The method whose own tags produced the cached resolution of `method`
    /// against `catalog`, following the actual-method cache transitively.
    /// `None` until `method` has been resolved against `catalog`.
    #[must_use]
    pub fn actual_method(&self, catalog: &TypeCatalog, method: &Method) -> Option<Method> {
        let id = catalog.id();
        let mut current = self
            .actual
            .get(&(id, method.clone()))
            .map(|e| e.value().clone())?;
        loop {
            let next = match self.actual.get(&(id, current.clone())) {
                Some(entry) => entry.value().clone(),
                None => return Some(current),
            };
            if next == current {
                return Some(current);
            }
            current = next;
        }
    }

    fn resolve_inner(
        &self,
        catalog: &TypeCatalog,
        method: &Method,
        visiting: &mut Vec<Method>,
    ) -> Result<Arc<dyn Executor>, DispatchError> {
        if let Some(executor) = self
            .resolved
            .get(&(catalog.id(), method.clone()))
            .map(|e| Arc::clone(e.value()))
        {
            return Ok(executor);
        }
        if visiting.contains(method) {
            return Err(self.unsupported(method, "declaration chain revisits this method"));
        }

        visiting.push(method.clone());
        let tags = collect_tags(method);
        let result = if tags.is_empty() {
            self.resolve_inherited(catalog, method, visiting)
        } else {
            self.resolve_tagged(catalog, method, &tags)
        };
        visiting.pop();
        result
    }

    fn resolve_tagged(
        &self,
        catalog: &TypeCatalog,
        method: &Method,
        tags: &[Tag],
    ) -> Result<Arc<dyn Executor>, DispatchError> {
        let identity = self.identity_of_tags(method, tags)?;
        let Some(executor) = self.executors.get(&identity).cloned() else {
            return Err(self.unsupported(method, format!("no executor for identity {identity}")));
        };
        self.cache(catalog, method, &executor, method.clone());
        Ok(executor)
    }

    /// Interface fallback, then bridge fallback, for a method without tags.
    ///
    /// Interfaces are searched breadth-first over `implements` edges, so a
    /// method inherited from a super-interface is found and the nearest
    /// declaration wins.
    fn resolve_inherited(
        &self,
        catalog: &TypeCatalog,
        method: &Method,
        visiting: &mut Vec<Method>,
    ) -> Result<Arc<dyn Executor>, DispatchError> {
        let Some(decl) = catalog.get(method.owner()) else {
            return Err(self.unsupported(
                method,
                "no capability tags and the declaring type is not in the catalog",
            ));
        };

        let param_types: Vec<TypeRef> = method.param_types().copied().collect();
        let mut pending: VecDeque<&'static str> = decl.interfaces().iter().copied().collect();
        let mut seen = HashSet::new();
        while let Some(name) = pending.pop_front() {
            if !seen.insert(name) {
                continue;
            }
            let Some(interface) = catalog.get(name) else {
                continue;
            };
            if let Some(candidate) = interface.find_method(method.name(), &param_types) {
                let executor = self.resolve_inner(catalog, candidate, visiting)?;
                self.cache(catalog, method, &executor, candidate.clone());
                return Ok(executor);
            }
            pending.extend(interface.interfaces().iter().copied());
        }

        for candidate in decl.methods().iter().filter(|m| is_bridge_for(m, method)) {
            if let Ok(executor) = self.resolve_inner(catalog, candidate, visiting) {
                self.cache(catalog, method, &executor, candidate.clone());
                return Ok(executor);
            }
        }

        Err(self.unsupported(
            method,
            "no capability tags and no annotated interface or bridge method",
        ))
    }

    fn identity_of_tags(&self, method: &Method, tags: &[Tag]) -> Result<Identity, DispatchError> {
        if has_duplicates(tags) {
            warn!(
                domain = %self.domain,
                method = %method,
                "method carries a repeated capability tag; repeated tags cancel out of its identity"
            );
        }
        self.generator.identity_of(tags).map_err(|err| match err {
            ConfigError::UnknownCapability { tag, .. } => self.unsupported(
                method,
                format!("capability `{tag}` does not belong to this domain"),
            ),
            other => DispatchError::Config(other),
        })
    }

    fn cache(
        &self,
        catalog: &TypeCatalog,
        method: &Method,
        executor: &Arc<dyn Executor>,
        actual: Method,
    ) {
        debug!(
            domain = %self.domain,
            method = %method,
            actual = %actual,
            executor = executor.name(),
            "resolved operation"
        );
        self.actual.insert((catalog.id(), method.clone()), actual);
        self.resolved
            .insert((catalog.id(), method.clone()), Arc::clone(executor));
    }

    fn unsupported(&self, method: &Method, reason: impl Into<String>) -> DispatchError {
        DispatchError::UnsupportedOperation {
            method: method.to_string(),
            domain: self.domain.name(),
            reference: self.domain.reference_type(),
            reason: reason.into(),
        }
    }
}

/// Method-level tags plus parameter tags, minus the reserved key-variable tag.
#[must_use]
pub fn collect_tags(method: &Method) -> Vec<Tag> {
    let key_var = Tag::of::<KeyVar>();
    method
        .tags()
        .iter()
        .chain(method.params().iter().flat_map(|p| p.tags()))
        .filter(|tag| **tag != key_var)
        .copied()
        .collect()
}

/// `candidate` is a bridge variant of `method`: a different bridge method with
/// the same name and arity whose parameter types each accept `method`'s.
fn is_bridge_for(candidate: &Method, method: &Method) -> bool {
    candidate.is_bridge()
        && candidate != method
        && candidate.name() == method.name()
        && candidate.params().len() == method.params().len()
        && candidate
            .param_types()
            .zip(method.param_types())
            .all(|(bridge, original)| bridge.is_assignable_from(original))
}

#[cfg(test)]
mod tests {
    use redop_core::{tags, ContextShape, InvocationContext, Param, TypeDecl, Value};

    use super::*;
    use crate::domain::tags::sorted_set;

    redop_core::capabilities! {
        A = "a",
        B = "b",
    }

    const FOO: TypeRef = TypeRef::with_supertypes("Foo", &["Entity"]);

    struct Stub {
        name: &'static str,
        identity: Identity,
        shape: ContextShape,
    }

    impl Stub {
        fn new(name: &'static str, identity: Identity) -> Arc<dyn Executor> {
            Arc::new(Self {
                name,
                identity,
                shape: ContextShape::new(),
            })
        }
    }

    impl Executor for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn identity(&self) -> Identity {
            self.identity
        }

        fn context_shape(&self) -> &ContextShape {
            &self.shape
        }

        fn execute(&self, _ctx: &InvocationContext) -> anyhow::Result<Value> {
            Ok(Value::String(self.name.to_string()))
        }
    }

    /// Tags `[A:0, B:1]`, `E1 = 1<<0`, `E2 = (1<<0) ^ (1<<1)`.
    fn scenario() -> ExecutorsMapping {
        let index = CapabilityIndex::builder("scenario")
            .register(Tag::of::<A>())
            .register(Tag::of::<B>())
            .build()
            .unwrap();
        let mut builder = ExecutorsMapping::builder_with_index(Domain::Value, index);
        let e1 = builder.identity_of(&tags![A]).unwrap();
        let e2 = builder.identity_of(&tags![A, B]).unwrap();
        assert_eq!(e1.bits(), 1 << 0);
        assert_eq!(e2.bits(), (1 << 0) ^ (1 << 1));
        builder.register(Stub::new("E1", e1));
        builder.register(Stub::new("E2", e2));
        builder.build()
    }

    fn method_with(tags: &[Tag]) -> Method {
        tags.iter()
            .fold(Method::builder("Ops", "op"), |m, t| m.with_tag(*t))
            .build()
    }

    #[test]
    fn end_to_end_scenario() {
        let mapping = scenario();
        let catalog = TypeCatalog::new();

        let e1 = mapping.resolve(&catalog, &method_with(&tags![A])).unwrap();
        assert_eq!(e1.name(), "E1");

        let e2 = mapping.resolve(&catalog, &method_with(&tags![A, B])).unwrap();
        assert_eq!(e2.name(), "E2");

        let err = mapping.resolve(&catalog, &method_with(&tags![B])).err().unwrap();
        assert!(matches!(
            err,
            DispatchError::UnsupportedOperation { reference: "ValueTemplate", .. }
        ));
    }

    #[test]
    fn unsupported_error_names_method_and_reference() {
        let mapping = scenario();
        let method = method_with(&tags![B]);
        let err = mapping.resolve(&TypeCatalog::new(), &method).err().unwrap();
        let message = err.to_string();
        assert!(message.contains("Ops.op()"), "{message}");
        assert!(message.contains("ValueTemplate"), "{message}");
        assert_eq!(mapping.cached_methods(), 0);
    }

    #[test]
    fn parameter_tags_count_but_key_var_does_not() {
        let mapping = scenario();
        let method = Method::builder("Ops", "op")
            .with_tag(Tag::of::<A>())
            .key_param("id", TypeRef::STRING)
            .param(Param::of(TypeRef::OBJECT).tag::<B>())
            .build();

        assert_eq!(collect_tags(&method), tags![A, B].to_vec());
        let executor = mapping.resolve(&TypeCatalog::new(), &method).unwrap();
        assert_eq!(executor.name(), "E2");
    }

    #[test]
    fn repeated_tag_cancels_out_of_identity() {
        let mapping = scenario();
        let method = Method::builder("Ops", "op")
            .with_tag(Tag::of::<A>())
            .with_tag(Tag::of::<B>())
            .param(Param::of(TypeRef::OBJECT).tag::<B>())
            .build();

        let executor = mapping.resolve(&TypeCatalog::new(), &method).unwrap();
        assert_eq!(executor.name(), "E1");
    }

    #[test]
    fn tag_from_another_domain_is_unsupported() {
        let mapping = scenario();
        let method = Method::builder("Ops", "op")
            .tag::<sorted_set::WithScores>()
            .build();
        let err = mapping.resolve(&TypeCatalog::new(), &method).err().unwrap();
        assert!(err.to_string().contains("with-scores"));
    }

    #[test]
    fn last_registered_executor_wins() {
        let index = CapabilityIndex::builder("scenario")
            .register(Tag::of::<A>())
            .build()
            .unwrap();
        let mut builder = ExecutorsMapping::builder_with_index(Domain::Value, index);
        let id = builder.identity_of(&tags![A]).unwrap();
        builder.register_all([Stub::new("first", id), Stub::new("second", id)]);
        let mapping = builder.build();

        assert_eq!(mapping.executor_count(), 1);
        assert_eq!(mapping.executor_for(id).unwrap().name(), "second");
    }

    #[test]
    fn cache_returns_same_executor() {
        let mapping = scenario();
        let catalog = TypeCatalog::new();
        let method = method_with(&tags![A]);

        let first = mapping.resolve(&catalog, &method).unwrap();
        let second = mapping.resolve(&catalog, &method).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mapping.cached_methods(), 1);
        assert_eq!(mapping.actual_method(&catalog, &method), Some(method));
    }

    #[test]
    fn concurrent_resolution_is_deterministic() {
        let mapping = scenario();
        let catalog = TypeCatalog::new();
        let method = method_with(&tags![A, B]);

        let names: Vec<&'static str> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| mapping.resolve(&catalog, &method).unwrap().name()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(names.iter().all(|n| *n == "E2"));
        assert_eq!(mapping.cached_methods(), 1);
    }

    #[test]
    fn same_signature_declarations_resolve_independently() {
        let mapping = scenario();
        let catalog = TypeCatalog::new();

        let only_a = method_with(&tags![A]);
        let both = method_with(&tags![A, B]);
        let only_b = method_with(&tags![B]);
        assert!(only_a.same_signature(&both) && only_a.same_signature(&only_b));

        assert_eq!(mapping.resolve(&catalog, &only_a).unwrap().name(), "E1");
        assert_eq!(mapping.resolve(&catalog, &both).unwrap().name(), "E2");
        assert!(matches!(
            mapping.resolve(&catalog, &only_b),
            Err(DispatchError::UnsupportedOperation { .. })
        ));
        assert_eq!(mapping.cached_methods(), 2);
        assert_eq!(mapping.actual_method(&catalog, &both), Some(both));
    }

    #[test]
    fn concurrent_distinct_declarations_keep_their_executors() {
        let mapping = scenario();
        let catalog = TypeCatalog::new();
        let declarations: Vec<(Method, &'static str)> = (0..16)
            .map(|i| {
                if i % 2 == 0 {
                    (method_with(&tags![A]), "E1")
                } else {
                    (method_with(&tags![A, B]), "E2")
                }
            })
            .collect();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for (method, expected) in &declarations {
                        assert_eq!(mapping.resolve(&catalog, method).unwrap().name(), *expected);
                    }
                });
            }
        });

        assert_eq!(mapping.cached_methods(), declarations.len());
    }

    // ---- inherited and bridge resolution ----

    /// `I<T>` declares `op(T)` (erased to `op(Object)`) tagged `{A}`;
    /// `C implements I<Foo>` exposes the override `op(Foo)` and the bridge
    /// `op(Object)`, neither tagged.
    fn generic_catalog() -> TypeCatalog {
        TypeCatalog::new()
            .with(TypeDecl::new("I").method("op", |m| {
                m.tag::<A>().param(Param::of(TypeRef::OBJECT))
            }))
            .with(
                TypeDecl::new("C")
                    .implements("I")
                    .method("op", |m| m.param(Param::of(FOO)))
                    .method("op", |m| m.param(Param::of(TypeRef::OBJECT)).bridge()),
            )
    }

    #[test]
    fn bridge_and_override_resolve_to_same_executor() {
        let mapping = scenario();
        let catalog = generic_catalog();
        let c = catalog.get("C").unwrap();
        let override_method = c.methods()[0].clone();
        let bridge_method = c.methods()[1].clone();

        let via_override = mapping.resolve(&catalog, &override_method).unwrap();
        let via_bridge = mapping.resolve(&catalog, &bridge_method).unwrap();
        assert!(Arc::ptr_eq(&via_override, &via_bridge));
        assert_eq!(via_override.name(), "E1");

        let annotated = catalog.method("I", "op", &[TypeRef::OBJECT]).unwrap();
        assert_eq!(mapping.actual_method(&catalog, &override_method), Some(annotated.clone()));
        assert_eq!(mapping.actual_method(&catalog, &bridge_method), Some(annotated));
    }

    #[test]
    fn bridge_first_then_override_also_agrees() {
        let mapping = scenario();
        let catalog = generic_catalog();
        let c = catalog.get("C").unwrap();

        let via_bridge = mapping.resolve(&catalog, &c.methods()[1]).unwrap();
        let via_override = mapping.resolve(&catalog, &c.methods()[0]).unwrap();
        assert!(Arc::ptr_eq(&via_override, &via_bridge));
    }

    #[test]
    fn inherited_interface_method_resolves() {
        let mapping = scenario();
        let catalog = TypeCatalog::new()
            .with(TypeDecl::new("Base").method("both", |m| m.tag::<A>().tag::<B>()))
            .with(TypeDecl::new("Impl").implements("Base").method("both", |m| m));

        let method = catalog.method("Impl", "both", &[]).unwrap();
        let executor = mapping.resolve(&catalog, &method).unwrap();
        assert_eq!(executor.name(), "E2");
        assert_eq!(
            mapping.actual_method(&catalog, &method).unwrap().owner(),
            "Base"
        );
    }

    #[test]
    fn super_interface_method_resolves() {
        let mapping = scenario();
        let catalog = TypeCatalog::new()
            .with(TypeDecl::new("Root").method("both", |m| m.tag::<A>().tag::<B>()))
            .with(TypeDecl::new("Middle").implements("Root"))
            .with(TypeDecl::new("Impl").implements("Middle").method("both", |m| m));

        let method = catalog.method("Impl", "both", &[]).unwrap();
        assert_eq!(mapping.resolve(&catalog, &method).unwrap().name(), "E2");
        assert_eq!(
            mapping.actual_method(&catalog, &method).unwrap().owner(),
            "Root"
        );
    }

    #[test]
    fn nearest_interface_declaration_wins() {
        let mapping = scenario();
        let catalog = TypeCatalog::new()
            .with(TypeDecl::new("Root").method("op", |m| m.tag::<A>().tag::<B>()))
            .with(TypeDecl::new("Middle").implements("Root").method("op", |m| m.tag::<A>()))
            .with(TypeDecl::new("Impl").implements("Middle").method("op", |m| m));

        let method = catalog.method("Impl", "op", &[]).unwrap();
        assert_eq!(mapping.resolve(&catalog, &method).unwrap().name(), "E1");
    }

    #[test]
    fn catalogs_do_not_share_inherited_resolutions() {
        let mapping = scenario();
        let impl_decl = TypeDecl::new("Impl").implements("Base").method("op", |m| m);
        let first = TypeCatalog::new()
            .with(TypeDecl::new("Base").method("op", |m| m.tag::<A>()))
            .with(impl_decl.clone());
        let second = TypeCatalog::new()
            .with(TypeDecl::new("Base").method("op", |m| m.tag::<A>().tag::<B>()))
            .with(impl_decl);

        // Both catalogs hold the very same `Impl.op` declaration.
        let method = first.method("Impl", "op", &[]).unwrap();
        assert_eq!(second.method("Impl", "op", &[]), Some(method.clone()));

        assert_eq!(mapping.resolve(&first, &method).unwrap().name(), "E1");
        assert_eq!(mapping.resolve(&second, &method).unwrap().name(), "E2");
        assert_eq!(mapping.actual_method(&first, &method).unwrap().tags().len(), 1);
        assert_eq!(mapping.actual_method(&second, &method).unwrap().tags().len(), 2);
    }

    #[test]
    fn untagged_method_without_match_is_unsupported() {
        let mapping = scenario();
        let catalog = TypeCatalog::new()
            .with(TypeDecl::new("Lonely").method("op", |m| m.param(Param::of(FOO))));
        let method = catalog.method("Lonely", "op", &[FOO]).unwrap();
        assert!(matches!(
            mapping.resolve(&catalog, &method),
            Err(DispatchError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn untagged_method_outside_catalog_is_unsupported() {
        let mapping = scenario();
        let method = Method::builder("Nowhere", "op").build();
        assert!(mapping.resolve(&TypeCatalog::new(), &method).is_err());
    }

    #[test]
    fn incompatible_bridge_is_ignored() {
        let mapping = scenario();
        let catalog = TypeCatalog::new()
            .with(TypeDecl::new("I").method("op", |m| {
                m.tag::<A>().param(Param::of(TypeRef::STRING))
            }))
            .with(
                TypeDecl::new("C")
                    .implements("I")
                    .method("op", |m| m.param(Param::of(FOO)))
                    .method("op", |m| m.param(Param::of(TypeRef::STRING)).bridge()),
            );
        let method = catalog.method("C", "op", &[FOO]).unwrap();
        assert!(mapping.resolve(&catalog, &method).is_err());
    }

    #[test]
    fn cyclic_declarations_terminate() {
        let mapping = scenario();
        let catalog = TypeCatalog::new()
            .with(TypeDecl::new("X").implements("Y").method("op", |m| m))
            .with(TypeDecl::new("Y").implements("X").method("op", |m| m));
        let method = catalog.method("X", "op", &[]).unwrap();
        let err = mapping.resolve(&catalog, &method).err().unwrap();
        assert!(err.to_string().contains("revisits"));
    }

    #[test]
    fn identity_of_method_and_supports() {
        let mapping = ExecutorsMapping::builder(Domain::SortedSet).unwrap().build();
        let method = Method::builder("Board", "top")
            .tag::<sorted_set::Range>()
            .tag::<sorted_set::WithScores>()
            .build();
        let identity = mapping.identity_of_method(&method).unwrap().unwrap();
        assert!(mapping
            .supports(identity, &Tag::of::<sorted_set::WithScores>())
            .unwrap());
        assert!(!mapping
            .supports(identity, &Tag::of::<sorted_set::Reverse>())
            .unwrap());
        assert!(mapping
            .identity_of_method(&Method::builder("Board", "none").build())
            .unwrap()
            .is_none());
    }
}
