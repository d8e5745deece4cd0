//! Operation declarations.
//!
//! A declared operation is a [`Method`] on a [`TypeDecl`]: a name, typed
//! parameters, and the capability tags attached to the method and to its
//! parameters. Types reference each other by name through a [`TypeCatalog`],
//! which is what resolution walks when a method carries no tags of its own
//! (inherited interface methods and bridge variants of generic overrides).

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::capability::shared::KeyVar;
use crate::capability::{Capability, Tag};
use crate::context::Codec;

// ---------------------------------------------------------------------------
// TypeRef
// ---------------------------------------------------------------------------

/// A named parameter type and the supertypes it can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: &'static str,
    supertypes: &'static [&'static str],
}

impl TypeRef {
    /// The root type every other type is assignable to.
    pub const OBJECT: TypeRef = TypeRef::named("Object");
    pub const STRING: TypeRef = TypeRef::with_supertypes("String", &["CharSequence"]);
    pub const LONG: TypeRef = TypeRef::with_supertypes("Long", &["Number"]);
    pub const DOUBLE: TypeRef = TypeRef::with_supertypes("Double", &["Number"]);
    pub const BYTES: TypeRef = TypeRef::named("Bytes");

    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            supertypes: &[],
        }
    }

    #[must_use]
    pub const fn with_supertypes(name: &'static str, supertypes: &'static [&'static str]) -> Self {
        Self { name, supertypes }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if a value of type `other` can be passed where `self`
    /// is expected.
    #[must_use]
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        self.name == Self::OBJECT.name
            || self.name == other.name
            || other.supertypes.contains(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// Param
// ---------------------------------------------------------------------------

/// One declared parameter with its attached tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    ty: TypeRef,
    tags: Vec<Tag>,
    key_var: Option<&'static str>,
}

impl Param {
    #[must_use]
    pub fn of(ty: TypeRef) -> Self {
        Self {
            ty,
            tags: Vec::new(),
            key_var: None,
        }
    }

    /// A parameter that supplies the key-template variable `name`.
    #[must_use]
    pub fn key(name: &'static str, ty: TypeRef) -> Self {
        Self {
            ty,
            tags: vec![Tag::of::<KeyVar>()],
            key_var: Some(name),
        }
    }

    #[must_use]
    pub fn tag<C: Capability>(self) -> Self {
        self.with_tag(Tag::of::<C>())
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    #[must_use]
    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Name of the key-template variable this parameter supplies, if any.
    #[must_use]
    pub fn key_var(&self) -> Option<&'static str> {
        self.key_var
    }
}

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

static NEXT_METHOD_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_CATALOG_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct MethodDecl {
    id: u64,
    owner: &'static str,
    name: &'static str,
    params: Vec<Param>,
    tags: Vec<Tag>,
    bridge: bool,
    key_template: Option<&'static str>,
    codec: Option<Codec>,
}

/// Cheap-to-clone handle for a declared method.
///
/// Every [`MethodBuilder::build`] yields a distinct declaration. Equality
/// and hashing follow the declaration, not the signature: two methods with
/// the same owner, name and parameter types but different tags are
/// different methods. Use [`Method::same_signature`] to compare signatures.
#[derive(Clone)]
pub struct Method(Arc<MethodDecl>);

impl Method {
    #[must_use]
    pub fn builder(owner: &'static str, name: &'static str) -> MethodBuilder {
        MethodBuilder {
            decl: MethodDecl {
                id: 0,
                owner,
                name,
                params: Vec::new(),
                tags: Vec::new(),
                bridge: false,
                key_template: None,
                codec: None,
            },
        }
    }

    /// Process-unique id of this declaration.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Name of the declaring type.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.0.owner
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.0.params
    }

    /// Method-level tags.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.0.tags
    }

    /// `true` for compiler-style bridge variants of a generic override.
    #[must_use]
    pub fn is_bridge(&self) -> bool {
        self.0.bridge
    }

    #[must_use]
    pub fn key_template(&self) -> Option<&'static str> {
        self.0.key_template
    }

    #[must_use]
    pub fn codec(&self) -> Option<Codec> {
        self.0.codec
    }

    pub fn param_types(&self) -> impl Iterator<Item = &TypeRef> {
        self.0.params.iter().map(Param::ty)
    }

    /// Returns `true` if this method has exactly the given name and parameter types.
    #[must_use]
    pub fn has_signature(&self, name: &str, param_types: &[TypeRef]) -> bool {
        self.name() == name
            && self.0.params.len() == param_types.len()
            && self
                .param_types()
                .zip(param_types)
                .all(|(a, b)| a.name() == b.name())
    }

    /// Same owner, name, bridge flag and parameter type names.
    #[must_use]
    pub fn same_signature(&self, other: &Method) -> bool {
        self.owner() == other.owner()
            && self.name() == other.name()
            && self.is_bridge() == other.is_bridge()
            && self.0.params.len() == other.0.params.len()
            && self
                .param_types()
                .zip(other.param_types())
                .all(|(a, b)| a.name() == b.name())
    }

    /// Index of the first parameter carrying `tag`.
    #[must_use]
    pub fn position_of(&self, tag: &Tag) -> Option<usize> {
        self.0.params.iter().position(|p| p.has_tag(tag))
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.owner(), self.name())?;
        for (i, ty) in self.param_types().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str(")")?;
        if self.is_bridge() {
            f.write_str(" [bridge]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method({self})")
    }
}

// ---------------------------------------------------------------------------
// MethodBuilder
// ---------------------------------------------------------------------------

/// Builder for [`Method`]. Obtained from [`Method::builder`] or
/// [`TypeDecl::method`].
#[derive(Debug)]
pub struct MethodBuilder {
    decl: MethodDecl,
}

impl MethodBuilder {
    /// Attaches a method-level capability.
    #[must_use]
    pub fn tag<C: Capability>(self) -> Self {
        self.with_tag(Tag::of::<C>())
    }

    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.decl.tags.push(tag);
        self
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.decl.params.push(param);
        self
    }

    /// Shorthand for `param(Param::key(name, ty))`.
    #[must_use]
    pub fn key_param(self, name: &'static str, ty: TypeRef) -> Self {
        self.param(Param::key(name, ty))
    }

    #[must_use]
    pub fn bridge(mut self) -> Self {
        self.decl.bridge = true;
        self
    }

    /// Key template for this method, overriding the declaring type's.
    #[must_use]
    pub fn key_template(mut self, template: &'static str) -> Self {
        self.decl.key_template = Some(template);
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: Codec) -> Self {
        self.decl.codec = Some(codec);
        self
    }

    #[must_use]
    pub fn build(mut self) -> Method {
        self.decl.id = NEXT_METHOD_ID.fetch_add(1, Ordering::Relaxed);
        Method(Arc::new(self.decl))
    }
}

// ---------------------------------------------------------------------------
// TypeDecl
// ---------------------------------------------------------------------------

/// A declaring type: an interface or a concrete client type.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    name: &'static str,
    interfaces: Vec<&'static str>,
    methods: Vec<Method>,
    key_template: Option<&'static str>,
}

impl TypeDecl {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            interfaces: Vec::new(),
            methods: Vec::new(),
            key_template: None,
        }
    }

    /// Adds a directly implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: &'static str) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Default key template for every method of this type.
    #[must_use]
    pub fn key_template(mut self, template: &'static str) -> Self {
        self.key_template = Some(template);
        self
    }

    /// Declares a method owned by this type.
    #[must_use]
    pub fn method(mut self, name: &'static str, f: impl FnOnce(MethodBuilder) -> MethodBuilder) -> Self {
        let method = f(Method::builder(self.name, name)).build();
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn interfaces(&self) -> &[&'static str] {
        &self.interfaces
    }

    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    #[must_use]
    pub fn default_key_template(&self) -> Option<&'static str> {
        self.key_template
    }

    /// Method with exactly this name and these parameter types.
    #[must_use]
    pub fn find_method(&self, name: &str, param_types: &[TypeRef]) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.has_signature(name, param_types))
    }

    /// First method with this name, regardless of parameters.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }
}

// ---------------------------------------------------------------------------
// TypeCatalog
// ---------------------------------------------------------------------------

/// Immutable set of declared types, looked up by name.
///
/// Each distinct catalog content carries its own id. Resolution results that
/// depend on the catalog (interface and bridge fallbacks) are cached under it.
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    id: u64,
    types: HashMap<&'static str, TypeDecl>,
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed),
            types: HashMap::new(),
        }
    }

    /// Adds `decl`, replacing any earlier type with the same name.
    ///
    /// The returned catalog gets a fresh id.
    #[must_use]
    pub fn with(mut self, decl: TypeDecl) -> Self {
        self.types.insert(decl.name, decl);
        self.id = NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed);
        self
    }

    /// Process-unique id of this catalog's content. Clones share it.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.types.get(name)
    }

    /// Convenience lookup of `owner.name(param_types)`.
    #[must_use]
    pub fn method(&self, owner: &str, name: &str, param_types: &[TypeRef]) -> Option<Method> {
        self.get(owner)?.find_method(name, param_types).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
