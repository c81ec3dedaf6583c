//! Resource descriptors and the dynamic record capability
//!
//! A [`ResourceDescriptor`] is the static, per-resource-type declaration of
//! its serializable shape: wire type name, ordered attributes, relationship
//! declarations, and optional per-resource meta/links providers. Descriptors
//! are created at process configuration time, never mutated afterwards, and
//! shared by reference across concurrent calls.
//!
//! Polymorphism is structural: there is no base type, and the assembler only
//! requires the named operations, so any record-describing type satisfying
//! the trait participates.

use crate::links::RequestContext;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Static declaration of a resource type's serializable shape
///
/// # Examples
///
/// ```
/// use jsonapi_serde::ResourceDescriptor;
///
/// struct UserResource;
///
/// impl ResourceDescriptor for UserResource {
/// 	fn type_name(&self) -> &str {
/// 		"user"
/// 	}
///
/// 	fn attributes(&self) -> Vec<&str> {
/// 		vec!["username", "first_name", "last_name"]
/// 	}
/// }
/// ```
pub trait ResourceDescriptor: Send + Sync {
	/// Wire-format type name, unique per descriptor
	fn type_name(&self) -> &str;

	/// Ordered sequence of attribute names to emit
	fn attributes(&self) -> Vec<&str>;

	/// Declared relationships, in emission order
	fn relationships(&self) -> Vec<Relationship> {
		Vec::new()
	}

	/// Per-resource meta mapping, emitted when `Some`
	fn meta(
		&self,
		_record: &dyn Record,
		_context: Option<&RequestContext>,
	) -> Option<Map<String, Value>> {
		None
	}

	/// Custom per-resource links, merged over the default `self` link
	///
	/// On key collision the provided link takes precedence.
	fn links(
		&self,
		_record: &dyn Record,
		_context: Option<&RequestContext>,
	) -> Option<Map<String, Value>> {
		None
	}
}

/// A declared relationship from one resource type to another
///
/// The target descriptor is referenced by `Arc`, and descriptors usually
/// construct it inside `relationships()`, so mutually referencing types
/// (author → posts → author) need no special wiring.
#[derive(Clone)]
pub struct Relationship {
	/// Relation name as declared (transformed for output at emission time)
	pub name: String,
	/// Descriptor of the related resource type
	pub target: Arc<dyn ResourceDescriptor>,
	/// Whether the related resource is recursed into without being requested
	pub policy: InclusionPolicy,
	/// Declared cardinality, decides the empty-linkage shape
	pub cardinality: Cardinality,
}

impl Relationship {
	/// Declare a single-valued relationship with the default policy
	pub fn one(name: impl Into<String>, target: Arc<dyn ResourceDescriptor>) -> Self {
		Self {
			name: name.into(),
			target,
			policy: InclusionPolicy::Default,
			cardinality: Cardinality::One,
		}
	}

	/// Declare a collection relationship with the default policy
	pub fn many(name: impl Into<String>, target: Arc<dyn ResourceDescriptor>) -> Self {
		Self {
			name: name.into(),
			target,
			policy: InclusionPolicy::Default,
			cardinality: Cardinality::Many,
		}
	}

	/// Mark this relationship as always included
	pub fn always_included(mut self) -> Self {
		self.policy = InclusionPolicy::AlwaysInclude;
		self
	}
}

/// Inclusion policy for a declared relationship
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InclusionPolicy {
	/// Linkage only, unless the relation's dotted path is requested
	#[default]
	Default,
	/// Recurse into the related resource unless the client explicitly
	/// narrows inclusion with a non-empty include set
	AlwaysInclude,
}

/// Declared cardinality of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
	One,
	Many,
}

/// Loaded value of a relation on a record
pub enum RelationValue<'a> {
	/// A single nested record
	One(&'a dyn Record),
	/// An ordered sequence of nested records
	Many(Vec<&'a dyn Record>),
	/// Loaded and explicitly empty (`null` or an empty sequence)
	///
	/// Distinct from an absent relation: an absent relation is omitted
	/// from the output entirely, an empty one emits `data: null` or
	/// `data: []` per declared cardinality.
	Empty,
}

/// Dynamic attribute-bag capability over heterogeneous backing records
///
/// The engine never assumes a concrete container type: any value exposing
/// an id, attribute lookup, and relation lookup serializes. Relationship
/// data is never fetched — `relation` only reports what is already loaded
/// on the record.
pub trait Record {
	/// Identifier of this record, stringified regardless of source type
	///
	/// `None` means the record has no usable id: fatal for a primary
	/// record, silently degrading for a relationship target.
	fn id(&self) -> Option<String>;

	/// Value of a named attribute, `None` when absent
	fn attribute(&self, name: &str) -> Option<Value>;

	/// Loaded value of a named relation, `None` when not loaded
	fn relation(&self, name: &str) -> Option<RelationValue<'_>>;
}

/// Plain JSON objects act as records directly
///
/// Nested objects are single related records, arrays are collections, and
/// an explicit `null` or empty array is a loaded-but-empty relation.
/// Scalar relation values are not nested records and read as not loaded.
///
/// # Examples
///
/// ```
/// use jsonapi_serde::Record;
/// use serde_json::json;
///
/// let record = json!({ "id": 123, "username": "j.smith" });
/// assert_eq!(record.id(), Some("123".to_string()));
/// assert_eq!(record.attribute("username"), Some(json!("j.smith")));
/// assert!(record.relation("company").is_none());
/// ```
impl Record for Value {
	fn id(&self) -> Option<String> {
		stringify_id(self.as_object()?.get("id")?)
	}

	fn attribute(&self, name: &str) -> Option<Value> {
		self.as_object()?.get(name).cloned()
	}

	fn relation(&self, name: &str) -> Option<RelationValue<'_>> {
		match self.as_object()?.get(name)? {
			Value::Null => Some(RelationValue::Empty),
			value @ Value::Object(_) => Some(RelationValue::One(value)),
			Value::Array(items) if items.is_empty() => Some(RelationValue::Empty),
			Value::Array(items) => Some(RelationValue::Many(
				items.iter().map(|item| item as &dyn Record).collect(),
			)),
			_ => None,
		}
	}
}

/// Stringify an id value, accepting strings and numbers
pub fn stringify_id(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}
