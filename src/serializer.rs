//! Document assembly
//!
//! [`JsonApiSerializer`] orchestrates the descriptor contract, key
//! transform, link builders, and inclusion resolution to build one resource
//! object or an ordered sequence of them, plus the deduplicated `included`
//! array and top-level `links`/`meta`.
//!
//! Execution is synchronous and purely in-memory. The only mutable state is
//! the call-scoped `included` registry: a seen-set of `(type, id)` keys, a
//! first-seen order list, and an object store, all created and destroyed
//! with one top-level call. Marking a key *before* recursing into its
//! relationships is what bounds traversal on cyclic graphs — once every
//! reachable `(type, id)` has been visited once, recursion stops.

use crate::document::{
	Document, Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject,
};
use crate::error::{SerializeError, SerializeResult};
use crate::links::{self, RequestContext};
use crate::query::QueryConfig;
use crate::resource::{
	Cardinality, InclusionPolicy, Record, RelationValue, Relationship, ResourceDescriptor,
};
use crate::transform::{key_transform, KeyTransform};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Builder-style document assembler
///
/// # Examples
///
/// ```
/// use jsonapi_serde::JsonApiSerializer;
/// use jsonapi_serde::ResourceDescriptor;
/// use serde_json::json;
///
/// struct UserResource;
///
/// impl ResourceDescriptor for UserResource {
/// 	fn type_name(&self) -> &str {
/// 		"user"
/// 	}
///
/// 	fn attributes(&self) -> Vec<&str> {
/// 		vec!["username"]
/// 	}
/// }
///
/// let record = json!({ "id": 123, "username": "j.smith" });
/// let document = JsonApiSerializer::new(&UserResource)
/// 	.serialize(&record)
/// 	.unwrap();
///
/// let rendered = serde_json::to_value(&document).unwrap();
/// assert_eq!(rendered["data"]["id"], json!("123"));
/// assert_eq!(rendered["links"]["self"], json!("/user/123"));
/// assert_eq!(rendered["included"], json!([]));
/// ```
pub struct JsonApiSerializer<'a> {
	descriptor: &'a dyn ResourceDescriptor,
	context: Option<&'a RequestContext>,
	meta: Option<Map<String, Value>>,
	query: QueryConfig,
	transform: Option<KeyTransform>,
}

impl<'a> JsonApiSerializer<'a> {
	/// Create an assembler for the given primary descriptor
	pub fn new(descriptor: &'a dyn ResourceDescriptor) -> Self {
		Self {
			descriptor,
			context: None,
			meta: None,
			query: QueryConfig::default(),
			transform: None,
		}
	}

	/// Attach a request context; links become absolute URLs
	pub fn context(mut self, context: &'a RequestContext) -> Self {
		self.context = Some(context);
		self
	}

	/// Attach a top-level `meta` mapping
	pub fn meta(mut self, meta: Map<String, Value>) -> Self {
		self.meta = Some(meta);
		self
	}

	/// Attach the client's query configuration
	pub fn query(mut self, query: QueryConfig) -> Self {
		self.query = query;
		self
	}

	/// Override the key transform for this call only
	///
	/// Defaults to the process-wide setting read at call time
	/// ([`crate::transform::key_transform`]).
	pub fn key_transform(mut self, transform: KeyTransform) -> Self {
		self.transform = Some(transform);
		self
	}

	/// Serialize a single record into a document
	///
	/// Fails with [`SerializeError::MissingIdentifier`] when the record has
	/// no usable id.
	pub fn serialize(&self, record: &dyn Record) -> SerializeResult<Document> {
		let type_name = self.descriptor.type_name();
		let id = record
			.id()
			.ok_or_else(|| SerializeError::missing_identifier(type_name))?;
		debug!(type_name, id = %id, "assembling single-resource document");

		let mut registry = IncludedRegistry::new();
		registry.reserve_primary(type_name, &id);
		let resource = self.build_resource(self.descriptor, record, "", &mut registry)?;

		let mut doc_links = Map::new();
		doc_links.insert(
			"self".to_string(),
			Value::String(links::resource_self(type_name, &id, self.context)),
		);
		if let Some(custom) = self.descriptor.links(record, self.context) {
			for (key, value) in custom {
				doc_links.insert(key, value);
			}
		}

		Ok(Document {
			data: PrimaryData::One(resource),
			included: registry.finish(),
			links: doc_links,
			meta: self.meta.clone(),
		})
	}

	/// Serialize an ordered sequence of records into a collection document
	///
	/// Each element contributes to one shared, deduplicated `included`
	/// registry; input order is preserved in `data`. Any primary record
	/// without an id fails the whole call.
	pub fn serialize_collection(&self, records: &[&dyn Record]) -> SerializeResult<Document> {
		let type_name = self.descriptor.type_name();
		debug!(type_name, count = records.len(), "assembling collection document");

		let mut registry = IncludedRegistry::new();
		// Reserve every primary identity first so no element of `data` is
		// ever duplicated into `included` by a sibling's relationships.
		for record in records {
			let id = record
				.id()
				.ok_or_else(|| SerializeError::missing_identifier(type_name))?;
			registry.reserve_primary(type_name, &id);
		}

		let mut resources = Vec::with_capacity(records.len());
		for record in records {
			resources.push(self.build_resource(self.descriptor, *record, "", &mut registry)?);
		}

		let self_link = if self.query.page_params().is_empty() {
			links::collection_self(type_name, self.context)
		} else {
			links::pagination(type_name, None, self.query.page_params(), self.context)
		};
		let mut doc_links = Map::new();
		doc_links.insert("self".to_string(), Value::String(self_link));

		Ok(Document {
			data: PrimaryData::Many(resources),
			included: registry.finish(),
			links: doc_links,
			meta: self.meta.clone(),
		})
	}

	fn build_resource(
		&self,
		descriptor: &dyn ResourceDescriptor,
		record: &dyn Record,
		path: &str,
		registry: &mut IncludedRegistry,
	) -> SerializeResult<ResourceObject> {
		let type_name = descriptor.type_name().to_string();
		let id = record
			.id()
			.ok_or_else(|| SerializeError::missing_identifier(&type_name))?;
		let transform = self.transform.unwrap_or_else(key_transform);

		let mut attributes = Map::new();
		for name in descriptor.attributes() {
			if !self.query.allows_field(&type_name, name) {
				continue;
			}
			if let Some(value) = record.attribute(name) {
				attributes.insert(transform.apply(name), value);
			}
		}

		let mut relationships = IndexMap::new();
		for relationship in descriptor.relationships() {
			let rel_path = if path.is_empty() {
				relationship.name.clone()
			} else {
				format!("{}.{}", path, relationship.name)
			};
			// A relation the record carries no value for is omitted
			// entirely, distinct from a loaded-but-empty relation.
			let Some(value) = record.relation(&relationship.name) else {
				continue;
			};
			if let Some(object) = self.resolve_relationship(
				&relationship,
				value,
				&type_name,
				&id,
				&rel_path,
				registry,
			)? {
				relationships.insert(transform.apply(&relationship.name), object);
			}
		}

		let mut resource_links = Map::new();
		resource_links.insert(
			"self".to_string(),
			Value::String(links::resource_self(&type_name, &id, self.context)),
		);
		if let Some(custom) = descriptor.links(record, self.context) {
			for (key, value) in custom {
				resource_links.insert(key, value);
			}
		}

		Ok(ResourceObject {
			id,
			type_name,
			attributes,
			relationships,
			links: resource_links,
			meta: descriptor.meta(record, self.context),
		})
	}

	/// Build the linkage block for one relation and register any resources
	/// selected for full inclusion
	///
	/// Returns `None` when the relation degrades to absent (a single target
	/// without a usable id).
	fn resolve_relationship(
		&self,
		relationship: &Relationship,
		value: RelationValue<'_>,
		parent_type: &str,
		parent_id: &str,
		path: &str,
		registry: &mut IncludedRegistry,
	) -> SerializeResult<Option<RelationshipObject>> {
		let mut rel_links = Map::new();
		rel_links.insert(
			"self".to_string(),
			Value::String(links::relationship_self(
				parent_type,
				parent_id,
				&relationship.name,
				self.context,
			)),
		);

		let target = relationship.target.as_ref();
		let target_type = target.type_name();

		let data = match value {
			RelationValue::Empty => match relationship.cardinality {
				Cardinality::One => Linkage::One(None),
				Cardinality::Many => Linkage::Many(Vec::new()),
			},
			RelationValue::One(related) => {
				let Some(related_id) = related.id() else {
					trace!(relation = path, "related record has no usable id, treating as absent");
					return Ok(None);
				};
				rel_links.insert(
					"related".to_string(),
					Value::String(links::relationship_related(
						target_type,
						&related_id,
						self.context,
					)),
				);
				if self.should_include(relationship.policy, path) {
					self.register_included(target, related, &related_id, path, registry)?;
				}
				Linkage::One(Some(ResourceIdentifier::new(target_type, related_id)))
			}
			RelationValue::Many(related_records) => {
				let include = self.should_include(relationship.policy, path);
				let mut identifiers = Vec::with_capacity(related_records.len());
				for related in related_records {
					let Some(related_id) = related.id() else {
						trace!(relation = path, "skipping collection member without usable id");
						continue;
					};
					if include {
						self.register_included(target, related, &related_id, path, registry)?;
					}
					identifiers.push(ResourceIdentifier::new(target_type, related_id));
				}
				Linkage::Many(identifiers)
			}
		};

		Ok(Some(RelationshipObject {
			data,
			links: rel_links,
		}))
	}

	/// Whether to recurse beyond linkage for a relation at `path`
	///
	/// A non-empty requested-include set narrows inclusion to exactly the
	/// requested paths; `AlwaysInclude` applies only when the client
	/// requested nothing.
	fn should_include(&self, policy: InclusionPolicy, path: &str) -> bool {
		let included = if self.query.has_includes() {
			self.query.requests_include(path)
		} else {
			policy == InclusionPolicy::AlwaysInclude
		};
		trace!(path, included, "inclusion decision");
		included
	}

	fn register_included(
		&self,
		descriptor: &dyn ResourceDescriptor,
		record: &dyn Record,
		id: &str,
		path: &str,
		registry: &mut IncludedRegistry,
	) -> SerializeResult<()> {
		let type_name = descriptor.type_name();
		// Marking before the recursive build is what terminates cycles:
		// a back-edge to an already-registered resource keeps its
		// identifier reference without re-traversing its relationships.
		if !registry.mark(type_name, id) {
			trace!(type_name, id, "already registered, identifier reference suffices");
			return Ok(());
		}
		let resource = self.build_resource(descriptor, record, path, registry)?;
		registry.store(type_name, id, resource);
		Ok(())
	}
}

/// Call-scoped registry backing the `included` section
///
/// Seen-set plus append-only order list, shared across the whole traversal
/// so deduplication works across sibling branches, not just within one.
struct IncludedRegistry {
	seen: HashSet<(String, String)>,
	order: Vec<(String, String)>,
	objects: HashMap<(String, String), ResourceObject>,
}

impl IncludedRegistry {
	fn new() -> Self {
		Self {
			seen: HashSet::new(),
			order: Vec::new(),
			objects: HashMap::new(),
		}
	}

	/// Mark a primary resource identity without scheduling it for
	/// `included`
	fn reserve_primary(&mut self, type_name: &str, id: &str) {
		self.seen.insert((type_name.to_string(), id.to_string()));
	}

	/// Mark `(type, id)` as seen and schedule it for `included`
	///
	/// Returns `false` when the identity was already seen (either reserved
	/// as primary or registered earlier in the traversal).
	fn mark(&mut self, type_name: &str, id: &str) -> bool {
		let key = (type_name.to_string(), id.to_string());
		if self.seen.contains(&key) {
			return false;
		}
		self.seen.insert(key.clone());
		self.order.push(key);
		true
	}

	fn store(&mut self, type_name: &str, id: &str, resource: ResourceObject) {
		self.objects
			.insert((type_name.to_string(), id.to_string()), resource);
	}

	/// Registered resources in first-seen order
	fn finish(self) -> Vec<ResourceObject> {
		let IncludedRegistry {
			order, mut objects, ..
		} = self;
		order
			.into_iter()
			.filter_map(|key| objects.remove(&key))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resource::Relationship;
	use serde_json::json;
	use std::sync::Arc;

	struct CompanyResource;

	impl ResourceDescriptor for CompanyResource {
		fn type_name(&self) -> &str {
			"company"
		}

		fn attributes(&self) -> Vec<&str> {
			vec!["name"]
		}
	}

	struct UserResource;

	impl ResourceDescriptor for UserResource {
		fn type_name(&self) -> &str {
			"user"
		}

		fn attributes(&self) -> Vec<&str> {
			vec!["username", "first_name", "last_name"]
		}

		fn relationships(&self) -> Vec<Relationship> {
			vec![Relationship::one("company", Arc::new(CompanyResource))]
		}
	}

	// ========================================
	// Registry behaviour
	// ========================================

	#[test]
	fn test_registry_dedupes_and_keeps_first_seen_order() {
		let mut registry = IncludedRegistry::new();
		assert!(registry.mark("comment", "2"));
		assert!(registry.mark("comment", "1"));
		assert!(!registry.mark("comment", "2"));

		registry.store(
			"comment",
			"2",
			ResourceObject {
				id: "2".to_string(),
				type_name: "comment".to_string(),
				attributes: Map::new(),
				relationships: IndexMap::new(),
				links: Map::new(),
				meta: None,
			},
		);
		registry.store(
			"comment",
			"1",
			ResourceObject {
				id: "1".to_string(),
				type_name: "comment".to_string(),
				attributes: Map::new(),
				relationships: IndexMap::new(),
				links: Map::new(),
				meta: None,
			},
		);

		let included = registry.finish();
		let ids: Vec<&str> = included.iter().map(|r| r.id.as_str()).collect();
		assert_eq!(ids, ["2", "1"]);
	}

	#[test]
	fn test_registry_reserved_primary_is_never_included() {
		let mut registry = IncludedRegistry::new();
		registry.reserve_primary("user", "123");
		assert!(!registry.mark("user", "123"));
		assert!(registry.finish().is_empty());
	}

	// ========================================
	// Assembly basics
	// ========================================

	#[test]
	fn test_primary_record_without_id_is_fatal() {
		let record = json!({ "username": "j.smith" });
		let err = JsonApiSerializer::new(&UserResource)
			.serialize(&record)
			.unwrap_err();
		assert_eq!(
			err,
			SerializeError::MissingIdentifier {
				type_name: "user".to_string()
			}
		);
	}

	#[test]
	fn test_collection_member_without_id_is_fatal() {
		let ok = json!({ "id": 1, "username": "a" });
		let bad = json!({ "username": "b" });
		let records: Vec<&dyn Record> = vec![&ok, &bad];
		let err = JsonApiSerializer::new(&UserResource)
			.serialize_collection(&records)
			.unwrap_err();
		assert!(matches!(err, SerializeError::MissingIdentifier { .. }));
	}

	#[test]
	fn test_relationship_target_without_id_degrades_to_absent() {
		let record = json!({
			"id": 1,
			"username": "j.smith",
			"company": { "name": "acme" }
		});
		let document = JsonApiSerializer::new(&UserResource)
			.serialize(&record)
			.unwrap();
		let rendered = serde_json::to_value(&document).unwrap();
		assert!(rendered["data"].get("relationships").is_none());
		assert_eq!(rendered["included"], json!([]));
	}

	#[test]
	fn test_loaded_null_relation_emits_null_linkage() {
		let record = json!({ "id": 1, "username": "j.smith", "company": null });
		let document = JsonApiSerializer::new(&UserResource)
			.serialize(&record)
			.unwrap();
		let rendered = serde_json::to_value(&document).unwrap();
		assert_eq!(rendered["data"]["relationships"]["company"]["data"], Value::Null);
		assert_eq!(
			rendered["data"]["relationships"]["company"]["links"]["self"],
			json!("/user/1/relationships/company")
		);
		assert!(rendered["data"]["relationships"]["company"]["links"]
			.get("related")
			.is_none());
	}

	#[test]
	fn test_loaded_relation_emits_linkage_and_links() {
		let record = json!({
			"id": 1,
			"username": "j.smith",
			"company": { "id": 2, "name": "acme" }
		});
		let document = JsonApiSerializer::new(&UserResource)
			.serialize(&record)
			.unwrap();
		let rendered = serde_json::to_value(&document).unwrap();
		let company = &rendered["data"]["relationships"]["company"];
		assert_eq!(company["data"], json!({ "id": "2", "type": "company" }));
		assert_eq!(company["links"]["self"], json!("/user/1/relationships/company"));
		assert_eq!(company["links"]["related"], json!("/company/2"));
		// default policy, nothing requested: linkage only
		assert_eq!(rendered["included"], json!([]));
	}

	#[test]
	fn test_descriptor_links_override_default_self() {
		struct CanonicalUserResource;

		impl ResourceDescriptor for CanonicalUserResource {
			fn type_name(&self) -> &str {
				"user"
			}

			fn attributes(&self) -> Vec<&str> {
				vec!["username"]
			}

			fn links(
				&self,
				record: &dyn Record,
				_context: Option<&RequestContext>,
			) -> Option<Map<String, Value>> {
				let mut links = Map::new();
				let id = record.id()?;
				links.insert(
					"self".to_string(),
					Value::String(format!("/people/{}", id)),
				);
				links.insert(
					"avatar".to_string(),
					Value::String(format!("/people/{}/avatar", id)),
				);
				Some(links)
			}
		}

		let record = json!({ "id": 7, "username": "j.smith" });
		let document = JsonApiSerializer::new(&CanonicalUserResource)
			.serialize(&record)
			.unwrap();
		let rendered = serde_json::to_value(&document).unwrap();
		assert_eq!(rendered["data"]["links"]["self"], json!("/people/7"));
		assert_eq!(rendered["data"]["links"]["avatar"], json!("/people/7/avatar"));
		assert_eq!(rendered["links"]["self"], json!("/people/7"));
	}

	#[test]
	fn test_per_call_transform_override() {
		let record = json!({ "id": 1, "first_name": "Jeff" });

		struct NameResource;

		impl ResourceDescriptor for NameResource {
			fn type_name(&self) -> &str {
				"user"
			}

			fn attributes(&self) -> Vec<&str> {
				vec!["first_name"]
			}
		}

		let document = JsonApiSerializer::new(&NameResource)
			.key_transform(KeyTransform::Camel)
			.serialize(&record)
			.unwrap();
		let rendered = serde_json::to_value(&document).unwrap();
		assert_eq!(rendered["data"]["attributes"]["firstName"], json!("Jeff"));
		assert!(rendered["data"]["attributes"].get("first_name").is_none());
	}

	#[test]
	fn test_collection_self_link_carries_page_params() {
		let a = json!({ "id": 1, "username": "a" });
		let records: Vec<&dyn Record> = vec![&a];
		let document = JsonApiSerializer::new(&UserResource)
			.query(QueryConfig::new().page_param("number", "2").page_param("size", "10"))
			.serialize_collection(&records)
			.unwrap();
		let rendered = serde_json::to_value(&document).unwrap();
		assert_eq!(
			rendered["links"]["self"],
			json!("/user?page%5Bnumber%5D=2&page%5Bsize%5D=10")
		);
	}
}
