//! Output data model
//!
//! Plain `serde::Serialize` structs for the assembled document tree. The
//! assembler produces this in-memory structure; encoding it to JSON text is
//! the caller's job (`serde_json::to_value` / `to_string`).

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// A complete top-level document
///
/// `included` is always present, even when empty, and contains no two
/// entries with the same `(type, id)` and no entry sharing a `(type, id)`
/// with a primary resource. `meta` is omitted unless supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
	pub data: PrimaryData,
	pub included: Vec<ResourceObject>,
	pub links: Map<String, Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<Map<String, Value>>,
}

/// Primary `data` section: one resource or an ordered sequence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
	One(ResourceObject),
	Many(Vec<ResourceObject>),
}

/// The serialized representation of one entity
///
/// `relationships` holds only relations the source record carried a value
/// for; a declared-but-unloaded relation is omitted entirely, which is
/// distinct from a loaded-but-empty relation (`data: null` / `data: []`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject {
	pub id: String,
	#[serde(rename = "type")]
	pub type_name: String,
	pub attributes: Map<String, Value>,
	#[serde(skip_serializing_if = "IndexMap::is_empty")]
	pub relationships: IndexMap<String, RelationshipObject>,
	pub links: Map<String, Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<Map<String, Value>>,
}

/// Linkage block for one relationship
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipObject {
	pub data: Linkage,
	pub links: Map<String, Value>,
}

/// Identifier-only relationship data
///
/// Serializes untagged: a single identifier or `null` for to-one
/// relations, an array of identifiers for to-many relations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
	One(Option<ResourceIdentifier>),
	Many(Vec<ResourceIdentifier>),
}

/// The minimal `(type, id)` reference used for relationship linkage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceIdentifier {
	pub id: String,
	#[serde(rename = "type")]
	pub type_name: String,
}

impl ResourceIdentifier {
	pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			type_name: type_name.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_linkage_serialization() {
		let single = Linkage::One(Some(ResourceIdentifier::new("company", "2")));
		assert_eq!(
			serde_json::to_value(&single).unwrap(),
			json!({ "id": "2", "type": "company" })
		);

		let empty_single = Linkage::One(None);
		assert_eq!(serde_json::to_value(&empty_single).unwrap(), Value::Null);

		let many = Linkage::Many(vec![ResourceIdentifier::new("comment", "3")]);
		assert_eq!(
			serde_json::to_value(&many).unwrap(),
			json!([{ "id": "3", "type": "comment" }])
		);

		let empty_many = Linkage::Many(Vec::new());
		assert_eq!(serde_json::to_value(&empty_many).unwrap(), json!([]));
	}

	#[test]
	fn test_empty_relationships_key_is_omitted() {
		let resource = ResourceObject {
			id: "1".to_string(),
			type_name: "user".to_string(),
			attributes: Map::new(),
			relationships: IndexMap::new(),
			links: Map::new(),
			meta: None,
		};
		let value = serde_json::to_value(&resource).unwrap();
		assert!(value.get("relationships").is_none());
		assert!(value.get("meta").is_none());
		assert_eq!(value["type"], json!("user"));
	}

	#[test]
	fn test_document_meta_omitted_when_absent() {
		let document = Document {
			data: PrimaryData::Many(Vec::new()),
			included: Vec::new(),
			links: Map::new(),
			meta: None,
		};
		let value = serde_json::to_value(&document).unwrap();
		assert!(value.get("meta").is_none());
		assert_eq!(value["data"], json!([]));
		assert_eq!(value["included"], json!([]));
	}
}
