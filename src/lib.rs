//! # jsonapi-serde
//!
//! Serialization of in-memory domain records into JSON:API-style documents:
//! a primary `data` section, a deduplicated `included` section for related
//! resources, per-resource `links`/`meta`, and relationship linkage blocks.
//!
//! ## Features
//!
//! - **Resource Descriptors**: trait-based per-type declarations of
//!   attributes, relationships, and optional meta/links providers
//! - **Compound Documents**: recursive relationship resolution with
//!   `(type, id)` deduplication and cycle termination
//! - **Sparse Fieldsets & Include Paths**: client-requested narrowing via
//!   [`QueryConfig`]
//! - **Link Generation**: root-relative or absolute resource, relationship,
//!   and pagination links
//! - **Key Transforms**: process-wide identity / snake_case / camelCase
//!   wire-format keys
//!
//! The engine is synchronous and purely in-memory: it neither loads
//! relationship data nor encodes JSON text. Documents are plain
//! `serde::Serialize` structures handed to `serde_json` by the caller.
//!
//! ## Examples
//!
//! ```
//! use jsonapi_serde::{JsonApiSerializer, QueryConfig, Relationship, ResourceDescriptor};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! struct CompanyResource;
//!
//! impl ResourceDescriptor for CompanyResource {
//! 	fn type_name(&self) -> &str {
//! 		"company"
//! 	}
//!
//! 	fn attributes(&self) -> Vec<&str> {
//! 		vec!["name"]
//! 	}
//! }
//!
//! struct UserResource;
//!
//! impl ResourceDescriptor for UserResource {
//! 	fn type_name(&self) -> &str {
//! 		"user"
//! 	}
//!
//! 	fn attributes(&self) -> Vec<&str> {
//! 		vec!["username"]
//! 	}
//!
//! 	fn relationships(&self) -> Vec<Relationship> {
//! 		vec![Relationship::one("company", Arc::new(CompanyResource))]
//! 	}
//! }
//!
//! let record = json!({
//! 	"id": 123,
//! 	"username": "j.smith",
//! 	"company": { "id": 2, "name": "acme" }
//! });
//!
//! let document = JsonApiSerializer::new(&UserResource)
//! 	.query(QueryConfig::new().include("company"))
//! 	.serialize(&record)
//! 	.unwrap();
//!
//! let rendered = serde_json::to_value(&document).unwrap();
//! assert_eq!(rendered["data"]["id"], json!("123"));
//! assert_eq!(
//! 	rendered["data"]["relationships"]["company"]["data"],
//! 	json!({ "id": "2", "type": "company" })
//! );
//! assert_eq!(rendered["included"][0]["type"], json!("company"));
//! ```

pub mod document;
pub mod error;
pub mod links;
pub mod query;
pub mod resource;
pub mod serializer;
pub mod transform;

// Re-export commonly used types
pub use document::{
	Document, Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject,
};
pub use error::{SerializeError, SerializeResult};
pub use links::RequestContext;
pub use query::QueryConfig;
pub use resource::{
	Cardinality, InclusionPolicy, Record, RelationValue, Relationship, ResourceDescriptor,
};
pub use serializer::JsonApiSerializer;
pub use transform::{camel_case, key_transform, set_key_transform, snake_case, KeyTransform};
