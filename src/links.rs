//! Resource, relationship, and pagination link construction
//!
//! All builders are pure functions over `(type, id, context)`. Without a
//! [`RequestContext`] the emitted paths are root-relative; with one they are
//! absolute URLs prefixed with `{scheme}://{host}`. Identical input with and
//! without a context differs only in that prefix.

use indexmap::IndexMap;
use url::form_urlencoded;

/// Request-scoped origin information for absolute link generation
///
/// # Examples
///
/// ```
/// use jsonapi_serde::{links, RequestContext};
///
/// let context = RequestContext::new("http", "www.example.com");
/// assert_eq!(
/// 	links::resource_self("user", "123", Some(&context)),
/// 	"http://www.example.com/user/123"
/// );
/// assert_eq!(links::resource_self("user", "123", None), "/user/123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
	pub scheme: String,
	pub host: String,
}

impl RequestContext {
	pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
		Self {
			scheme: scheme.into(),
			host: host.into(),
		}
	}

	/// The `{scheme}://{host}` prefix for absolute URLs
	pub fn origin(&self) -> String {
		format!("{}://{}", self.scheme, self.host)
	}
}

fn base(context: Option<&RequestContext>) -> String {
	context.map(RequestContext::origin).unwrap_or_default()
}

/// Self link of a single resource: `{base}/{type}/{id}`
pub fn resource_self(type_name: &str, id: &str, context: Option<&RequestContext>) -> String {
	format!("{}/{}/{}", base(context), type_name, id)
}

/// Self link of a collection: `{base}/{type}`
pub fn collection_self(type_name: &str, context: Option<&RequestContext>) -> String {
	format!("{}/{}", base(context), type_name)
}

/// Self link of a relationship: `{base}/{type}/{id}/relationships/{relation}`
pub fn relationship_self(
	type_name: &str,
	id: &str,
	relation: &str,
	context: Option<&RequestContext>,
) -> String {
	format!(
		"{}/{}/{}/relationships/{}",
		base(context),
		type_name,
		id,
		relation
	)
}

/// Related-resource link of a relationship: `{base}/{related_type}/{related_id}`
pub fn relationship_related(
	related_type: &str,
	related_id: &str,
	context: Option<&RequestContext>,
) -> String {
	resource_self(related_type, related_id, context)
}

/// Current resource or collection path with a `page[...]` query string
///
/// Page parameters are URL-encoded under the nested `page[...]` key
/// convention, preserving the mapping's insertion order.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use jsonapi_serde::links;
///
/// let mut page = IndexMap::new();
/// page.insert("number".to_string(), "2".to_string());
/// page.insert("size".to_string(), "10".to_string());
///
/// assert_eq!(
/// 	links::pagination("post", None, &page, None),
/// 	"/post?page%5Bnumber%5D=2&page%5Bsize%5D=10"
/// );
/// ```
pub fn pagination(
	type_name: &str,
	id: Option<&str>,
	page: &IndexMap<String, String>,
	context: Option<&RequestContext>,
) -> String {
	let path = match id {
		Some(id) => resource_self(type_name, id, context),
		None => collection_self(type_name, context),
	};
	if page.is_empty() {
		return path;
	}
	let mut query = form_urlencoded::Serializer::new(String::new());
	for (key, value) in page {
		query.append_pair(&format!("page[{}]", key), value);
	}
	format!("{}?{}", path, query.finish())
}
