//! Client-requested serialization options
//!
//! A [`QueryConfig`] is produced upstream by request-parsing code (query
//! string extraction is out of scope here) and consumed by the assembler:
//! requested include paths, sparse fieldsets per type, and page parameters.
//! Absence of the object is equivalent to an empty include set and no
//! fieldset restriction.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Include paths, sparse fieldsets, and page parameters for one request
///
/// # Examples
///
/// ```
/// use jsonapi_serde::QueryConfig;
///
/// let query = QueryConfig::new()
/// 	.include("best_comments.user")
/// 	.fields("user", ["username"]);
///
/// assert!(query.requests_include("best_comments"));
/// assert!(query.requests_include("best_comments.user"));
/// assert!(!query.requests_include("best"));
/// assert!(query.allows_field("user", "username"));
/// assert!(!query.allows_field("user", "first_name"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryConfig {
	include: Vec<String>,
	fields: HashMap<String, HashSet<String>>,
	page: IndexMap<String, String>,
}

impl QueryConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Request a dotted relationship path for inclusion
	pub fn include(mut self, path: impl Into<String>) -> Self {
		self.include.push(path.into());
		self
	}

	/// Restrict emitted attributes for a type (sparse fieldset)
	pub fn fields<I, S>(mut self, type_name: impl Into<String>, fields: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.fields
			.insert(type_name.into(), fields.into_iter().map(Into::into).collect());
		self
	}

	/// Add a page parameter, emitted under the `page[...]` key convention
	pub fn page_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.page.insert(key.into(), value.into());
		self
	}

	/// Whether the client requested any includes at all
	///
	/// A non-empty include set narrows inclusion to exactly the requested
	/// paths, overriding `AlwaysInclude` declarations.
	pub fn has_includes(&self) -> bool {
		!self.include.is_empty()
	}

	/// Requested dotted include paths
	pub fn include_paths(&self) -> &[String] {
		&self.include
	}

	/// Whether `path` is requested, directly or as a prefix of a deeper
	/// requested path
	///
	/// Matching is path-segment-exact, not substring: `"best"` does not
	/// match a requested `"best_comments.user"`.
	pub fn requests_include(&self, path: &str) -> bool {
		self.include.iter().any(|requested| {
			requested == path
				|| requested
					.strip_prefix(path)
					.is_some_and(|rest| rest.starts_with('.'))
		})
	}

	/// Sparse fieldset for a type, `None` when unrestricted
	pub fn fields_for(&self, type_name: &str) -> Option<&HashSet<String>> {
		self.fields.get(type_name)
	}

	/// Whether an attribute of the given type may be emitted
	pub fn allows_field(&self, type_name: &str, field: &str) -> bool {
		self.fields
			.get(type_name)
			.map_or(true, |restricted| restricted.contains(field))
	}

	/// Page parameters in insertion order
	pub fn page_params(&self) -> &IndexMap<String, String> {
		&self.page
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_empty_config_is_unrestricted() {
		let query = QueryConfig::new();
		assert!(!query.has_includes());
		assert!(!query.requests_include("company"));
		assert!(query.allows_field("user", "anything"));
		assert!(query.fields_for("user").is_none());
		assert!(query.page_params().is_empty());
	}

	#[test]
	fn test_include_prefix_matching_is_segment_exact() {
		let query = QueryConfig::new().include("best_comments.user");
		assert!(query.requests_include("best_comments"));
		assert!(query.requests_include("best_comments.user"));
		assert!(!query.requests_include("best"));
		assert!(!query.requests_include("best_comments.use"));
		assert!(!query.requests_include("best_comments.user.company"));
	}

	#[test]
	fn test_multiple_include_paths() {
		let query = QueryConfig::new().include("company").include("posts.comments");
		assert!(query.requests_include("company"));
		assert!(query.requests_include("posts"));
		assert!(query.requests_include("posts.comments"));
		assert!(!query.requests_include("comments"));
	}

	#[test]
	fn test_sparse_fieldsets_are_per_type() {
		let query = QueryConfig::new().fields("user", ["username"]);
		assert!(query.allows_field("user", "username"));
		assert!(!query.allows_field("user", "first_name"));
		assert!(query.allows_field("company", "name"));
	}

	#[test]
	fn test_page_params_keep_insertion_order() {
		let query = QueryConfig::new()
			.page_param("size", "10")
			.page_param("number", "2");
		let keys: Vec<&String> = query.page_params().keys().collect();
		assert_eq!(keys, ["size", "number"]);
	}
}
