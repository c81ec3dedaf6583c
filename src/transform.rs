//! Wire-format key transformation
//!
//! Attribute and relationship names declared on a descriptor are mapped to
//! their wire-format keys by a single process-wide [`KeyTransform`]. The
//! setting is configured once at startup and read at call time, so a
//! configuration change takes effect on the next `serialize` call without
//! descriptors caching anything.

use crate::error::SerializeError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::str::FromStr;

/// Key style applied to every attribute and relationship name
///
/// The transform must be injective over a descriptor's own declared field
/// names; a descriptor declaring both `first_name` and `firstName` under
/// [`KeyTransform::Camel`] is a configuration error on the caller's side
/// that the serializer does not detect.
///
/// # Examples
///
/// ```
/// use jsonapi_serde::KeyTransform;
///
/// assert_eq!(KeyTransform::Identity.apply("first_name"), "first_name");
/// assert_eq!(KeyTransform::Snake.apply("firstName"), "first_name");
/// assert_eq!(KeyTransform::Camel.apply("first_name"), "firstName");
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyTransform {
	/// Emit declared names unchanged
	#[default]
	Identity,
	/// Emit `snake_case` keys
	Snake,
	/// Emit `camelCase` keys
	Camel,
}

impl KeyTransform {
	/// Apply this transform to a declared field name
	pub fn apply(&self, name: &str) -> String {
		match self {
			KeyTransform::Identity => name.to_string(),
			KeyTransform::Snake => snake_case(name),
			KeyTransform::Camel => camel_case(name),
		}
	}
}

impl FromStr for KeyTransform {
	type Err = SerializeError;

	/// Parse a transform mode name
	///
	/// # Examples
	///
	/// ```
	/// use jsonapi_serde::KeyTransform;
	///
	/// let transform: KeyTransform = "snake".parse().unwrap();
	/// assert_eq!(transform, KeyTransform::Snake);
	/// assert!("kebab".parse::<KeyTransform>().is_err());
	/// ```
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"identity" => Ok(KeyTransform::Identity),
			"snake" | "snake_case" => Ok(KeyTransform::Snake),
			"camel" | "camelCase" => Ok(KeyTransform::Camel),
			other => Err(SerializeError::configuration(format!(
				"unknown key transform mode: {}",
				other
			))),
		}
	}
}

static KEY_TRANSFORM: Lazy<RwLock<KeyTransform>> =
	Lazy::new(|| RwLock::new(KeyTransform::default()));

/// Select the process-wide key transform
///
/// A process-configuration action, not a per-call parameter: callers must
/// treat the setting as immutable for the duration of any in-flight
/// `serialize` call. Races are acceptable only between calls.
pub fn set_key_transform(transform: KeyTransform) {
	*KEY_TRANSFORM.write() = transform;
}

/// Read the currently configured key transform
pub fn key_transform() -> KeyTransform {
	*KEY_TRANSFORM.read()
}

/// Convert a field name to `snake_case`
pub fn snake_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len() + 4);
	for (i, ch) in name.chars().enumerate() {
		if ch.is_ascii_uppercase() {
			if i > 0 {
				out.push('_');
			}
			out.push(ch.to_ascii_lowercase());
		} else if ch == '-' {
			out.push('_');
		} else {
			out.push(ch);
		}
	}
	out
}

/// Convert a field name to `camelCase`
pub fn camel_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len());
	let mut upper_next = false;
	for ch in name.chars() {
		if ch == '_' || ch == '-' {
			upper_next = true;
		} else if upper_next {
			out.push(ch.to_ascii_uppercase());
			upper_next = false;
		} else {
			out.push(ch);
		}
	}
	out
}
