//! Error types for document assembly

use thiserror::Error;

/// Result alias for serialization operations
pub type SerializeResult<T> = Result<T, SerializeError>;

/// Errors surfaced by the document assembler
///
/// Only two conditions are exceptional: a structural misconfiguration
/// (unknown key-transform mode, invalid descriptor wiring) and a primary
/// record without a usable id. Everything else in input data — absent
/// attributes, unloaded relations, relationship targets without ids — is
/// normal shape variation and degrades to omitted keys or empty linkage.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
	/// The serializer or a descriptor is structurally misconfigured.
	///
	/// Surfaces synchronously and is never retried: retrying does not
	/// change a misconfiguration.
	#[error("invalid serializer configuration: {0}")]
	Configuration(String),

	/// A record serialized as the primary subject lacks a usable id.
	///
	/// Fatal for the call. Distinct from a *relationship* target without
	/// an id, which is non-fatal and emits no linkage.
	#[error("primary resource of type '{type_name}' has no usable id")]
	MissingIdentifier { type_name: String },
}

impl SerializeError {
	/// Create a configuration error
	pub fn configuration(message: impl Into<String>) -> Self {
		Self::Configuration(message.into())
	}

	/// Create a missing-identifier error for the given resource type
	pub fn missing_identifier(type_name: impl Into<String>) -> Self {
		Self::MissingIdentifier {
			type_name: type_name.into(),
		}
	}

	/// Check if this error is a configuration error
	pub fn is_configuration(&self) -> bool {
		matches!(self, Self::Configuration(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_configuration_display() {
		let err = SerializeError::configuration("unknown key transform mode: kebab");
		assert_eq!(
			err.to_string(),
			"invalid serializer configuration: unknown key transform mode: kebab"
		);
		assert!(err.is_configuration());
	}

	#[test]
	fn test_missing_identifier_display() {
		let err = SerializeError::missing_identifier("user");
		assert_eq!(
			err.to_string(),
			"primary resource of type 'user' has no usable id"
		);
		assert!(!err.is_configuration());
	}
}
