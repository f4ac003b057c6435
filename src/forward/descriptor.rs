//! Static per-(resource, verb) tables that drive [`Forwarder::forward`].
//!
//! [`Forwarder::forward`]: crate::forward::Forwarder::forward

use reqwest::Method;
use serde_json::Value;

use crate::forward::error::FieldError;

/// HTTP verb used toward the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }

    /// Whether the inbound JSON body is validated and forwarded.
    pub fn carries_body(self) -> bool {
        matches!(self, Verb::Post)
    }
}

/// How a numeric field is represented once coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Decimal,
}

/// Range constraint applied after coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Any,
    Positive,
    NonNegative,
}

/// A body field that must be coerced to a JSON number before forwarding.
#[derive(Debug, Clone, Copy)]
pub struct NumericField {
    pub name: &'static str,
    pub kind: NumberKind,
    pub bound: Bound,
    /// Value used when an optional field is absent or blank.
    pub default: Option<f64>,
}

impl NumericField {
    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: NumberKind::Integer,
            bound: Bound::Any,
            default: None,
        }
    }

    pub const fn decimal(name: &'static str) -> Self {
        Self {
            name,
            kind: NumberKind::Decimal,
            bound: Bound::Any,
            default: None,
        }
    }

    pub const fn positive(self) -> Self {
        Self {
            bound: Bound::Positive,
            ..self
        }
    }

    pub const fn non_negative(self) -> Self {
        Self {
            bound: Bound::NonNegative,
            ..self
        }
    }

    pub const fn or_default(self, value: f64) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }
}

/// A body field restricted to a fixed set of string values.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceField {
    pub name: &'static str,
    pub allowed: &'static [&'static str],
}

/// Shape of the JSON error body returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `{ "error": msg }`, used by the admin dashboards.
    Error,
    /// `{ "success": false, "message": msg }`, used by the resident dashboards.
    Status,
}

impl Envelope {
    pub fn failure(self, message: &str) -> Value {
        match self {
            Envelope::Error => serde_json::json!({ "error": message }),
            Envelope::Status => serde_json::json!({ "success": false, "message": message }),
        }
    }

    pub fn acknowledged(self, message: &str) -> Value {
        match self {
            Envelope::Error => serde_json::json!({ "message": message }),
            Envelope::Status => serde_json::json!({ "success": true, "message": message }),
        }
    }
}

/// Projection from a backend listing body to the caller's view.
///
/// Returns `None` when the body is not a listing at all.
pub type ListingMapper = fn(Value) -> Option<Value>;

/// What a successful backend reply turns into.
#[derive(Debug, Clone, Copy)]
pub enum SuccessShape {
    /// Backend JSON unchanged; an empty body becomes an acknowledgement.
    PassThrough { default_message: &'static str },
    /// Fixed acknowledgement, backend body ignored.
    Message(&'static str),
    /// `{ message, data }` where data is the backend JSON.
    MessageWithData(&'static str),
    /// Backend listing mapped to flattened views.
    Listing(ListingMapper),
}

/// Everything the forwarder needs to know about one (resource, verb) pair.
#[derive(Debug)]
pub struct ResourceDescriptor {
    /// Resource name used in logs and metrics (e.g. `payments`).
    pub resource: &'static str,
    /// Capitalized name used in generic backend error messages.
    pub label: &'static str,
    /// Human action used in failure messages (e.g. `create bill`).
    pub action: &'static str,
    pub verb: Verb,
    /// Backend path, with `{id}` standing for the record identifier.
    pub path: &'static str,
    pub required: &'static [&'static str],
    pub numeric: &'static [NumericField],
    pub choices: &'static [ChoiceField],
    /// When set, only these fields of the body are forwarded.
    pub body_fields: Option<&'static [&'static str]>,
    /// Forward the caller's session cookie.
    pub session: bool,
    pub success: SuccessShape,
    pub envelope: Envelope,
}

const ID_PLACEHOLDER: &str = "{id}";

impl ResourceDescriptor {
    pub fn needs_id(&self) -> bool {
        self.path.contains(ID_PLACEHOLDER)
    }

    /// Backend path segments with the record identifier substituted.
    ///
    /// Segments are unencoded; the transport percent-encodes them.
    pub fn path_segments<'a>(&self, id: Option<&'a str>) -> Result<Vec<&'a str>, FieldError> {
        let id = id.map(str::trim).filter(|id| !id.is_empty());
        if self.needs_id() && id.is_none() {
            return Err(FieldError::Missing { field: "id" });
        }

        Ok(self
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match id {
                Some(id) if segment == ID_PLACEHOLDER => id,
                _ => segment,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARK: ResourceDescriptor = ResourceDescriptor {
        resource: "payments",
        label: "Payments",
        action: "update payment",
        verb: Verb::Put,
        path: "/admin/payments/mark/{id}",
        required: &[],
        numeric: &[],
        choices: &[],
        body_fields: None,
        session: true,
        success: SuccessShape::Message("ok"),
        envelope: Envelope::Error,
    };

    #[test]
    fn test_path_segments_substitute_id() {
        assert_eq!(
            MARK.path_segments(Some(" 64f1c0ffee ")).unwrap(),
            vec!["admin", "payments", "mark", "64f1c0ffee"]
        );
    }

    #[test]
    fn test_path_segments_keep_id_unencoded() {
        assert_eq!(
            MARK.path_segments(Some("a/b c")).unwrap(),
            vec!["admin", "payments", "mark", "a/b c"]
        );
    }

    #[test]
    fn test_path_segments_require_id() {
        assert_eq!(MARK.path_segments(None), Err(FieldError::Missing { field: "id" }));
        assert_eq!(MARK.path_segments(Some("  ")), Err(FieldError::Missing { field: "id" }));
    }

    #[test]
    fn test_envelopes() {
        assert_eq!(Envelope::Error.failure("boom"), serde_json::json!({ "error": "boom" }));
        assert_eq!(
            Envelope::Status.failure("boom"),
            serde_json::json!({ "success": false, "message": "boom" })
        );
    }
}
