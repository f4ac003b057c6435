//! Resident endpoints and the flattened resident view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forward::descriptor::{Envelope, NumericField, ResourceDescriptor, SuccessShape, Verb};
use crate::resources::lenient;

/// Resident document as returned by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResidentRecord {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub block: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub flat_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub number_of_member: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub two_wheeler: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub four_wheeler: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default, deserialize_with = "lenient::text")]
    pub created_at: Option<String>,
}

impl ResidentRecord {
    /// `first last`, skipping blank parts.
    pub fn display_name(&self) -> String {
        join_present(&[&self.first_name, &self.last_name], " ")
    }

    /// `block-flat`, skipping blank parts.
    pub fn flat(&self) -> String {
        join_present(&[&self.block, &self.flat_number], "-")
    }
}

fn join_present(parts: &[&Option<String>], separator: &str) -> String {
    parts
        .iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Resident row shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentView {
    pub id: String,
    pub name: String,
    pub flat: String,
    pub joined: String,
    pub email: String,
    pub phone: String,
    pub members: u64,
    pub vehicles: u8,
    pub status: &'static str,
}

impl From<ResidentRecord> for ResidentView {
    fn from(record: ResidentRecord) -> Self {
        Self {
            name: record.display_name(),
            flat: record.flat(),
            joined: record
                .created_at
                .as_deref()
                .and_then(calendar_date)
                .unwrap_or_else(|| "N/A".to_string()),
            members: record
                .number_of_member
                .as_ref()
                .and_then(|n| n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)))
                .unwrap_or(0),
            vehicles: u8::from(record.two_wheeler) + u8::from(record.four_wheeler),
            status: if record.status.as_deref() == Some("active") {
                "active"
            } else {
                "inactive"
            },
            id: record.id.unwrap_or_default(),
            email: record.email.unwrap_or_default(),
            phone: record.mobile_number.unwrap_or_default(),
        }
    }
}

/// UTC calendar date (`YYYY-MM-DD`) of an RFC 3339 timestamp, plain date or epoch millis.
pub fn calendar_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        ts.with_timezone(&Utc).date_naive()
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        date
    } else {
        let millis = raw.parse::<i64>().ok()?;
        DateTime::<Utc>::from_timestamp_millis(millis)?.date_naive()
    };
    Some(date.format("%Y-%m-%d").to_string())
}

/// Map a backend resident listing to views; `None` if it is not a list.
pub fn map_listing(body: Value) -> Option<Value> {
    let Value::Array(records) = body else {
        return None;
    };
    let views: Vec<ResidentView> = records
        .into_iter()
        .map(|record| ResidentView::from(lenient::decode::<ResidentRecord>(record)))
        .collect();
    serde_json::to_value(views).ok()
}

pub static LIST: ResourceDescriptor = ResourceDescriptor {
    resource: "residents",
    label: "Residents",
    action: "fetch residents",
    verb: Verb::Get,
    path: "/admin/api/residents",
    required: &[],
    numeric: &[],
    choices: &[],
    body_fields: None,
    session: true,
    success: SuccessShape::Listing(map_listing),
    envelope: Envelope::Error,
};

pub static CREATE: ResourceDescriptor = ResourceDescriptor {
    resource: "residents",
    label: "Residents",
    action: "create resident",
    verb: Verb::Post,
    path: "/admin/addNewResident",
    required: &[
        "first_name",
        "last_name",
        "mobile_number",
        "emergency_number",
        "birth_date",
        "number_of_member",
        "block",
        "floor_number",
        "flat_number",
        "email",
        "create_password",
    ],
    numeric: &[
        NumericField::integer("mobile_number"),
        NumericField::integer("emergency_number"),
        NumericField::integer("number_of_member").positive(),
        NumericField::integer("floor_number"),
        NumericField::integer("flat_number"),
    ],
    choices: &[],
    body_fields: None,
    session: true,
    success: SuccessShape::PassThrough {
        default_message: "Resident created successfully",
    },
    envelope: Envelope::Error,
};

pub static DELETE: ResourceDescriptor = ResourceDescriptor {
    resource: "residents",
    label: "Residents",
    action: "delete resident",
    verb: Verb::Delete,
    path: "/admin/residents/{id}",
    required: &[],
    numeric: &[],
    choices: &[],
    body_fields: None,
    session: true,
    success: SuccessShape::Message("Resident deleted successfully"),
    envelope: Envelope::Error,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::validation::prepare_body;
    use crate::forward::FieldError;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_full_record_flattens() {
        let body = json!([{
            "_id": { "$oid": "650a1b" },
            "first_name": "Meera",
            "last_name": "Iyer",
            "block": "C",
            "flat_number": 302,
            "email": "meera@example.com",
            "mobile_number": 9123456780_i64,
            "number_of_member": 4,
            "two_wheeler": "KA01XY9999",
            "four_wheeler": "KA01ZZ0001",
            "status": "active",
            "createdAt": "2024-12-31T22:30:00.000-02:00"
        }]);

        let views = map_listing(body).unwrap();
        assert_eq!(
            views,
            json!([{
                "id": "650a1b",
                "name": "Meera Iyer",
                "flat": "C-302",
                "joined": "2025-01-01",
                "email": "meera@example.com",
                "phone": "9123456780",
                "members": 4,
                "vehicles": 2,
                "status": "active"
            }])
        );
    }

    #[test]
    fn test_missing_created_at_is_not_available() {
        let views = map_listing(json!([{ "_id": "r9", "first_name": "Kabir", "status": "active" }])).unwrap();
        assert_eq!(views[0]["joined"], json!("N/A"));
        assert_eq!(views[0]["name"], json!("Kabir"));
        assert_eq!(views[0]["vehicles"], json!(0));
    }

    #[test]
    fn test_every_record_maps_even_garbage() {
        let views = map_listing(json!([null, 42, { "status": "suspended", "createdAt": "yesterday" }])).unwrap();
        let views = views.as_array().unwrap();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0]["status"], json!("inactive"));
        assert_eq!(views[2]["joined"], json!("N/A"));
        assert_eq!(views[2]["status"], json!("inactive"));
    }

    #[test]
    fn test_non_list_is_rejected() {
        assert!(map_listing(json!({ "residents": [] })).is_none());
    }

    #[test]
    fn test_calendar_date_formats() {
        assert_eq!(calendar_date("2024-03-05T10:00:00Z").as_deref(), Some("2024-03-05"));
        assert_eq!(calendar_date("2024-03-05").as_deref(), Some("2024-03-05"));
        assert_eq!(calendar_date("1709632800000").as_deref(), Some("2024-03-05"));
        assert_eq!(calendar_date("not a date"), None);
    }

    fn new_resident() -> Value {
        json!({
            "first_name": "Ravi",
            "last_name": "Shah",
            "mobile_number": "9876543210",
            "emergency_number": "9123456780",
            "birth_date": "1988-04-12",
            "number_of_member": "3",
            "block": "B",
            "floor_number": "2",
            "flat_number": "204",
            "email": "ravi@example.com",
            "create_password": "s3cret!",
        })
    }

    #[rstest]
    #[case("first_name")]
    #[case("last_name")]
    #[case("mobile_number")]
    #[case("emergency_number")]
    #[case("birth_date")]
    #[case("number_of_member")]
    #[case("block")]
    #[case("floor_number")]
    #[case("flat_number")]
    #[case("email")]
    #[case("create_password")]
    fn test_create_requires_every_field(#[case] field: &'static str) {
        let mut body = new_resident();
        body.as_object_mut().unwrap().remove(field);
        assert_eq!(prepare_body(&CREATE, Some(body)), Err(FieldError::Missing { field }));
    }

    #[test]
    fn test_create_coerces_integer_fields() {
        let sent = prepare_body(&CREATE, Some(new_resident())).unwrap();
        assert_eq!(sent["mobile_number"], json!(9_876_543_210_i64));
        assert_eq!(sent["emergency_number"], json!(9_123_456_780_i64));
        assert_eq!(sent["number_of_member"], json!(3));
        assert_eq!(sent["floor_number"], json!(2));
        assert_eq!(sent["flat_number"], json!(204));
        assert_eq!(sent["block"], json!("B"));
    }

    #[rstest]
    #[case("floor_number", json!("2.5"), FieldError::NotInteger { field: "floor_number" })]
    #[case("mobile_number", json!("98765-43210"), FieldError::NotNumeric { field: "mobile_number" })]
    #[case("number_of_member", json!("0"), FieldError::NotPositive { field: "number_of_member" })]
    #[case("number_of_member", json!(-2), FieldError::NotPositive { field: "number_of_member" })]
    #[case("flat_number", json!("B-204"), FieldError::NotNumeric { field: "flat_number" })]
    fn test_create_rejects_bad_numbers(
        #[case] field: &str,
        #[case] value: Value,
        #[case] expected: FieldError,
    ) {
        let mut body = new_resident();
        body[field] = value;
        assert_eq!(prepare_body(&CREATE, Some(body)), Err(expected));
    }
}
