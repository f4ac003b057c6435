//! Shallow input validation and numeric coercion.
//!
//! Runs entirely before any network call. Checks happen in a fixed order:
//! required fields, numeric coercion, enumerated choices, then projection.

use serde_json::{Map, Number, Value};

use crate::forward::descriptor::{Bound, NumberKind, NumericField, ResourceDescriptor};
use crate::forward::error::FieldError;

/// Validate and coerce an inbound body into the body sent to the backend.
pub fn prepare_body(
    descriptor: &ResourceDescriptor,
    body: Option<Value>,
) -> Result<Value, FieldError> {
    let mut fields = match body {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(FieldError::MalformedBody),
    };

    for &field in descriptor.required {
        if fields.get(field).map_or(true, is_blank) {
            return Err(FieldError::Missing { field });
        }
    }

    for spec in descriptor.numeric {
        match fields.get(spec.name) {
            Some(value) if !is_blank(value) => {
                let number = coerce(spec, value)?;
                fields.insert(spec.name.to_string(), Value::Number(number));
            }
            _ => match spec.default.and_then(|d| to_json_number(spec.kind, d)) {
                Some(default) => {
                    fields.insert(spec.name.to_string(), Value::Number(default));
                }
                None => {
                    fields.remove(spec.name);
                }
            },
        }
    }

    for choice in descriptor.choices {
        if let Some(value) = fields.get(choice.name) {
            let allowed = value
                .as_str()
                .map(str::trim)
                .is_some_and(|v| choice.allowed.contains(&v));
            if !allowed {
                return Err(FieldError::NotAllowed {
                    field: choice.name,
                    allowed: choice.allowed,
                });
            }
        }
    }

    if let Some(keep) = descriptor.body_fields {
        fields.retain(|key, _| keep.contains(&key.as_str()));
    }

    Ok(Value::Object(fields))
}

/// Absent-equivalent values: null and whitespace-only strings.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coerce(spec: &NumericField, value: &Value) -> Result<Number, FieldError> {
    let field = spec.name;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let number = parsed
        .filter(|n| n.is_finite())
        .ok_or(FieldError::NotNumeric { field })?;

    if spec.kind == NumberKind::Integer && number.fract() != 0.0 {
        return Err(FieldError::NotInteger { field });
    }
    match spec.bound {
        Bound::Positive if number <= 0.0 => return Err(FieldError::NotPositive { field }),
        Bound::NonNegative if number < 0.0 => return Err(FieldError::Negative { field }),
        _ => {}
    }

    // Integers keep their exact textual value; long phone numbers exceed f64 precision.
    if let Value::String(s) = value {
        if let Ok(exact) = s.trim().parse::<i64>() {
            return Ok(Number::from(exact));
        }
    }
    if let Value::Number(n) = value {
        if n.is_i64() || n.is_u64() {
            return Ok(n.clone());
        }
    }
    to_json_number(spec.kind, number).ok_or(FieldError::NotNumeric { field })
}

/// Whole values become JSON integers so `12000` is not sent as `12000.0`.
fn to_json_number(kind: NumberKind, value: f64) -> Option<Number> {
    let whole = value.fract() == 0.0 && value.abs() < i64::MAX as f64;
    if kind == NumberKind::Integer || whole {
        whole.then(|| Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::descriptor::{ChoiceField, Envelope, SuccessShape, Verb};
    use rstest::rstest;
    use serde_json::json;

    const BILL: ResourceDescriptor = ResourceDescriptor {
        resource: "payments",
        label: "Payments",
        action: "create bill",
        verb: Verb::Post,
        path: "/admin/createBill",
        required: &["title", "type", "amount", "dueDate"],
        numeric: &[
            NumericField::decimal("amount").positive(),
            NumericField::decimal("penalty").non_negative().or_default(0.0),
        ],
        choices: &[ChoiceField {
            name: "type",
            allowed: &["Maintenance", "Water"],
        }],
        body_fields: Some(&["title", "type", "amount", "penalty", "dueDate"]),
        session: true,
        success: SuccessShape::MessageWithData("Bill created successfully"),
        envelope: Envelope::Error,
    };

    fn bill() -> Value {
        json!({
            "title": "October maintenance",
            "type": "Maintenance",
            "amount": "1500.50",
            "dueDate": "2025-10-31",
        })
    }

    #[test]
    fn test_coerces_and_defaults() {
        let body = prepare_body(&BILL, Some(bill())).unwrap();
        assert_eq!(body["amount"], json!(1500.5));
        assert_eq!(body["penalty"], json!(0));
    }

    #[test]
    fn test_whole_amount_stays_integer() {
        let mut input = bill();
        input["amount"] = json!("2000");
        input["penalty"] = json!(" 50 ");
        let body = prepare_body(&BILL, Some(input)).unwrap();
        assert_eq!(body["amount"], json!(2000));
        assert_eq!(body["penalty"], json!(50));
    }

    #[test]
    fn test_projection_drops_unlisted_fields() {
        let mut input = bill();
        input["resident"] = json!("someone");
        let body = prepare_body(&BILL, Some(input)).unwrap();
        assert!(body.get("resident").is_none());
    }

    #[rstest]
    #[case("title")]
    #[case("type")]
    #[case("amount")]
    #[case("dueDate")]
    fn test_missing_required_field(#[case] field: &'static str) {
        let mut input = bill();
        input.as_object_mut().unwrap().remove(field);
        assert_eq!(
            prepare_body(&BILL, Some(input)),
            Err(FieldError::Missing { field })
        );
    }

    #[rstest]
    #[case(json!(""))]
    #[case(json!("   "))]
    #[case(Value::Null)]
    fn test_blank_counts_as_missing(#[case] title: Value) {
        let mut input = bill();
        input["title"] = title;
        assert_eq!(
            prepare_body(&BILL, Some(input)),
            Err(FieldError::Missing { field: "title" })
        );
    }

    #[rstest]
    #[case(json!("abc"), FieldError::NotNumeric { field: "amount" })]
    #[case(json!("NaN"), FieldError::NotNumeric { field: "amount" })]
    #[case(json!(true), FieldError::NotNumeric { field: "amount" })]
    #[case(json!("0"), FieldError::NotPositive { field: "amount" })]
    #[case(json!(-10), FieldError::NotPositive { field: "amount" })]
    fn test_invalid_amount(#[case] amount: Value, #[case] expected: FieldError) {
        let mut input = bill();
        input["amount"] = amount;
        assert_eq!(prepare_body(&BILL, Some(input)), Err(expected));
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let mut input = bill();
        input["penalty"] = json!("-1");
        assert_eq!(
            prepare_body(&BILL, Some(input)),
            Err(FieldError::Negative { field: "penalty" })
        );
    }

    #[test]
    fn test_unknown_choice_rejected() {
        let mut input = bill();
        input["type"] = json!("Gym");
        assert!(matches!(
            prepare_body(&BILL, Some(input)),
            Err(FieldError::NotAllowed { field: "type", .. })
        ));
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert_eq!(prepare_body(&BILL, Some(json!([1, 2]))), Err(FieldError::MalformedBody));
    }

    #[test]
    fn test_missing_body_reports_first_required_field() {
        assert_eq!(prepare_body(&BILL, None), Err(FieldError::Missing { field: "title" }));
    }

    #[test]
    fn test_integer_keeps_long_phone_number_exact() {
        const PHONE: ResourceDescriptor = ResourceDescriptor {
            numeric: &[NumericField::integer("contact")],
            required: &["contact"],
            choices: &[],
            body_fields: None,
            ..BILL
        };
        let body = prepare_body(&PHONE, Some(json!({ "contact": "9998887777" }))).unwrap();
        assert_eq!(body["contact"], json!(9_998_887_777_i64));

        assert_eq!(
            prepare_body(&PHONE, Some(json!({ "contact": "12.5" }))),
            Err(FieldError::NotInteger { field: "contact" })
        );
    }
}
