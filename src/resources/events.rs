//! Resident event booking.

use crate::forward::descriptor::{Envelope, NumericField, ResourceDescriptor, SuccessShape, Verb};

pub static BOOK: ResourceDescriptor = ResourceDescriptor {
    resource: "events",
    label: "Events",
    action: "book event",
    verb: Verb::Post,
    path: "/resident/api/events",
    required: &["title", "venueId", "attendees", "date", "startTime", "endTime"],
    numeric: &[NumericField::integer("attendees").positive()],
    choices: &[],
    body_fields: None,
    session: true,
    success: SuccessShape::PassThrough {
        default_message: "Event booked successfully",
    },
    envelope: Envelope::Status,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::stub::{target, StubTransport};
    use crate::forward::validation::prepare_body;
    use crate::forward::{FieldError, ForwardRequest, Forwarder};
    use axum::http::StatusCode;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn booking() -> Value {
        json!({
            "title": "Diwali night",
            "venueId": "clubhouse",
            "attendees": "120",
            "date": "2025-11-01",
            "startTime": "18:00",
            "endTime": "23:00",
        })
    }

    #[rstest]
    #[case("title")]
    #[case("venueId")]
    #[case("attendees")]
    #[case("date")]
    #[case("startTime")]
    #[case("endTime")]
    fn test_every_required_field(#[case] field: &'static str) {
        let mut body = booking();
        body.as_object_mut().unwrap().remove(field);
        assert_eq!(prepare_body(&BOOK, Some(body)), Err(FieldError::Missing { field }));
    }

    #[rstest]
    #[case(json!("0"), Err(FieldError::NotPositive { field: "attendees" }))]
    #[case(json!(-4), Err(FieldError::NotPositive { field: "attendees" }))]
    #[case(json!("12.5"), Err(FieldError::NotInteger { field: "attendees" }))]
    #[case(json!("many"), Err(FieldError::NotNumeric { field: "attendees" }))]
    #[case(json!("120"), Ok(json!(120)))]
    #[case(json!(40.0), Ok(json!(40)))]
    fn test_attendees_is_positive_integer(
        #[case] attendees: Value,
        #[case] expected: Result<Value, FieldError>,
    ) {
        let mut body = booking();
        body["attendees"] = attendees;
        let result = prepare_body(&BOOK, Some(body)).map(|sent| sent["attendees"].clone());
        assert_eq!(result, expected);
    }

    #[tokio::test]
    async fn test_rejection_uses_status_envelope() {
        let stub = StubTransport::replying(200, "{}");
        let forwarder = Forwarder::new(stub.clone());
        let mut body = booking();
        body.as_object_mut().unwrap().remove("venueId");

        let response = forwarder
            .forward(
                &target(),
                &BOOK,
                ForwardRequest {
                    body: Some(body),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body,
            json!({ "success": false, "message": "venueId is required" })
        );
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_booking_reaches_event_route() {
        let stub = StubTransport::replying(201, "");
        let forwarder = Forwarder::new(stub.clone());

        let response = forwarder
            .forward(
                &target(),
                &BOOK,
                ForwardRequest {
                    body: Some(booking()),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(
            response.body,
            json!({ "success": true, "message": "Event booked successfully" })
        );
        let call = stub.last_call();
        assert_eq!(call.url.path(), "/resident/api/events");
        assert_eq!(call.body.unwrap()["attendees"], json!(120));
    }
}
