//! Bill and payment endpoints, plus the flattened payment view.
//!
//! Overdue flags and penalties are computed by the backend; this module only
//! relays them.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::forward::descriptor::{
    ChoiceField, Envelope, NumericField, ResourceDescriptor, SuccessShape, Verb,
};
use crate::resources::lenient;
use crate::resources::residents::ResidentRecord;

pub const BILL_TYPES: &[&str] = &["Maintenance", "Parking", "Water", "Electricity", "Other"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillTemplateRecord {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub bill_type: Option<String>,
}

/// Bill document as returned by the backend listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::record")]
    pub resident: ResidentRecord,
    #[serde(default, deserialize_with = "lenient::record")]
    pub bill_template: BillTemplateRecord,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<Number>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub penalty_amount: Option<Number>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_amount: Option<Number>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub formatted_due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_overdue: bool,
    #[serde(default, deserialize_with = "lenient::number")]
    pub days_overdue: Option<Number>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_paid: bool,
    #[serde(default, deserialize_with = "lenient::text")]
    pub paid_at_formatted: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub payment_status: Option<String>,
}

/// Payment row shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub id: String,
    pub resident_name: String,
    pub flat: String,
    pub bill_title: String,
    pub bill_type: String,
    pub base_amount: Number,
    pub penalty_amount: Number,
    pub current_amount: Number,
    pub due_date: String,
    pub is_overdue: bool,
    pub days_overdue: u64,
    pub is_paid: bool,
    pub paid_at: Option<String>,
    pub payment_status: String,
    pub resident_id: String,
    pub bill_template_id: String,
}

fn is_zero(n: &Number) -> bool {
    n.as_f64().map_or(true, |v| v == 0.0)
}

impl From<BillRecord> for PaymentView {
    fn from(bill: BillRecord) -> Self {
        let zero = Number::from(0);
        let base_amount = bill.amount.clone().unwrap_or_else(|| zero.clone());
        let current_amount = bill
            .current_amount
            .clone()
            .filter(|n| !is_zero(n))
            .unwrap_or_else(|| base_amount.clone());
        let payment_status = bill.payment_status.clone().unwrap_or_else(|| {
            if bill.is_paid {
                "Paid"
            } else if bill.is_overdue {
                "Overdue"
            } else {
                "Pending"
            }
            .to_string()
        });

        Self {
            id: bill.id.unwrap_or_default(),
            resident_name: bill.resident.display_name(),
            flat: bill.resident.flat(),
            bill_title: bill.bill_template.title.unwrap_or_default(),
            bill_type: bill.bill_template.bill_type.unwrap_or_default(),
            penalty_amount: bill.penalty_amount.unwrap_or(zero),
            base_amount,
            current_amount,
            due_date: bill.formatted_due_date.unwrap_or_else(|| "N/A".to_string()),
            is_overdue: bill.is_overdue,
            days_overdue: bill
                .days_overdue
                .and_then(|n| n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)))
                .unwrap_or(0),
            is_paid: bill.is_paid,
            paid_at: bill.paid_at_formatted,
            payment_status,
            resident_id: bill.resident.id.unwrap_or_default(),
            bill_template_id: bill.bill_template.id.unwrap_or_default(),
        }
    }
}

/// Map a backend bill listing to views; `None` if it is not a list.
pub fn map_listing(body: Value) -> Option<Value> {
    let Value::Array(records) = body else {
        return None;
    };
    let views: Vec<PaymentView> = records
        .into_iter()
        .map(|record| PaymentView::from(lenient::decode::<BillRecord>(record)))
        .collect();
    serde_json::to_value(views).ok()
}

pub static LIST: ResourceDescriptor = ResourceDescriptor {
    resource: "payments",
    label: "Payments",
    action: "fetch payments",
    verb: Verb::Get,
    path: "/admin/payments",
    required: &[],
    numeric: &[],
    choices: &[],
    body_fields: None,
    session: false,
    success: SuccessShape::Listing(map_listing),
    envelope: Envelope::Error,
};

pub static CREATE_BILL: ResourceDescriptor = ResourceDescriptor {
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
        allowed: BILL_TYPES,
    }],
    body_fields: Some(&["title", "type", "amount", "penalty", "dueDate"]),
    session: true,
    success: SuccessShape::MessageWithData("Bill created successfully"),
    envelope: Envelope::Error,
};

pub static MARK_PAID: ResourceDescriptor = ResourceDescriptor {
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
    success: SuccessShape::Message("Payment marked as paid successfully"),
    envelope: Envelope::Error,
};
