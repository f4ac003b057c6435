//! Employee endpoints.

use crate::forward::descriptor::{
    ChoiceField, Envelope, NumericField, ResourceDescriptor, SuccessShape, Verb,
};

pub const EMPLOYEE_STATUSES: &[&str] = &["Active", "On Leave", "Inactive"];

/// `{ employees: [...], stats: {...} }`, relayed unchanged.
pub static LIST: ResourceDescriptor = ResourceDescriptor {
    resource: "employees",
    label: "Employees",
    action: "fetch employees",
    verb: Verb::Get,
    path: "/admin/employees",
    required: &[],
    numeric: &[],
    choices: &[],
    body_fields: None,
    session: true,
    success: SuccessShape::PassThrough {
        default_message: "No employees found",
    },
    envelope: Envelope::Error,
};

pub static CREATE: ResourceDescriptor = ResourceDescriptor {
    resource: "employees",
    label: "Employees",
    action: "create employee",
    verb: Verb::Post,
    path: "/admin/employees",
    required: &["name", "role", "contact", "salary", "join_date", "location", "status"],
    numeric: &[
        NumericField::integer("contact"),
        NumericField::decimal("salary").positive(),
    ],
    choices: &[ChoiceField {
        name: "status",
        allowed: EMPLOYEE_STATUSES,
    }],
    body_fields: None,
    session: true,
    success: SuccessShape::PassThrough {
        default_message: "Employee added successfully",
    },
    envelope: Envelope::Error,
};
