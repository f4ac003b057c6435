//! Resident complaint endpoints.

use crate::forward::descriptor::{ChoiceField, Envelope, ResourceDescriptor, SuccessShape, Verb};

pub const PRIORITIES: &[&str] = &["Low", "Medium", "High"];

pub static LIST: ResourceDescriptor = ResourceDescriptor {
    resource: "complaints",
    label: "Complaints",
    action: "fetch complaints",
    verb: Verb::Get,
    path: "/resident/api/complaints",
    required: &[],
    numeric: &[],
    choices: &[],
    body_fields: None,
    session: true,
    success: SuccessShape::PassThrough {
        default_message: "No complaints found",
    },
    envelope: Envelope::Status,
};

pub static CREATE: ResourceDescriptor = ResourceDescriptor {
    resource: "complaints",
    label: "Complaints",
    action: "submit complaint",
    verb: Verb::Post,
    path: "/resident/api/complaints",
    required: &["title", "category", "priority", "description"],
    numeric: &[],
    choices: &[ChoiceField {
        name: "priority",
        allowed: PRIORITIES,
    }],
    body_fields: Some(&["title", "category", "priority", "description", "date"]),
    session: true,
    success: SuccessShape::PassThrough {
        default_message: "Complaint submitted successfully",
    },
    envelope: Envelope::Status,
};
