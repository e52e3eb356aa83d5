//! Static per-route chains. Declared order is the order failures are
//! reported in.

use super::{Chain, Check, FieldRule};

/// Register and user update: email format plus uniqueness (self-excluded
/// on update), name and password present.
pub const USER: Chain = &[
    FieldRule {
        field: "name",
        checks: &[Check::Required {
            message: "name is required",
        }],
    },
    FieldRule {
        field: "email",
        checks: &[
            Check::Email {
                message: "invalid email",
            },
            Check::Unique {
                table: "users",
                column: "email",
                message: "email already registered",
            },
        ],
    },
    FieldRule {
        field: "password",
        checks: &[Check::Required {
            message: "password is required",
        }],
    },
];

pub const PATIENT: Chain = &[FieldRule {
    field: "dni",
    checks: &[
        Check::Length {
            min: 7,
            max: 10,
            message: "DNI must be 7 to 10 characters",
        },
        Check::Numeric {
            message: "DNI must contain only digits",
        },
        Check::Unique {
            table: "patients",
            column: "dni",
            message: "DNI already registered to another patient",
        },
    ],
}];

pub const DOCTOR: Chain = &[FieldRule {
    field: "license_number",
    checks: &[
        Check::Required {
            message: "license number is required",
        },
        Check::Unique {
            table: "doctors",
            column: "license_number",
            message: "license number already registered",
        },
    ],
}];

/// Appointment references: both foreign keys must be positive integers
/// naming rows that actually exist.
pub const APPOINTMENT: Chain = &[
    FieldRule {
        field: "patient_id",
        checks: &[
            Check::PositiveInt {
                message: "patient_id must be a positive integer",
            },
            Check::Exists {
                table: "patients",
                message: "patient does not exist",
            },
        ],
    },
    FieldRule {
        field: "doctor_id",
        checks: &[
            Check::PositiveInt {
                message: "doctor_id must be a positive integer",
            },
            Check::Exists {
                table: "doctors",
                message: "doctor does not exist",
            },
        ],
    },
];
