use serde::{Deserialize, Serialize};

/// The portal's caller roles. The core trusts whatever identity it is handed
/// and performs no authorization itself; these helpers exist for callers
/// that gate access before invoking an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Executive,
    Teacher,
    Superadmin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Executive => "executive",
            Role::Teacher => "teacher",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "exec" | "executive" => Some(Role::Executive),
            "teacher" => Some(Role::Teacher),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    pub const fn may_submit_applications(self) -> bool {
        match self {
            Role::Student => true,
            Role::Executive | Role::Teacher | Role::Superadmin => false,
        }
    }

    pub const fn may_grade(self) -> bool {
        match self {
            Role::Executive | Role::Superadmin => true,
            Role::Student | Role::Teacher => false,
        }
    }

    pub const fn may_schedule(self) -> bool {
        match self {
            Role::Superadmin => true,
            Role::Student | Role::Executive | Role::Teacher => false,
        }
    }
}
