use crate::error::PayrollError;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            5 => Some(Role::ApiUser),
            _ => None,
        }
    }
}

/// Explicit credential/context object passed to every collaborator call.
///
/// The transport layer owns token verification; by the time a session is
/// constructed the caller identity is already resolved into this record.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl AuthContext {
    pub fn new(user_id: u64, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            employee_id: None,
        }
    }

    pub fn require_payroll_access(&self) -> Result<(), PayrollError> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(PayrollError::Forbidden(format!(
                "user '{}' may not run payroll (HR/Admin only)",
                self.username
            )))
        }
    }

    /// Returns true if the user is an employee
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }
}
