//! Access policy: which role or permission each operation requires.
//!
//! Every handler goes through [`authorize`] with its [`Operation`]; the
//! requirements live in one table instead of being repeated per endpoint.

use crate::{
    error::{AppError, AppResult},
    models::user::{Group, Permission, UserClaims},
};

/// Everything a client can ask the server to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewSummary,
    ViewCatalog,
    SearchBooks,
    ViewSession,
    ViewOwnLoans,
    ViewAllLoans,
    IssueBook,
    ReturnBook,
    RenewBook,
    CreateInstance,
    UpdateInstance,
    DeleteInstance,
    CreateAuthor,
    UpdateAuthor,
    DeleteAuthor,
    CreateBook,
    UpdateBook,
    DeleteBook,
    ManageTaxonomy,
    ManageMembers,
    ManageAccess,
}

impl Operation {
    pub const ALL: [Operation; 21] = [
        Operation::ViewSummary,
        Operation::ViewCatalog,
        Operation::SearchBooks,
        Operation::ViewSession,
        Operation::ViewOwnLoans,
        Operation::ViewAllLoans,
        Operation::IssueBook,
        Operation::ReturnBook,
        Operation::RenewBook,
        Operation::CreateInstance,
        Operation::UpdateInstance,
        Operation::DeleteInstance,
        Operation::CreateAuthor,
        Operation::UpdateAuthor,
        Operation::DeleteAuthor,
        Operation::CreateBook,
        Operation::UpdateBook,
        Operation::DeleteBook,
        Operation::ManageTaxonomy,
        Operation::ManageMembers,
        Operation::ManageAccess,
    ];
}

/// What the caller must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Anyone,
    Authenticated,
    Permission(Permission),
    Group(Group),
    Superuser,
}

/// The policy table
pub const POLICY: &[(Operation, Requirement)] = &[
    (Operation::ViewSummary, Requirement::Anyone),
    (Operation::ViewCatalog, Requirement::Anyone),
    (Operation::SearchBooks, Requirement::Anyone),
    (Operation::ViewSession, Requirement::Authenticated),
    (Operation::ViewOwnLoans, Requirement::Authenticated),
    (Operation::ViewAllLoans, Requirement::Permission(Permission::CanMarkReturned)),
    (Operation::IssueBook, Requirement::Permission(Permission::CanMarkReturned)),
    (Operation::ReturnBook, Requirement::Permission(Permission::CanMarkReturned)),
    (Operation::RenewBook, Requirement::Permission(Permission::CanMarkReturned)),
    (Operation::CreateInstance, Requirement::Group(Group::Librarian)),
    (Operation::UpdateInstance, Requirement::Authenticated),
    (Operation::DeleteInstance, Requirement::Authenticated),
    (Operation::CreateAuthor, Requirement::Permission(Permission::AddAuthor)),
    (Operation::UpdateAuthor, Requirement::Permission(Permission::ChangeAuthor)),
    (Operation::DeleteAuthor, Requirement::Permission(Permission::DeleteAuthor)),
    (Operation::CreateBook, Requirement::Permission(Permission::AddBook)),
    (Operation::UpdateBook, Requirement::Permission(Permission::ChangeBook)),
    (Operation::DeleteBook, Requirement::Permission(Permission::DeleteBook)),
    (Operation::ManageTaxonomy, Requirement::Permission(Permission::CanManageTaxonomy)),
    (Operation::ManageMembers, Requirement::Permission(Permission::CanManageMembers)),
    (Operation::ManageAccess, Requirement::Superuser),
];

/// Requirement for `operation`; operations missing from the table are
/// reserved to superusers.
pub fn requirement(operation: Operation) -> Requirement {
    POLICY
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, requirement)| *requirement)
        .unwrap_or(Requirement::Superuser)
}

/// Check `claims` (None for an anonymous caller) against the table
pub fn authorize(operation: Operation, claims: Option<&UserClaims>) -> AppResult<()> {
    let requirement = requirement(operation);
    if requirement == Requirement::Anyone {
        return Ok(());
    }

    let claims = claims.ok_or_else(|| AppError::Authentication("Login required".to_string()))?;

    let allowed = match requirement {
        Requirement::Anyone | Requirement::Authenticated => true,
        Requirement::Permission(permission) => claims.has_permission(permission),
        Requirement::Group(group) => claims.in_group(group),
        Requirement::Superuser => claims.is_superuser,
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(user = %claims.sub, ?operation, ?requirement, "Access denied");
        Err(AppError::Authorization(denial_message(requirement)))
    }
}

fn denial_message(requirement: Requirement) -> String {
    match requirement {
        Requirement::Permission(permission) => format!("Permission '{}' required", permission),
        Requirement::Group(group) => format!("Membership in group '{}' required", group.as_str()),
        _ => "Administrator privileges required".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: Vec<Permission>, groups: Vec<Group>) -> UserClaims {
        UserClaims {
            sub: "testuser".into(),
            user_id: 1,
            is_superuser: false,
            groups,
            permissions,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_every_operation_has_one_entry() {
        for op in Operation::ALL {
            let entries = POLICY.iter().filter(|(o, _)| *o == op).count();
            assert_eq!(entries, 1, "{:?} must appear exactly once", op);
        }
        assert_eq!(POLICY.len(), Operation::ALL.len());
    }

    #[test]
    fn test_anonymous_access() {
        assert!(authorize(Operation::ViewCatalog, None).is_ok());
        assert!(authorize(Operation::SearchBooks, None).is_ok());
        assert!(matches!(
            authorize(Operation::ViewOwnLoans, None),
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            authorize(Operation::IssueBook, None),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn test_plain_member() {
        let member = claims(vec![], vec![]);
        assert!(authorize(Operation::ViewOwnLoans, Some(&member)).is_ok());
        assert!(authorize(Operation::DeleteInstance, Some(&member)).is_ok());
        for op in [
            Operation::IssueBook,
            Operation::ReturnBook,
            Operation::RenewBook,
            Operation::ViewAllLoans,
            Operation::ManageMembers,
            Operation::CreateInstance,
            Operation::ManageAccess,
        ] {
            assert!(matches!(
                authorize(op, Some(&member)),
                Err(AppError::Authorization(_))
            ));
        }
    }

    #[test]
    fn test_circulation_permission() {
        let staff = claims(vec![Permission::CanMarkReturned], vec![]);
        assert!(authorize(Operation::IssueBook, Some(&staff)).is_ok());
        assert!(authorize(Operation::ReturnBook, Some(&staff)).is_ok());
        assert!(authorize(Operation::RenewBook, Some(&staff)).is_ok());
        assert!(authorize(Operation::ManageMembers, Some(&staff)).is_err());
    }

    #[test]
    fn test_librarian_group_creates_instances() {
        let librarian = claims(vec![], vec![Group::Librarian]);
        assert!(authorize(Operation::CreateInstance, Some(&librarian)).is_ok());
        assert!(authorize(Operation::CreateBook, Some(&librarian)).is_err());
    }

    #[test]
    fn test_superuser_passes_everything() {
        let mut admin = claims(vec![], vec![]);
        admin.is_superuser = true;
        for op in Operation::ALL {
            assert!(authorize(op, Some(&admin)).is_ok(), "{:?}", op);
        }
    }
}
