use crate::domain::model::{Destination, Role};

/// 多重角色時的固定優先順序：admin > tenant > owner
pub const ROLE_PRIORITY: [(Role, Destination); 3] = [
    (Role::Admin, Destination::AdminDashboard),
    (Role::Tenant, Destination::TenantDashboard),
    (Role::Owner, Destination::OwnerDashboard),
];

pub fn destination_for_roles(roles: &[Role]) -> Destination {
    ROLE_PRIORITY
        .iter()
        .find(|(role, _)| roles.contains(role))
        .map(|(_, destination)| *destination)
        .unwrap_or(Destination::Home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_and_admin_goes_to_admin() {
        let roles = vec![Role::Owner, Role::Admin];
        assert_eq!(destination_for_roles(&roles), Destination::AdminDashboard);
        assert_eq!(destination_for_roles(&roles).path(), "/admin/dashboard");
    }

    #[test]
    fn test_tenant_beats_owner() {
        assert_eq!(
            destination_for_roles(&[Role::Owner, Role::Tenant]),
            Destination::TenantDashboard
        );
    }

    #[test]
    fn test_single_and_missing_roles() {
        assert_eq!(destination_for_roles(&[Role::Owner]), Destination::OwnerDashboard);
        assert_eq!(destination_for_roles(&[]), Destination::Home);
        assert_eq!(
            destination_for_roles(&[Role::Other("auditor".to_string())]),
            Destination::Home
        );
    }
}
