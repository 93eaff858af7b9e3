use shared::domain::{Role, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    StaffScan,
    AdminDashboard,
    EventsList,
}

impl Destination {
    pub fn route_name(self) -> &'static str {
        match self {
            Destination::StaffScan => "scan",
            Destination::AdminDashboard => "dashboard",
            Destination::EventsList => "events",
        }
    }

    pub fn params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Destination::EventsList => &[("screen", "HomeScreen")],
            Destination::StaffScan | Destination::AdminDashboard => &[],
        }
    }
}

struct RoutingRule {
    name: &'static str,
    matches: fn(&UserProfile) -> bool,
    destination: Destination,
}

// Evaluated in order; the first match wins.
const ROUTING_RULES: [RoutingRule; 3] = [
    RoutingRule {
        name: "staff-attendee",
        matches: |profile| profile.is_staff && profile.role == Role::Attendee,
        destination: Destination::StaffScan,
    },
    RoutingRule {
        name: "admin",
        matches: |profile| profile.role == Role::Admin,
        destination: Destination::AdminDashboard,
    },
    RoutingRule {
        name: "default",
        matches: |_| true,
        destination: Destination::EventsList,
    },
];

pub fn destination_for(profile: &UserProfile) -> Destination {
    ROUTING_RULES
        .iter()
        .find(|rule| (rule.matches)(profile))
        .map(|rule| {
            tracing::debug!(rule = rule.name, user_id = %profile.id, "routing rule matched");
            rule.destination
        })
        .unwrap_or(Destination::EventsList)
}

/// Screen navigation owned by the UI layer.
pub trait Navigator: Send + Sync {
    /// Replaces the whole navigation stack with `route_name`.
    fn reset_to(&self, route_name: &str, params: &[(&str, &str)]);
}

#[cfg(test)]
mod tests {
    use shared::domain::UserId;

    use super::*;

    fn profile(role: Role, is_staff: bool) -> UserProfile {
        UserProfile {
            id: UserId(1),
            username: "u".into(),
            role,
            is_staff,
            email: None,
            avatar: None,
        }
    }

    #[test]
    fn staff_attendee_goes_to_scan() {
        assert_eq!(
            destination_for(&profile(Role::Attendee, true)),
            Destination::StaffScan
        );
    }

    #[test]
    fn admin_goes_to_dashboard_even_when_staff() {
        assert_eq!(
            destination_for(&profile(Role::Admin, true)),
            Destination::AdminDashboard
        );
        assert_eq!(
            destination_for(&profile(Role::Admin, false)),
            Destination::AdminDashboard
        );
    }

    #[test]
    fn everyone_else_lands_on_events() {
        for (role, is_staff) in [
            (Role::Attendee, false),
            (Role::Organizer, true),
            (Role::Organizer, false),
            (Role::Other, true),
        ] {
            let destination = destination_for(&profile(role, is_staff));
            assert_eq!(destination, Destination::EventsList, "{role:?} staff={is_staff}");
        }
        assert_eq!(
            Destination::EventsList.params(),
            &[("screen", "HomeScreen")]
        );
    }
}
