//! Route protection and post-auth navigation.

use crate::models::{Role, Session};

/// Paths reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &["/", "/register"];
/// Where a signed-out visitor is sent.
pub const LOGIN_ROUTE: &str = "/register";
/// Where logout lands.
pub const LOGOUT_ROUTE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    Redirect(&'static str),
}

// Trailing slashes and query strings do not change the route.
fn route_of(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&route_of(path))
}

/// Decide whether `path` may render for the given session.
pub fn guard_route(path: &str, session: Option<&Session>) -> RouteDecision {
    if session.is_some() || is_public(path) {
        RouteDecision::Allow
    } else {
        RouteDecision::Redirect(LOGIN_ROUTE)
    }
}

/// First page after login or registration.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Buyer => "/marketplace",
        Role::Farmer => "/irrigation",
    }
}

/// Navigation entries shown to a role, in display order.
pub fn nav_routes(role: Role) -> &'static [&'static str] {
    match role {
        Role::Buyer => &["/marketplace"],
        Role::Farmer => &[
            "/calendar",
            "/irrigation",
            "/doctor",
            "/market",
            "/estimator",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;

    fn buyer() -> Session {
        Session {
            id: UserId(9),
            full_name: "Aziz".to_string(),
            role: Role::Buyer,
            region: "Tashkent".to_string(),
            email: None,
            phone_number: None,
        }
    }

    #[test]
    fn test_public_routes_need_no_session() {
        assert_eq!(guard_route("/", None), RouteDecision::Allow);
        assert_eq!(guard_route("/register", None), RouteDecision::Allow);
        assert_eq!(guard_route("/register/?next=x", None), RouteDecision::Allow);
    }

    #[test]
    fn test_protected_routes_redirect_to_login() {
        for path in ["/marketplace", "/irrigation", "/calendar", "/market"] {
            assert_eq!(guard_route(path, None), RouteDecision::Redirect("/register"));
            assert_eq!(guard_route(path, Some(&buyer())), RouteDecision::Allow);
        }
    }

    #[test]
    fn test_landing_and_nav_by_role() {
        assert_eq!(landing_route(Role::Buyer), "/marketplace");
        assert_eq!(landing_route(Role::Farmer), "/irrigation");
        assert_eq!(nav_routes(Role::Buyer), &["/marketplace"]);
        assert!(nav_routes(Role::Farmer).contains(&"/estimator"));
        assert!(!nav_routes(Role::Farmer).contains(&"/marketplace"));
    }
}
