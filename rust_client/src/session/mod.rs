//! Client-asserted session state.
//!
//! The signed-in user is read from local storage and trusted as is. There is
//! no expiry and no server round trip; logout simply forgets the record.

pub mod context;
pub mod guard;
pub mod storage;

pub use context::{
    Language, SessionContext, SessionEvent, SubscriptionId, LANGUAGE_KEY, SESSION_KEY,
};
pub use guard::{
    guard_route, is_public, landing_route, nav_routes, RouteDecision, LOGIN_ROUTE, LOGOUT_ROUTE,
    PUBLIC_ROUTES,
};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
