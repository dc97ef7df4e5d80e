//! Student authentication state, its session storage and the guard for
//! student-only pages.

pub mod context;
pub mod guard;
pub mod session;

pub use context::{AuthState, AuthStatus};
pub use guard::{require_student, GuardDecision, StudentSession};
pub use session::{AuthContext, CurrentStudent};
