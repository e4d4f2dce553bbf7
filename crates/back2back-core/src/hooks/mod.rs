//! Screen-level data hooks.
//!
//! Each hook owns the cached resources for one screen and exposes the value,
//! loading and error state, a `reload()`, and the screen's mutation:
//! - `GymLocations`: locations and the primary gym (`set_primary`)
//! - `Membership`: plans and the current plan (`change_plan`)
//! - `UserProfile`: the member's profile (`update`)

pub mod gym_locations;
pub mod membership;
pub mod user_info;

pub use gym_locations::{GymLocations, GYM_LOCATIONS_KEY};
pub use membership::{Membership, MembershipView, CURRENT_MEMBERSHIP_KEY, MEMBERSHIP_PLANS_KEY};
pub use user_info::{UserProfile, USER_PROFILE_KEY};
