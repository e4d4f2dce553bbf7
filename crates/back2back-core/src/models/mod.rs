//! Data models for Back2Back entities.
//!
//! - `GymLocation`: a club the member can check in at, one of them primary
//! - `MembershipPlan`: a purchasable plan with pricing and features
//! - `UserInfo`: the member's editable profile

pub mod gym;
pub mod membership;
pub mod user;

pub use gym::GymLocation;
pub use membership::MembershipPlan;
pub use user::UserInfo;
