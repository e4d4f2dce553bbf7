//! Utility functions for validating and formatting profile input.

pub mod validation;

pub use validation::{
    clean_phone_number, format_phone_number, is_valid_email, is_valid_name, is_valid_phone_number,
};
