//! Managed authentication service adapter.

mod password_grant;

pub use password_grant::PasswordGrantLoginService;
