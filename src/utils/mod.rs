pub mod crypto;
pub mod otp;
pub mod time;
pub mod validation;
