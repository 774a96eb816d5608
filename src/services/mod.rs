pub mod auth_service;
pub mod mail_service;
pub mod otp_service;
pub mod question_service;
pub mod submission_service;
pub mod token_service;
