use crate::constants::{ERR_INVALID_EMAIL, ERR_PASSWORD_MISMATCH, MIN_PASSWORD_LEN};
use crate::error::{AppError, Result};
use crate::models::UserRecord;

/// Validate registration form fields
pub fn validate_registration(
    full_name: &str,
    email: &str,
    mobile: &str,
    password: &str,
    confirm_password: &str,
) -> Result<()> {
    if full_name.trim().is_empty() {
        return Err(AppError::InvalidInput("Full name is required".to_string()));
    }
    if !UserRecord::validate_email(email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }
    if mobile.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Mobile number is required".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirm_password {
        return Err(AppError::InvalidInput(ERR_PASSWORD_MISMATCH.to_string()));
    }
    Ok(())
}

/// Validate admin task-creation form fields
pub fn validate_new_task(title: &str, points: i64, link: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }
    if points <= 0 {
        return Err(AppError::InvalidInput(
            "Points must be greater than zero".to_string(),
        ));
    }
    if !link.starts_with("http://") && !link.starts_with("https://") {
        return Err(AppError::InvalidInput(
            "Link must be an http(s) URL".to_string(),
        ));
    }
    Ok(())
}

/// Percent-encode a string for use in a URL query component
///
/// Unreserved characters per RFC 3986 pass through; everything else is
/// encoded byte-wise.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Build the prefilled support deep link returned with a withdrawal
/// submission
pub fn support_deep_link(
    contact: &str,
    amount: i64,
    method_label: &str,
    account_details: &str,
) -> String {
    let message = format!(
        "Hello! I have requested a withdrawal of Rs. {} via {} on EarnTask Pro. Account: {}. Please verify.",
        amount, method_label, account_details
    );
    format!(
        "https://wa.me/{}?text={}",
        contact,
        encode_uri_component(&message)
    )
}
