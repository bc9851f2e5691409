use crate::utils::error::{AppError, AppResult};

fn is_printable_ascii(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii() && !c.is_ascii_control())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.is_empty() {
        return Err(AppError::Validation("Username cannot be empty".to_string()));
    }

    if username.len() > 64 {
        return Err(AppError::Validation(
            "Username must be at most 64 characters long".to_string(),
        ));
    }

    if !is_printable_ascii(username) {
        return Err(AppError::Validation(
            "Username must contain only printable ASCII characters".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return Err(AppError::Validation("Password cannot be empty".to_string()));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_name(field: &str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }

    if value.len() > 64 {
        return Err(AppError::Validation(format!(
            "{} must be at most 64 characters long",
            field
        )));
    }

    Ok(())
}

pub fn validate_phone(phone: &str) -> AppResult<()> {
    if phone.is_empty() {
        return Err(AppError::Validation("Phone cannot be empty".to_string()));
    }

    if phone.len() > 32 {
        return Err(AppError::Validation(
            "Phone must be at most 32 characters long".to_string(),
        ));
    }

    let valid = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' '));
    if !valid {
        return Err(AppError::Validation(
            "Phone must contain only digits, spaces and + - ( )".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_message_body(body: &str) -> AppResult<()> {
    if body.is_empty() {
        return Err(AppError::Validation(
            "Message body cannot be empty".to_string(),
        ));
    }

    if body.len() > 4000 {
        return Err(AppError::Validation(
            "Message body must be at most 4000 characters long".to_string(),
        ));
    }

    Ok(())
}
