//! Input validation shared by the upload and checkout flows.
//!
//! Every failure here is an `AppError::Validation` and happens before any
//! side effect.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::Currency;
use crate::AppError;

pub const MAX_TITLE_LENGTH: usize = 200;

/// Largest price the `price NUMERIC(12, 2)` column holds
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Largest accumulated earnings the `earnings NUMERIC(14, 2)` column holds
pub const MAX_EARNINGS: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Money is stored with cent precision
pub const PRICE_SCALE: u32 = 2;

/// Parse a price typed by the uploader.
///
/// Accepts plain decimals ("9.99", "10") and scientific notation ("1e2").
pub fn parse_price(raw: &str) -> Result<Decimal, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Price is required".to_string()));
    }
    let price = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            AppError::Validation(format!("Price must be a number, got '{}'", trimmed))
        })?;
    ensure_price(price)
}

/// Non-negative, at most two decimal places, within the stored range.
pub fn ensure_price(price: Decimal) -> Result<Decimal, AppError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    let price = price.normalize();
    if price.scale() > PRICE_SCALE {
        return Err(AppError::Validation(
            "Price can have at most 2 decimal places".to_string(),
        ));
    }
    if price > MAX_PRICE {
        return Err(AppError::Validation(format!(
            "Price must be at most {}",
            MAX_PRICE
        )));
    }
    // -0 normalizes to a zero that still prints as "-0"
    if price.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(price)
}

pub fn parse_currency(raw: &str) -> Result<Currency, AppError> {
    Currency::from_str(raw).map_err(|_| {
        let supported: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
        AppError::Validation(format!(
            "Unsupported currency '{}'. Supported currencies: {}",
            raw.trim(),
            supported.join(", ")
        ))
    })
}

/// Buyer contact is only checked for presence.
pub fn require_buyer_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }
    Ok(email.to_string())
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}
