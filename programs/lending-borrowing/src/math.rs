//! Checked integer math with explicit rounding direction

use crate::{constants::BPS, error::LendingError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero, used for amounts owed to a user
    Down,
    /// Away from zero, used for amounts owed by a user
    Up,
}

/// `a * b / c` computed in u128 with the requested rounding.
pub fn mul_div(a: u128, b: u128, c: u128, rounding: Rounding) -> Result<u128, LendingError> {
    if c == 0 {
        return Err(LendingError::ArithmeticOverflow);
    }
    let product = a.checked_mul(b).ok_or(LendingError::ArithmeticOverflow)?;
    let quotient = product / c;
    match rounding {
        Rounding::Up if product % c != 0 => quotient
            .checked_add(1)
            .ok_or(LendingError::ArithmeticOverflow),
        _ => Ok(quotient),
    }
}

/// `mul_div` over u64 operands with the result narrowed back to u64.
pub fn mul_div_u64(a: u64, b: u64, c: u64, rounding: Rounding) -> Result<u64, LendingError> {
    let result = mul_div(a as u128, b as u128, c as u128, rounding)?;
    to_u64(result)
}

pub fn to_u64(value: u128) -> Result<u64, LendingError> {
    u64::try_from(value).map_err(|_| LendingError::ArithmeticOverflow)
}

/// Apply a basis-point ratio to a value.
pub fn apply_bps(value: u128, bps: u64, rounding: Rounding) -> Result<u128, LendingError> {
    mul_div(value, bps as u128, BPS as u128, rounding)
}

pub fn pow10(exp: u32) -> Result<u128, LendingError> {
    10u128.checked_pow(exp).ok_or(LendingError::ArithmeticOverflow)
}

/// Scale `amount * price` by `10^exponent`, where the exponent may be negative.
pub fn scale_by_exponent(
    amount: u128,
    price: u128,
    exponent: i32,
    rounding: Rounding,
) -> Result<u128, LendingError> {
    if exponent >= 0 {
        amount
            .checked_mul(price)
            .and_then(|v| v.checked_mul(pow10(exponent as u32).ok()?))
            .ok_or(LendingError::ArithmeticOverflow)
    } else {
        mul_div(amount, price, pow10(exponent.unsigned_abs())?, rounding)
    }
}
