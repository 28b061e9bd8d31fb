//! Dial-code prefix handling for the phone field.
//!
//! The phone field always starts with the selected country's dial code
//! followed by a space. Edits that would remove or damage that prefix are
//! folded back onto it, so the user never has to retype the code.

/// Initial phone value for a freshly selected country.
pub fn seed(dial_code: &str) -> String {
    format!("{dial_code} ")
}

/// Join a dial code and a national part, falling back to the bare seed.
fn compose(dial_code: &str, national: &str) -> String {
    let national = national.trim();
    if national.is_empty() {
        seed(dial_code)
    } else {
        format!("{dial_code} {national}")
    }
}

/// Re-seed the phone value after the country changed, keeping anything the
/// user already typed after the old prefix.
pub fn reseed(previous: &str, old_dial_code: Option<&str>, new_dial_code: &str) -> String {
    let national = match old_dial_code {
        Some(old) => national_part(previous, old),
        None => previous.trim(),
    };
    compose(new_dial_code, national)
}

/// Normalize a raw edit of the phone input so the dial-code prefix survives.
///
/// A leading token separated from the rest by whitespace, or starting with
/// `+`, is what remains of the prefix after a deletion (including backspace
/// at position 0) and is replaced by the full dial code. Bare digits are
/// always kept as the national part.
pub fn mask_input(dial_code: &str, input: &str) -> String {
    let input = input.trim_start();
    if let Some(rest) = input.strip_prefix(dial_code) {
        return compose(dial_code, rest);
    }

    match input.split_once(char::is_whitespace) {
        Some((head, tail)) if head.starts_with('+') || is_prefix_fragment(head, dial_code) => {
            compose(dial_code, tail)
        }
        Some(_) => compose(dial_code, input),
        None if is_prefix_fragment(input, dial_code) && input.starts_with('+') => seed(dial_code),
        None => compose(dial_code, input.strip_prefix('+').unwrap_or(input)),
    }
}

/// The part of `value` following the dial-code prefix, if present.
pub fn national_part<'a>(value: &'a str, dial_code: &str) -> &'a str {
    let trimmed = value.trim();
    if dial_code.is_empty() {
        return trimmed;
    }
    match trimmed.strip_prefix(dial_code) {
        Some(rest) => rest.trim_start(),
        None => trimmed,
    }
}

/// Digits of the national number, with separators and the dial code removed.
pub fn national_digits(value: &str, dial_code: &str) -> String {
    let trimmed = value.trim();
    if !dial_code.is_empty() && trimmed.starts_with(dial_code) {
        return digits_only(national_part(trimmed, dial_code));
    }

    let digits = digits_only(trimmed);
    let dial_digits = digits_only(dial_code);
    if trimmed.starts_with('+') && !dial_digits.is_empty() {
        if let Some(rest) = digits.strip_prefix(dial_digits.as_str()) {
            return rest.to_string();
        }
    }
    digits
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Whether `head` is what is left of `dial_code` after deleting characters
/// from it.
fn is_prefix_fragment(head: &str, dial_code: &str) -> bool {
    if head.len() >= dial_code.len() {
        return false;
    }
    let mut remaining = dial_code.chars();
    head.chars().all(|c| remaining.any(|d| d == c))
}
