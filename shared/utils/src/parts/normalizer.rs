//! Token Normalizer
//!
//! Canonicalizes a raw OCR token into a candidate part reference, undoing the
//! two OCR artifacts common on exploded-view sheets: leading zeros that belong
//! at the end of a number, and a letter `O` read in place of a digit `0`.

/// Trim leading and trailing non-alphanumeric characters.
pub fn strip_punctuation(text: &str) -> &str {
    text.trim_matches(|c: char| !c.is_ascii_alphanumeric())
}

/// `true` when the token is non-empty and made only of ASCII digits.
pub fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a raw token. Returns `None` when nothing usable remains.
pub fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim().to_uppercase();
    if token.is_empty() {
        return None;
    }

    if is_numeric(&token) {
        return shift_leading_zeros(&token);
    }

    Some(fix_letter_o(token))
}

/// "0012" -> "1200". All-zero input has no significant digits.
fn shift_leading_zeros(digits: &str) -> Option<String> {
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return None;
    }
    let leading = digits.len() - significant.len();

    let mut shifted = String::with_capacity(digits.len());
    shifted.push_str(significant);
    shifted.extend(std::iter::repeat('0').take(leading));
    Some(shifted)
}

/// "N1O2" -> "N102": second-to-last `O` of an N-code is a zero.
fn fix_letter_o(token: String) -> String {
    let mut chars: Vec<char> = token.chars().collect();
    let len = chars.len();

    if len >= 3 && chars[0] == 'N' && chars[len - 2] == 'O' {
        chars[len - 2] = '0';
        return chars.into_iter().collect();
    }
    token
}
