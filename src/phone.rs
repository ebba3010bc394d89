//! # Phone
//!
//! Normalizes raw phone input into the display form `(DD) DDDDD-DDDD` and
//! extracts the trailing digits the roster filter groups by.
//!
//! Formatting is progressive so it works on partial input while the user is
//! still typing. Anything past the 11th digit is dropped.

/// Strips non-digits and re-inserts the fixed punctuation as digits
/// accumulate. Total function, no failure mode.
pub fn format_phone(raw: &str) -> String {
    let digits: Vec<char> = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(11)
        .collect();

    let mut formatted = String::with_capacity(15);
    for (position, digit) in digits.iter().enumerate() {
        match position {
            0 => {
                formatted.push('(');
                formatted.push(*digit);
            }
            2 => {
                formatted.push_str(") ");
                formatted.push(*digit);
            }
            7 => {
                formatted.push('-');
                formatted.push(*digit);
            }
            _ => formatted.push(*digit),
        }
    }

    formatted
}

/// Final 4 digits of the input, fewer if the input is shorter.
pub fn last_four_digits(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(4);

    digits[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_number() {
        assert_eq!(format_phone("62999998888"), "(62) 99999-8888");
    }

    #[test]
    fn test_partial_number() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("6"), "(6");
        assert_eq!(format_phone("62"), "(62");
        assert_eq!(format_phone("629"), "(62) 9");
        assert_eq!(format_phone("6299999"), "(62) 99999");
        assert_eq!(format_phone("62999998"), "(62) 99999-8");
    }

    #[test]
    fn test_ignores_punctuation() {
        assert_eq!(format_phone("(62) 99999-8888"), "(62) 99999-8888");
        assert_eq!(format_phone("62 9.9999 8888"), "(62) 99999-8888");
    }

    #[test]
    fn test_truncates_extra_digits() {
        assert_eq!(format_phone("629999988887777"), "(62) 99999-8888");
    }

    #[test]
    fn test_last_four() {
        assert_eq!(last_four_digits("(62) 99999-8888"), "8888");
        assert_eq!(last_four_digits("629"), "629");
        assert_eq!(last_four_digits(""), "");
    }
}
