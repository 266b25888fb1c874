use crate::error::ConfigError;

pub const MIN_PLATE_LENGTH: usize = 6;
pub const MAX_PLATE_LENGTH: usize = 7;

/// Normalizes a plate number as typed by a user.
///
/// Spaces and dashes are dropped and letters uppercased, so `"ab 123 cd"`
/// and `"AB-123-CD"` both become `"AB123CD"`. The result must be 6 or 7
/// ASCII alphanumerics, which covers both the old `ABC123` and the
/// Mercosur `AB123CD` formats.
pub fn normalize_plate(input: &str) -> Result<String, ConfigError> {
    let plate: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if plate.is_empty() {
        return Err(ConfigError::InvalidPlate("plate number is empty".into()));
    }
    if let Some(bad) = plate.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPlate(format!(
            "unexpected character {:?} in {:?}",
            bad, input
        )));
    }
    if !(MIN_PLATE_LENGTH..=MAX_PLATE_LENGTH).contains(&plate.len()) {
        return Err(ConfigError::InvalidPlate(format!(
            "expected {} to {} characters, got {}",
            MIN_PLATE_LENGTH,
            MAX_PLATE_LENGTH,
            plate.len()
        )));
    }

    Ok(plate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_old_and_mercosur_formats() {
        assert_eq!(normalize_plate("ABC123").unwrap(), "ABC123");
        assert_eq!(normalize_plate("ab 123 cd").unwrap(), "AB123CD");
        assert_eq!(normalize_plate(" AB-123-CD ").unwrap(), "AB123CD");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            normalize_plate("  "),
            Err(ConfigError::InvalidPlate(_))
        ));
    }

    #[test]
    fn rejects_symbols_and_accents() {
        assert!(normalize_plate("ABC/123").is_err());
        assert!(normalize_plate("ÑBC123").is_err());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(normalize_plate("AB12").is_err());
        assert!(normalize_plate("ABCD12345").is_err());
    }
}
