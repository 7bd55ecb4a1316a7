//! src/domain/airport_code.rs

/// An IATA airport or metro-area code, e.g. `SFO` or `NYC`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportCode(String);

impl AirportCode {
    /// Accepts exactly three ASCII letters, in any case, with surrounding
    /// whitespace tolerated; stored uppercased.
    pub fn parse(code: String) -> Result<Self, String> {
        let trimmed = code.trim();
        let is_three_letters =
            trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic());
        if is_three_letters {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(format!("{} is not a valid airport code.", code))
        }
    }
}

impl AsRef<str> for AirportCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AirportCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
