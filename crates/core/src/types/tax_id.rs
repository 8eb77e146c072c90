//! Brazilian taxpayer identifiers (CPF and CNPJ).
//!
//! Both identifiers end in two check digits computed by weighted sums modulo
//! 11 over the preceding digits. Punctuation is ignored on input: only ASCII
//! digits are considered, so `529.982.247-25` and `52998224725` parse to the
//! same [`Cpf`].

use core::fmt;

use serde::{Deserialize, Serialize};

use super::status::IdentificationType;

const CPF_LENGTH: usize = 11;
const CNPJ_LENGTH: usize = 14;

const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Errors that can occur when parsing a [`Cpf`], [`Cnpj`] or [`TaxId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxIdError {
    /// Wrong number of digits after stripping punctuation.
    #[error("expected {expected} digits, got {actual}")]
    InvalidLength {
        /// Digits required by the identifier kind.
        expected: usize,
        /// Digits found in the input.
        actual: usize,
    },
    /// Digit count matches neither a CPF nor a CNPJ.
    #[error("{0} digits is neither a CPF (11) nor a CNPJ (14)")]
    UnknownLength(usize),
    /// Every digit is the same (e.g. `111.111.111-11`).
    #[error("all digits are identical")]
    RepeatedDigits,
    /// The supplied check digits do not match the computed ones.
    #[error("check digits do not match")]
    CheckDigitMismatch,
}

/// Returns `true` if `input` is a valid CPF (individual taxpayer ID).
///
/// ```
/// use autopecas_core::validate_cpf;
///
/// assert!(validate_cpf("529.982.247-25"));
/// assert!(!validate_cpf("11111111111"));
/// ```
#[must_use]
pub fn validate_cpf(input: &str) -> bool {
    check_cpf(&ascii_digits(input)).is_ok()
}

/// Returns `true` if `input` is a valid CNPJ (company taxpayer ID).
///
/// ```
/// use autopecas_core::validate_cnpj;
///
/// assert!(validate_cnpj("11.222.333/0001-81"));
/// assert!(!validate_cnpj("11.222.333/0001-82"));
/// ```
#[must_use]
pub fn validate_cnpj(input: &str) -> bool {
    check_cnpj(&ascii_digits(input)).is_ok()
}

/// A validated CPF, stored as its 11 bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Parse a CPF, ignoring punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not hold exactly 11 digits, if all
    /// digits are identical, or if the check digits are wrong.
    pub fn parse(input: &str) -> Result<Self, TaxIdError> {
        let digits = ascii_digits(input);
        check_cpf(&digits)?;
        Ok(Self(to_string(&digits)))
    }

    /// The 11 bare digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: `000.000.000-00`.
    #[must_use]
    pub fn formatted(&self) -> String {
        punctuate(&self.0, &[(3, '.'), (6, '.'), (9, '-')])
    }
}

/// A validated CNPJ, stored as its 14 bare digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cnpj(String);

impl Cnpj {
    /// Parse a CNPJ, ignoring punctuation.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not hold exactly 14 digits, if all
    /// digits are identical, or if the check digits are wrong.
    pub fn parse(input: &str) -> Result<Self, TaxIdError> {
        let digits = ascii_digits(input);
        check_cnpj(&digits)?;
        Ok(Self(to_string(&digits)))
    }

    /// The 14 bare digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: `00.000.000/0000-00`.
    #[must_use]
    pub fn formatted(&self) -> String {
        punctuate(&self.0, &[(2, '.'), (5, '.'), (8, '/'), (12, '-')])
    }
}

/// Either kind of taxpayer ID, chosen by digit count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaxId {
    /// Individual.
    Cpf(Cpf),
    /// Company.
    Cnpj(Cnpj),
}

impl TaxId {
    /// Parse a CPF or CNPJ depending on how many digits the input holds.
    ///
    /// # Errors
    ///
    /// Returns [`TaxIdError::UnknownLength`] when the digit count is neither
    /// 11 nor 14, otherwise the error of the matching parser.
    pub fn parse(input: &str) -> Result<Self, TaxIdError> {
        match ascii_digits(input).len() {
            CPF_LENGTH => Cpf::parse(input).map(Self::Cpf),
            CNPJ_LENGTH => Cnpj::parse(input).map(Self::Cnpj),
            other => Err(TaxIdError::UnknownLength(other)),
        }
    }

    /// The identification type a payment provider expects for this ID.
    #[must_use]
    pub const fn identification_type(&self) -> IdentificationType {
        match self {
            Self::Cpf(_) => IdentificationType::Cpf,
            Self::Cnpj(_) => IdentificationType::Cnpj,
        }
    }

    /// The bare digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Cpf(cpf) => cpf.as_str(),
            Self::Cnpj(cnpj) => cnpj.as_str(),
        }
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpf(cpf) => cpf.fmt(f),
            Self::Cnpj(cnpj) => cnpj.fmt(f),
        }
    }
}

impl std::str::FromStr for Cpf {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::str::FromStr for Cnpj {
    type Err = TaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cpf {
    type Error = TaxIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<String> for Cnpj {
    type Error = TaxIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl From<Cnpj> for String {
    fn from(cnpj: Cnpj) -> Self {
        cnpj.0
    }
}

// =============================================================================
// Check digits
// =============================================================================

fn ascii_digits(input: &str) -> Vec<u32> {
    input.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn to_string(digits: &[u32]) -> String {
    digits
        .iter()
        .filter_map(|&d| char::from_digit(d, 10))
        .collect()
}

fn all_identical(digits: &[u32]) -> bool {
    digits.windows(2).all(|pair| pair.first() == pair.last())
}

fn weighted_sum(
    digits: impl IntoIterator<Item = u32>,
    weights: impl IntoIterator<Item = u32>,
) -> u32 {
    digits.into_iter().zip(weights).map(|(d, w)| d * w).sum()
}

/// CPF check digits for the first nine digits.
fn cpf_check_digits(body: &[u32]) -> [u32; 2] {
    let reduce = |sum: u32| match sum * 10 % 11 {
        10 | 11 => 0,
        rest => rest,
    };

    let first = reduce(weighted_sum(body.iter().copied(), (2..=10).rev()));
    let second = reduce(weighted_sum(
        body.iter().copied().chain([first]),
        (2..=11).rev(),
    ));
    [first, second]
}

/// CNPJ check digits for the first twelve digits.
fn cnpj_check_digits(body: &[u32]) -> [u32; 2] {
    let reduce = |sum: u32| match sum % 11 {
        rest if rest < 2 => 0,
        rest => 11 - rest,
    };

    let first = reduce(weighted_sum(body.iter().copied(), CNPJ_FIRST_WEIGHTS));
    let second = reduce(weighted_sum(
        body.iter().copied().chain([first]),
        CNPJ_SECOND_WEIGHTS,
    ));
    [first, second]
}

fn check_cpf(digits: &[u32]) -> Result<(), TaxIdError> {
    check(digits, CPF_LENGTH, cpf_check_digits)
}

fn check_cnpj(digits: &[u32]) -> Result<(), TaxIdError> {
    check(digits, CNPJ_LENGTH, cnpj_check_digits)
}

fn check(
    digits: &[u32],
    expected: usize,
    check_digits: fn(&[u32]) -> [u32; 2],
) -> Result<(), TaxIdError> {
    if digits.len() != expected {
        return Err(TaxIdError::InvalidLength {
            expected,
            actual: digits.len(),
        });
    }

    if all_identical(digits) {
        return Err(TaxIdError::RepeatedDigits);
    }

    let (body, supplied) = digits.split_at(expected - 2);
    if supplied != check_digits(body) {
        return Err(TaxIdError::CheckDigitMismatch);
    }

    Ok(())
}

/// Insert separators before the given zero-based digit positions.
fn punctuate(digits: &str, marks: &[(usize, char)]) -> String {
    let mut out = String::with_capacity(digits.len() + marks.len());
    for (i, c) in digits.chars().enumerate() {
        if let Some((_, mark)) = marks.iter().find(|(pos, _)| *pos == i) {
            out.push(*mark);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_valid_cpf() {
        assert!(validate_cpf("52998224725"));
        assert!(validate_cpf("529.982.247-25"));
    }

    #[test]
    fn test_repeated_cpf_rejected() {
        assert!(!validate_cpf("11111111111"));
        assert!(!validate_cpf("000.000.000-00"));
        assert_eq!(
            Cpf::parse("99999999999"),
            Err(TaxIdError::RepeatedDigits)
        );
    }

    #[test]
    fn test_cpf_wrong_length() {
        assert_eq!(
            Cpf::parse("5299822472"),
            Err(TaxIdError::InvalidLength {
                expected: 11,
                actual: 10
            })
        );
        assert!(!validate_cpf(""));
        assert!(!validate_cpf("529982247250"));
    }

    #[test]
    fn test_cpf_wrong_check_digit() {
        assert_eq!(
            Cpf::parse("52998224726"),
            Err(TaxIdError::CheckDigitMismatch)
        );
        assert!(!validate_cpf("52998224735"));
    }

    #[test]
    fn test_cpf_with_remainder_ten() {
        // First weighted sum gives remainder 10, which maps to check digit 0.
        assert!(validate_cpf("10000000108"));
        assert_eq!(cpf_check_digits(&[1, 0, 0, 0, 0, 0, 0, 0, 1]), [0, 8]);
    }

    #[test]
    fn test_known_valid_cnpj() {
        assert!(validate_cnpj("11222333000181"));
        assert!(validate_cnpj("11.222.333/0001-81"));
    }

    #[test]
    fn test_cnpj_rejections() {
        assert!(!validate_cnpj("11.222.333/0001-80"));
        assert!(!validate_cnpj("00000000000000"));
        assert!(!validate_cnpj("1122233300018"));
        assert_eq!(
            Cnpj::parse("11111111111111"),
            Err(TaxIdError::RepeatedDigits)
        );
    }

    #[test]
    fn test_formatting() {
        let cpf = Cpf::parse("52998224725").unwrap();
        assert_eq!(cpf.formatted(), "529.982.247-25");
        assert_eq!(cpf.as_str(), "52998224725");

        let cnpj = Cnpj::parse("11222333000181").unwrap();
        assert_eq!(cnpj.to_string(), "11.222.333/0001-81");
    }

    #[test]
    fn test_tax_id_dispatch() {
        let cpf = TaxId::parse("529.982.247-25").unwrap();
        assert_eq!(cpf.identification_type(), IdentificationType::Cpf);

        let cnpj = TaxId::parse("11.222.333/0001-81").unwrap();
        assert_eq!(cnpj.identification_type(), IdentificationType::Cnpj);
        assert_eq!(cnpj.as_str(), "11222333000181");

        assert_eq!(TaxId::parse("123"), Err(TaxIdError::UnknownLength(3)));
    }

    #[test]
    fn test_serde_uses_bare_digits() {
        let cpf: Cpf = serde_json::from_str("\"529.982.247-25\"").unwrap();
        assert_eq!(serde_json::to_string(&cpf).unwrap(), "\"52998224725\"");
        assert!(serde_json::from_str::<Cpf>("\"11111111111\"").is_err());
    }
}
