//! National tax identifiers for generated profiles.
//!
//! Values are synthetic but structurally valid: the Italian codice fiscale
//! carries the official check character and every VAT number passes its
//! country's checksum.

use crate::models::Country;
use chrono::{Datelike, NaiveDate};
use rand::Rng;

/// Used where a country has no such identifier.
pub const NOT_APPLICABLE: &str = "N/A";

const MONTH_CODES: &[u8; 12] = b"ABCDEHLMPRST";

/// Cadastral codes of a few large Italian municipalities.
const MUNICIPALITY_CODES: &[&str] = &[
    "H501", // Roma
    "F205", // Milano
    "F839", // Napoli
    "L219", // Torino
    "G273", // Palermo
    "A944", // Bologna
    "D612", // Firenze
    "L736", // Venezia
    "D969", // Genova
    "A662", // Bari
];

const ODD_VALUES: [u32; 26] = [
    1, 0, 5, 7, 9, 13, 15, 17, 19, 21, 2, 4, 18, 20, 11, 3, 6, 8, 12, 14, 16, 10, 22, 25, 24, 23,
];
const ODD_DIGIT_VALUES: [u32; 10] = [1, 0, 5, 7, 9, 13, 15, 17, 19, 21];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'A' | 'E' | 'I' | 'O' | 'U')
}

/// Upper-cased ASCII letters, with common Italian accents folded.
fn letters(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| match c {
            'à' | 'á' | 'À' | 'Á' => 'A',
            'è' | 'é' | 'È' | 'É' => 'E',
            'ì' | 'í' | 'Ì' | 'Í' => 'I',
            'ò' | 'ó' | 'Ò' | 'Ó' => 'O',
            'ù' | 'ú' | 'Ù' | 'Ú' => 'U',
            other => other.to_ascii_uppercase(),
        })
        .filter(|c| c.is_ascii_uppercase())
        .collect()
}

fn split_letters(s: &str) -> (Vec<char>, Vec<char>) {
    letters(s).into_iter().partition(|c| !is_vowel(*c))
}

fn pad_code(consonants: &[char], vowels: &[char]) -> String {
    consonants
        .iter()
        .chain(vowels.iter())
        .copied()
        .chain(std::iter::repeat('X'))
        .take(3)
        .collect()
}

/// Three-letter surname block: consonants, then vowels, then `X` padding.
pub fn surname_code(surname: &str) -> String {
    let (consonants, vowels) = split_letters(surname);
    pad_code(&consonants, &vowels)
}

/// Three-letter first-name block. With four or more consonants the second
/// one is skipped.
pub fn first_name_code(first_name: &str) -> String {
    let (consonants, vowels) = split_letters(first_name);
    if consonants.len() >= 4 {
        [consonants[0], consonants[2], consonants[3]].iter().collect()
    } else {
        pad_code(&consonants, &vowels)
    }
}

/// Check character over the first 15 characters of a codice fiscale.
///
/// Returns `None` when the input is not 15 ASCII alphanumerics.
pub fn codice_fiscale_check_char(partial: &str) -> Option<char> {
    if partial.len() != 15 {
        return None;
    }
    let mut sum = 0u32;
    for (i, c) in partial.chars().enumerate() {
        let c = c.to_ascii_uppercase();
        // Positions are counted from 1, so index 0 is "odd".
        let value = match (i % 2 == 0, c) {
            (true, '0'..='9') => ODD_DIGIT_VALUES[(c as u8 - b'0') as usize],
            (true, 'A'..='Z') => ODD_VALUES[(c as u8 - b'A') as usize],
            (false, '0'..='9') => (c as u8 - b'0') as u32,
            (false, 'A'..='Z') => (c as u8 - b'A') as u32,
            _ => return None,
        };
        sum += value;
    }
    Some((b'A' + (sum % 26) as u8) as char)
}

/// Builds a full 16-character codice fiscale.
pub fn codice_fiscale(
    surname: &str,
    first_name: &str,
    birth_date: NaiveDate,
    sex: Sex,
    municipality: &str,
) -> String {
    let day = match sex {
        Sex::Male => birth_date.day(),
        Sex::Female => birth_date.day() + 40,
    };
    let partial = format!(
        "{}{}{:02}{}{:02}{}",
        surname_code(surname),
        first_name_code(first_name),
        birth_date.year().rem_euclid(100),
        MONTH_CODES[birth_date.month0() as usize] as char,
        day,
        municipality.to_uppercase(),
    );
    match codice_fiscale_check_char(&partial) {
        Some(check) => format!("{}{}", partial, check),
        None => partial,
    }
}

/// Codice fiscale with a randomly chosen municipality of birth.
pub fn random_codice_fiscale<R: Rng + ?Sized>(
    surname: &str,
    first_name: &str,
    birth_date: NaiveDate,
    sex: Sex,
    rng: &mut R,
) -> String {
    let municipality = MUNICIPALITY_CODES[rng.random_range(0..MUNICIPALITY_CODES.len())];
    codice_fiscale(surname, first_name, birth_date, sex, municipality)
}

/// Personal tax identifier for the country, `N/A` outside Italy.
pub fn tax_code_for<R: Rng + ?Sized>(
    country: Country,
    surname: &str,
    first_name: &str,
    birth_date: NaiveDate,
    sex: Sex,
    rng: &mut R,
) -> String {
    match country {
        Country::Italy => random_codice_fiscale(surname, first_name, birth_date, sex, rng),
        _ => NOT_APPLICABLE.to_string(),
    }
}

// ============ VAT numbers ============

fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn digits_of(s: &str) -> Option<Vec<u32>> {
    s.chars().map(|c| c.to_digit(10)).collect()
}

/// Check digit of an Italian partita IVA over its first ten digits.
pub fn italian_vat_check_digit(first_ten: &str) -> Option<u32> {
    let digits = digits_of(first_ten)?;
    if digits.len() != 10 {
        return None;
    }
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    Some((10 - sum % 10) % 10)
}

/// Luhn validity of a digit string.
pub fn luhn_valid(number: &str) -> bool {
    let Some(digits) = digits_of(number) else {
        return false;
    };
    if digits.is_empty() {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Two-digit French VAT key for a SIREN.
pub fn french_vat_key(siren: u64) -> u64 {
    (12 + 3 * (siren % 97)) % 97
}

/// German USt-IdNr. check digit (ISO 7064 MOD 11,10) over eight digits.
pub fn german_vat_check_digit(first_eight: &str) -> Option<u32> {
    let digits = digits_of(first_eight)?;
    if digits.len() != 8 {
        return None;
    }
    let mut product = 10;
    for d in digits {
        let mut sum = (d + product) % 10;
        if sum == 0 {
            sum = 10;
        }
        product = (2 * sum) % 11;
    }
    let check = 11 - product;
    Some(if check == 10 { 0 } else { check })
}

/// Luxembourg VAT check pair: the first six digits modulo 89.
pub fn luxembourg_vat_check(first_six: u32) -> u32 {
    first_six % 89
}

fn random_siren<R: Rng + ?Sized>(rng: &mut R) -> String {
    // Fix the last digit so the whole SIREN satisfies Luhn.
    let body = format!("{}{}", rng.random_range(1..10u8), random_digits(rng, 7));
    (0..10)
        .map(|d| format!("{}{}", body, d))
        .find(|candidate| luhn_valid(candidate))
        .unwrap_or_else(|| format!("{}0", body))
}

/// Country-prefixed VAT identifier with a valid checksum.
pub fn vat_id_for<R: Rng + ?Sized>(country: Country, rng: &mut R) -> String {
    match country {
        Country::Italy => {
            let company = random_digits(rng, 7);
            let office = format!("{:03}", rng.random_range(1..=100u32));
            let first_ten = format!("{}{}", company, office);
            let check = italian_vat_check_digit(&first_ten).unwrap_or(0);
            format!("IT{}{}", first_ten, check)
        }
        Country::France => {
            let siren = random_siren(rng);
            let key = siren.parse::<u64>().map(french_vat_key).unwrap_or(0);
            format!("FR{:02}{}", key, siren)
        }
        Country::Germany => {
            let first_eight = format!("{}{}", rng.random_range(1..10u8), random_digits(rng, 7));
            let check = german_vat_check_digit(&first_eight).unwrap_or(0);
            format!("DE{}{}", first_eight, check)
        }
        Country::Luxembourg => {
            let first_six = rng.random_range(100_000..1_000_000u32);
            format!("LU{}{:02}", first_six, luxembourg_vat_check(first_six))
        }
    }
}

/// Checks the checksum of a VAT identifier produced by [`vat_id_for`].
pub fn is_valid_vat_id(vat_id: &str) -> bool {
    if vat_id.len() < 2 || !vat_id.is_char_boundary(2) {
        return false;
    }
    let (prefix, rest) = vat_id.split_at(2);
    if !rest.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match prefix {
        "IT" if rest.len() == 11 => italian_vat_check_digit(&rest[..10])
            .is_some_and(|check| rest[10..].parse::<u32>().ok() == Some(check)),
        "FR" if rest.len() == 11 => {
            let (key, siren) = rest.split_at(2);
            match (key.parse::<u64>(), siren.parse::<u64>()) {
                (Ok(key), Ok(siren_num)) => luhn_valid(siren) && french_vat_key(siren_num) == key,
                _ => false,
            }
        }
        "DE" if rest.len() == 9 => german_vat_check_digit(&rest[..8])
            .is_some_and(|check| rest[8..].parse::<u32>().ok() == Some(check)),
        "LU" if rest.len() == 8 => match (rest[..6].parse::<u32>(), rest[6..].parse::<u32>()) {
            (Ok(first_six), Ok(check)) => luxembourg_vat_check(first_six) == check,
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_name_blocks() {
        assert_eq!(surname_code("Rossi"), "RSS");
        assert_eq!(surname_code("Fo"), "FOX");
        assert_eq!(surname_code("De Luca"), "DLC");
        assert_eq!(first_name_code("Mario"), "MRA");
        assert_eq!(first_name_code("Alessandro"), "LSN");
        assert_eq!(first_name_code("Al"), "LAX");
    }

    #[test]
    fn test_check_char_known_codes() {
        assert_eq!(codice_fiscale_check_char("RSSMRA85T10A562"), Some('S'));
        assert_eq!(codice_fiscale_check_char("MRTMTT25D09F205"), Some('Z'));
        assert_eq!(codice_fiscale_check_char("SHORT"), None);
    }

    #[test]
    fn test_full_codice_fiscale() {
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert_eq!(
            codice_fiscale("Bianchi", "Laura", date, Sex::Female, "H501"),
            "BNCLRA90A41H501F"
        );
        let date = NaiveDate::from_ymd_opt(1925, 4, 9).unwrap();
        assert_eq!(
            codice_fiscale("Moretti", "Matteo", date, Sex::Male, "F205"),
            "MRTMTT25D09F205Z"
        );
    }

    #[test]
    fn test_tax_code_only_for_italy() {
        let mut rng = StdRng::seed_from_u64(1);
        let date = NaiveDate::from_ymd_opt(1980, 6, 15).unwrap();
        assert_eq!(
            tax_code_for(Country::France, "Martin", "Paul", date, Sex::Male, &mut rng),
            NOT_APPLICABLE
        );
        let cf = tax_code_for(Country::Italy, "Verdi", "Giulia", date, Sex::Female, &mut rng);
        assert_eq!(cf.len(), 16);
        assert!(cf.starts_with("VRDGLI80H55"));
    }

    #[test]
    fn test_known_vat_numbers() {
        assert!(is_valid_vat_id("IT07643520567"));
        assert!(is_valid_vat_id("FR40303265045"));
        assert!(is_valid_vat_id("DE136695976"));
        assert!(is_valid_vat_id("LU26375245"));
        assert!(!is_valid_vat_id("IT07643520568"));
        assert!(!is_valid_vat_id("DE136695975"));
        assert!(!is_valid_vat_id("ES12345678"));
    }

    #[test]
    fn test_generated_vat_ids_are_valid() {
        let mut rng = StdRng::seed_from_u64(99);
        for country in Country::ALL {
            for _ in 0..50 {
                let vat = vat_id_for(country, &mut rng);
                assert!(vat.starts_with(country.code()), "{}", vat);
                assert!(is_valid_vat_id(&vat), "{}", vat);
            }
        }
    }
}
