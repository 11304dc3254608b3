/// Locale-aware synthetic profile generation
///
/// Names, streets, cities and phone numbers come from the `fake` locale that
/// matches the selected country. The IBAN is drawn from the shared pool
/// allocator and tax identifiers from `tax_codes`. The email column is
/// filled later by the generation flow, once a mailbox has been provisioned.
use crate::iban::IbanAllocator;
use crate::models::{Country, ExtraField, Profile};
use crate::tax_codes::{self, Sex};
use chrono::{Days, Local, Months, NaiveDate};
use fake::faker::address::raw::{BuildingNumber, CityName, PostCode, StreetName};
use fake::faker::name::raw::{FirstName, LastName};
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{DE_DE, FR_FR, IT_IT};
use fake::Fake;
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use rand::seq::IndexedRandom;
use rand::Rng;

pub const MIN_AGE_YEARS: u32 = 18;
pub const MAX_AGE_YEARS: u32 = 80;

const LUXEMBOURG_CITIES: &[&str] = &[
    "Luxembourg",
    "Esch-sur-Alzette",
    "Differdange",
    "Dudelange",
    "Ettelbruck",
    "Diekirch",
    "Wiltz",
    "Echternach",
    "Remich",
    "Grevenmacher",
];

const LUXEMBOURG_MOBILE_PREFIXES: &[&str] = &["621", "628", "661", "671", "691"];

/// Raw locale output before country-specific formatting.
#[derive(Debug, Clone)]
struct LocaleIdentity {
    first_name: String,
    last_name: String,
    street: String,
    building: String,
    postcode: String,
    city: String,
    phone: String,
}

macro_rules! locale_identity {
    ($locale:expr, $rng:expr) => {
        LocaleIdentity {
            first_name: FirstName($locale).fake_with_rng(&mut *$rng),
            last_name: LastName($locale).fake_with_rng(&mut *$rng),
            street: StreetName($locale).fake_with_rng(&mut *$rng),
            building: BuildingNumber($locale).fake_with_rng(&mut *$rng),
            postcode: PostCode($locale).fake_with_rng(&mut *$rng),
            city: CityName($locale).fake_with_rng(&mut *$rng),
            phone: PhoneNumber($locale).fake_with_rng(&mut *$rng),
        }
    };
}

fn identity_for<R: Rng + ?Sized>(country: Country, rng: &mut R) -> LocaleIdentity {
    match country {
        Country::Italy => locale_identity!(IT_IT, rng),
        Country::France => locale_identity!(FR_FR, rng),
        Country::Germany => locale_identity!(DE_DE, rng),
        Country::Luxembourg => {
            let mut identity = locale_identity!(FR_FR, rng);
            identity.postcode = format!("L-{}", rng.random_range(1000..10000u32));
            identity.city = LUXEMBOURG_CITIES
                .choose(rng)
                .copied()
                .unwrap_or("Luxembourg")
                .to_string();
            let prefix = LUXEMBOURG_MOBILE_PREFIXES.choose(rng).copied().unwrap_or("691");
            identity.phone = format!(
                "+352 {} {:03} {:03}",
                prefix,
                rng.random_range(0..1000u32),
                rng.random_range(0..1000u32)
            );
            identity
        }
    }
}

/// Joins address parts on one line, in the order the country writes them.
fn format_address(country: Country, identity: &LocaleIdentity) -> String {
    let raw = match country {
        Country::Italy | Country::Germany => format!(
            "{} {}\n{} {}",
            identity.street, identity.building, identity.postcode, identity.city
        ),
        Country::France | Country::Luxembourg => format!(
            "{} {}\n{} {}",
            identity.building, identity.street, identity.postcode, identity.city
        ),
    };
    one_line(&raw)
}

/// Replaces line breaks with `", "` and collapses whitespace runs so the
/// address fits a CSV cell.
pub fn one_line(address: &str) -> String {
    address
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn phone_region(country: Country) -> CountryId {
    match country {
        Country::Italy => CountryId::IT,
        Country::France => CountryId::FR,
        Country::Germany => CountryId::DE,
        Country::Luxembourg => CountryId::LU,
    }
}

/// International format when libphonenumber accepts the number, raw otherwise.
pub fn format_phone(country: Country, raw: &str) -> String {
    match phonenumber::parse(Some(phone_region(country)), raw) {
        Ok(number) if phonenumber::is_valid(&number) => {
            number.format().mode(Mode::International).to_string()
        }
        Ok(_) => {
            tracing::debug!("Generated phone not valid for {}: {}", country.code(), raw);
            raw.to_string()
        }
        Err(e) => {
            tracing::debug!("Failed to parse generated phone '{}': {:?}", raw, e);
            raw.to_string()
        }
    }
}

/// Uniform birth date for an age between 18 and 80 years on `today`, both
/// inclusive: the oldest birthday is the day after `today` minus 81 years.
pub fn random_birth_date<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> NaiveDate {
    let latest = today
        .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
        .unwrap_or(today);
    let earliest = today
        .checked_sub_months(Months::new((MAX_AGE_YEARS + 1) * 12))
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .unwrap_or(latest);
    let span = (latest - earliest).num_days().max(0) as u64;
    earliest
        .checked_add_days(Days::new(rng.random_range(0..=span)))
        .unwrap_or(latest)
}

pub struct ProfileGenerator;

impl ProfileGenerator {
    /// Generates one profile with a thread-local RNG and today's date.
    pub fn generate(country: Country, fields: &[ExtraField], ibans: &IbanAllocator) -> Profile {
        let mut rng = rand::rng();
        Self::generate_with_rng(country, fields, ibans, Local::now().date_naive(), &mut rng)
    }

    /// Generates one profile. `Email` is left empty for the caller to fill.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        country: Country,
        fields: &[ExtraField],
        ibans: &IbanAllocator,
        today: NaiveDate,
        rng: &mut R,
    ) -> Profile {
        let identity = identity_for(country, rng);
        let birth_date = random_birth_date(today, rng);
        let sex = if rng.random_bool(0.5) {
            Sex::Male
        } else {
            Sex::Female
        };

        let mut profile = Profile {
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            birth_date: birth_date.format("%d/%m/%Y").to_string(),
            address: format_address(country, &identity),
            iban: ibans.next_iban(country.code()),
            country: country.label().to_string(),
            email: None,
            phone: None,
            tax_code: None,
            vat_id: None,
        };

        if fields.contains(&ExtraField::Phone) {
            profile.phone = Some(format_phone(country, &identity.phone));
        }
        if fields.contains(&ExtraField::TaxCode) {
            profile.tax_code = Some(tax_codes::tax_code_for(
                country,
                &identity.last_name,
                &identity.first_name,
                birth_date,
                sex,
                rng,
            ));
        }
        if fields.contains(&ExtraField::VatId) {
            profile.vat_id = Some(tax_codes::vat_id_for(country, rng));
        }

        tracing::debug!(
            "Generated profile for {} ({}): {} {}",
            country.code(),
            country.locale(),
            profile.first_name,
            profile.last_name
        );
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn test_one_line_joins_lines() {
        assert_eq!(one_line("Via Roma 1\n00100 Roma"), "Via Roma 1, 00100 Roma");
        assert_eq!(one_line("a\n\n b \n"), "a, b");
    }

    #[test]
    fn test_one_line_collapses_inner_whitespace() {
        assert_eq!(
            one_line("Via  Ricci\t del Castello 4\n01146   Roma"),
            "Via Ricci del Castello 4, 01146 Roma"
        );
    }

    #[test]
    fn test_birth_date_within_age_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let latest = NaiveDate::from_ymd_opt(2006, 3, 15).unwrap();
        let earliest = NaiveDate::from_ymd_opt(1943, 3, 16).unwrap();
        for _ in 0..500 {
            let d = random_birth_date(today(), &mut rng);
            assert!(d >= earliest && d <= latest, "{}", d);
        }
    }

    #[test]
    fn test_birth_date_reaches_both_age_limits() {
        let mut rng = StdRng::seed_from_u64(1);
        let ages: Vec<u32> = (0..20_000)
            .map(|_| today().years_since(random_birth_date(today(), &mut rng)).unwrap())
            .collect();
        assert_eq!(ages.iter().min(), Some(&MIN_AGE_YEARS));
        assert_eq!(ages.iter().max(), Some(&MAX_AGE_YEARS));
    }

    #[test]
    fn test_base_profile_has_no_optional_fields() {
        let mut rng = StdRng::seed_from_u64(11);
        let ibans = IbanAllocator::new();
        let profile =
            ProfileGenerator::generate_with_rng(Country::Germany, &[], &ibans, today(), &mut rng);

        assert!(!profile.first_name.is_empty());
        assert!(!profile.last_name.is_empty());
        assert!(profile.iban.starts_with("DE"));
        assert_eq!(profile.country, "Germania");
        assert!(!profile.address.contains('\n'));
        assert_eq!(profile.birth_date.len(), 10);
        assert!(profile.email.is_none());
        assert!(profile.phone.is_none());
        assert!(profile.tax_code.is_none());
        assert!(profile.vat_id.is_none());
    }

    #[test]
    fn test_selected_fields_are_filled() {
        let mut rng = StdRng::seed_from_u64(12);
        let ibans = IbanAllocator::new();
        let fields = [ExtraField::Phone, ExtraField::TaxCode, ExtraField::VatId];

        let italian =
            ProfileGenerator::generate_with_rng(Country::Italy, &fields, &ibans, today(), &mut rng);
        assert_eq!(italian.tax_code.as_deref().map(str::len), Some(16));
        assert!(italian.vat_id.as_deref().unwrap().starts_with("IT"));
        assert!(italian.phone.is_some());

        let french =
            ProfileGenerator::generate_with_rng(Country::France, &fields, &ibans, today(), &mut rng);
        assert_eq!(french.tax_code.as_deref(), Some(tax_codes::NOT_APPLICABLE));
        assert!(french.vat_id.as_deref().unwrap().starts_with("FR"));
    }

    #[test]
    fn test_luxembourg_address_uses_local_postcode() {
        let mut rng = StdRng::seed_from_u64(5);
        let ibans = IbanAllocator::new();
        let profile = ProfileGenerator::generate_with_rng(
            Country::Luxembourg,
            &[ExtraField::Phone],
            &ibans,
            today(),
            &mut rng,
        );
        assert!(profile.address.contains(", L-"), "{}", profile.address);
        assert!(profile.phone.as_deref().unwrap().starts_with("+352"));
        assert!(profile.iban.starts_with("LU"));
    }
}
