/// Property-based tests using proptest
/// Tests invariants that should hold for every pool, name, date and seed
use chrono::NaiveDate;
use fake_profile_api::export;
use fake_profile_api::generator::{one_line, random_birth_date, ProfileGenerator};
use fake_profile_api::iban::{IbanAllocator, IBAN_UNAVAILABLE};
use fake_profile_api::models::{Country, ExtraField};
use fake_profile_api::tax_codes::{
    codice_fiscale, codice_fiscale_check_char, is_valid_vat_id, vat_id_for, Sex,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

fn country_strategy() -> impl Strategy<Value = Country> {
    prop::sample::select(Country::ALL.to_vec())
}

// Property: every IBAN in a pool is handed out once per pass
proptest! {
    #[test]
    fn iban_pass_is_a_permutation(
        pool in prop::collection::hash_set("[A-Z]{2}[0-9]{10}", 1..20),
        seed in any::<u64>()
    ) {
        let pool: Vec<String> = pool.into_iter().collect();
        let allocator = IbanAllocator::with_pools(HashMap::from([("xx".to_string(), pool.clone())]));
        let mut rng = StdRng::seed_from_u64(seed);

        let mut first: Vec<String> = (0..pool.len())
            .map(|_| allocator.next_iban_with("XX", &mut rng))
            .collect();
        let mut second: Vec<String> = (0..pool.len())
            .map(|_| allocator.next_iban_with("xx", &mut rng))
            .collect();

        let mut expected = pool.clone();
        expected.sort();
        first.sort();
        second.sort();
        prop_assert_eq!(&first, &expected);
        prop_assert_eq!(&second, &expected);
    }

    #[test]
    fn unknown_country_never_panics(code in "\\PC*") {
        let allocator = IbanAllocator::with_pools(HashMap::new());
        prop_assert_eq!(allocator.next_iban(&code), IBAN_UNAVAILABLE);
    }
}

// Property: codice fiscale is always 16 characters with a matching check char
proptest! {
    #[test]
    fn codice_fiscale_is_well_formed(
        surname in "[A-Za-z' ]{0,15}",
        first_name in "[A-Za-z ]{0,15}",
        days in 0i64..30_000,
        female in any::<bool>(),
        municipality in "[A-Z][0-9]{3}"
    ) {
        let birth_date = NaiveDate::from_ymd_opt(1930, 1, 1).unwrap() + chrono::Duration::days(days);
        let sex = if female { Sex::Female } else { Sex::Male };

        let cf = codice_fiscale(&surname, &first_name, birth_date, sex, &municipality);

        prop_assert_eq!(cf.len(), 16);
        prop_assert!(cf.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        prop_assert_eq!(codice_fiscale_check_char(&cf[..15]), cf.chars().last());
    }

    #[test]
    fn check_char_rejects_wrong_length(partial in "[A-Z0-9]{0,14}") {
        prop_assert_eq!(codice_fiscale_check_char(&partial), None);
    }
}

// Property: generated VAT ids pass their national checksum
proptest! {
    #[test]
    fn generated_vat_ids_are_valid(country in country_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let vat_id = vat_id_for(country, &mut rng);

        prop_assert!(vat_id.starts_with(country.code()));
        prop_assert!(is_valid_vat_id(&vat_id), "invalid VAT id {}", vat_id);
    }

    #[test]
    fn vat_validation_never_panics(input in "\\PC*") {
        let _ = is_valid_vat_id(&input);
    }
}

// Property: birth dates stay inside the 18..=80 age window
proptest! {
    #[test]
    fn birth_date_within_age_window(days in 0i64..20_000, seed in any::<u64>()) {
        let today = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(days);
        let mut rng = StdRng::seed_from_u64(seed);

        let birth = random_birth_date(today, &mut rng);

        let age = today.years_since(birth).unwrap();
        prop_assert!((18..=80).contains(&age), "age {} for {}", age, birth);
        prop_assert!(birth > today - chrono::Months::new(81 * 12), "{} too old", birth);
    }
}

// Property: a generated profile always yields one CSV record matching the header
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn profile_rows_match_header(
        country in country_strategy(),
        fields in prop::sample::subsequence(ExtraField::ALL.to_vec(), 0..=4),
        seed in any::<u64>()
    ) {
        let ibans = IbanAllocator::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let profile = ProfileGenerator::generate_with_rng(country, &fields, &ibans, today, &mut rng);
        prop_assert_eq!(one_line(&profile.address), profile.address.clone());

        let bytes = export::to_csv(&[profile], &fields).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let width = reader.headers().unwrap().len();
        let records: Vec<_> = reader.records().map(|r| r.unwrap()).collect();

        prop_assert_eq!(width, 6 + fields.len());
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(records[0].len(), width);
    }
}
