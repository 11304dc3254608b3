use crate::errors::AppError;
use crate::models::{ExtraField, Profile};

pub const CSV_FILENAME: &str = "profili.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Base columns, always exported in this order.
pub const BASE_COLUMNS: [&str; 6] = [
    "Nome",
    "Cognome",
    "Data di Nascita",
    "Indirizzo",
    "IBAN",
    "Paese",
];

/// Selected extras in canonical export order, without duplicates.
pub fn selected_extras(fields: &[ExtraField]) -> Vec<ExtraField> {
    ExtraField::ALL
        .into_iter()
        .filter(|f| fields.contains(f))
        .collect()
}

/// Header row for a selection of extra fields.
pub fn columns(fields: &[ExtraField]) -> Vec<String> {
    BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(selected_extras(fields).iter().map(|f| f.column().to_string()))
        .collect()
}

fn extra_value(profile: &Profile, field: ExtraField) -> &str {
    let value = match field {
        ExtraField::Email => &profile.email,
        ExtraField::Phone => &profile.phone,
        ExtraField::TaxCode => &profile.tax_code,
        ExtraField::VatId => &profile.vat_id,
    };
    value.as_deref().unwrap_or("")
}

/// Serializes profiles as CSV with a header row.
pub fn to_csv(profiles: &[Profile], fields: &[ExtraField]) -> Result<Vec<u8>, AppError> {
    let extras = selected_extras(fields);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(columns(fields))?;
    for profile in profiles {
        let mut record: Vec<&str> = vec![
            profile.first_name.as_str(),
            profile.last_name.as_str(),
            profile.birth_date.as_str(),
            profile.address.as_str(),
            profile.iban.as_str(),
            profile.country.as_str(),
        ];
        record.extend(extras.iter().map(|f| extra_value(profile, *f)));
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV export failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            first_name: "Giulia".to_string(),
            last_name: "Verdi".to_string(),
            birth_date: "15/06/1980".to_string(),
            address: "Via Roma 1, 00100 Roma".to_string(),
            iban: "IT60X0542811101000000123456".to_string(),
            country: "Italia".to_string(),
            email: Some("abc@guerrillamail.com".to_string()),
            phone: None,
            tax_code: Some("VRDGLI80H55H501X".to_string()),
            vat_id: None,
        }
    }

    #[test]
    fn test_columns_follow_canonical_order() {
        let cols = columns(&[ExtraField::VatId, ExtraField::Email, ExtraField::VatId]);
        assert_eq!(
            cols,
            vec![
                "Nome",
                "Cognome",
                "Data di Nascita",
                "Indirizzo",
                "IBAN",
                "Paese",
                "Email",
                "Partita IVA"
            ]
        );
    }

    #[test]
    fn test_csv_quotes_addresses_with_commas() {
        let bytes = to_csv(&[profile()], &[ExtraField::Email, ExtraField::TaxCode]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Nome,Cognome,Data di Nascita,Indirizzo,IBAN,Paese,Email,Codice Fiscale"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Giulia,Verdi,15/06/1980,\"Via Roma 1, 00100 Roma\",IT60X0542811101000000123456,Italia,abc@guerrillamail.com,VRDGLI80H55H501X"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_missing_optional_value_is_empty_cell() {
        let bytes = to_csv(&[profile()], &[ExtraField::Phone]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with("Italia,"));
    }

    #[test]
    fn test_header_only_for_empty_batch() {
        let bytes = to_csv(&[], &[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Nome,Cognome,Data di Nascita,Indirizzo,IBAN,Paese\n"
        );
    }
}
