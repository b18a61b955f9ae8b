use super::domain::{parse_amount, parse_date, FeeItemId, Payment};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use tracing::warn;

/// Reads a cashier's payment ledger export into payment records.
///
/// Expected columns: `Date`, `Montant`, `Motif` and an optional `Tranche` holding
/// the fee item the cashier linked the payment to.
pub struct PaymentLedgerImporter;

impl PaymentLedgerImporter {
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Payment>, PaymentImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut payments = Vec::new();

        for (index, record) in csv_reader.deserialize::<LedgerRow>().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = record?;

            let date = parse_date(&row.date).map_err(|_| PaymentImportError::InvalidDate {
                line,
                value: row.date.clone(),
            })?;

            let amount = match parse_amount(&row.amount) {
                Some(amount) => amount,
                None => {
                    warn!(line, value = %row.amount, "unreadable payment amount, counted as 0");
                    0
                }
            };

            payments.push(Payment {
                amount,
                date: Some(date),
                reason: row.reason,
                fee_item_id: row.fee_item.map(FeeItemId),
            });
        }

        Ok(payments)
    }
}

#[derive(Debug, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Montant", alias = "amount", alias = "Amount")]
    amount: String,
    #[serde(rename = "Motif", alias = "reason", alias = "Reason", default)]
    reason: String,
    #[serde(
        rename = "Tranche",
        alias = "feeItemId",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    fee_item: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[derive(Debug, thiserror::Error)]
pub enum PaymentImportError {
    #[error("failed to read payment ledger: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: '{value}' is not a valid payment date")]
    InvalidDate { line: usize, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    #[test]
    fn parses_french_ledger_exports() {
        let csv = "Date,Montant,Motif,Tranche\n\
                   02/09/2025,10 000,Paiement inscription,\n\
                   2025-10-01,\"30,000\",Paiement Tranche 1 Scolarité 2025-2026,1ère tranche\n";

        let payments = PaymentLedgerImporter::from_reader(Cursor::new(csv)).expect("ledger parses");

        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0].amount, 10_000);
        assert_eq!(payments[0].date, NaiveDate::from_ymd_opt(2025, 9, 2));
        assert!(payments[0].fee_item_id.is_none());
        assert_eq!(payments[1].amount, 30_000);
        assert_eq!(
            payments[1].fee_item_id,
            Some(FeeItemId::from("1ère tranche"))
        );
    }

    #[test]
    fn missing_link_column_is_optional() {
        let csv = "Date,Montant,Motif\n2025-10-01,5000,Paiement inscription\n";

        let payments = PaymentLedgerImporter::from_reader(Cursor::new(csv)).expect("ledger parses");

        assert_eq!(payments.len(), 1);
        assert!(payments[0].fee_item_id.is_none());
    }

    #[test]
    fn unreadable_amounts_are_counted_as_zero() {
        let csv = "Date,Montant,Motif\n2025-10-01,n/a,Paiement inscription\n";

        let payments = PaymentLedgerImporter::from_reader(Cursor::new(csv)).expect("ledger parses");

        assert_eq!(payments[0].amount, 0);
        assert!(!payments[0].is_countable());
    }

    #[test]
    fn invalid_dates_report_their_line() {
        let csv = "Date,Montant,Motif\n2025-10-01,5000,ok\nsoon,5000,Paiement inscription\n";

        match PaymentLedgerImporter::from_reader(Cursor::new(csv)) {
            Err(PaymentImportError::InvalidDate { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "soon");
            }
            other => panic!("expected invalid date, got {other:?}"),
        }
    }
}
