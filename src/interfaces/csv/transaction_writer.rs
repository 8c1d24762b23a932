use super::{HEADERS, TransactionRecord};
use crate::domain::transaction::Transaction;
use crate::error::Result;
use std::io::Write;

/// Writes transactions as CSV, header first even when there are no rows.
pub struct TransactionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> TransactionWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_transactions<'a>(
        &mut self,
        txns: impl IntoIterator<Item = &'a Transaction>,
    ) -> Result<()> {
        self.writer.write_record(HEADERS)?;
        for txn in txns {
            self.writer.serialize(TransactionRecord::from(txn))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::Currency;
    use crate::domain::money::Money;
    use crate::interfaces::csv::transaction_reader::TransactionReader;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_writer_output() {
        let id = Uuid::parse_str("6f6e6b2c-9d0e-4a47-8d57-0f4f2b5e8f11").unwrap();
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let txn = Transaction::new(id, date, "accepted", "O1", Money::new(Currency::INR, dec!(2000.45)));

        let mut out = Vec::new();
        TransactionWriter::new(&mut out)
            .write_transactions([&txn])
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "id,date,status,order_id,currency,amount\n\
             6f6e6b2c-9d0e-4a47-8d57-0f4f2b5e8f11,2024-05-01T10:00:00Z,accepted,O1,INR,2000.45\n"
        );

        let back: Vec<Transaction> = TransactionReader::new(text.as_bytes())
            .transactions()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(back, vec![txn]);
    }

    #[test]
    fn test_writer_empty_still_has_header() {
        let mut out = Vec::new();
        TransactionWriter::new(&mut out)
            .write_transactions(std::iter::empty())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,date,status,order_id,currency,amount\n");
    }
}
