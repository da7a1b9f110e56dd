use serde::{Deserialize, Serialize};
use std::fmt;

/// The named fields read from a tax slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Slip number, reused as the renamed file's base name.
    Id,
    TaxType,
    TaxBase,
    Rate,
    TaxAmount,
    DocumentNumber,
    /// Name of the withholder/collector.
    PayerName,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Id,
        Field::TaxType,
        Field::TaxBase,
        Field::Rate,
        Field::TaxAmount,
        Field::DocumentNumber,
        Field::PayerName,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::TaxType => "tax_type",
            Field::TaxBase => "tax_base",
            Field::Rate => "rate",
            Field::TaxAmount => "tax_amount",
            Field::DocumentNumber => "document_number",
            Field::PayerName => "payer_name",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Id => write!(f, "ID"),
            Field::TaxType => write!(f, "Tax Type"),
            Field::TaxBase => write!(f, "Tax Base"),
            Field::Rate => write!(f, "Rate"),
            Field::TaxAmount => write!(f, "Tax Amount"),
            Field::DocumentNumber => write!(f, "Document Number"),
            Field::PayerName => write!(f, "Payer Name"),
        }
    }
}

/// Raw text of each field. `None` means no source produced any text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues {
    pub id: Option<String>,
    pub tax_type: Option<String>,
    pub tax_base: Option<String>,
    pub rate: Option<String>,
    pub tax_amount: Option<String>,
    pub document_number: Option<String>,
    pub payer_name: Option<String>,
}

impl FieldValues {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Store `text`, treating empty text as absent.
    pub fn set(&mut self, field: Field, text: String) {
        *self.slot_mut(field) = if text.is_empty() { None } else { Some(text) };
    }

    /// Value for export: absent fields become the empty string.
    pub fn text(&self, field: Field) -> &str {
        self.get(field).unwrap_or("")
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Id => &self.id,
            Field::TaxType => &self.tax_type,
            Field::TaxBase => &self.tax_base,
            Field::Rate => &self.rate,
            Field::TaxAmount => &self.tax_amount,
            Field::DocumentNumber => &self.document_number,
            Field::PayerName => &self.payer_name,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Id => &mut self.id,
            Field::TaxType => &mut self.tax_type,
            Field::TaxBase => &mut self.tax_base,
            Field::Rate => &mut self.rate,
            Field::TaxAmount => &mut self.tax_amount,
            Field::DocumentNumber => &mut self.document_number,
            Field::PayerName => &mut self.payer_name,
        }
    }
}

/// One processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub file_name: String,
    pub fields: FieldValues,
    /// Set when the file could not be processed and the batch kept going.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Position of the source file in delivery order.
    #[serde(skip)]
    pub source_index: usize,
}

impl ExtractedRecord {
    pub fn id(&self) -> Option<&str> {
        self.fields.get(Field::Id)
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Records of one run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub records: Vec<ExtractedRecord>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ExtractedRecord> {
        self.records.iter().filter(|r| r.is_failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_absent() {
        let mut values = FieldValues::default();
        values.set(Field::Rate, String::new());
        assert_eq!(values.get(Field::Rate), None);
        assert_eq!(values.text(Field::Rate), "");

        values.set(Field::Rate, "2%".into());
        assert_eq!(values.get(Field::Rate), Some("2%"));
    }

    #[test]
    fn test_field_serde_keys_match() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }
}
