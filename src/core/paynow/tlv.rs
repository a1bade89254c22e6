use crate::core::errors::BillSplitError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One tag-length-value data object. Lengths count characters and are two digits wide.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TlvField {
    pub tag: String,
    pub value: String,
}

impl TlvField {
    pub fn new(tag: &str, value: impl Into<String>) -> Self {
        TlvField {
            tag: tag.to_string(),
            value: value.into(),
        }
    }

    pub fn encode(&self) -> Result<String, BillSplitError> {
        encode_field(&self.tag, &self.value)
    }
}

pub fn encode_field(tag: &str, value: &str) -> Result<String, BillSplitError> {
    let length = value.chars().count();
    if length > 99 {
        return Err(BillSplitError::invalid_input(
            tag,
            "Field Too Long",
            format!("field {} is {} characters, the limit is 99", tag, length),
        ));
    }
    Ok(format!("{}{:02}{}", tag, length, value))
}

pub fn encode_fields(fields: &[TlvField]) -> Result<String, BillSplitError> {
    fields.iter().map(TlvField::encode).collect()
}

/// Splits a TLV string into its top-level fields.
pub fn decode_fields(input: &str) -> Result<Vec<TlvField>, BillSplitError> {
    let chars: Vec<char> = input.chars().collect();
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if pos + 4 > chars.len() {
            return Err(BillSplitError::invalid_input(
                "payload",
                "Truncated Payload",
                format!("dangling header at offset {}", pos),
            ));
        }
        let tag: String = chars[pos..pos + 2].iter().collect();
        let length_text: String = chars[pos + 2..pos + 4].iter().collect();
        if !length_text.chars().all(|c| c.is_ascii_digit()) {
            return Err(BillSplitError::invalid_input(
                "payload",
                "Malformed Length",
                format!("field {} has length `{}`", tag, length_text),
            ));
        }
        let length: usize = length_text.parse().unwrap_or_default();
        let start = pos + 4;
        let end = start + length;
        if end > chars.len() {
            return Err(BillSplitError::invalid_input(
                "payload",
                "Truncated Payload",
                format!("field {} needs {} characters, {} remain", tag, length, chars.len() - start),
            ));
        }
        fields.push(TlvField {
            tag,
            value: chars[start..end].iter().collect(),
        });
        pos = end;
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_pads_length() {
        assert_eq!(encode_field("00", "01").unwrap(), "000201");
        assert_eq!(encode_field("59", "Alex Tan").unwrap(), "5908Alex Tan");
    }

    #[test]
    fn test_rejects_oversized_value() {
        assert!(encode_field("59", &"x".repeat(100)).is_err());
    }

    #[test]
    fn test_decode_nested_template() {
        let fields = decode_fields("26130009SG.PAYNOW5303702").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], TlvField::new("26", "0009SG.PAYNOW"));
        let nested = decode_fields(&fields[0].value).unwrap();
        assert_eq!(nested, vec![TlvField::new("00", "SG.PAYNOW")]);
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode_fields("000201010").is_err());
        assert!(decode_fields("0005abc").is_err());
        assert!(decode_fields("00xx").is_err());
    }
}
