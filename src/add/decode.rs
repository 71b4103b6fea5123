//! Decoding of the newline-delimited `add` response
//!
//! The service emits one JSON record per line. Records carrying a `Hash`
//! describe an added file or directory; others (such as `Bytes` progress
//! records) are dropped. Any unparseable line fails the whole response.

use crate::add::types::AddedFile;
use crate::error::{Result, StorageError};
use cid::Cid;
use serde_json::{Map, Value};

/// One raw record of the response stream
///
/// Only `Hash` is inspected before a record is kept or dropped, so fields
/// of a dropped record may carry any JSON type.
#[derive(Debug, Clone)]
pub(crate) struct AddRecord {
    fields: Map<String, Value>,
}

impl AddRecord {
    fn parse(line: &str, line_number: usize) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| StorageError::malformed_response(line_number, e.to_string()))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(StorageError::malformed_response(
                line_number,
                format!("expected a JSON object, got {}", other),
            )),
        }
    }

    /// The identifier, or `None` when `Hash` is absent or null
    fn hash(&self) -> Result<Option<&str>> {
        match self.fields.get("Hash") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(hash)) => Ok(Some(hash)),
            Some(other) => Err(StorageError::invalid_identifier(
                other.to_string(),
                "identifier is not a string",
            )),
        }
    }

    fn into_added_file(self, hash: &str, line_number: usize) -> Result<AddedFile> {
        let name = match self.fields.get("Name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(StorageError::malformed_response(
                    line_number,
                    format!("Name is not a string: {}", other),
                ))
            }
        };
        let size = parse_size(self.fields.get("Size"))?;
        let cid = Cid::try_from(hash)
            .map_err(|e| StorageError::invalid_identifier(hash, e.to_string()))?;

        Ok(AddedFile::new(cid, name, size))
    }
}

/// Decimal string on the wire; bare numbers are tolerated
fn parse_size(value: Option<&Value>) -> Result<u64> {
    match value {
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| StorageError::invalid_size(s.clone())),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| StorageError::invalid_size(n.to_string())),
        Some(other) => Err(StorageError::invalid_size(other.to_string())),
        None => Err(StorageError::invalid_size("")),
    }
}

/// Decode a full `add` response body into the added files, in emission order
pub fn decode_add_response(text: &str) -> Result<Vec<AddedFile>> {
    let mut added = Vec::new();

    for (index, line) in text.trim().split('\n').enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let line_number = index + 1;
        let record = AddRecord::parse(line, line_number)?;

        match record.hash()?.map(str::to_string) {
            Some(hash) => added.push(record.into_added_file(&hash, line_number)?),
            None => {
                log::trace!(
                    "Dropping record without identifier on line {} (name: {:?}, bytes: {:?})",
                    line_number,
                    record.fields.get("Name"),
                    record.fields.get("Bytes")
                );
            }
        }
    }

    log::debug!("Decoded {} added file(s) from add response", added.len());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_A: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    const CID_B: &str = "QmUNLLsPACCz1vLxQVkXqqLX5R1X345qqfHbsf67hvA3Nn";

    #[test]
    fn test_single_record() {
        let body = format!(r#"{{"Hash":"{}","Name":"a.txt","Size":"42"}}"#, CID_A);
        let added = decode_add_response(&body).unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].path, "a.txt");
        assert_eq!(added[0].size, 42);
        assert_eq!(added[0].cid, Cid::try_from(CID_A).unwrap());
        assert_eq!(added[0].cid.to_string(), CID_A);
    }

    #[test]
    fn test_records_without_hash_are_dropped() {
        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"3\"}}\n{{\"Name\":\"b\"}}\n",
            CID_A
        );
        let added = decode_add_response(&body).unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].path, "a");
        assert_eq!(added[0].size, 3);
    }

    #[test]
    fn test_progress_and_null_hash_records_are_dropped() {
        let body = format!(
            concat!(
                "{{\"Name\":\"a\",\"Bytes\":262144}}\n",
                "{{\"Hash\":null,\"Name\":\"a\",\"Size\":\"1\"}}\n",
                "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"262158\"}}\n",
                "{{\"Hash\":\"{}\",\"Name\":\"\",\"Size\":\"4\"}}\n",
            ),
            CID_A, CID_B
        );
        let added = decode_add_response(&body).unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(added[0].path, "a");
        assert_eq!(added[0].size, 262158);
        assert_eq!(added[1].path, "");
        assert_eq!(added[1].cid.to_string(), CID_B);
    }

    #[test]
    fn test_order_follows_emission() {
        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"z\",\"Size\":\"1\"}}\n{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"2\"}}",
            CID_B, CID_A
        );
        let paths: Vec<_> = decode_add_response(&body)
            .unwrap()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(paths, vec!["z", "a"]);
    }

    #[test]
    fn test_whitespace_and_crlf_are_tolerated() {
        let body = format!(
            "\n  {{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\r\n\r\n{{\"Hash\":\"{}\",\"Name\":\"b\",\"Size\":\"2\"}}\r\n  \n",
            CID_A, CID_B
        );
        let added = decode_add_response(&body).unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added[1].path, "b");
    }

    #[test]
    fn test_empty_body_decodes_to_nothing() {
        assert!(decode_add_response("").unwrap().is_empty());
        assert!(decode_add_response("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_line_fails_whole_response() {
        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\nnot json\n",
            CID_A
        );
        let err = decode_add_response(&body).unwrap_err();
        assert!(matches!(err, StorageError::MalformedResponse { line: 2, .. }));
    }

    #[test]
    fn test_invalid_size_fails() {
        let body = format!(r#"{{"Hash":"{}","Name":"a","Size":"lots"}}"#, CID_A);
        let err = decode_add_response(&body).unwrap_err();
        assert!(matches!(err, StorageError::InvalidSize { ref value } if value == "lots"));

        let body = format!(r#"{{"Hash":"{}","Name":"a"}}"#, CID_A);
        assert!(matches!(
            decode_add_response(&body).unwrap_err(),
            StorageError::InvalidSize { .. }
        ));

        let body = format!(r#"{{"Hash":"{}","Name":"a","Size":"-1"}}"#, CID_A);
        assert!(matches!(
            decode_add_response(&body).unwrap_err(),
            StorageError::InvalidSize { .. }
        ));
    }

    #[test]
    fn test_numeric_size_is_accepted() {
        let body = format!(r#"{{"Hash":"{}","Name":"a","Size":7}}"#, CID_A);
        assert_eq!(decode_add_response(&body).unwrap()[0].size, 7);
    }

    #[test]
    fn test_invalid_identifier_fails() {
        let err = decode_add_response(r#"{"Hash":"not-a-cid","Name":"a","Size":"1"}"#)
            .unwrap_err();
        assert!(
            matches!(err, StorageError::InvalidIdentifier { ref value, .. } if value == "not-a-cid")
        );
    }

    #[test]
    fn test_dropped_records_may_carry_any_field_types() {
        let added = decode_add_response(r#"{"Name":"a","Bytes":1.5}"#).unwrap();
        assert!(added.is_empty());

        let body = format!(
            concat!(
                "{{\"Name\":7,\"Bytes\":\"lots\",\"Size\":[1]}}\n",
                "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\n",
            ),
            CID_A
        );
        let added = decode_add_response(&body).unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].path, "a");
    }

    #[test]
    fn test_non_object_line_is_malformed() {
        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\n[1,2]\n",
            CID_A
        );
        let err = decode_add_response(&body).unwrap_err();
        assert!(matches!(err, StorageError::MalformedResponse { line: 2, .. }));

        assert!(matches!(
            decode_add_response("42").unwrap_err(),
            StorageError::MalformedResponse { line: 1, .. }
        ));
    }

    #[test]
    fn test_non_string_name_on_kept_record_is_malformed() {
        let body = format!(r#"{{"Hash":"{}","Name":5,"Size":"1"}}"#, CID_A);
        assert!(matches!(
            decode_add_response(&body).unwrap_err(),
            StorageError::MalformedResponse { line: 1, .. }
        ));
    }

    #[test]
    fn test_invalid_size_after_valid_record_fails_whole_response() {
        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\n{{\"Hash\":\"{}\",\"Name\":\"b\",\"Size\":\"1.5\"}}\n",
            CID_A, CID_B
        );
        let err = decode_add_response(&body).unwrap_err();
        assert!(matches!(err, StorageError::InvalidSize { ref value } if value == "1.5"));
    }

    #[test]
    fn test_invalid_identifier_after_valid_record_fails_whole_response() {
        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\n{{\"Hash\":\"bogus\",\"Name\":\"b\",\"Size\":\"2\"}}\n",
            CID_A
        );
        let err = decode_add_response(&body).unwrap_err();
        assert!(
            matches!(err, StorageError::InvalidIdentifier { ref value, .. } if value == "bogus")
        );

        let body = format!(
            "{{\"Hash\":\"{}\",\"Name\":\"a\",\"Size\":\"1\"}}\n{{\"Hash\":12,\"Name\":\"b\",\"Size\":\"2\"}}\n",
            CID_A
        );
        assert!(matches!(
            decode_add_response(&body).unwrap_err(),
            StorageError::InvalidIdentifier { .. }
        ));
    }
}
