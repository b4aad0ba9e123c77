//! Objects serialized to HTTP request body

use std::fmt;
use serde::Serialize;
use serde_json::Value;
use crate::qkd014_data::HttpRequestBody;
use crate::Qkd014Error;

/// "Get key" request parameters, sent by master SAE
/// # Note
/// Fields left to `None` are not sent at all, so that the KME applies its own default values
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[allow(non_snake_case)]
pub struct KeyRequest {
    /// Number of keys requested, KME default value is 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<u64>,

    /// Size of each key in bits, KME default value is defined as key_size in Status data format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Array of IDs of slave SAEs. It is used for specifying two or more slave SAEs to share identical keys.
    /// The maximum number of IDs is defined as max_SAE_ID_count in Status data format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_slave_SAE_IDs: Option<Vec<String>>,

    /// Extension parameters that KME shall handle or return an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_mandatory: Option<Value>,

    /// Extension parameters that KME may ignore
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_optional: Option<Value>,
}
impl HttpRequestBody for KeyRequest {}

impl KeyRequest {
    /// True if no parameter is set, in which case the simplified GET request must be used
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.size.is_none()
            && self.additional_slave_SAE_IDs.is_none()
            && self.extension_mandatory.is_none()
            && self.extension_optional.is_none()
    }
}

impl fmt::Display for KeyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number : {:?}", self.number)?;
        writeln!(f, "Size : {:?}", self.size)?;
        writeln!(f, "Additional slave SAE IDs : {:?}", self.additional_slave_SAE_IDs)?;
        writeln!(f, "Extension mandatory : {:?}", self.extension_mandatory)?;
        writeln!(f, "Extension optional : {:?}", self.extension_optional)
    }
}

/// "Get key with key IDs" request parameters, sent by slave SAE
#[derive(Debug, Clone, PartialEq)]
pub struct KeyIdRequest {
    key_ids: Vec<String>,
    key_id_extensions: Option<Vec<Value>>,
    key_ids_extension: Option<Value>,
}

impl KeyIdRequest {
    /// Create a new request
    /// # Arguments
    /// * `key_ids` - Key IDs given by the master SAE, UUID format (eg "550e8400-e29b-41d4-a716-446655440000")
    /// * `key_id_extensions` - Optional extension for each key ID, index `i` goes with `key_ids[i]`
    /// * `key_ids_extension` - Optional extension for the whole request
    /// # Errors
    /// If `key_id_extensions` is given and its length differs from `key_ids` one
    pub fn new(key_ids: Vec<String>, key_id_extensions: Option<Vec<Value>>, key_ids_extension: Option<Value>) -> Result<Self, Qkd014Error> {
        if let Some(extensions) = &key_id_extensions {
            if extensions.len() != key_ids.len() {
                return Err(Qkd014Error::InvalidRequest(format!(
                    "{} key ID extensions given for {} key IDs, one extension per key ID is expected",
                    extensions.len(),
                    key_ids.len()
                )));
            }
        }
        Ok(Self {
            key_ids,
            key_id_extensions,
            key_ids_extension,
        })
    }

    pub fn key_ids(&self) -> &[String] {
        &self.key_ids
    }

    /// Wire representation of the request
    pub(crate) fn to_request_body(&self) -> RequestListKeysIds {
        let key_ids = self.key_ids.iter().enumerate().map(|(i, key_id)| {
            RequestKeyId {
                key_ID: key_id.clone(),
                key_ID_extension: self.key_id_extensions.as_ref().map(|extensions| extensions[i].clone()),
            }
        }).collect();
        RequestListKeysIds {
            key_IDs: key_ids,
            key_IDs_extension: self.key_ids_extension.clone(),
        }
    }
}

impl fmt::Display for KeyIdRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key_id in self.to_request_body().key_IDs {
            write!(f, "Key ID : {}", key_id.key_ID)?;
            if let Some(extension) = key_id.key_ID_extension {
                write!(f, ", Key ID extension : {}", extension)?;
            }
            writeln!(f)?;
        }
        if let Some(extension) = &self.key_ids_extension {
            writeln!(f, "Key IDs extension : {}", extension)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Debug)]
#[allow(non_snake_case)]
pub(crate) struct RequestKeyId {
    pub(crate) key_ID: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key_ID_extension: Option<Value>,
}

#[derive(Serialize, Debug)]
#[allow(non_snake_case)]
pub(crate) struct RequestListKeysIds {
    pub(crate) key_IDs: Vec<RequestKeyId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) key_IDs_extension: Option<Value>,
}
impl HttpRequestBody for RequestListKeysIds {}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::qkd014_data::HttpRequestBody;
    use crate::qkd014_data::request_obj::{KeyIdRequest, KeyRequest};
    use crate::Qkd014Error;

    #[test]
    fn test_display_key_request() {
        let key_request = KeyRequest {
            number: Some(2),
            size: Some(256),
            ..Default::default()
        };
        assert_eq!(key_request.to_string(), "Number : Some(2)\nSize : Some(256)\nAdditional slave SAE IDs : None\nExtension mandatory : None\nExtension optional : None\n");
    }

    #[test]
    fn test_serialize_empty_key_request() {
        let key_request = KeyRequest::default();
        assert!(key_request.is_empty());
        assert_eq!(key_request.to_json().unwrap(), json!({}));
    }

    #[test]
    fn test_serialize_key_request_omits_unset_fields() {
        let key_request = KeyRequest {
            number: Some(2),
            ..Default::default()
        };
        assert!(!key_request.is_empty());
        assert_eq!(key_request.to_json().unwrap(), json!({"number": 2}));

        let key_request = KeyRequest {
            size: Some(256),
            extension_optional: Some(json!([{"abc_route_type": "direct"}])),
            ..Default::default()
        };
        assert_eq!(key_request.to_json().unwrap(), json!({"size": 256, "extension_optional": [{"abc_route_type": "direct"}]}));
    }

    #[test]
    fn test_serialize_key_request_explicit_zero_is_sent() {
        let key_request = KeyRequest {
            number: Some(0),
            additional_slave_SAE_IDs: Some(vec![]),
            ..Default::default()
        };
        assert!(!key_request.is_empty());
        assert_eq!(key_request.to_json().unwrap(), json!({"number": 0, "additional_slave_SAE_IDs": []}));
    }

    #[test]
    fn test_serialize_full_key_request() {
        let key_request = KeyRequest {
            number: Some(3),
            size: Some(1024),
            additional_slave_SAE_IDs: Some(vec!["ABCDEFG".to_string(), "HIJKLMN".to_string()]),
            extension_mandatory: Some(json!([{"abc_route_type": "direct"}, {"abc_transfer_method": "qkd"}])),
            extension_optional: Some(json!([{"abc_max_age": 30000}])),
        };
        assert_eq!(key_request.to_json().unwrap(), json!({
            "number": 3,
            "size": 1024,
            "additional_slave_SAE_IDs": ["ABCDEFG", "HIJKLMN"],
            "extension_mandatory": [{"abc_route_type": "direct"}, {"abc_transfer_method": "qkd"}],
            "extension_optional": [{"abc_max_age": 30000}]
        }));
    }

    #[test]
    fn test_serialize_key_id_request_without_extensions() {
        let request = KeyIdRequest::new(vec!["id1".to_string(), "id2".to_string(), "id3".to_string()], None, None).unwrap();
        let json = request.to_request_body().to_json().unwrap();
        assert_eq!(json, json!({"key_IDs": [{"key_ID": "id1"}, {"key_ID": "id2"}, {"key_ID": "id3"}]}));
        for element in json["key_IDs"].as_array().unwrap() {
            assert!(element.get("key_ID_extension").is_none());
        }
    }

    #[test]
    fn test_serialize_key_id_request_with_extensions() {
        let request = KeyIdRequest::new(
            vec!["id1".to_string(), "id2".to_string()],
            Some(vec![json!({"n": 1}), json!("second")]),
            Some(json!({"request": true})),
        ).unwrap();
        assert_eq!(request.to_request_body().to_json().unwrap(), json!({
            "key_IDs": [
                {"key_ID": "id1", "key_ID_extension": {"n": 1}},
                {"key_ID": "id2", "key_ID_extension": "second"}
            ],
            "key_IDs_extension": {"request": true}
        }));
    }

    #[test]
    fn test_key_id_request_extensions_length_mismatch() {
        let short = KeyIdRequest::new(vec!["id1".to_string(), "id2".to_string()], Some(vec![json!(1)]), None);
        assert!(matches!(short, Err(Qkd014Error::InvalidRequest(_))));
        let long = KeyIdRequest::new(vec!["id1".to_string()], Some(vec![json!(1), json!(2)]), None);
        assert!(matches!(long, Err(Qkd014Error::InvalidRequest(_))));
    }

    #[test]
    fn test_display_key_id_request() {
        let request = KeyIdRequest::new(vec!["id1".to_string(), "id2".to_string()], Some(vec![json!(1), json!(2)]), Some(json!("x"))).unwrap();
        assert_eq!(request.key_ids(), &["id1".to_string(), "id2".to_string()]);
        assert_eq!(request.to_string(), "Key ID : id1, Key ID extension : 1\nKey ID : id2, Key ID extension : 2\nKey IDs extension : \"x\"\n");
    }
}
