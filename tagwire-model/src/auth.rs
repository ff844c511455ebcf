//! Login credentials.

use crate::registry;
use tagwire_core::{CodecError, FieldType, Map, Record, RecordSchema, Value};
use tagwire_protocol::TypeTag;

pub const AUTHENTICATION_REQUEST: &str = "AuthenticationRequest";

pub(crate) fn schemas() -> Result<Vec<RecordSchema>, CodecError> {
    Ok(vec![RecordSchema::builder(AUTHENTICATION_REQUEST)
        .required(
            1,
            "credentials",
            FieldType::map(FieldType::String, FieldType::String),
        )
        .build()?])
}

pub fn authentication_request<K, V>(
    credentials: impl IntoIterator<Item = (K, V)>,
) -> Result<Record, CodecError>
where
    K: Into<String>,
    V: Into<String>,
{
    let mut map = Map::new(TypeTag::String, TypeTag::String);
    for (key, value) in credentials {
        map.insert(Value::String(key.into()), Value::String(value.into()))?;
    }
    registry()
        .new_record(AUTHENTICATION_REQUEST)?
        .with("credentials", map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_credentials_roundtrip() {
        let request =
            authentication_request([("username", "jsmith"), ("password", "havebadpass")]).unwrap();
        let bytes = codec().encode_to_bytes(&request).unwrap();
        // map header: key tag, value tag, count
        assert_eq!(&bytes[..10], [13, 0, 1, 11, 11, 0, 0, 0, 2, 0]);

        let decoded = codec().decode_bytes(&bytes, AUTHENTICATION_REQUEST).unwrap();
        assert_eq!(decoded, request);
        let credentials = decoded.get("credentials").and_then(Value::as_map).unwrap();
        assert_eq!(
            credentials.get(&Value::from("username")),
            Some(&Value::from("jsmith"))
        );
    }

    #[test]
    fn test_empty_credentials_are_valid() {
        let request = authentication_request(Vec::<(String, String)>::new()).unwrap();
        let bytes = codec().encode_to_bytes(&request).unwrap();
        assert_eq!(&bytes[..], [13, 0, 1, 11, 11, 0, 0, 0, 0, 0]);
        assert_eq!(
            codec().decode_bytes(&bytes, AUTHENTICATION_REQUEST).unwrap(),
            request
        );
    }
}
