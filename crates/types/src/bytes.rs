use faster_hex::{hex_decode, hex_string};
use std::fmt;

/// Variable length bytes, hex encoded on the wire.
///
/// Chain nodes emit hex without a prefix; a leading `0x` is accepted when
/// decoding.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonBytes(Vec<u8>);

impl JsonBytes {
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        JsonBytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn to_hex(&self) -> String {
        hex_string(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, faster_hex::Error> {
        let s = s.trim_start_matches("0x");
        // odd length input is rejected by hex_decode
        let mut buf = vec![0u8; s.len() / 2];
        hex_decode(s.as_bytes(), &mut buf)?;
        Ok(JsonBytes(buf))
    }
}

impl From<Vec<u8>> for JsonBytes {
    fn from(bytes: Vec<u8>) -> Self {
        JsonBytes(bytes)
    }
}

impl fmt::Debug for JsonBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonBytes({})", self.to_hex())
    }
}

impl fmt::Display for JsonBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

struct JsonBytesVisitor;

impl<'b> serde::de::Visitor<'b> for JsonBytesVisitor {
    type Value = JsonBytes;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a hex string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        JsonBytes::from_hex(v).map_err(|_| E::invalid_value(serde::de::Unexpected::Str(v), &self))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        self.visit_str(&v)
    }
}

impl serde::Serialize for JsonBytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for JsonBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(JsonBytesVisitor)
    }
}
