/// Serde adapter storing an id as its raw `u64`.
///
/// Ids serialize as plain integers, which is how they are meant to land in
/// external systems (primary keys, wire fields). Deserialization checks that
/// reserved bits are zero, so a value produced by a different layout or by
/// bit corruption is rejected instead of silently decoded into nonsense
/// components.
///
/// # Example
///
/// ```
/// use floe::ClassicFlake;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Row {
///     #[serde(with = "floe::as_u64")]
///     id: ClassicFlake,
/// }
/// ```
pub mod as_u64 {
    use crate::Flake;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serializes an id as its raw integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<ID, S>(id: &ID, s: S) -> Result<S::Ok, S::Error>
    where
        ID: Flake,
        S: Serializer,
    {
        id.to_raw().serialize(s)
    }

    /// Deserializes an id from its raw integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying deserializer fails or if the value
    /// has reserved bits set for the target layout.
    pub fn deserialize<'de, ID, D>(d: D) -> Result<ID, D::Error>
    where
        ID: Flake,
        D: Deserializer<'de>,
    {
        let raw = u64::deserialize(d)?;
        if !ID::is_valid(raw) {
            return Err(serde::de::Error::custom(format_args!(
                "value {raw} has reserved bits set for this id layout"
            )));
        }
        Ok(ID::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ClassicFlake, Flake};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
    struct Row {
        #[serde(with = "super::as_u64")]
        id: ClassicFlake,
    }

    #[test]
    fn round_trips_through_json() {
        let row = Row {
            id: ClassicFlake::from(1234, 3, 7, 89),
        };
        let encoded = serde_json::to_string(&row).unwrap();
        assert_eq!(encoded, format!("{{\"id\":{}}}", row.id.to_raw()));

        let decoded: Row = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, row);
    }

    #[test]
    fn rejects_reserved_bits() {
        let raw = ClassicFlake::from(42, 1, 2, 3).to_raw() | 1 << 63;
        let err = serde_json::from_value::<Row>(json!({ "id": raw })).unwrap_err();
        assert!(err.to_string().contains("reserved bits"));
    }

    #[test]
    fn rejects_non_integers() {
        assert!(serde_json::from_value::<Row>(json!({ "id": "oops" })).is_err());
    }
}
