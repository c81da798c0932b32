use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, Sqlite, Type};

use common::prelude::PublicKey;

/// Public key column, stored as base64 text
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DPublicKey(PublicKey);

impl From<DPublicKey> for PublicKey {
    fn from(val: DPublicKey) -> Self {
        val.0
    }
}

impl From<PublicKey> for DPublicKey {
    fn from(key: PublicKey) -> Self {
        Self(key)
    }
}

impl Decode<'_, Sqlite> for DPublicKey {
    fn decode(value: SqliteValueRef<'_>) -> Result<Self, BoxDynError> {
        let db_val = <String as Decode<Sqlite>>::decode(value)?;
        let key = PublicKey::from_base64(&db_val).map_err(DPublicKeyError::InvalidKey)?;

        Ok(Self(key))
    }
}

impl Encode<'_, Sqlite> for DPublicKey {
    fn encode_by_ref(
        &self,
        args: &mut Vec<SqliteArgumentValue<'_>>,
    ) -> Result<IsNull, BoxDynError> {
        args.push(SqliteArgumentValue::Text(self.0.to_base64().into()));
        Ok(IsNull::No)
    }
}

impl Type<Sqlite> for DPublicKey {
    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty)
    }

    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DPublicKeyError {
    #[error("invalid public key: {0}")]
    InvalidKey(#[from] common::crypto::KeyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::SecretKey;

    #[test]
    fn test_encode_public_key() -> Result<(), BoxDynError> {
        let key = SecretKey::generate()?.public();
        let dkey = DPublicKey::from(key);

        let mut args = Vec::new();
        let _ = dkey.encode_by_ref(&mut args)?;

        if let SqliteArgumentValue::Text(encoded) = &args[0] {
            assert_eq!(encoded.as_ref(), key.to_base64());
        } else {
            panic!("Expected Text variant");
        }

        Ok(())
    }
}
