//! Fixed-width commitment codec.
//!
//! A bucket record is committed as a single 128-character string:
//!
//! | Range       | Field               |
//! |-------------|---------------------|
//! | `[0, 32)`   | `account_id`        |
//! | `[32, 64)`  | `access_key_id`     |
//! | `[64, 128)` | `secret_access_key` |
//!
//! `name` is not serialized; decoding sets it to the account id.
//!
//! Bulk ledger reads return the payload hex-encoded, optionally behind a
//! `0x` marker. [`decode_wire`] handles that form, [`decode`] the plain text.
//! Widths are counted in characters, not bytes.

use crate::bucket::BucketRecord;
use crate::error::{DecodeError, EncodeError};

/// Width of the account id field.
pub const ACCOUNT_ID_LEN: usize = 32;
/// Width of the access key id field.
pub const ACCESS_KEY_ID_LEN: usize = 32;
/// Width of the secret access key field.
pub const SECRET_ACCESS_KEY_LEN: usize = 64;
/// Total width of an encoded commitment.
pub const COMMITMENT_LEN: usize = ACCOUNT_ID_LEN + ACCESS_KEY_ID_LEN + SECRET_ACCESS_KEY_LEN;
/// Marker that may precede a hex-encoded wire payload.
pub const WIRE_PREFIX: &str = "0x";

/// Encode a record to its 128-character commitment.
///
/// Every field must already have its exact width. Shorter fields are
/// rejected rather than padded: `decode` cannot tell padding from content,
/// so a padded record would never compare equal to the one it came from and
/// reconciliation would republish it forever.
pub fn encode(record: &BucketRecord) -> Result<String, EncodeError> {
    check_width("account_id", &record.account_id, ACCOUNT_ID_LEN)?;
    check_width("access_key_id", &record.access_key_id, ACCESS_KEY_ID_LEN)?;
    check_width(
        "secret_access_key",
        &record.secret_access_key,
        SECRET_ACCESS_KEY_LEN,
    )?;

    let mut out = String::with_capacity(COMMITMENT_LEN);
    out.push_str(&record.account_id);
    out.push_str(&record.access_key_id);
    out.push_str(&record.secret_access_key);
    Ok(out)
}

/// Encode a record in the hex wire form (`0x` || hex(commitment)).
pub fn encode_wire(record: &BucketRecord) -> Result<String, EncodeError> {
    let plain = encode(record)?;
    Ok(format!("{}{}", WIRE_PREFIX, hex::encode(plain.as_bytes())))
}

/// Decode a plain 128-character commitment.
pub fn decode(raw: &str) -> Result<BucketRecord, DecodeError> {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() != COMMITMENT_LEN {
        return Err(DecodeError::InvalidLength {
            expected: COMMITMENT_LEN,
            actual: chars.len(),
        });
    }

    let (account, rest) = chars.split_at(ACCOUNT_ID_LEN);
    let (access_key, secret) = rest.split_at(ACCESS_KEY_ID_LEN);

    Ok(BucketRecord::new(
        account.iter().collect::<String>(),
        access_key.iter().collect::<String>(),
        secret.iter().collect::<String>(),
    ))
}

/// Decode a commitment as it appears in bulk ledger reads.
///
/// Strips an optional `0x` marker, hex-decodes, interprets the bytes as UTF-8,
/// trims surrounding whitespace, then decodes the text.
pub fn decode_wire(raw: &str) -> Result<BucketRecord, DecodeError> {
    let stripped = raw.strip_prefix(WIRE_PREFIX).unwrap_or(raw);
    let bytes = hex::decode(stripped)?;
    let text = String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    decode(text.trim())
}

fn check_width(field: &'static str, value: &str, expected: usize) -> Result<(), EncodeError> {
    let actual = value.chars().count();
    if actual != expected {
        return Err(EncodeError::FieldWidth {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
