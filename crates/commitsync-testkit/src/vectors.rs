//! Golden wire vectors.
//!
//! Each vector pins the exact on-ledger value for a known record, so any
//! change to field order, widths, or hex casing shows up as a failure.

use commitsync_core::{decode_wire, encode_wire, BucketRecord};

/// A record and its expected wire encoding.
#[derive(Debug, Clone)]
pub struct WireVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub account_id: &'static str,
    pub access_key_id: &'static str,
    pub secret_access_key: &'static str,
    /// Expected `0x`-prefixed lowercase hex.
    pub expected_wire: &'static str,
}

impl WireVector {
    pub fn record(&self) -> BucketRecord {
        BucketRecord::new(self.account_id, self.access_key_id, self.secret_access_key)
    }
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<WireVector> {
    vec![
        WireVector {
            name: "repeated letters",
            account_id: "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            access_key_id: "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
            secret_access_key: "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
            expected_wire: "0x\
                6161616161616161616161616161616161616161616161616161616161616161\
                6262626262626262626262626262626262626262626262626262626262626262\
                6363636363636363636363636363636363636363636363636363636363636363\
                6363636363636363636363636363636363636363636363636363636363636363",
        },
        WireVector {
            name: "realistic credentials",
            account_id: "0123456789abcdef0123456789abcdef",
            access_key_id: "AKIAEXAMPLEKEY00AKIAEXAMPLEKEY00",
            secret_access_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEYwJalrXUtnFEMI/K7MDENG/bP",
            expected_wire: "0x\
                3031323334353637383961626364656630313233343536373839616263646566\
                414b49414558414d504c454b45593030414b49414558414d504c454b45593030\
                774a616c725855746e46454d492f4b374d44454e472f62507852666943594558\
                414d504c454b4559774a616c725855746e46454d492f4b374d44454e472f6250",
        },
    ]
}

/// Check every vector in both directions.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let record = vector.record();
        let wire = encode_wire(&record).map_err(|e| format!("{}: {}", vector.name, e))?;
        if wire != vector.expected_wire {
            return Err(format!(
                "{}: encoded {} but expected {}",
                vector.name, wire, vector.expected_wire
            ));
        }
        let decoded = decode_wire(vector.expected_wire).map_err(|e| format!("{}: {}", vector.name, e))?;
        if decoded != record {
            return Err(format!("{}: decoded record differs", vector.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors() {
        verify_all_vectors().unwrap();
    }

    #[test]
    fn test_vector_widths() {
        for vector in all_vectors() {
            assert_eq!(vector.expected_wire.len(), 2 + 256, "{}", vector.name);
        }
    }
}
