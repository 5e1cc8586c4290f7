//! Ledger addresses.
//!
//! Addresses are opaque 20-byte identifiers. Key derivation and signature
//! checking happen upstream of this engine; by the time a transaction
//! reaches the state machine its addresses are already authenticated.

/// 20-byte ledger address.
pub type Address = [u8; 20];

/// Render an address as lowercase hex, for error messages and logs.
pub fn address_to_hex(address: &Address) -> String {
    let mut out = String::with_capacity(40);
    for byte in address {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_to_hex() {
        let mut addr = [0u8; 20];
        addr[0] = 0xAB;
        addr[19] = 0x01;
        let hex = address_to_hex(&addr);
        assert_eq!(hex.len(), 40);
        assert!(hex.starts_with("ab"));
        assert!(hex.ends_with("01"));
    }
}
