//! Key layout.
//!
//! Every stored key is prefixed with a one-byte table identifier so that
//! unrelated kinds of state can share one database and still be enumerated
//! per table.

/// Table holding miscellaneous node state (liveness records, flags).
pub const COMMON_TABLE: u8 = 1;

/// Build `[table] ‖ key`.
pub fn table_key(table: u8, key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(key.len() + 1);
    out.push(table);
    out.extend_from_slice(key);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_key() {
        assert_eq!(table_key(1, b"ab"), vec![1, b'a', b'b']);
        assert_eq!(table_key(7, b""), vec![7]);
    }
}
