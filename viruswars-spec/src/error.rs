//! # Encoding Error Types

use thiserror::Error;

/// Raised only on internal misuse of the codec: a value handed to an
/// encoder that cannot be represented in its field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("literal {0} outside the 12-bit range [-2048, 2047]")]
    LiteralOutOfRange(i32),

    #[error("data value {0} outside the 28-bit range [-134217728, 134217727]")]
    DataValueOutOfRange(i64),

    #[error("register index {0} outside 1..=32")]
    BadRegisterIndex(u8),

    #[error("dereference count {0} not supported (max 2)")]
    BadDereferenceCount(u8),

    #[error("opcode value {0:#x} outside the 4-bit range")]
    BadOpcode(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EncodingError::LiteralOutOfRange(5000);
        assert_eq!(
            err.to_string(),
            "literal 5000 outside the 12-bit range [-2048, 2047]"
        );

        let err = EncodingError::BadRegisterIndex(33);
        assert_eq!(err.to_string(), "register index 33 outside 1..=32");
    }
}
