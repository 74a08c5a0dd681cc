use ink_core::InkError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> InkError {
    InkError::new(code, error.to_string())
}

pub(crate) fn map_state_write(error: std::io::Error) -> InkError {
    map_error("API_STATE_WRITE", error)
}

pub(crate) fn map_state_read(error: std::io::Error) -> InkError {
    map_error("API_STATE_READ", error)
}

pub(crate) fn map_state_encode(error: serde_json::Error) -> InkError {
    map_error("API_STATE_WRITE", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(
            map_state_write(std::io::Error::other("write")).code,
            "API_STATE_WRITE"
        );
        assert_eq!(
            map_state_read(std::io::Error::other("read")).code,
            "API_STATE_READ"
        );

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let mapped = map_state_encode(invalid);
        assert_eq!(mapped.code, "API_STATE_WRITE");
        assert!(!mapped.message.is_empty());
    }
}
