use serde::Deserialize;

/// Configuration for decode/size/encode calls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodecConfig {
    /// Upper bound on an array element count read from the wire.
    pub max_array_length: Option<usize>,

    /// Whether `string` payloads must be valid UTF-8. When false, invalid
    /// sequences are replaced and decoding continues.
    pub strict_utf8: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_array_length: None,
            strict_utf8: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: CodecConfig = serde_json::from_str(r#"{"maxArrayLength": 16}"#).unwrap();
        assert_eq!(config.max_array_length, Some(16));
        assert!(config.strict_utf8);

        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
    }
}
