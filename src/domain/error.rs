//! Domain error types.

/// Top-level error type for fxlab.
#[derive(Debug, thiserror::Error)]
pub enum FxlabError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Unknown bot type: {0}")]
    UnknownBotType(String),

    #[error("Bot not found: {0}")]
    BotNotFound(String),

    #[error("Bot {name} is not active")]
    BotInactive { name: String },

    #[error("Bot execution failed: {reason}")]
    Execution { reason: String },

    #[error("unsupported input for {bot}: {reason}")]
    InvalidInput { bot: String, reason: String },

    #[error("market data error: {reason}")]
    MarketData { reason: String },

    #[error("no price data for {pair}")]
    NoData { pair: String },

    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FxlabError> for std::process::ExitCode {
    fn from(err: &FxlabError) -> Self {
        let code: u8 = match err {
            FxlabError::Io(_) | FxlabError::Json(_) => 1,
            FxlabError::ConfigParse { .. } | FxlabError::ConfigInvalid { .. } => 2,
            FxlabError::UnknownBotType(_) | FxlabError::BotNotFound(_) => 3,
            FxlabError::BotInactive { .. }
            | FxlabError::Execution { .. }
            | FxlabError::InvalidInput { .. } => 4,
            FxlabError::MarketData { .. }
            | FxlabError::NoData { .. }
            | FxlabError::InvalidSignal(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_message_names_bot() {
        let err = FxlabError::BotInactive {
            name: "solver".into(),
        };
        assert_eq!(err.to_string(), "Bot solver is not active");
    }

    #[test]
    fn execution_message_wraps_reason() {
        let err = FxlabError::Execution {
            reason: "boom".into(),
        };
        assert_eq!(err.to_string(), "Bot execution failed: boom");
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FxlabError = io.into();
        assert!(matches!(err, FxlabError::Io(_)));
    }

    #[test]
    fn exit_codes_differ_by_class() {
        let config = FxlabError::ConfigInvalid {
            key: "k".into(),
            reason: "r".into(),
        };
        let missing = FxlabError::BotNotFound("x".into());
        assert_eq!(
            std::process::ExitCode::from(&config),
            std::process::ExitCode::from(2)
        );
        assert_eq!(
            std::process::ExitCode::from(&missing),
            std::process::ExitCode::from(3)
        );
    }
}
