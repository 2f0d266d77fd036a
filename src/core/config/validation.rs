use super::service::{AppConfig, ConfigError};

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_range(
        "chunking.chunk_size",
        config.chunking.chunk_size as u64,
        1,
        10_000_000,
    )?;
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        return Err(ConfigError::Invalid {
            field: "chunking.chunk_overlap".to_string(),
            message: format!(
                "overlap {} must be smaller than chunk_size {}",
                config.chunking.chunk_overlap, config.chunking.chunk_size
            ),
        });
    }

    validate_range("retrieval.top_k", config.retrieval.top_k as u64, 1, 100)?;
    validate_range("server.max_upload_mb", config.server.max_upload_mb, 1, 10_240)?;
    validate_range("gemini.timeout_secs", config.gemini.timeout_secs, 1, 86_400)?;
    validate_range("web.timeout_secs", config.web.timeout_secs, 1, 86_400)?;

    if !(0.0..=2.0).contains(&config.gemini.temperature) {
        return Err(ConfigError::Invalid {
            field: "gemini.temperature".to_string(),
            message: format!("{} is outside 0.0..=2.0", config.gemini.temperature),
        });
    }

    validate_non_empty("server.host", &config.server.host)?;
    validate_non_empty("gemini.base_url", &config.gemini.base_url)?;
    validate_non_empty("gemini.embedding_model", &config.gemini.embedding_model)?;
    validate_non_empty("gemini.generation_model", &config.gemini.generation_model)?;

    Ok(())
}

fn validate_range(field: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            message: format!("{} is outside {}..={}", value, min, max),
        });
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}
