use std::{env, str::FromStr};

use anyhow::{Context, Result};

use super::{
    config_model::{
        AuthSecret, BackendServer, Calendar, Chatbot, Database, DotEnvyConfig, Gemini,
        ImageHosting,
    },
    stage::Stage,
};

const MIN_JWT_SECRET_LEN: usize = 32;

fn required(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("{} is missing", key))
}

fn parsed<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .trim()
        .parse::<T>()
        .with_context(|| format!("{} is invalid", key))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} is invalid", key)),
        _ => Ok(default),
    }
}

fn string_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: parsed("SERVER_PORT_BACKEND")?,
        body_limit: parsed("SERVER_BODY_LIMIT")?,
        timeout: parsed("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
    };

    let jwt_secret = required("JWT_SECRET")?;
    if jwt_secret.len() < MIN_JWT_SECRET_LEN {
        anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_JWT_SECRET_LEN);
    }
    let auth = AuthSecret {
        jwt_secret,
        token_ttl_seconds: parsed_or("JWT_TTL_SECONDS", 7 * 24 * 60 * 60)?,
    };

    let gemini = Gemini {
        api_base: string_or(
            "GEMINI_API_BASE",
            "https://generativelanguage.googleapis.com",
        ),
        api_key: required("GEMINI_API_KEY")?,
        model: string_or("GEMINI_MODEL", "gemini-1.5-flash"),
        temperature: parsed_or("GEMINI_TEMPERATURE", 0.7)?,
        max_output_tokens: parsed_or("GEMINI_MAX_OUTPUT_TOKENS", 1024)?,
        timeout_secs: parsed_or("GEMINI_TIMEOUT_SECS", 30)?,
    };

    let image_hosting = ImageHosting {
        upload_url: string_or("IMGBB_UPLOAD_URL", "https://api.imgbb.com/1/upload"),
        api_key: required("IMGBB_API_KEY")?,
        timeout_secs: parsed_or("IMGBB_TIMEOUT_SECS", 30)?,
    };

    let chatbot = Chatbot {
        free_daily_limit: parsed_or("FREE_CHATBOT_DAILY_LIMIT", 10)?,
    };

    let utc_offset_hours: i32 = parsed_or("LOCAL_UTC_OFFSET_HOURS", 7)?;
    if !(-12..=14).contains(&utc_offset_hours) {
        anyhow::bail!("LOCAL_UTC_OFFSET_HOURS must be between -12 and 14");
    }
    let calendar = Calendar { utc_offset_hours };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        auth,
        gemini,
        image_hosting,
        chatbot,
        calendar,
        stage: get_stage(),
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_or_falls_back_when_unset() {
        let value: i32 = parsed_or("EMOCARE_TEST_UNSET_VARIABLE", 10).unwrap();
        assert_eq!(value, 10);
    }

    #[test]
    fn required_names_the_missing_variable() {
        let err = required("EMOCARE_TEST_MISSING_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("EMOCARE_TEST_MISSING_VARIABLE"));
    }

    #[test]
    fn stage_parses_aliases() {
        assert_eq!(Stage::try_from("prod").unwrap(), Stage::Production);
        assert_eq!(Stage::try_from(" Local ").unwrap(), Stage::Local);
        assert!(Stage::try_from("staging").is_err());
    }
}
