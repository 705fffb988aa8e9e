use crate::BackendError;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Resolve the API credential: an explicit flag overrides the environment
/// variable, and missing both is an auth failure surfaced before any
/// generation call is attempted.
pub fn resolve_api_key(flag: Option<&str>) -> Result<String, BackendError> {
    resolve_from(flag, std::env::var(API_KEY_ENV_VAR).ok())
}

fn resolve_from(flag: Option<&str>, env_value: Option<String>) -> Result<String, BackendError> {
    flag.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or(env_value.filter(|k| !k.trim().is_empty()))
        .ok_or_else(|| {
            BackendError::Auth(format!(
                "API key not provided. Pass --api-key or set {}.",
                API_KEY_ENV_VAR
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_environment() {
        let key = resolve_from(Some("flag-key"), Some("env-key".into())).unwrap();
        assert_eq!(key, "flag-key");
    }

    #[test]
    fn test_environment_used_when_flag_absent() {
        let key = resolve_from(None, Some("env-key".into())).unwrap();
        assert_eq!(key, "env-key");
    }

    #[test]
    fn test_blank_flag_falls_back_to_environment() {
        let key = resolve_from(Some("  "), Some("env-key".into())).unwrap();
        assert_eq!(key, "env-key");
    }

    #[test]
    fn test_missing_both_is_auth_failure() {
        let err = resolve_from(None, None).unwrap_err();
        assert!(matches!(err, BackendError::Auth(_)));
    }
}
