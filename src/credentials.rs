use std::env;
use std::fmt;

use crate::error::AppError;

pub const ENV_ACCESS_KEY_ID: &str = "OSS_ACCESS_KEY_ID";
pub const ENV_ACCESS_KEY_SECRET: &str = "OSS_ACCESS_KEY_SECRET";

/// OSS访问凭证。secret不会出现在Debug输出或任何错误信息中。
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub access_key_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// 如果同时提供 access id 和 secret，使用静态凭证；
    /// 否则回退到环境变量 OSS_ACCESS_KEY_ID / OSS_ACCESS_KEY_SECRET。
    pub fn resolve(explicit_id: &str, explicit_secret: &str) -> crate::Result<Self> {
        resolve_from(
            explicit_id,
            explicit_secret,
            env::var(ENV_ACCESS_KEY_ID).ok().as_deref(),
            env::var(ENV_ACCESS_KEY_SECRET).ok().as_deref(),
        )
    }
}

pub fn resolve_from(
    explicit_id: &str,
    explicit_secret: &str,
    env_id: Option<&str>,
    env_secret: Option<&str>,
) -> crate::Result<Credentials> {
    if !explicit_id.is_empty() || !explicit_secret.is_empty() {
        if explicit_id.is_empty() || explicit_secret.is_empty() {
            return Err(AppError::Usage(
                "oss access id 和 secret 必须同时提供，或者都不提供以使用环境变量".to_string(),
            ));
        }
        return Ok(Credentials {
            access_key_id: explicit_id.to_string(),
            access_key_secret: explicit_secret.to_string(),
        });
    }

    match (env_id, env_secret) {
        (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Ok(Credentials {
            access_key_id: id.to_string(),
            access_key_secret: secret.to_string(),
        }),
        _ => Err(AppError::Usage(format!(
            "请提供 OSS Access Key ID 和 Secret，或者设置环境变量 {} 和 {}",
            ENV_ACCESS_KEY_ID, ENV_ACCESS_KEY_SECRET
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_pair_wins_over_env() {
        let creds =
            resolve_from("flag-id", "flag-secret", Some("env-id"), Some("env-secret")).unwrap();
        assert_eq!(creds.access_key_id, "flag-id");
        assert_eq!(creds.access_key_secret, "flag-secret");
    }

    #[test]
    fn test_partial_explicit_pair_fails() {
        assert!(resolve_from("flag-id", "", Some("env-id"), Some("env-secret")).is_err());
        assert!(resolve_from("", "flag-secret", Some("env-id"), Some("env-secret")).is_err());
    }

    #[test]
    fn test_falls_back_to_env() {
        let creds = resolve_from("", "", Some("env-id"), Some("env-secret")).unwrap();
        assert_eq!(creds.access_key_id, "env-id");
        assert_eq!(creds.access_key_secret, "env-secret");
    }

    #[test]
    fn test_incomplete_env_fails() {
        assert!(resolve_from("", "", Some("env-id"), None).is_err());
        assert!(resolve_from("", "", None, Some("env-secret")).is_err());
        assert!(resolve_from("", "", None, None).is_err());
        assert!(resolve_from("", "", Some(""), Some("env-secret")).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials {
            access_key_id: "id".to_string(),
            access_key_secret: "super-secret".to_string(),
        };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
