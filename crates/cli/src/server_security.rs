use anyhow::{Context as AnyhowContext, Result};
use std::net::SocketAddr;

pub(crate) const AUTH_TOKEN_ENV: &str = "GRANTSCOPE_AUTH_TOKEN";

#[derive(Clone, Debug)]
pub(crate) struct AuthToken {
    token: String,
}

impl AuthToken {
    pub(crate) fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        let Some(raw) = raw else {
            return Ok(None);
        };

        let token = raw.trim();
        if token.is_empty() {
            anyhow::bail!("auth token must be non-empty")
        }

        Ok(Some(Self {
            token: token.to_string(),
        }))
    }

    pub(crate) fn matches_http_authorization_header(&self, header_value: &str) -> bool {
        let Some(rest) = header_value.trim().strip_prefix("Bearer ") else {
            return false;
        };
        constant_time_eq(rest.trim(), &self.token)
    }
}

/// Resolves `bind` and refuses any non-loopback address unless `public`.
pub(crate) async fn resolve_guarded_bind_addrs(bind: &str, public: bool) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(bind)
        .await
        .with_context(|| format!("Failed to resolve bind address: {bind}"))?
        .collect();
    if addrs.is_empty() {
        anyhow::bail!("Bind address resolved to zero socket addrs: {bind}")
    }

    if !public && addrs.iter().any(|addr| !addr.ip().is_loopback()) {
        anyhow::bail!(
            "Refusing to bind to non-loopback address without --public: {bind}. To expose the server, pass --public and set {AUTH_TOKEN_ENV} (or --auth-token)."
        )
    }
    Ok(addrs)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_token_parses_and_matches_bearer_header() {
        let token = AuthToken::parse(Some("  secret  ")).unwrap().unwrap();
        assert!(token.matches_http_authorization_header("Bearer secret"));
        assert!(!token.matches_http_authorization_header("secret"));
        assert!(!token.matches_http_authorization_header("Bearer wrong"));
        assert!(AuthToken::parse(Some("   ")).is_err());
        assert!(AuthToken::parse(None).unwrap().is_none());
    }

    #[tokio::test]
    async fn bind_guard_requires_public_for_non_loopback() {
        resolve_guarded_bind_addrs("127.0.0.1:0", false).await.unwrap();
        assert!(resolve_guarded_bind_addrs("0.0.0.0:0", false).await.is_err());
        resolve_guarded_bind_addrs("0.0.0.0:0", true).await.unwrap();
    }
}
