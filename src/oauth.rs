//! OAuth 1.0a request signing (HMAC-SHA1) for the X API.
//!
//! Only query-string and explicitly passed form parameters take part in the
//! signature; JSON bodies never do.

use crate::error::PublishError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use itertools::Itertools;
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// User-context credentials for one X account.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &crate::utils::mask_secret(&self.consumer_key))
            .field("token", &crate::utils::mask_secret(&self.token))
            .finish_non_exhaustive()
    }
}

/// RFC 3986 percent-encoding as OAuth requires.
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

/// `Authorization` header value for a request, with a fresh nonce and the
/// current timestamp.
pub fn authorization_header(
    creds: &OAuthCredentials,
    method: &str,
    url: &Url,
) -> Result<String, PublishError> {
    let nonce: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let timestamp = chrono::Utc::now().timestamp().max(0) as u64;
    signed_header(creds, method, url, &[], &nonce, timestamp)
}

/// Deterministic variant of [`authorization_header`]; `form` holds any
/// url-encoded body parameters.
pub fn signed_header(
    creds: &OAuthCredentials,
    method: &str,
    url: &Url,
    form: &[(&str, &str)],
    nonce: &str,
    timestamp: u64,
) -> Result<String, PublishError> {
    let timestamp = timestamp.to_string();
    let oauth_params = [
        ("oauth_consumer_key", creds.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", creds.token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let param_string = oauth_params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .chain(query.iter().map(|(k, v)| (encode(k), encode(v))))
        .chain(form.iter().map(|(k, v)| (encode(k), encode(v))))
        .sorted()
        .map(|(k, v)| format!("{k}={v}"))
        .join("&");

    let base_url = format!("{}{}", url.origin().ascii_serialization(), url.path());
    let base_string = format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url),
        encode(&param_string)
    );
    let signing_key = format!("{}&{}", encode(&creds.consumer_secret), encode(&creds.token_secret));

    let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
        .map_err(|e| PublishError::Signing(e.to_string()))?;
    mac.update(base_string.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let header = oauth_params
        .iter()
        .copied()
        .chain(std::iter::once(("oauth_signature", signature.as_str())))
        .sorted()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .join(", ");

    Ok(format!("OAuth {header}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_creds() -> OAuthCredentials {
        OAuthCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    #[test]
    fn test_matches_published_signature_example() {
        let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true").unwrap();
        let header = signed_header(
            &example_creds(),
            "post",
            &url,
            &[("status", "Hello Ladies + Gentlemen, a signed OAuth request!")],
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            1318622958,
        )
        .unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.contains("oauth_version=\"1.0\""));
    }

    #[test]
    fn test_fresh_nonce_per_header() {
        let url = Url::parse("https://api.twitter.com/2/tweets").unwrap();
        let a = authorization_header(&example_creds(), "POST", &url).unwrap();
        let b = authorization_header(&example_creds(), "POST", &url).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_hides_secrets() {
        let shown = format!("{:?}", example_creds());
        assert!(!shown.contains("kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw"));
        assert!(!shown.contains("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));
    }
}
