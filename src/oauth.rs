//! GitHub OAuth URL helpers: authorize URL and callback-code extraction.
//!
//! DESIGN
//! ======
//! Both helpers are pure string functions. The callback parser deliberately
//! does not validate the surrounding URL; whatever precedes the `?code=`
//! marker is handed back untouched as the replacement location.

#[cfg(test)]
#[path = "oauth_test.rs"]
mod oauth_test;

pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
pub const OAUTH_SCOPE: &str = "user";
const CODE_MARKER: &str = "?code=";

/// Build the GitHub authorization URL for `client_id`.
///
/// An empty client id still yields a URL; GitHub rejects it at consent time.
#[must_use]
pub fn sign_in_url(client_id: &str) -> String {
    format!("{GITHUB_AUTHORIZE_URL}?scope={OAUTH_SCOPE}&client_id={client_id}")
}

/// An OAuth code split out of a redirect URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackCode {
    /// The authorization code.
    pub code: String,
    /// The URL with the `?code=...` suffix removed.
    pub stripped_url: String,
}

/// Extract the OAuth code from a redirect URL such as `https://app/x?code=ABC123`.
///
/// Returns `None` when the marker is absent or the code is empty. The code
/// ends at the first `&`, `#`, or repeated `?code=` marker.
#[must_use]
pub fn parse_callback(href: &str) -> Option<CallbackCode> {
    let (stripped, rest) = href.split_once(CODE_MARKER)?;
    let rest = rest.split_once(CODE_MARKER).map_or(rest, |(first, _)| first);
    let end = rest.find(['&', '#']).unwrap_or(rest.len());
    let code = &rest[..end];
    if code.is_empty() {
        return None;
    }
    Some(CallbackCode { code: code.to_owned(), stripped_url: stripped.to_owned() })
}
