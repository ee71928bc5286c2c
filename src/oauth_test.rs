use super::*;

// =============================================================================
// sign_in_url
// =============================================================================

#[test]
fn sign_in_url_contains_scope_and_client_id() {
    assert_eq!(
        sign_in_url("Iv1.abc"),
        "https://github.com/login/oauth/authorize?scope=user&client_id=Iv1.abc"
    );
}

#[test]
fn sign_in_url_with_empty_client_id_is_still_built() {
    assert!(sign_in_url("").ends_with("client_id="));
}

// =============================================================================
// parse_callback
// =============================================================================

#[test]
fn parse_callback_splits_code_and_url() {
    let cb = parse_callback("https://app/x?code=ABC123").unwrap();
    assert_eq!(cb.code, "ABC123");
    assert_eq!(cb.stripped_url, "https://app/x");
}

#[test]
fn parse_callback_without_marker_is_none() {
    assert_eq!(parse_callback("https://app/x"), None);
    assert_eq!(parse_callback("https://app/x?state=1&code=ABC"), None);
}

#[test]
fn parse_callback_empty_code_is_none() {
    assert_eq!(parse_callback("https://app/x?code="), None);
    assert_eq!(parse_callback("https://app/x?code=&state=1"), None);
}

#[test]
fn parse_callback_stops_at_next_param_or_fragment() {
    assert_eq!(parse_callback("http://127.0.0.1:3000/?code=abc&state=xyz").unwrap().code, "abc");
    assert_eq!(parse_callback("https://app/?code=abc#top").unwrap().code, "abc");
}

#[test]
fn parse_callback_keeps_root_path() {
    let cb = parse_callback("http://localhost:3000/?code=f00").unwrap();
    assert_eq!(cb.stripped_url, "http://localhost:3000/");
}

#[test]
fn parse_callback_stops_at_repeated_marker() {
    let cb = parse_callback("https://app/?code=A?code=B").unwrap();
    assert_eq!(cb.code, "A");
    assert_eq!(cb.stripped_url, "https://app/");
}
