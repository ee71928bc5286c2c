use super::*;
use crate::oauth::parse_callback;

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

#[tokio::test]
async fn wait_returns_full_href_of_first_request() {
    let listener = CallbackListener::bind(loopback()).await.unwrap();
    let addr = listener.local_addr();
    let waiter = tokio::spawn(listener.wait(Duration::from_secs(5)));

    let body = reqwest::get(format!("http://{addr}/auth?code=ABC123"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("You can return to the terminal"));
    assert!(!body.contains("Signed in"));

    let href = waiter.await.unwrap().unwrap();
    assert_eq!(href, format!("http://{addr}/auth?code=ABC123"));

    let cb = parse_callback(&href).unwrap();
    assert_eq!(cb.code, "ABC123");
    assert_eq!(cb.stripped_url, format!("http://{addr}/auth"));
}

#[tokio::test]
async fn wait_times_out_without_request() {
    let listener = CallbackListener::bind(loopback()).await.unwrap();
    let err = listener.wait(Duration::from_millis(50)).await.unwrap_err();
    assert!(matches!(err, CallbackError::TimedOut));
}

#[tokio::test]
async fn bind_in_use_address_fails() {
    let first = CallbackListener::bind(loopback()).await.unwrap();
    let err = CallbackListener::bind(first.local_addr()).await.err().unwrap();
    assert!(matches!(err, CallbackError::Bind { .. }));
}

#[tokio::test]
async fn landing_page_is_neutral_for_denied_consent() {
    let listener = CallbackListener::bind(loopback()).await.unwrap();
    let addr = listener.local_addr();
    let waiter = tokio::spawn(listener.wait(Duration::from_secs(5)));

    let body = reqwest::get(format!("http://{addr}/?error=access_denied"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("Signed in"));

    let href = waiter.await.unwrap().unwrap();
    assert_eq!(parse_callback(&href), None);
}
