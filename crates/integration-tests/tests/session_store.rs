//! Session records are released once a visitor has nothing left in them.

use toys_marketplace_integration_tests::{
    HERO_FIGURE, TestApp, USER_EMAIL, USER_PASSWORD, location, session_id,
};

#[tokio::test]
async fn test_anonymous_toast_session_is_released() {
    let app = TestApp::spawn().await;

    let product_id = HERO_FIGURE.to_string();
    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", product_id.as_str()), ("return_to", "/login")],
        )
        .await;
    assert_eq!(location(&response).as_deref(), Some("/login"));
    let id = session_id(&response).expect("toast session cookie");
    assert!(app.has_session(&id).await);

    let page = app.page("/login").await;
    assert!(page.contains("Please log in to add items to cart"));
    assert!(!app.has_session(&id).await);

    // Nothing to show on the next page
    let page = app.page("/login").await;
    assert!(!page.contains("Please log in to add items to cart"));
}

#[tokio::test]
async fn test_failed_login_session_is_released() {
    let app = TestApp::spawn().await;

    let response = app.login(USER_EMAIL, "wrong-password").await;

    // The toast is rendered on the same response, so no session is issued
    assert!(session_id(&response).is_none());
    let page = response.text().await.expect("login page");
    assert!(page.contains("Incorrect email or password"));
}

#[tokio::test]
async fn test_signed_in_session_survives_toast_drain() {
    let app = TestApp::spawn().await;

    let response = app.login(USER_EMAIL, USER_PASSWORD).await;
    assert_eq!(location(&response).as_deref(), Some("/"));
    let id = session_id(&response).expect("signed-in session cookie");

    let home = app.page("/").await;
    assert!(home.contains("Login successful!"));
    assert!(app.has_session(&id).await);

    app.post_form("/logout", &[]).await;
    assert!(app.has_session(&id).await);

    let home = app.page("/").await;
    assert!(home.contains("Logged out successfully"));
    assert!(!app.has_session(&id).await);
}
