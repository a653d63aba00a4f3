//! Login against the live site. Needs a WebDriver server and, for the
//! success cases, `GOODBUDGET_VALID_EMAIL` / `GOODBUDGET_VALID_PASSWORD`.

mod common;

use common::{ensure, LiveSession, TestResult};
use goodbudget_checks::fixtures::LOGIN_ERROR;
use goodbudget_checks::pages::{HomePage, LandingPage, LoginOptions, LoginPage};

async fn open_login(session: &LiveSession) -> TestResult {
    let landing = LandingPage::new(&session.ctx);
    landing.open().await?;
    landing.navigate_login_page().await?;
    Ok(())
}

async fn rejected_login(session: &LiveSession, email: &str, password: &str) -> TestResult {
    open_login(session).await?;
    let login = LoginPage::new(&session.ctx);
    login
        .provide_login_details(Some(email), Some(password), LoginOptions::default())
        .await?;
    ensure!(login.verify_login_error(LOGIN_ERROR).await?, "no login error for {email:?}");
    Ok(())
}

#[tokio::test]
#[ignore = "needs the live site and a WebDriver server"]
async fn navigates_to_login_page() -> TestResult {
    let session = LiveSession::start().await?;
    let ret = open_login(&session).await;
    session.finish(ret).await
}

#[tokio::test]
#[ignore = "needs the live site and a WebDriver server"]
async fn empty_credentials_are_rejected() -> TestResult {
    let session = LiveSession::start().await?;
    let ret = rejected_login(&session, "", "").await;
    session.finish(ret).await
}

#[tokio::test]
#[ignore = "needs the live site and a WebDriver server"]
async fn malformed_email_is_rejected() -> TestResult {
    let session = LiveSession::start().await?;
    let password = session.config.valid_password.clone();
    let ret = rejected_login(&session, "invalid-email", &password).await;
    session.finish(ret).await
}

#[tokio::test]
#[ignore = "needs the live site and a WebDriver server"]
async fn unknown_account_is_rejected() -> TestResult {
    let session = LiveSession::start().await?;
    let email = format!("nonexistent_{}@example.com", chrono::Utc::now().timestamp_millis());
    let password = session.config.valid_password.clone();
    let ret = rejected_login(&session, &email, &password).await;
    session.finish(ret).await
}

#[tokio::test]
#[ignore = "needs the live site and a WebDriver server"]
async fn wrong_password_is_rejected() -> TestResult {
    let session = LiveSession::start().await?;
    let email = session.config.valid_email.clone();
    let ret = rejected_login(&session, &email, "wrongPassword123!").await;
    session.finish(ret).await
}

#[tokio::test]
#[ignore = "needs the live site, a WebDriver server and valid credentials"]
async fn valid_login_then_log_out() -> TestResult {
    let session = LiveSession::start().await?;
    let ret = log_in_and_out(&session).await;
    session.finish(ret).await
}

async fn log_in_and_out(session: &LiveSession) -> TestResult {
    common::log_in(session).await?;
    let home = HomePage::new(&session.ctx);
    home.log_out().await?;
    home.check_url(&session.ctx.url_pattern("login"), "Log In").await?;
    Ok(())
}
