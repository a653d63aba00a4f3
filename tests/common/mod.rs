//! Shared setup for the live suites.
//!
//! Scenario bodies check with [`ensure!`] and [`ensure_eq!`] instead of
//! `assert!`: a failed check returns `Err`, so the session's `finish` still
//! runs its teardown.

#![allow(dead_code, unused_macros, unused_imports)]

use std::error::Error;
use std::sync::Arc;

use goodbudget_checks::browser::WebDriverBrowser;
use goodbudget_checks::config::{load_dotenv, E2eConfig};
use goodbudget_checks::logger::{init_tracing, Annotations};
use goodbudget_checks::pages::{HomePage, LandingPage, LoginOptions, LoginPage, PageContext};

pub type TestResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Return `Err` from the enclosing scenario unless `cond` holds.
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        if !$cond {
            return Err(format!("check failed: {}", stringify!($cond)).into());
        }
    };
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            return Err(format!($($msg)+).into());
        }
    };
}

/// Return `Err` from the enclosing scenario unless both sides are equal.
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return Err(format!(
                        "check failed: {} == {}\n  left: {:?}\n right: {:?}",
                        stringify!($left),
                        stringify!($right),
                        left,
                        right
                    )
                    .into());
                }
            }
        }
    };
}

pub(crate) use ensure;
pub(crate) use ensure_eq;

/// One browser session per test.
pub struct LiveSession {
    pub config: E2eConfig,
    pub ctx: PageContext,
    pub annotations: Annotations,
    browser: Arc<WebDriverBrowser>,
}

impl LiveSession {
    pub async fn start() -> Result<Self, Box<dyn Error + Send + Sync>> {
        load_dotenv();
        init_tracing();

        let config = E2eConfig::from_env();
        let browser = Arc::new(WebDriverBrowser::connect(&config).await?);
        let annotations = Annotations::new();
        let ctx = PageContext::new(browser.clone(), config.site_url.clone())
            .with_annotations(annotations.clone());

        Ok(Self {
            config,
            ctx,
            annotations,
            browser,
        })
    }

    /// Close the browser, print the annotation report and hand back the
    /// scenario's own result.
    pub async fn finish(self, outcome: TestResult) -> TestResult {
        for note in self.annotations.snapshot() {
            println!("[{}] {}", note.kind, note.description);
        }
        self.browser.quit().await?;
        outcome
    }
}

/// Log in with the configured account and land on the dashboard.
pub async fn log_in(session: &LiveSession) -> TestResult {
    let landing = LandingPage::new(&session.ctx);
    let login = LoginPage::new(&session.ctx);
    let home = HomePage::new(&session.ctx);

    landing.open().await?;
    landing.navigate_login_page().await?;
    login
        .provide_login_details(
            Some(session.config.valid_email.as_str()),
            Some(session.config.valid_password.as_str()),
            LoginOptions::default(),
        )
        .await?;
    home.check_url(&session.ctx.url_pattern("home"), "").await?;
    home.verify_user_name(session.config.valid_username()).await?;
    Ok(())
}
