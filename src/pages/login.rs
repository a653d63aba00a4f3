use crate::browser::Locator;

use super::signup::verify_validation_error;
use super::{PageContext, PageInteraction, PageResult};

#[derive(Debug, Clone, Copy)]
pub struct LoginOptions {
    pub click_login: bool,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self { click_login: true }
    }
}

pub struct LoginPage {
    ui: PageInteraction,
    login_url: String,
    pub email_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub general_error: Locator,
}

impl LoginPage {
    pub fn new(ctx: &PageContext) -> Self {
        Self {
            ui: ctx.interaction("LoginPage"),
            login_url: format!("{}/login", ctx.site_url),
            email_input: Locator::css("#username"),
            password_input: Locator::css("#password"),
            login_button: Locator::css(".elementor-button-text"),
            general_error: Locator::css("label[class=\"error\"]"),
        }
    }

    /// Open the login form directly instead of through the landing page.
    pub async fn navigate_to_login_page(&self) -> PageResult<()> {
        self.ui.goto(&self.login_url, "Log In").await
    }

    /// Type whichever credentials are given, then submit unless told not to.
    pub async fn provide_login_details(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        options: LoginOptions,
    ) -> PageResult<()> {
        if let Some(email) = email {
            self.ui.enter_email(&self.email_input, email).await?;
        }
        if let Some(password) = password {
            self.ui.enter_password(&self.password_input, password).await?;
        }
        if options.click_login {
            self.ui.click_element(&self.login_button, "Login button").await?;
        }
        Ok(())
    }

    pub async fn verify_validation_error(&self, error: &Locator, expected: &str) -> PageResult<bool> {
        verify_validation_error(&self.ui, error, expected).await
    }

    /// Whether the general login error shows `expected`.
    pub async fn verify_login_error(&self, expected: &str) -> PageResult<bool> {
        verify_validation_error(&self.ui, &self.general_error, expected).await
    }

    pub async fn check_url(&self, pattern: &str, page_name: &str) -> PageResult<()> {
        self.ui.check_url(pattern, page_name).await
    }
}
