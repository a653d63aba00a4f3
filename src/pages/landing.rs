use crate::browser::Locator;

use super::{PageContext, PageInteraction, PageResult};

/// Public marketing site: the entry point to sign-up and login
pub struct LandingPage {
    ui: PageInteraction,
    site_url: String,
    signup_pattern: String,
    login_pattern: String,
    pub login_button: Locator,
    pub sign_up_button: Locator,
}

impl LandingPage {
    pub fn new(ctx: &PageContext) -> Self {
        Self {
            ui: ctx.interaction("LandingPage"),
            site_url: ctx.site_url.clone(),
            signup_pattern: ctx.url_pattern("signup"),
            login_pattern: ctx.url_pattern("login"),
            login_button: Locator::xpath(
                "(//a[@class='elementor-item'][normalize-space()='Log in'])[1]",
            ),
            sign_up_button: Locator::xpath(
                "(//a[@class='elementor-item'][normalize-space()='Sign up'])[1]",
            ),
        }
    }

    /// Load the site root.
    pub async fn open(&self) -> PageResult<()> {
        self.ui.goto(&self.site_url, "Landing").await
    }

    pub async fn navigate_to_sign_up_page(&self) -> PageResult<()> {
        self.ui.click_element(&self.sign_up_button, "Sign Up").await?;
        self.ui.check_url(&self.signup_pattern, "Sign Up").await
    }

    pub async fn navigate_login_page(&self) -> PageResult<()> {
        self.ui.click_element(&self.login_button, "Log In").await?;
        self.ui.check_url(&self.login_pattern, "Log In").await
    }

    pub async fn check_url(&self, pattern: &str, page_name: &str) -> PageResult<()> {
        self.ui.check_url(pattern, page_name).await
    }
}
