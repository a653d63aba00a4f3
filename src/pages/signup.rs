use crate::browser::Locator;

use super::{LandingPage, PageContext, PageInteraction, PageResult};

const CAPTCHA_PROMPT: &str = ">>> Pausing for manual CAPTCHA completion. Please solve the CAPTCHA in the browser, then resume the run. <<<";

/// Steps of the sign-up form to perform
#[derive(Debug, Clone, Copy)]
pub struct SignUpOptions {
    pub select_plan: bool,
    pub accept_terms: bool,
    pub pause_for_captcha: bool,
    pub submit: bool,
}

impl Default for SignUpOptions {
    fn default() -> Self {
        Self {
            select_plan: true,
            accept_terms: true,
            pause_for_captcha: true,
            submit: true,
        }
    }
}

pub struct SignUpPage {
    ui: PageInteraction,
    landing: LandingPage,
    pub email_field: Locator,
    pub password_field: Locator,
    pub plan_radio: Locator,
    pub terms_of_use_checkbox: Locator,
    pub get_started_button: Locator,
    pub validation_error: Locator,
}

impl SignUpPage {
    pub fn new(ctx: &PageContext) -> Self {
        Self {
            ui: ctx.interaction("SignUpPage"),
            landing: LandingPage::new(ctx),
            email_field: Locator::css("#new_household_email"),
            password_field: Locator::css("#new_household_new_password"),
            plan_radio: Locator::css("#new_household_plan_0"),
            terms_of_use_checkbox: Locator::css("#new_household_terms_of_use"),
            get_started_button: Locator::xpath("//span[@class=\"elementor-button-text\"]"),
            validation_error: Locator::css("label.error"),
        }
    }

    pub async fn navigate_to_sign_up_page(&self) -> PageResult<()> {
        self.landing.navigate_to_sign_up_page().await
    }

    /// Fill and submit the sign-up form.
    ///
    /// With `pause_for_captcha` set the run stops for the operator to solve
    /// the CAPTCHA before the final submit.
    pub async fn provide_sign_up_details(
        &self,
        email: &str,
        password: &str,
        options: SignUpOptions,
    ) -> PageResult<()> {
        self.ui.wait_for_dom_ready(self.ui.timeouts().url).await?;
        self.ui.enter_email(&self.email_field, email).await?;
        self.ui.enter_password(&self.password_field, password).await?;

        if options.select_plan {
            self.ui.click_element(&self.plan_radio, "Select Free Plan").await?;
        }
        if options.accept_terms {
            self.ui
                .click_element(&self.terms_of_use_checkbox, "Accept Terms of Use")
                .await?;
        }
        if options.pause_for_captcha {
            self.ui.logger().info(CAPTCHA_PROMPT, None);
            self.ui.pause(CAPTCHA_PROMPT).await?;
            self.ui
                .logger()
                .info(">>> Resuming test. Assuming CAPTCHA was solved. <<<", None);
        }
        if options.submit {
            self.ui
                .click_element(&self.get_started_button, "Get Started Button")
                .await?;
        }
        Ok(())
    }

    /// Whether `error` shows `expected` within the assertion timeout.
    ///
    /// Fails only when the error element never becomes visible.
    pub async fn verify_validation_error(&self, error: &Locator, expected: &str) -> PageResult<bool> {
        verify_validation_error(&self.ui, error, expected).await
    }
}

pub(crate) async fn verify_validation_error(
    ui: &PageInteraction,
    error: &Locator,
    expected: &str,
) -> PageResult<bool> {
    ui.expect_visible(error, "validation error", ui.timeouts().assertion)
        .await?;

    match ui.expect_text_contains(error, expected, "validation error").await {
        Ok(()) => {
            ui.logger()
                .assertion(&format!("Validation error shows: {}", expected), true, None, None);
            Ok(true)
        }
        Err(err) => {
            let actual = ui.text_of(error, "validation error").await?;
            ui.logger().assertion(
                &format!("Validation error shows: {}", expected),
                false,
                Some(expected),
                actual.as_deref().map(str::trim),
            );
            ui.logger().debug(err.to_string(), None);
            Ok(false)
        }
    }
}
