//! Login and envelope scenarios run offline against a scripted copy of the
//! site built on `FakeBrowser`.

use std::sync::Arc;
use std::time::Duration;

use goodbudget_checks::browser::Locator;
use goodbudget_checks::config::Timeouts;
use goodbudget_checks::fixtures::{
    EMPTY_ENVELOPE_NAME_ERROR, INVALID_AMOUNT_ERROR, INVALID_BUDGET_AMOUNTS, LOGIN_ERROR,
};
use goodbudget_checks::logger::Annotations;
use goodbudget_checks::pages::{
    EnvelopePage, EnvelopeRow, HomePage, LandingPage, LoginOptions, LoginPage, PageContext,
    PageErrorKind,
};
use goodbudget_checks::testing::{FakeBrowser, FakeElement, FakePage};

const SITE: &str = "https://www.goodbudget.com";
const EMAIL: &str = "existinguser@example.com";
const PASSWORD: &str = "defaultPassword123";

struct Site {
    browser: Arc<FakeBrowser>,
    ctx: PageContext,
    landing: LandingPage,
    login: LoginPage,
    home: HomePage,
    envelopes: EnvelopePage,
}

fn envelope_ids(page: &FakePage, rows: &Locator) -> Vec<String> {
    page.all(rows)
        .iter()
        .filter_map(|el| el.attributes.get("id").cloned())
        .collect()
}

fn add_row(page: &mut FakePage, envelopes: &EnvelopePage, id: &str, name: &str, amount: &str) {
    let row = EnvelopeRow::new(id);
    page.push(&envelopes.envelope_rows, FakeElement::visible().with_attr("id", id));
    page.push(&envelopes.first_envelope_name, FakeElement::visible().with_value(name));
    page.set(&row.name_input(), FakeElement::visible().with_value(name));
    page.set(&row.amount_input(), FakeElement::visible().with_value(amount));
    page.set(&row.edit_button(), FakeElement::visible());
    page.set(&row.delete_button(), FakeElement::visible());
}

/// Blank, or digits with at most one decimal point.
fn is_plain_amount(amount: &str) -> bool {
    amount.is_empty()
        || (amount.chars().all(|c| c.is_ascii_digit() || c == '.') && amount.parse::<f64>().is_ok())
}

/// Goodbudget as far as these scenarios see it: one account whose
/// Groceries and Gas envelopes total 348.33.
fn site() -> Site {
    let browser = Arc::new(FakeBrowser::new("about:blank"));
    let ctx = PageContext::new(browser.clone(), SITE)
        .with_timeouts(Timeouts::uniform(Duration::from_millis(100)))
        .with_annotations(Annotations::new());
    let site = Site {
        browser: browser.clone(),
        landing: LandingPage::new(&ctx),
        login: LoginPage::new(&ctx),
        home: HomePage::new(&ctx),
        envelopes: EnvelopePage::new(&ctx),
        ctx,
    };

    let login_link = site.landing.login_button.clone();
    browser.on_goto(SITE, move |page| page.set(&login_link, FakeElement::visible()));

    let (email, password, submit) = (
        site.login.email_input.clone(),
        site.login.password_input.clone(),
        site.login.login_button.clone(),
    );
    browser.on_click(&site.landing.login_button, move |page| {
        page.url = "https://goodbudget.com/login".to_string();
        for locator in [&email, &password, &submit] {
            page.set(locator, FakeElement::visible());
        }
    });

    let (email, password, error) = (
        site.login.email_input.clone(),
        site.login.password_input.clone(),
        site.login.general_error.clone(),
    );
    let (user_name, add_button, log_out) = (
        site.home.user_name.clone(),
        site.home.add_envelope_button.clone(),
        site.home.log_out_button.clone(),
    );
    browser.on_click(&site.login.login_button, move |page| {
        if page.value(&email) == Some(EMAIL) && page.value(&password) == Some(PASSWORD) {
            page.url = "https://goodbudget.com/home".to_string();
            page.set(&user_name, FakeElement::visible().with_text("existinguser"));
            page.set(&add_button, FakeElement::visible());
            page.set(&log_out, FakeElement::visible());
        } else {
            page.set(&error, FakeElement::visible().with_text(LOGIN_ERROR));
        }
    });

    browser.on_click(&site.home.log_out_button, |page| {
        page.url = "https://goodbudget.com/login".to_string();
    });

    // The editor is seeded on first open and keeps its rows afterwards.
    let envelopes = EnvelopePage::new(&site.ctx);
    browser.on_click(&site.home.add_envelope_button, move |page| {
        page.url = "https://goodbudget.com/envelope/edit".to_string();
        if page.all(&envelopes.envelope_rows).is_empty() {
            add_row(page, &envelopes, "1", "Groceries", "240.00");
            add_row(page, &envelopes, "2", "Gas", "108.33");
            page.set(&envelopes.monthly_budget_info, FakeElement::visible().with_text("$348.33"));
            page.set(&envelopes.new_envelope_button, FakeElement::visible());
            page.set(&envelopes.save_envelopes_button, FakeElement::visible());
        }
    });

    let envelopes = EnvelopePage::new(&site.ctx);
    browser.on_click(&site.envelopes.new_envelope_button, move |page| {
        add_row(page, &envelopes, "-1", "", "");
    });

    let new_row = EnvelopeRow::new("-1");
    let (amount, monthly) = (new_row.amount_input(), site.envelopes.monthly_budget_info.clone());
    browser.on_enter(&new_row.amount_input(), move |page| {
        if page.value(&amount) == Some("100") {
            page.set_text(&monthly, "$448.33");
        }
    });

    let envelopes = EnvelopePage::new(&site.ctx);
    browser.on_click(&new_row.delete_button(), move |page| {
        let row = EnvelopeRow::new("-1");
        if let Some(name) = page.value(&row.name_input()).map(str::to_string) {
            page.remove(&HomePage::envelope_entry(&name));
        }
        page.set_visible(&row.name_input(), false);
        page.retain_without(&envelopes.envelope_rows, "id", "-1");
        page.set_text(&envelopes.monthly_budget_info, "$348.33");
    });

    let envelopes = EnvelopePage::new(&site.ctx);
    browser.on_click(&site.envelopes.save_envelopes_button, move |page| {
        let ids = envelope_ids(page, &envelopes.envelope_rows);
        let names: Vec<String> = ids
            .iter()
            .filter_map(|id| page.value(&EnvelopeRow::new(id).name_input()).map(str::to_string))
            .collect();
        let amounts: Vec<String> = ids
            .iter()
            .filter_map(|id| page.value(&EnvelopeRow::new(id).amount_input()).map(str::to_string))
            .collect();
        let rejection = if names.iter().any(|name| name.is_empty()) {
            Some(EMPTY_ENVELOPE_NAME_ERROR)
        } else if amounts.iter().any(|amount| !is_plain_amount(amount)) {
            Some(INVALID_AMOUNT_ERROR)
        } else {
            None
        };
        if let Some(message) = rejection {
            page.set(
                &envelopes.validation_error_message,
                FakeElement::visible().with_text(message),
            );
            return;
        }
        page.url = "https://goodbudget.com/home".to_string();
        page.set(&envelopes.dont_fill_envelopes_button, FakeElement::visible());
        for name in names {
            page.set(&HomePage::envelope_entry(&name), FakeElement::visible());
            page.set(&HomePage::envelope_balance(&name), FakeElement::visible().with_text("$0.00"));
        }
    });

    site
}

async fn log_in(site: &Site) {
    site.landing.open().await.expect("open site");
    site.landing.navigate_login_page().await.expect("login page");
    site.login
        .provide_login_details(Some(EMAIL), Some(PASSWORD), LoginOptions::default())
        .await
        .expect("submit login");
    site.home
        .check_url(&site.ctx.url_pattern("home"), "")
        .await
        .expect("dashboard");
    site.home.verify_user_name("existinguser").await.expect("user name");
}

#[tokio::test]
async fn invalid_credentials_all_show_the_same_error() {
    let site = site();
    site.landing.open().await.unwrap();
    site.landing.navigate_login_page().await.unwrap();

    for (email, password) in [
        ("", ""),
        ("invalid-email", PASSWORD),
        ("nonexistent_1@example.com", PASSWORD),
        (EMAIL, "wrongPassword123!"),
    ] {
        site.browser.with_page(|page| page.remove(&site.login.general_error));
        site.login
            .provide_login_details(Some(email), Some(password), LoginOptions::default())
            .await
            .unwrap();
        assert!(site.login.verify_login_error(LOGIN_ERROR).await.unwrap());
    }
    assert_eq!(site.browser.url(), "https://goodbudget.com/login");
}

#[tokio::test]
async fn login_then_log_out() {
    let site = site();
    log_in(&site).await;

    site.home.log_out().await.unwrap();
    site.home
        .check_url(&site.ctx.url_pattern("login"), "Log In")
        .await
        .unwrap();

    let annotations = site.ctx.annotations.as_ref().unwrap().snapshot();
    assert!(annotations
        .iter()
        .any(|note| note.description.contains("Success: Log Out")));
}

#[tokio::test]
async fn create_then_delete_envelope() {
    let site = site();
    let (home, envelopes) = (&site.home, &site.envelopes);
    let name = "Groceries-1718000000000";
    log_in(&site).await;

    home.click_add_envelope_button().await.unwrap();
    envelopes.verify_monthly_budget("348.33").await.unwrap();
    envelopes.create_new_envelope(name, "100").await.unwrap();
    envelopes.verify_monthly_budget("448.33").await.unwrap();
    envelopes.save_changes(false).await.unwrap();
    envelopes.decide_to_fill_envelopes(false).await.unwrap();
    home.verify_created_envelope(name, true).await.unwrap();

    home.click_add_envelope_button().await.unwrap();
    envelopes.delete_envelope(name, "348.33").await.unwrap();
    envelopes.save_changes(false).await.unwrap();
    home.verify_deleted_envelope(name).await.unwrap();
}

#[tokio::test]
async fn empty_envelope_name_is_rejected() {
    let site = site();
    log_in(&site).await;

    site.home.click_add_envelope_button().await.unwrap();
    site.envelopes.create_new_envelope("", "100.00").await.unwrap();
    site.envelopes.save_changes(true).await.unwrap();
    site.envelopes
        .verify_error_message(EMPTY_ENVELOPE_NAME_ERROR)
        .await
        .unwrap();
}

#[tokio::test]
async fn malformed_amounts_are_rejected() {
    for (n, amount) in INVALID_BUDGET_AMOUNTS.iter().enumerate() {
        let site = site();
        log_in(&site).await;

        site.home.click_add_envelope_button().await.unwrap();
        site.envelopes
            .create_new_envelope(&format!("Groceries-{n}"), amount)
            .await
            .unwrap();
        site.envelopes.save_changes(true).await.unwrap();
        site.envelopes
            .verify_error_message(INVALID_AMOUNT_ERROR)
            .await
            .unwrap_or_else(|err| panic!("amount {amount:?}: {err}"));
        assert!(site.browser.url().ends_with("/envelope/edit"), "{amount:?} was saved");
    }
}

#[tokio::test]
async fn editing_an_unknown_envelope_names_it() {
    let site = site();
    log_in(&site).await;
    site.home.click_add_envelope_button().await.unwrap();

    let err = site
        .envelopes
        .edit_envelope("Rent", "0.00", "Mortgage", "900.00")
        .await
        .unwrap_err();
    assert_eq!(err.operation.as_deref(), Some("Edit Envelope"));
    assert!(matches!(err.kind, PageErrorKind::EnvelopeNotFound(_)));
    assert!(err.to_string().contains("\"Rent\""));
}
