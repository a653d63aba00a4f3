use regex::escape;
use serde_json::json;

use crate::browser::{BrowserError, Locator};

use super::{PageContext, PageError, PageErrorKind, PageInteraction, PageResult};

/// One `li[id]` row of the envelope editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeRow {
    id: String,
}

impl EnvelopeRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn scoped(&self, inner: &str) -> Locator {
        Locator::css(format!("li[id=\"{}\"] {}", self.id, inner))
    }

    pub fn name_input(&self) -> Locator {
        self.scoped("div[class=\"row-name\"] input[type=\"text\"]")
    }

    pub fn amount_input(&self) -> Locator {
        self.scoped("input[placeholder=\"0.00\"]")
    }

    pub fn edit_button(&self) -> Locator {
        self.scoped("button[class=\"btn btn-ok\"]")
    }

    pub fn delete_button(&self) -> Locator {
        self.scoped("i[class=\"icon-remove-sign\"]")
    }
}

/// The envelope editor (`/envelope/edit`).
pub struct EnvelopePage {
    ui: PageInteraction,
    edit_url_pattern: String,
    home_pattern: String,
    pub envelope_rows: Locator,
    pub first_envelope_name: Locator,
    pub new_envelope_button: Locator,
    pub save_envelopes_button: Locator,
    pub validation_error_message: Locator,
    pub cancel_button: Locator,
    pub new_envelopes_message: Locator,
    pub fill_envelopes_button: Locator,
    pub dont_fill_envelopes_button: Locator,
    pub fill_envelopes_amount_input: Locator,
    pub fill_envelopes_payer_input: Locator,
    pub quick_fill_dropdown: Locator,
    pub fill_from_available_button: Locator,
    pub save_fill_envelopes_button: Locator,
    pub monthly_budget_info: Locator,
}

impl EnvelopePage {
    pub fn new(ctx: &PageContext) -> Self {
        Self {
            ui: ctx.interaction("EnvelopePage"),
            edit_url_pattern: format!("^https://{}/envelope/edit$", escape(&ctx.site_host())),
            home_pattern: ctx.url_pattern("home"),
            envelope_rows: Locator::css("envelope-list li[id]"),
            first_envelope_name: Locator::css(
                "envelope-list li[id] div[class=\"row-name\"] input[type=\"text\"]",
            ),
            new_envelope_button: Locator::xpath(
                "//div[@class=\"all-buckets\"]//envelope-list//form[contains(@class,\"form-edit-envelope\")]//div//button[@type=\"button\"][normalize-space()=\"Add\"]",
            ),
            save_envelopes_button: Locator::css("#save-envelopes-btn"),
            validation_error_message: Locator::css(".control-group.error"),
            cancel_button: Locator::css("button[class=\"btn btn-cancel set-cancel-clicked\"]"),
            new_envelopes_message: Locator::xpath("//h1[normalize-space()=\"New Envelopes Created!\"]"),
            fill_envelopes_button: Locator::css("#fillEnvelopesModalYes"),
            dont_fill_envelopes_button: Locator::xpath("//button[@id=\"fillEnvelopesModalNo\"]"),
            fill_envelopes_amount_input: Locator::css("#specify-amount"),
            fill_envelopes_payer_input: Locator::css("#specify-fillname"),
            quick_fill_dropdown: Locator::css(
                "div[class=\"btn-group\"] button[class=\"btn btn-fill dropdown-toggle\"]",
            ),
            fill_from_available_button: Locator::xpath("//a[normalize-space()=\"Available\"]"),
            save_fill_envelopes_button: Locator::css("div[id=\"incomeSummary\"] button[type=\"submit\"]"),
            monthly_budget_info: Locator::css("p[class=\"total-total\"] strong"),
        }
    }

    async fn wait_for_envelope_list(&self) -> PageResult<()> {
        let timeout = self.ui.timeouts().envelope_list;
        self.ui
            .expect_visible(&self.first_envelope_name, "envelope list", timeout)
            .await?;
        self.ui
            .expect_enabled(&self.first_envelope_name, "envelope list", timeout)
            .await
    }

    async fn row_ids(&self) -> PageResult<Vec<String>> {
        self.ui
            .browser()
            .attributes(&self.envelope_rows, "id")
            .await
            .map_err(|e| PageError::new("list", "envelope rows", e.into()))
    }

    async fn wait_for_new_row(&self, known: &[String]) -> PageResult<EnvelopeRow> {
        let timeout = self.ui.timeouts().envelope_list;
        let browser = self.ui.browser();
        let rows = &self.envelope_rows;
        let id = self
            .ui
            .poll(timeout, || async move {
                let ids = browser.attributes(rows, "id").await?;
                Ok::<_, BrowserError>(ids.into_iter().find(|id| !known.contains(id)))
            })
            .await
            .map_err(|e| PageError::new("find", "new envelope row", e.into()))?;

        id.map(EnvelopeRow::new)
            .ok_or_else(|| PageError::new("find", "new envelope row", PageErrorKind::NoNewRow(timeout)))
    }

    /// Resolve the editor row whose name input currently holds `name`.
    pub async fn find_envelope(&self, name: &str) -> PageResult<EnvelopeRow> {
        self.wait_for_envelope_list().await?;
        for id in self.row_ids().await? {
            let row = EnvelopeRow::new(id);
            let value = self
                .ui
                .browser()
                .input_value(&row.name_input())
                .await
                .map_err(|e| PageError::new("read", "envelope name", e.into()))?;
            if value.as_deref().map(str::trim) == Some(name) {
                self.ui
                    .logger()
                    .debug(format!("Envelope {:?} is row {}", name, row.id()), None);
                return Ok(row);
            }
        }
        Err(PageError::new(
            "find",
            "envelope",
            PageErrorKind::EnvelopeNotFound(name.to_string()),
        ))
    }

    /// Add a row, name it and give it a budget. Returns the new row.
    pub async fn create_new_envelope(&self, name: &str, budget: &str) -> PageResult<EnvelopeRow> {
        let details = json!({ "name": name, "budget": budget });
        self.ui
            .operation("Create New Envelope", Some(details), async {
                self.wait_for_envelope_list().await?;
                self.ui
                    .logger()
                    .step("Existing envelopes are visible and enabled", None);

                let known = self.row_ids().await?;
                self.ui
                    .click_element(&self.new_envelope_button, "Add New Envelope Button")
                    .await?;
                self.ui.logger().step("Clicked Add New Envelope Button", None);

                let row = self.wait_for_new_row(&known).await?;
                self.ui
                    .fill_input(&row.name_input(), name, "New Envelope Name")
                    .await?;
                self.ui
                    .logger()
                    .step(&format!("Set envelope name to: {}", name), None);

                let amount = row.amount_input();
                self.ui
                    .fill_input(&amount, budget, "New Envelope Budget")
                    .await?;
                self.ui.press_enter(&amount, "New Envelope Budget").await?;
                self.ui
                    .logger()
                    .step(&format!("Set envelope budget to: {}", budget), None);
                Ok::<_, PageError>(row)
            })
            .await
    }

    /// The monthly total contains `expected`.
    pub async fn verify_monthly_budget(&self, expected: &str) -> PageResult<()> {
        let details = json!({ "expectedBudget": expected });
        self.ui
            .operation("Verify Monthly Budget", Some(details), async {
                self.ui
                    .expect_text_contains(&self.monthly_budget_info, expected, "monthly budget")
                    .await?;
                self.ui
                    .logger()
                    .assertion("Monthly budget is", true, None, None);
                Ok::<_, PageError>(())
            })
            .await
    }

    /// Click Save. A rejected save stays on the editor; an accepted one
    /// lands on the dashboard.
    pub async fn save_changes(&self, validation_test: bool) -> PageResult<()> {
        self.ui
            .operation("Save Changes", None, async {
                self.ui
                    .click_element(&self.save_envelopes_button, "Save Envelopes Button")
                    .await?;
                let pattern = if validation_test {
                    &self.edit_url_pattern
                } else {
                    &self.home_pattern
                };
                self.ui.check_url(pattern, "").await
            })
            .await
    }

    /// Rename and re-budget the envelope called `name`. Returns its row so
    /// the edit can be reverted after the name has changed.
    pub async fn edit_envelope(
        &self,
        name: &str,
        budget: &str,
        new_name: &str,
        new_budget: &str,
    ) -> PageResult<EnvelopeRow> {
        let details = json!({
            "name": name,
            "budget": budget,
            "newName": new_name,
            "newBudget": new_budget,
        });
        self.ui
            .operation("Edit Envelope", Some(details), async {
                let row = self.find_envelope(name).await?;
                self.ui
                    .click_element(&row.edit_button(), "Edit Envelope Button")
                    .await?;
                self.ui
                    .fill_input(&row.name_input(), new_name, "New Envelope Name")
                    .await?;
                let amount = row.amount_input();
                self.ui
                    .fill_input(&amount, new_budget, "New Envelope Budget")
                    .await?;
                self.ui.press_enter(&amount, "New Envelope Budget").await?;
                Ok::<_, PageError>(row)
            })
            .await
    }

    pub async fn verify_error_message(&self, expected: &str) -> PageResult<()> {
        let details = json!({ "expectedMessage": expected });
        self.ui
            .operation("Verify Error Message", Some(details), async {
                self.ui
                    .expect_text_contains(&self.validation_error_message, expected, "validation error")
                    .await?;
                self.ui
                    .logger()
                    .assertion("Validation error message is", true, None, None);
                Ok::<_, PageError>(())
            })
            .await
    }

    /// Put `row` back to `name` and `budget`.
    pub async fn revert_edited_changes(&self, row: &EnvelopeRow, name: &str, budget: &str) -> PageResult<()> {
        let details = json!({ "row": row.id(), "name": name, "budget": budget });
        self.ui
            .operation("Revert Edited Changes", Some(details), async {
                self.wait_for_envelope_list().await?;
                self.ui
                    .fill_input(&row.name_input(), name, "Revert Envelope Name")
                    .await?;
                let amount = row.amount_input();
                self.ui
                    .fill_input(&amount, budget, "Revert Envelope Budget")
                    .await?;
                self.ui.press_enter(&amount, "Revert Envelope Budget").await
            })
            .await
    }

    /// Remove the envelope called `name` and check the monthly total falls
    /// back to `initial_budget`.
    pub async fn delete_envelope(&self, name: &str, initial_budget: &str) -> PageResult<()> {
        self.ui
            .operation("Delete Envelope", Some(json!({ "name": name })), async {
                let row = self.find_envelope(name).await?;
                self.ui
                    .click_element(&row.delete_button(), "Remove Envelope Button")
                    .await?;
                self.ui
                    .expect_hidden(&row.name_input(), name, self.ui.timeouts().assertion)
                    .await?;
                self.ui
                    .logger()
                    .step(&format!("Deleted envelope: {}", name), None);

                self.ui
                    .expect_text_contains(&self.monthly_budget_info, initial_budget, "monthly budget")
                    .await?;
                self.ui
                    .logger()
                    .assertion("Envelope is deleted", true, None, None);
                Ok::<_, PageError>(())
            })
            .await
    }

    /// Answer the "fill your envelopes?" prompt shown after creating one.
    pub async fn decide_to_fill_envelopes(&self, fill: bool) -> PageResult<()> {
        self.ui
            .operation("Decide to Fill Envelopes", Some(json!({ "fill": fill })), async {
                if fill {
                    self.ui
                        .click_element(&self.fill_envelopes_button, "Fill Envelopes Button")
                        .await?;
                    self.ui.logger().step("Clicked Fill Envelopes Button", None);
                } else {
                    self.ui
                        .click_element(&self.dont_fill_envelopes_button, "Do Not Fill Envelopes Button")
                        .await?;
                }
                Ok::<_, PageError>(())
            })
            .await
    }

    /// Fill envelopes from a payment of `amount` by `payer`, quick-filling
    /// from what is available.
    pub async fn fill_envelopes(&self, amount: &str, payer: &str) -> PageResult<()> {
        let details = json!({ "amount": amount, "payer": payer });
        self.ui
            .operation("Fill Envelopes", Some(details), async {
                self.ui
                    .fill_input(&self.fill_envelopes_amount_input, amount, "Fill Amount")
                    .await?;
                self.ui
                    .fill_input(&self.fill_envelopes_payer_input, payer, "Fill Payer")
                    .await?;
                self.ui
                    .click_element(&self.quick_fill_dropdown, "Quick Fill Dropdown")
                    .await?;
                self.ui
                    .click_element(&self.fill_from_available_button, "Fill From Available")
                    .await?;
                self.ui
                    .click_element(&self.save_fill_envelopes_button, "Save Fill Envelopes Button")
                    .await
            })
            .await
    }

    /// Discard edits and return to the dashboard.
    pub async fn cancel_changes(&self) -> PageResult<()> {
        self.ui
            .operation("Cancel Changes", None, async {
                self.ui.click_element(&self.cancel_button, "Cancel Button").await?;
                self.ui.check_url(&self.home_pattern, "Home").await
            })
            .await
    }

    pub async fn verify_new_envelopes_message(&self) -> PageResult<()> {
        self.ui
            .operation("Verify New Envelopes Message", None, async {
                self.ui
                    .expect_visible(
                        &self.new_envelopes_message,
                        "New Envelopes Created message",
                        self.ui.timeouts().assertion,
                    )
                    .await?;
                self.ui
                    .logger()
                    .assertion("New envelopes message is shown", true, None, None);
                Ok::<_, PageError>(())
            })
            .await
    }

    pub async fn check_url(&self, pattern: &str, page_name: &str) -> PageResult<()> {
        self.ui.check_url(pattern, page_name).await
    }
}
