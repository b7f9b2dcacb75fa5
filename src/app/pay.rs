//! Pay page for a single order (members only)

use super::events::{ApiEvent, PayPageLoad};
use super::orders::render_order_items;
use super::App;
use crate::access::{Capabilities, Route};
use crate::api::{ApiClient, ApiError};
use crate::payment::PaymentForm;
use crate::theme;
use crate::types::{Order, OrderStatus};
use crate::ui::components;
use eframe::egui;
use tracing::{debug, warn};

#[derive(Default)]
pub(crate) struct PayState {
    pub order_id: Option<String>,
    pub order: Option<Order>,
    pub loading: bool,
    pub paying: bool,
    pub form: PaymentForm,
}

impl PayState {
    fn for_order(id: String) -> Self {
        Self {
            order_id: Some(id),
            loading: true,
            ..Self::default()
        }
    }

    /// Show the loaded order, preselecting the payment type already on it
    fn show(&mut self, order: Order) {
        if let Some(method) = &order.payment_method {
            self.form = PaymentForm::with_type(method.payment_type);
        }
        self.order = Some(order);
    }
}

/// Profile first, then the order; members only
async fn load_pay_page(api: ApiClient, id: &str) -> PayPageLoad {
    let user = match api.me().await {
        Ok(user) => user,
        Err(e) if e.is_unauthorized() => {
            debug!(error = %e, "Pay page without a usable session");
            return PayPageLoad::NoSession;
        }
        Err(e) if e.status().is_some() => {
            debug!(error = %e, "Pay page profile rejected");
            return PayPageLoad::ProfileRejected;
        }
        Err(e) => return PayPageLoad::Failed(e),
    };
    if !Capabilities::for_role(Some(user.role)).pay_orders {
        return PayPageLoad::Forbidden(user);
    }
    match api.order(id).await {
        Ok(order) => PayPageLoad::Loaded(user, order),
        Err(e) if e.is_network() || matches!(e, ApiError::Decode(_)) => PayPageLoad::Failed(e),
        Err(e) => {
            debug!(error = %e, id, "Order lookup rejected");
            PayPageLoad::OrderMissing(user)
        }
    }
}

impl App {
    pub(crate) fn load_pay_page(&mut self, id: String) {
        self.pay = PayState::for_order(id.clone());
        self.spawn_request(move |api| async move {
            let result = load_pay_page(api, &id).await;
            ApiEvent::PayPageLoaded { id, result }
        });
    }

    pub(super) fn on_pay_page_loaded(&mut self, id: String, result: PayPageLoad) {
        let current = matches!(&self.route, Route::Pay(open) if *open == id);
        if !current || self.pay.order_id.as_deref() != Some(id.as_str()) {
            debug!(id = %id, "Dropping stale pay page load");
            return;
        }
        self.pay.loading = false;
        match result {
            PayPageLoad::Loaded(user, order) => {
                self.user = Some(user);
                self.pay.show(order);
            }
            PayPageLoad::NoSession => {
                self.end_session();
                self.navigate(Route::Login);
            }
            PayPageLoad::ProfileRejected => self.navigate(Route::Login),
            PayPageLoad::Forbidden(user) => {
                self.user = Some(user);
                self.toasts.error("Access denied for this role");
                self.navigate(Route::Restaurants);
            }
            PayPageLoad::OrderMissing(user) => {
                self.user = Some(user);
                self.toasts.error("Order not found");
                self.navigate(Route::Orders);
            }
            PayPageLoad::Failed(e) => {
                warn!(error = %e, id = %id, "Failed to load order");
                self.toasts.error("Failed to load order");
            }
        }
    }

    fn pay_order(&mut self) {
        if self.pay.paying {
            return;
        }
        let Some(id) = self.pay.order.as_ref().map(|o| o.id.clone()) else {
            return;
        };
        let payment = match self.pay.form.validate() {
            Ok(payment) => payment,
            Err(e) => {
                self.toasts.error(e.to_string());
                return;
            }
        };
        self.pay.paying = true;
        self.spawn_request(move |api| async move {
            ApiEvent::OrderPaid(api.pay_order(&id, &payment).await)
        });
    }

    pub(super) fn on_order_paid(&mut self, result: Result<Order, ApiError>) {
        self.pay.paying = false;
        match result {
            Ok(order) => {
                self.pay.order = Some(order);
                self.toasts.success("Payment successful!");
            }
            Err(e) if e.is_network() => self.toasts.error("Something went wrong"),
            Err(e) => self.toasts.error(e.message_or("Payment failed")),
        }
    }

    pub(crate) fn render_pay(&mut self, ui: &mut egui::Ui) {
        if self.pay.loading {
            components::loading(ui, "Loading order...");
            return;
        }
        let Some(order) = self.pay.order.as_ref() else {
            components::empty_state(ui, egui_phosphor::regular::RECEIPT_X, "Order not found.");
            return;
        };

        let mut pay = false;
        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(format!("{} Payment for Order", egui_phosphor::regular::WALLET))
                    .size(theme::FONT_TITLE)
                    .color(theme::TEXT_PRIMARY)
                    .strong(),
            );
            ui.add_space(theme::SPACING_LG);

            egui::Grid::new("pay_order_info")
                .num_columns(2)
                .spacing([theme::SPACING_LG, theme::SPACING_SM])
                .show(ui, |ui| {
                    ui.label(egui::RichText::new("Order ID:").color(theme::TEXT_MUTED));
                    ui.label(components::short_id(&order.id));
                    ui.end_row();
                    ui.label(egui::RichText::new("Status:").color(theme::TEXT_MUTED));
                    ui.label(
                        egui::RichText::new(order.status.as_str())
                            .color(components::status_color(&order.status))
                            .strong(),
                    );
                    ui.end_row();
                    ui.label(egui::RichText::new("Total Amount:").color(theme::TEXT_MUTED));
                    ui.label(egui::RichText::new(components::format_price(order.total_amount)).strong());
                    ui.end_row();
                    ui.label(egui::RichText::new("Placed on:").color(theme::TEXT_MUTED));
                    ui.label(components::format_datetime(&order.created_at));
                    ui.end_row();
                });

            if order.status == OrderStatus::Pending {
                ui.add_space(theme::SPACING_LG);
                ui.separator();
                ui.label(egui::RichText::new("Choose Payment Method").size(theme::FONT_HEADING).strong());
                ui.add_space(theme::SPACING_MD);
                components::payment_form(ui, &mut self.pay.form);
                ui.add_space(theme::SPACING_LG);

                let label = if self.pay.paying { "Processing..." } else { "Confirm & Pay" };
                let button = theme::button_accent(label).min_size(egui::vec2(ui.available_width(), 36.0));
                if ui.add_enabled(!self.pay.paying, button).clicked() {
                    pay = true;
                }
            }

            ui.add_space(theme::SPACING_LG);
            ui.separator();
            ui.label(egui::RichText::new("Order Items").size(theme::FONT_HEADING).strong());
            ui.add_space(theme::SPACING_MD);
            render_order_items(ui, &order.items);

            if order.status == OrderStatus::Paid {
                ui.add_space(theme::SPACING_LG);
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} This order is already paid.",
                            egui_phosphor::regular::CHECK_CIRCLE
                        ))
                        .color(theme::STATUS_SUCCESS),
                    );
                });
            }
        });

        if pay {
            self.pay_order();
        }
    }
}
