//! Cart page and order placement

use super::events::ApiEvent;
use super::App;
use crate::access::Route;
use crate::api::ApiError;
use crate::cart::{Cart, CartKey};
use crate::payment::PaymentForm;
use crate::theme;
use crate::types::{CreateOrder, CreatedOrder};
use crate::ui::components::{self, Step};
use eframe::egui;
use tracing::{info, warn};

#[derive(Default)]
pub(crate) struct CheckoutState {
    pub show_payment: bool,
    pub form: PaymentForm,
    pub placing: bool,
}

enum CartAction {
    Step(CartKey, Step),
    Remove(CartKey),
    OpenPayment,
    ClosePayment,
    PlaceOrder,
}

/// Request body for the current cart, or the toast text explaining why not
fn build_order(cart: &Cart, form: &PaymentForm) -> Result<CreateOrder, String> {
    if cart.is_empty() {
        return Err("Your cart is empty!".to_string());
    }
    let payment = form.validate().map_err(|e| e.to_string())?;
    Ok(CreateOrder { items: cart.order_lines(), payment })
}

impl App {
    /// Opening `/cart` re-reads the stored cart
    pub(crate) fn enter_cart(&mut self) {
        self.checkout = CheckoutState::default();
        self.cart = self.db.load_cart().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored cart");
            Cart::default()
        });
        self.deny_cart_for_staff();
    }

    fn place_order(&mut self) {
        if self.checkout.placing {
            return;
        }
        let order = match build_order(&self.cart, &self.checkout.form) {
            Ok(order) => order,
            Err(message) => {
                self.toasts.error(message);
                return;
            }
        };
        self.checkout.placing = true;
        self.spawn_request(move |api| async move {
            ApiEvent::OrderPlaced(api.create_order(&order).await)
        });
    }

    pub(super) fn on_order_placed(&mut self, result: Result<CreatedOrder, ApiError>) {
        self.checkout.placing = false;
        match result {
            Ok(created) => {
                self.toasts.success("Order placed successfully!");
                self.cart.clear();
                if let Err(e) = self.db.clear_cart() {
                    warn!(error = %e, "Failed to clear stored cart");
                }
                self.checkout = CheckoutState::default();
                match created.id {
                    Some(id) => self.navigate(Route::Pay(id)),
                    None => {
                        info!("Order created without an id in the response");
                        self.navigate(Route::Orders);
                    }
                }
            }
            Err(e) => self.toasts.error(e.message_or("Failed to place order.")),
        }
    }

    fn apply_cart_action(&mut self, action: CartAction) {
        match action {
            CartAction::Step(key, Step::Increase) => {
                self.cart.increase(&key);
                self.persist_cart();
            }
            CartAction::Step(key, Step::Decrease) => {
                self.cart.decrease(&key);
                self.persist_cart();
            }
            CartAction::Remove(key) => {
                self.cart.remove(&key);
                self.persist_cart();
            }
            CartAction::OpenPayment => {
                if self.cart.is_empty() {
                    self.toasts.error("Your cart is empty!");
                } else {
                    self.checkout.show_payment = true;
                }
            }
            CartAction::ClosePayment => self.checkout.show_payment = false,
            CartAction::PlaceOrder => self.place_order(),
        }
    }

    pub(crate) fn render_cart(&mut self, ui: &mut egui::Ui) {
        let mut actions = Vec::new();
        let title = format!("{} Your Cart", egui_phosphor::regular::SHOPPING_CART);
        components::page_header(ui, &title, |_| {});

        if self.cart.is_empty() {
            components::empty_state(ui, egui_phosphor::regular::SHOPPING_BAG, "Your cart is empty.");
        } else {
            for item in self.cart.items() {
                theme::card_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&item.name).color(theme::TEXT_PRIMARY).strong());
                            if !item.restaurant_name.is_empty() {
                                ui.label(
                                    egui::RichText::new(&item.restaurant_name)
                                        .size(theme::FONT_SMALL)
                                        .color(theme::TEXT_DIM),
                                );
                            }
                            ui.label(egui::RichText::new(components::format_price(item.price)).color(theme::TEXT_MUTED));
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let trash = egui::RichText::new(egui_phosphor::regular::TRASH).color(theme::STATUS_ERROR);
                            if ui.add(egui::Button::new(trash).frame(false)).on_hover_text("Remove").clicked() {
                                actions.push(CartAction::Remove(item.key()));
                            }
                            ui.add_space(theme::SPACING_MD);
                            ui.label(
                                egui::RichText::new(components::format_price(item.line_total()))
                                    .color(theme::TEXT_SECONDARY)
                                    .strong(),
                            );
                            ui.add_space(theme::SPACING_MD);
                            if let Some(step) = components::quantity_stepper(ui, item.qty) {
                                actions.push(CartAction::Step(item.key(), step));
                            }
                        });
                    });
                });
                ui.add_space(theme::SPACING_MD);
            }

            ui.add_space(theme::SPACING_LG);
            theme::card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("Total: {}", components::format_price(self.cart.total())))
                            .size(theme::FONT_HEADING)
                            .color(theme::TEXT_PRIMARY)
                            .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = if self.checkout.placing { "Processing..." } else { "Proceed to Pay" };
                        if ui.add_enabled(!self.checkout.placing, theme::button_success(label)).clicked() {
                            actions.push(CartAction::OpenPayment);
                        }
                    });
                });
            });
        }

        if self.checkout.show_payment {
            self.render_payment_modal(ui.ctx(), &mut actions);
        }

        for action in actions {
            self.apply_cart_action(action);
        }
    }

    fn render_payment_modal(&mut self, ctx: &egui::Context, actions: &mut Vec<CartAction>) {
        let placing = self.checkout.placing;
        let form = &mut self.checkout.form;

        let modal = egui::Modal::new(egui::Id::new("checkout_payment_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(140))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(theme::MODAL_WIDTH);
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{} Choose Payment Method", egui_phosphor::regular::CREDIT_CARD))
                            .size(theme::FONT_HEADING)
                            .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if components::close_button(ui) {
                            actions.push(CartAction::ClosePayment);
                        }
                    });
                });
                ui.add_space(theme::SPACING_LG);

                components::payment_form(ui, form);
                ui.add_space(theme::SPACING_XL);

                let label = if placing { "Placing Order..." } else { "Confirm & Place Order" };
                let button = theme::button_success(label).min_size(egui::vec2(ui.available_width(), 34.0));
                if ui.add_enabled(!placing, button).clicked() {
                    actions.push(CartAction::PlaceOrder);
                }
            });

        if modal.should_close() && !placing {
            actions.push(CartAction::ClosePayment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{app, ToastKind};
    use crate::types::{MenuItem, PaymentType, Restaurant};
    use rstest::rstest;
    use serde_json::json;

    fn cart_with_one_line() -> Cart {
        let restaurant = Restaurant {
            id: "r1".into(),
            name: "Spice Hub".into(),
            country: "INDIA".into(),
            created_at: String::new(),
            menu_items: Vec::new(),
        };
        let item = MenuItem { id: "m1".into(), name: "Dosa".into(), price: 120.0 };
        let mut cart = Cart::default();
        cart.add(&item, &restaurant, 2);
        cart
    }

    #[test]
    fn empty_cart_cannot_be_ordered() {
        let error = build_order(&Cart::default(), &PaymentForm::default()).expect_err("empty");
        assert_eq!(error, "Your cart is empty!");
    }

    #[test]
    fn payment_is_validated_before_ordering() {
        let form = PaymentForm::with_type(PaymentType::Upi);
        let error = build_order(&cart_with_one_line(), &form).expect_err("missing upi");
        assert_eq!(error, "Please enter your UPI ID");
    }

    #[test]
    fn order_body_carries_lines_and_payment() {
        let form = PaymentForm {
            payment_type: PaymentType::Upi,
            upi_id: "ana@okbank".into(),
            ..PaymentForm::default()
        };
        let order = build_order(&cart_with_one_line(), &form).expect("valid order");
        assert_eq!(
            serde_json::to_value(order).expect("encodes"),
            json!({
                "items": [{ "menuItemId": "m1", "quantity": 2, "restaurantId": "r1" }],
                "payment": { "type": "UPI", "details": { "upiId": "ana@okbank" } }
            })
        );
    }

    #[rstest]
    #[case::pay_page(Some("o-77"), Route::Pay("o-77".into()))]
    #[case::orders_without_id(None, Route::Orders)]
    fn placed_order_clears_the_cart(mut app: App, #[case] id: Option<&str>, #[case] expected: Route) {
        app.cart = cart_with_one_line();
        app.persist_cart();
        app.checkout.placing = true;

        app.on_order_placed(Ok(CreatedOrder { id: id.map(str::to_string) }));

        assert!(app.cart.is_empty());
        assert!(app.db.load_cart().expect("load").is_empty());
        assert!(!app.checkout.placing);
        assert_eq!(app.route, expected);
        assert_eq!(app.toasts.latest(), Some(("Order placed successfully!", ToastKind::Success)));
    }

    #[rstest]
    fn failed_order_keeps_the_cart(mut app: App) {
        app.cart = cart_with_one_line();
        app.persist_cart();
        app.route = Route::Cart;

        app.on_order_placed(Err(ApiError::Status { status: 400, message: Some("Menu item unavailable".into()) }));

        assert_eq!(app.cart.len(), 1);
        assert_eq!(app.db.load_cart().expect("load").len(), 1);
        assert_eq!(app.route, Route::Cart);
        assert_eq!(app.toasts.latest(), Some(("Menu item unavailable", ToastKind::Error)));
    }
}
