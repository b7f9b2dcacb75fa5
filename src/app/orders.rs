//! Orders page: every order the user may see, with cancel and pay actions

use super::events::{ApiEvent, OrdersLoadError};
use super::App;
use crate::access::{Capabilities, Route};
use crate::api::ApiError;
use crate::theme;
use crate::types::{Order, OrderItem, OrderStatus, User};
use crate::ui::components;
use eframe::egui;
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Default)]
pub(crate) struct OrdersState {
    pub orders: Vec<Order>,
    /// Profile fetched alongside the orders; drives the action buttons
    pub viewer: Option<User>,
    pub loading: bool,
    pub expanded: HashSet<String>,
    pub cancelling: HashSet<String>,
}

impl OrdersState {
    pub fn toggle_expand(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    /// Local status update after the server accepted a cancel
    pub fn mark_cancelled(&mut self, id: &str) {
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == id) {
            order.status = OrderStatus::Cancelled;
        }
    }

    fn caps(&self) -> Option<Capabilities> {
        self.viewer.as_ref().map(|u| Capabilities::for_role(Some(u.role)))
    }
}

enum OrderAction {
    Toggle(String),
    Cancel(String),
    Pay(String),
}

impl App {
    pub(crate) fn load_orders(&mut self) {
        self.orders.loading = true;
        self.orders.expanded.clear();
        self.spawn_request(|api| async move {
            let result = match api.me().await {
                Ok(user) => api
                    .orders()
                    .await
                    .map(|orders| (user, orders))
                    .map_err(OrdersLoadError::Orders),
                Err(e) => Err(OrdersLoadError::Profile(e)),
            };
            ApiEvent::OrdersLoaded(result)
        });
    }

    pub(super) fn on_orders_loaded(&mut self, result: Result<(User, Vec<Order>), OrdersLoadError>) {
        self.orders.loading = false;
        match result {
            Ok((user, orders)) => {
                debug!(count = orders.len(), "Orders loaded");
                self.orders.orders = orders;
                self.orders.viewer = Some(user);
            }
            Err(OrdersLoadError::Profile(e)) | Err(OrdersLoadError::Orders(e)) if e.is_network() => {
                warn!(error = %e, "Orders page failed to load");
                self.toasts.error("Something went wrong");
            }
            Err(OrdersLoadError::Profile(e)) => {
                warn!(error = %e, "Orders page could not load the profile");
                self.toasts.error("Failed to load user info");
            }
            Err(OrdersLoadError::Orders(e)) => {
                warn!(error = %e, "Orders page could not load orders");
                self.toasts.error("Failed to fetch orders");
            }
        }
    }

    fn cancel_order(&mut self, id: String) {
        if !self.orders.cancelling.insert(id.clone()) {
            return;
        }
        self.spawn_request(move |api| async move {
            let result = api.cancel_order(&id).await;
            ApiEvent::OrderCancelled { id, result }
        });
    }

    pub(super) fn on_order_cancelled(&mut self, id: String, result: Result<(), ApiError>) {
        self.orders.cancelling.remove(&id);
        match result {
            Ok(()) => {
                self.orders.mark_cancelled(&id);
                self.toasts.success("Order cancelled successfully");
            }
            Err(e) if e.is_network() => self.toasts.error("Error cancelling order"),
            Err(_) => self.toasts.error("Failed to cancel order"),
        }
    }

    pub(crate) fn render_orders(&mut self, ui: &mut egui::Ui) {
        components::page_header(ui, "Orders", |_| {});

        let state = &self.orders;
        if state.loading {
            components::loading(ui, "Loading orders...");
            return;
        }
        if state.orders.is_empty() {
            components::empty_state(ui, egui_phosphor::regular::RECEIPT, "No orders found.");
            return;
        }

        let caps = state.caps();
        let mut actions = Vec::new();
        for order in &state.orders {
            let expanded = state.expanded.contains(&order.id);
            let cancelling = state.cancelling.contains(&order.id);
            render_order_card(ui, order, caps, expanded, cancelling, &mut actions);
            ui.add_space(theme::SPACING_LG);
        }

        for action in actions {
            match action {
                OrderAction::Toggle(id) => self.orders.toggle_expand(&id),
                OrderAction::Cancel(id) => self.cancel_order(id),
                OrderAction::Pay(id) => self.navigate(Route::Pay(id)),
            }
        }
    }
}

fn render_order_card(
    ui: &mut egui::Ui,
    order: &Order,
    caps: Option<Capabilities>,
    expanded: bool,
    cancelling: bool,
    actions: &mut Vec<OrderAction>,
) {
    theme::card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(
                    egui::RichText::new(format!("Order ID: {}", components::short_id(&order.id)))
                        .color(theme::TEXT_PRIMARY)
                        .strong(),
                );
                let buyer = match &order.user.email {
                    Some(email) => format!("By: {} ({email})", order.user.name),
                    None => format!("By: {}", order.user.name),
                };
                for line in [
                    buyer,
                    format!("Country: {}", order.user.country),
                    format!("Date: {}", components::format_datetime(&order.created_at)),
                ] {
                    ui.label(egui::RichText::new(line).size(theme::FONT_SMALL).color(theme::TEXT_MUTED));
                }
            });
            ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                ui.label(
                    egui::RichText::new(format!("Status: {}", order.status))
                        .color(components::status_color(&order.status))
                        .strong(),
                );
                ui.label(
                    egui::RichText::new(components::format_price(order.total_amount))
                        .size(theme::FONT_HEADING)
                        .color(theme::TEXT_PRIMARY)
                        .strong(),
                );
            });
        });
        ui.add_space(theme::SPACING_MD);

        let toggle = if expanded {
            format!("{} Hide Items", egui_phosphor::regular::CARET_UP)
        } else {
            format!("{} Show Items ({})", egui_phosphor::regular::CARET_DOWN, order.items.len())
        };
        let toggle = egui::Button::new(egui::RichText::new(toggle).color(theme::ACCENT_LIGHT)).frame(false);
        if ui.add(toggle).clicked() {
            actions.push(OrderAction::Toggle(order.id.clone()));
        }

        if expanded {
            ui.separator();
            egui::ScrollArea::vertical()
                .id_salt(("order_items", &order.id))
                .max_height(400.0)
                .show(ui, |ui| render_order_items(ui, &order.items));
        }

        let pending = order.status == OrderStatus::Pending;
        let Some(caps) = caps.filter(|_| pending) else {
            return;
        };
        ui.add_space(theme::SPACING_MD);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if caps.pay_orders && ui.add(theme::button_accent("Pay Now")).clicked() {
                actions.push(OrderAction::Pay(order.id.clone()));
            }
            if caps.cancel_orders {
                let label = if cancelling { "Cancelling..." } else { "Cancel Order" };
                if ui.add_enabled(!cancelling, theme::button_danger(label)).clicked() {
                    actions.push(OrderAction::Cancel(order.id.clone()));
                }
            }
        });
    });
}

/// One row per ordered item: name × quantity, restaurant, price
pub(super) fn render_order_items(ui: &mut egui::Ui, items: &[OrderItem]) {
    for item in items {
        egui::Frame::new()
            .fill(theme::BG_SURFACE)
            .corner_radius(theme::RADIUS_MEDIUM)
            .inner_margin(egui::Margin::symmetric(theme::SPACING_LG as i8, theme::SPACING_MD as i8))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.label(
                            egui::RichText::new(format!("{} × {}", item.menu_item.name, item.quantity))
                                .color(theme::TEXT_SECONDARY),
                        );
                        ui.label(
                            egui::RichText::new(format!(
                                "{} • {}",
                                item.menu_item.restaurant.name, item.menu_item.restaurant.country
                            ))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                        );
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(components::format_price(item.price))
                                .color(theme::TEXT_PRIMARY)
                                .strong(),
                        );
                    });
                });
            });
        ui.add_space(theme::SPACING_SM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderUser;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            user: OrderUser { name: "Ana".into(), email: None, country: "INDIA".into() },
            items: Vec::new(),
            total_amount: 100.0,
            status,
            created_at: String::new(),
            payment_method: None,
        }
    }

    #[test]
    fn toggling_twice_collapses() {
        let mut state = OrdersState::default();
        state.toggle_expand("o1");
        assert!(state.expanded.contains("o1"));
        state.toggle_expand("o2");
        state.toggle_expand("o1");
        assert!(!state.expanded.contains("o1"));
        assert!(state.expanded.contains("o2"));
    }

    #[test]
    fn cancel_only_touches_the_matching_order() {
        let mut state = OrdersState {
            orders: vec![order("o1", OrderStatus::Pending), order("o2", OrderStatus::Pending)],
            ..Default::default()
        };
        state.mark_cancelled("o2");
        assert_eq!(state.orders[0].status, OrderStatus::Pending);
        assert_eq!(state.orders[1].status, OrderStatus::Cancelled);

        state.mark_cancelled("missing");
        assert_eq!(state.orders.len(), 2);
    }

    #[test]
    fn actions_wait_for_the_viewer() {
        let mut state = OrdersState::default();
        assert!(state.caps().is_none());
        state.viewer = Some(User {
            sub: "u1".into(),
            email: "m@x.io".into(),
            role: crate::types::Role::Manager,
            country: "INDIA".into(),
            name: "Mo".into(),
        });
        let caps = state.caps().expect("viewer known");
        assert!(caps.cancel_orders);
        assert!(!caps.pay_orders);
    }
}
