//! Restaurants page: paged card grid, menu modal, staff add forms

use super::events::ApiEvent;
use super::App;
use crate::access;
use crate::api::ApiError;
use crate::cart::CartKey;
use crate::constants::COUNTRIES;
use crate::theme;
use crate::types::{MenuItem, NewMenuItem, NewRestaurant, PageMeta, Restaurant, RestaurantPage};
use crate::ui::components::{self, Step};
use eframe::egui;
use std::collections::HashMap;
use tracing::{debug, warn};

// ============================================================================
// STATE
// ============================================================================

#[derive(Default)]
pub(crate) struct RestaurantsState {
    pub page: u32,
    pub restaurants: Vec<Restaurant>,
    pub meta: PageMeta,
    pub loading: bool,
    pub load_failed: bool,
    /// Restaurant whose menu modal is open
    pub menu: Option<Restaurant>,
    /// Stepper value per menu line, 1 when absent
    quantities: HashMap<CartKey, u32>,
    pub add_restaurant: Option<RestaurantForm>,
    pub add_item: Option<MenuItemForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RestaurantForm {
    pub name: String,
    pub country: String,
    pub saving: bool,
}

impl Default for RestaurantForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            country: COUNTRIES[0].to_string(),
            saving: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MenuItemForm {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub name: String,
    pub price: String,
    pub saving: bool,
}

impl MenuItemForm {
    fn for_restaurant(restaurant: &Restaurant) -> Self {
        Self {
            restaurant_id: restaurant.id.clone(),
            restaurant_name: restaurant.name.clone(),
            ..Self::default()
        }
    }

    /// Request body, or `None` when the price is not a usable number
    fn to_request(&self) -> Option<NewMenuItem> {
        let price: f64 = self.price.trim().parse().ok()?;
        if !price.is_finite() || price < 0.0 {
            return None;
        }
        Some(NewMenuItem {
            name: self.name.trim().to_string(),
            price,
            restaurant_id: self.restaurant_id.clone(),
        })
    }
}

impl RestaurantsState {
    /// Back to page 1 with every modal closed
    pub fn reset(&mut self) {
        self.page = 1;
        self.menu = None;
        self.add_restaurant = None;
        self.add_item = None;
        self.quantities.clear();
    }

    pub fn qty(&self, key: &CartKey) -> u32 {
        self.quantities.get(key).copied().unwrap_or(1)
    }

    pub fn step_qty(&mut self, key: CartKey, step: Step) {
        let next = components::apply_step(self.qty(&key), step);
        self.quantities.insert(key, next);
    }

    /// Current stepper value; the stepper goes back to 1
    pub fn take_qty(&mut self, key: &CartKey) -> u32 {
        self.quantities.remove(key).unwrap_or(1)
    }
}

/// What a click in the page asked for, applied after rendering
enum Action {
    Page(u32),
    Retry,
    OpenMenu(Restaurant),
    CloseMenu,
    Step(CartKey, Step),
    AddToCart(MenuItem, Restaurant),
    OpenAddRestaurant,
    OpenAddItem(Restaurant),
    SaveRestaurant,
    SaveItem,
    CloseForms,
}

impl App {
    // ========================================================================
    // REQUESTS
    // ========================================================================

    pub(crate) fn load_restaurants(&mut self, page: u32) {
        let page = page.max(1);
        let limit = self.settings.page_size();
        self.restaurants.page = page;
        self.restaurants.loading = true;
        self.restaurants.load_failed = false;
        self.spawn_request(move |api| async move {
            ApiEvent::RestaurantsLoaded { page, result: api.restaurants(page, limit).await }
        });
    }

    pub(super) fn on_restaurants_loaded(&mut self, page: u32, result: Result<RestaurantPage, ApiError>) {
        if page != self.restaurants.page {
            debug!(page, current = self.restaurants.page, "Dropping stale restaurants page");
            return;
        }
        self.restaurants.loading = false;
        match result {
            Ok(data) => {
                self.restaurants.restaurants = data.data;
                self.restaurants.meta = data.meta;
            }
            Err(e) => {
                warn!(error = %e, page, "Error fetching restaurants");
                self.restaurants.load_failed = true;
            }
        }
    }

    fn add_to_cart(&mut self, item: &MenuItem, restaurant: &Restaurant) {
        if !self.caps().use_cart {
            return;
        }
        let key = CartKey::new(&restaurant.id, &item.id);
        let qty = self.restaurants.take_qty(&key);
        let added = self.cart.add(item, restaurant, qty);
        self.persist_cart();
        self.toasts.success(format!("{added} × {} added to cart", item.name));
    }

    fn save_restaurant(&mut self) {
        let role = self.user.as_ref().map(|u| u.role);
        let user_country = self.user.as_ref().map(|u| u.country.as_str());
        let Some(form) = self.restaurants.add_restaurant.as_ref() else {
            return;
        };
        if form.saving {
            return;
        }
        if form.name.trim().is_empty() {
            self.toasts.error("Please enter a restaurant name");
            return;
        }
        let body = NewRestaurant {
            name: form.name.trim().to_string(),
            country: access::restaurant_country(role, user_country, &form.country),
        };
        if let Some(form) = self.restaurants.add_restaurant.as_mut() {
            form.saving = true;
        }
        self.spawn_request(move |api| async move {
            ApiEvent::RestaurantCreated(api.create_restaurant(&body).await)
        });
    }

    pub(super) fn on_restaurant_created(&mut self, result: Result<(), ApiError>) {
        if let Some(form) = self.restaurants.add_restaurant.as_mut() {
            form.saving = false;
        }
        match result {
            Ok(()) => {
                self.toasts.success("Restaurant added!");
                self.restaurants.add_restaurant = None;
                self.load_restaurants(1);
            }
            Err(e) if e.is_network() => self.toasts.error("Network error"),
            Err(_) => self.toasts.error("Failed to add restaurant"),
        }
    }

    fn save_item(&mut self) {
        let Some(form) = self.restaurants.add_item.as_ref() else {
            return;
        };
        if form.saving {
            return;
        }
        if form.name.trim().is_empty() {
            self.toasts.error("Please enter an item name");
            return;
        }
        let Some(body) = form.to_request() else {
            self.toasts.error("Please enter a valid price");
            return;
        };
        if let Some(form) = self.restaurants.add_item.as_mut() {
            form.saving = true;
        }
        self.spawn_request(move |api| async move {
            ApiEvent::MenuItemCreated(api.create_item(&body).await)
        });
    }

    pub(super) fn on_menu_item_created(&mut self, result: Result<(), ApiError>) {
        if let Some(form) = self.restaurants.add_item.as_mut() {
            form.saving = false;
        }
        match result {
            Ok(()) => {
                self.toasts.success("Menu item added!");
                self.restaurants.add_item = None;
                self.load_restaurants(1);
            }
            Err(e) if e.is_network() => self.toasts.error("Network error"),
            Err(_) => self.toasts.error("Failed to add menu item"),
        }
    }

    fn apply_restaurants_action(&mut self, action: Action) {
        match action {
            Action::Page(page) => self.load_restaurants(page),
            Action::Retry => self.load_restaurants(self.restaurants.page),
            Action::OpenMenu(restaurant) => self.restaurants.menu = Some(restaurant),
            Action::CloseMenu => self.restaurants.menu = None,
            Action::Step(key, step) => self.restaurants.step_qty(key, step),
            Action::AddToCart(item, restaurant) => self.add_to_cart(&item, &restaurant),
            Action::OpenAddRestaurant => self.restaurants.add_restaurant = Some(RestaurantForm::default()),
            Action::OpenAddItem(restaurant) => {
                self.restaurants.add_item = Some(MenuItemForm::for_restaurant(&restaurant));
            }
            Action::SaveRestaurant => self.save_restaurant(),
            Action::SaveItem => self.save_item(),
            Action::CloseForms => {
                self.restaurants.add_restaurant = None;
                self.restaurants.add_item = None;
            }
        }
    }

    // ========================================================================
    // RENDERING
    // ========================================================================

    pub(crate) fn render_restaurants(&mut self, ui: &mut egui::Ui) {
        let caps = self.caps();
        let mut actions = Vec::new();

        let title = format!("{} Explore Restaurants", egui_phosphor::regular::FORK_KNIFE);
        components::page_header(ui, &title, |ui| {
            if caps.manage_restaurants
                && ui.add(theme::button_success("+ Add Restaurant")).clicked()
            {
                actions.push(Action::OpenAddRestaurant);
            }
        });

        let state = &self.restaurants;
        if state.loading && state.restaurants.is_empty() {
            components::loading(ui, "Loading restaurants...");
        } else if state.load_failed && state.restaurants.is_empty() {
            components::empty_state(ui, egui_phosphor::regular::WARNING, "Could not load restaurants");
            ui.vertical_centered(|ui| {
                if ui.add(theme::button("Retry")).clicked() {
                    actions.push(Action::Retry);
                }
            });
        } else if state.restaurants.is_empty() {
            components::empty_state(ui, egui_phosphor::regular::STOREFRONT, "No restaurants yet");
        } else {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(theme::SPACING_XL, theme::SPACING_XL);
                for restaurant in &state.restaurants {
                    render_card(ui, restaurant, caps.manage_restaurants, &mut actions);
                }
            });
        }

        ui.add_space(theme::SPACING_XL);
        render_pager(ui, state.page, &state.meta, state.loading, &mut actions);

        let ctx = ui.ctx().clone();
        self.render_menu_modal(&ctx, caps.use_cart, &mut actions);
        self.render_add_restaurant_modal(&ctx, caps.choose_country, &mut actions);
        self.render_add_item_modal(&ctx, &mut actions);

        for action in actions {
            self.apply_restaurants_action(action);
        }
    }

    fn render_menu_modal(&self, ctx: &egui::Context, can_order: bool, actions: &mut Vec<Action>) {
        let Some(restaurant) = &self.restaurants.menu else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("menu_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(160))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(theme::MODAL_WIDTH + 60.0);
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&restaurant.name)
                            .size(theme::FONT_HEADING)
                            .color(theme::TEXT_PRIMARY)
                            .strong(),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if components::close_button(ui) {
                            actions.push(Action::CloseMenu);
                        }
                    });
                });
                ui.label(
                    egui::RichText::new(format!(
                        "{} • {}",
                        restaurant.country,
                        components::format_date(&restaurant.created_at)
                    ))
                    .color(theme::TEXT_MUTED),
                );
                ui.add_space(theme::SPACING_LG);

                if restaurant.menu_items.is_empty() {
                    ui.label(egui::RichText::new("No menu items yet").color(theme::TEXT_DIM));
                    return;
                }

                egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                    for item in &restaurant.menu_items {
                        let key = CartKey::new(&restaurant.id, &item.id);
                        theme::card_frame()
                            .inner_margin(egui::Margin::same(theme::SPACING_LG as i8))
                            .show(ui, |ui| {
                                ui.set_width(ui.available_width());
                                ui.horizontal(|ui| {
                                    ui.vertical(|ui| {
                                        ui.label(egui::RichText::new(&item.name).color(theme::TEXT_PRIMARY));
                                        ui.label(
                                            egui::RichText::new(components::format_price(item.price))
                                                .size(theme::FONT_SMALL)
                                                .color(theme::TEXT_MUTED),
                                        );
                                    });
                                    if !can_order {
                                        return;
                                    }
                                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                        let add = format!("{} Add", egui_phosphor::regular::SHOPPING_CART);
                                        if ui.add(theme::button_success(add)).clicked() {
                                            actions.push(Action::AddToCart(item.clone(), restaurant.clone()));
                                        }
                                        if let Some(step) = components::quantity_stepper(ui, self.restaurants.qty(&key)) {
                                            actions.push(Action::Step(key.clone(), step));
                                        }
                                    });
                                });
                            });
                        ui.add_space(theme::SPACING_SM);
                    }
                });
            });

        if modal.should_close() {
            actions.push(Action::CloseMenu);
        }
    }

    fn render_add_restaurant_modal(&mut self, ctx: &egui::Context, choose_country: bool, actions: &mut Vec<Action>) {
        let Some(form) = self.restaurants.add_restaurant.as_mut() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("add_restaurant_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(160))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(theme::MODAL_WIDTH);
                ui.label(egui::RichText::new("Add Restaurant").size(theme::FONT_HEADING).strong());
                ui.add_space(theme::SPACING_LG);

                ui.add(
                    egui::TextEdit::singleline(&mut form.name)
                        .hint_text("Restaurant Name")
                        .desired_width(f32::INFINITY),
                );
                if choose_country {
                    ui.add_space(theme::SPACING_MD);
                    egui::ComboBox::from_id_salt("restaurant_country")
                        .selected_text(form.country.as_str())
                        .width(ui.available_width())
                        .show_ui(ui, |ui| {
                            for country in COUNTRIES {
                                ui.selectable_value(&mut form.country, country.to_string(), country);
                            }
                        });
                }
                ui.add_space(theme::SPACING_XL);

                form_buttons(ui, form.saving, actions, Action::SaveRestaurant);
            });

        if modal.should_close() {
            actions.push(Action::CloseForms);
        }
    }

    fn render_add_item_modal(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let Some(form) = self.restaurants.add_item.as_mut() else {
            return;
        };

        let modal = egui::Modal::new(egui::Id::new("add_item_modal"))
            .backdrop_color(egui::Color32::from_black_alpha(160))
            .frame(theme::modal_frame())
            .show(ctx, |ui| {
                ui.set_width(theme::MODAL_WIDTH);
                ui.label(egui::RichText::new("Add Menu Item").size(theme::FONT_HEADING).strong());
                ui.label(egui::RichText::new(&form.restaurant_name).color(theme::TEXT_MUTED));
                ui.add_space(theme::SPACING_LG);

                ui.add(
                    egui::TextEdit::singleline(&mut form.name)
                        .hint_text("Item Name")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(theme::SPACING_MD);
                ui.add(
                    egui::TextEdit::singleline(&mut form.price)
                        .hint_text("Price")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(theme::SPACING_XL);

                form_buttons(ui, form.saving, actions, Action::SaveItem);
            });

        if modal.should_close() {
            actions.push(Action::CloseForms);
        }
    }
}

fn render_card(ui: &mut egui::Ui, restaurant: &Restaurant, staff: bool, actions: &mut Vec<Action>) {
    theme::card_frame().show(ui, |ui| {
        ui.set_width(theme::CARD_WIDTH);
        ui.label(
            egui::RichText::new(&restaurant.name)
                .size(theme::FONT_HEADING)
                .color(theme::TEXT_PRIMARY)
                .strong(),
        );
        ui.label(
            egui::RichText::new(format!(
                "{} • {}",
                restaurant.country,
                components::format_date(&restaurant.created_at)
            ))
            .size(theme::FONT_SMALL)
            .color(theme::TEXT_MUTED),
        );
        ui.add_space(theme::SPACING_LG);

        let full = egui::vec2(ui.available_width(), 30.0);
        if ui.add(theme::button_accent("View Menu").min_size(full)).clicked() {
            actions.push(Action::OpenMenu(restaurant.clone()));
        }
        if staff {
            ui.add_space(theme::SPACING_SM);
            if ui.add(theme::button_warning("+ Add Menu Item").min_size(full)).clicked() {
                actions.push(Action::OpenAddItem(restaurant.clone()));
            }
        }
    });
}

fn render_pager(ui: &mut egui::Ui, page: u32, meta: &PageMeta, loading: bool, actions: &mut Vec<Action>) {
    if meta.total_pages <= 1 && !meta.has_prev_page && !meta.has_next_page {
        return;
    }
    ui.horizontal(|ui| {
        let prev = format!("{} Previous", egui_phosphor::regular::CARET_LEFT);
        if ui.add_enabled(meta.has_prev_page && !loading, theme::button(prev)).clicked() {
            actions.push(Action::Page(page.saturating_sub(1)));
        }
        ui.label(
            egui::RichText::new(format!("Page {} of {}", page, meta.total_pages.max(1)))
                .color(theme::TEXT_MUTED),
        );
        let next = format!("Next {}", egui_phosphor::regular::CARET_RIGHT);
        if ui.add_enabled(meta.has_next_page && !loading, theme::button(next)).clicked() {
            actions.push(Action::Page(page + 1));
        }
        if loading {
            ui.spinner();
        }
    });
}

/// Cancel / Save row at the bottom of the add forms
fn form_buttons(ui: &mut egui::Ui, saving: bool, actions: &mut Vec<Action>, save: Action) {
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        let label = if saving { "Saving..." } else { "Save" };
        if ui.add_enabled(!saving, theme::button_accent(label)).clicked() {
            actions.push(save);
            return;
        }
        if ui.add(theme::button("Cancel")).clicked() {
            actions.push(Action::CloseForms);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use rstest::rstest;

    #[test]
    fn stepper_defaults_to_one_and_floors_there() {
        let mut state = RestaurantsState::default();
        let key = CartKey::new("r1", "m1");
        assert_eq!(state.qty(&key), 1);

        state.step_qty(key.clone(), Step::Decrease);
        assert_eq!(state.qty(&key), 1);
        state.step_qty(key.clone(), Step::Increase);
        state.step_qty(key.clone(), Step::Increase);
        assert_eq!(state.qty(&key), 3);
    }

    #[test]
    fn stepper_is_keyed_by_restaurant_and_item() {
        let mut state = RestaurantsState::default();
        state.step_qty(CartKey::new("r1", "m1"), Step::Increase);
        assert_eq!(state.qty(&CartKey::new("r1", "m1")), 2);
        assert_eq!(state.qty(&CartKey::new("r2", "m1")), 1);
    }

    #[test]
    fn taking_a_quantity_resets_the_stepper() {
        let mut state = RestaurantsState::default();
        let key = CartKey::new("r1", "m1");
        state.step_qty(key.clone(), Step::Increase);
        assert_eq!(state.take_qty(&key), 2);
        assert_eq!(state.qty(&key), 1);
        assert_eq!(state.take_qty(&key), 1);
    }

    #[test]
    fn reset_returns_to_first_page() {
        let mut state = RestaurantsState { page: 4, ..Default::default() };
        state.add_restaurant = Some(RestaurantForm::default());
        state.reset();
        assert_eq!(state.page, 1);
        assert!(state.add_restaurant.is_none());
        assert!(state.menu.is_none());
    }

    #[test]
    fn new_restaurant_form_starts_in_india() {
        assert_eq!(RestaurantForm::default().country, "INDIA");
    }

    #[rstest]
    #[case("120", Some(120.0))]
    #[case(" 99.5 ", Some(99.5))]
    #[case("", None)]
    #[case("abc", None)]
    #[case("-3", None)]
    #[case("NaN", None)]
    fn menu_item_price_parsing(#[case] price: &str, #[case] expected: Option<f64>) {
        let form = MenuItemForm {
            restaurant_id: "r1".into(),
            name: " Dosa ".into(),
            price: price.into(),
            ..Default::default()
        };
        let request = form.to_request();
        assert_eq!(request.as_ref().map(|r| r.price), expected);
        if let Some(request) = request {
            assert_eq!(request.name, "Dosa");
            assert_eq!(request.restaurant_id, "r1");
        }
    }

    fn restaurant_page(page: u32, names: &[&str]) -> RestaurantPage {
        RestaurantPage {
            data: names
                .iter()
                .map(|name| Restaurant {
                    id: format!("r-{name}"),
                    name: name.to_string(),
                    country: "INDIA".into(),
                    created_at: String::new(),
                    menu_items: Vec::new(),
                })
                .collect(),
            meta: PageMeta { page, has_next_page: true, ..PageMeta::default() },
        }
    }

    #[rstest]
    fn late_page_is_dropped(mut app: App) {
        app.load_restaurants(1);
        app.load_restaurants(2);

        app.on_restaurants_loaded(1, Ok(restaurant_page(1, &["Spice Hub"])));
        assert!(app.restaurants.loading);
        assert!(app.restaurants.restaurants.is_empty());

        app.on_restaurants_loaded(2, Ok(restaurant_page(2, &["Diner", "Taco Stand"])));
        assert!(!app.restaurants.loading);
        assert_eq!(app.restaurants.restaurants.len(), 2);
        assert_eq!(app.restaurants.meta.page, 2);
    }

    #[rstest]
    fn failed_load_offers_retry(mut app: App) {
        app.load_restaurants(1);
        app.on_restaurants_loaded(1, Err(ApiError::Decode("bad".into())));
        assert!(app.restaurants.load_failed);
        assert!(!app.restaurants.loading);
    }
}
