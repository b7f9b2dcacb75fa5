//! Routing, the navbar and the session lifecycle (profile check, logout)

use super::events::ApiEvent;
use super::App;
use crate::access::{self, Route};
use crate::api::ApiError;
use crate::constants::APP_NAME;
use crate::theme;
use crate::types::User;
use eframe::egui;
use tracing::{debug, info, warn};

/// Upper bound on chained redirects; the rules settle in at most two hops
const MAX_REDIRECTS: usize = 3;

impl App {
    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// Go to `target`, applying the route guards, then load the page
    pub(crate) fn navigate(&mut self, target: Route) {
        let has_token = self.session_token.is_some();
        let mut route = target;
        for _ in 0..MAX_REDIRECTS {
            match access::redirect(&route.path(), has_token) {
                Some(next) => {
                    debug!(from = %route.path(), to = %next.path(), "Redirect");
                    route = next;
                }
                None => break,
            }
        }

        info!(from = %self.route.path(), to = %route.path(), "Navigate");
        self.route = route.clone();
        self.enter(route);
        self.check_profile();
    }

    /// Per-page work when a page is opened
    fn enter(&mut self, route: Route) {
        match route {
            Route::Root => {}
            Route::Login => self.login.reset(),
            Route::Restaurants => {
                self.restaurants.reset();
                self.load_restaurants(1);
            }
            Route::Cart => self.enter_cart(),
            Route::Orders => self.load_orders(),
            Route::Pay(id) => self.load_pay_page(id),
        }
    }

    /// Staff never get a cart; an unknown profile is let through
    pub(crate) fn deny_cart_for_staff(&mut self) {
        let staff = self.user.as_ref().is_some_and(|u| u.role.is_staff());
        if staff && self.route == Route::Cart {
            self.toasts.error("Access denied for this role");
            self.navigate(Route::Restaurants);
        }
    }

    // ========================================================================
    // PROFILE
    // ========================================================================

    /// Re-fetch `/auth/me` for the navbar and role checks
    fn check_profile(&mut self) {
        if self.session_token.is_none() {
            self.user = None;
            return;
        }
        if self.profile_in_flight {
            return;
        }
        self.profile_in_flight = true;
        self.spawn_request(|api| async move { ApiEvent::Profile(api.me().await) });
    }

    pub(super) fn on_profile(&mut self, result: Result<User, ApiError>) {
        self.profile_in_flight = false;
        match result {
            Ok(user) if self.session_token.is_none() => {
                debug!(user = %user.sub, "Dropping profile that outlived the session");
            }
            Ok(user) => {
                debug!(user = %user.sub, role = %user.role, country = %user.country, "Profile loaded");
                self.user = Some(user);
                self.deny_cart_for_staff();
            }
            Err(e) if e.is_unauthorized() && self.session_token.is_some() => {
                warn!(error = %e, "Stored session rejected");
                self.end_session();
                self.toasts.error("Session expired. Please log in again.");
                self.navigate(Route::Login);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load profile");
                self.user = None;
            }
        }
    }

    /// Forget the session locally: token, cookie and profile
    pub(crate) fn end_session(&mut self) {
        self.store_session(None);
        self.api.drop_session();
        self.user = None;
    }

    // ========================================================================
    // LOGOUT
    // ========================================================================

    fn logout(&mut self) {
        if self.logout_in_flight {
            return;
        }
        self.logout_in_flight = true;
        self.spawn_request(|api| async move { ApiEvent::LoggedOut(api.logout().await) });
    }

    pub(super) fn on_logged_out(&mut self, result: Result<(), ApiError>) {
        self.logout_in_flight = false;
        match result {
            Ok(()) => {
                self.end_session();
                self.toasts.success("Logged out successfully!");
                self.navigate(Route::Login);
            }
            Err(e) if e.is_network() => self.toasts.error("Network error while logging out."),
            Err(_) => self.toasts.error("Failed to log out. Try again."),
        }
    }

    // ========================================================================
    // NAVBAR
    // ========================================================================

    /// Top bar; hidden until the profile is known
    pub(crate) fn render_navbar(&mut self, ctx: &egui::Context) {
        let Some(user) = self.user.clone() else {
            return;
        };
        let caps = self.caps();
        let mut goto = None;
        let mut logout = false;

        egui::TopBottomPanel::top("navbar")
            .exact_height(theme::NAVBAR_HEIGHT)
            .frame(theme::navbar_frame())
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(APP_NAME)
                            .size(theme::FONT_BRAND)
                            .color(theme::ACCENT_LIGHT)
                            .strong(),
                    );
                    ui.add_space(theme::SPACING_XXL);

                    let mut links = vec![
                        (egui_phosphor::regular::STOREFRONT, "Restaurants", Route::Restaurants),
                        (egui_phosphor::regular::RECEIPT, "Orders", Route::Orders),
                    ];
                    if caps.use_cart {
                        links.push((egui_phosphor::regular::SHOPPING_CART, "Cart", Route::Cart));
                    }
                    for (icon, label, route) in links {
                        let active = self.route == route;
                        let color = if active { theme::TEXT_PRIMARY } else { theme::TEXT_MUTED };
                        let text = egui::RichText::new(format!("{icon} {label}")).color(color);
                        if ui.selectable_label(active, text).clicked() {
                            goto = Some(route);
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = format!("{} Logout", egui_phosphor::regular::SIGN_OUT);
                        let button = theme::button_danger(label);
                        if ui.add_enabled(!self.logout_in_flight, button).clicked() {
                            logout = true;
                        }
                        ui.add_space(theme::SPACING_LG);
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&user.name).color(theme::TEXT_PRIMARY).strong())
                                .on_hover_text(&user.email);
                            ui.label(
                                egui::RichText::new(format!("{} • {}", user.role, user.country))
                                    .size(theme::FONT_SMALL)
                                    .color(theme::TEXT_MUTED),
                            );
                        });
                    });
                });
            });

        if let Some(route) = goto {
            self.navigate(route);
        }
        if logout {
            self.logout();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{app, user, ToastKind};
    use crate::types::Role;
    use rstest::rstest;

    #[rstest]
    fn rejected_session_is_cleared_and_sent_to_login(mut app: App) {
        app.store_session(Some("tok-1".into()));
        app.user = Some(user(Role::Member));
        app.route = Route::Orders;

        app.on_profile(Err(ApiError::Status { status: 401, message: None }));

        assert_eq!(app.session_token, None);
        assert_eq!(app.db.session_token().expect("token"), None);
        assert!(app.user.is_none());
        assert_eq!(app.route, Route::Login);
        assert_eq!(
            app.toasts.latest(),
            Some(("Session expired. Please log in again.", ToastKind::Error))
        );
    }

    #[rstest]
    fn other_profile_failures_keep_the_session(mut app: App) {
        app.store_session(Some("tok-1".into()));
        app.route = Route::Orders;

        app.on_profile(Err(ApiError::Status { status: 500, message: None }));

        assert_eq!(app.session_token.as_deref(), Some("tok-1"));
        assert_eq!(app.route, Route::Orders);
        assert!(app.toasts.latest().is_none());
    }

    #[rstest]
    fn profile_arriving_after_logout_is_dropped(mut app: App) {
        app.store_session(Some("tok-1".into()));
        app.on_logged_out(Ok(()));
        assert_eq!(app.route, Route::Login);

        app.on_profile(Ok(user(Role::Member)));

        assert!(app.user.is_none());
        assert_eq!(app.session_token, None);
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Manager)]
    fn staff_are_turned_away_from_the_cart(mut app: App, #[case] role: Role) {
        app.store_session(Some("tok-1".into()));
        app.route = Route::Cart;

        app.on_profile(Ok(user(role)));

        assert_eq!(app.route, Route::Restaurants);
        assert_eq!(app.toasts.latest(), Some(("Access denied for this role", ToastKind::Error)));
    }

    #[rstest]
    fn members_keep_the_cart(mut app: App) {
        app.store_session(Some("tok-1".into()));
        app.route = Route::Cart;

        app.on_profile(Ok(user(Role::Member)));

        assert_eq!(app.route, Route::Cart);
        assert!(app.toasts.latest().is_none());
    }

    #[rstest]
    fn guards_apply_on_navigation(mut app: App) {
        app.navigate(Route::Root);
        assert_eq!(app.route, Route::Login);

        app.navigate(Route::Cart);
        assert_eq!(app.route, Route::Login);

        app.store_session(Some("tok-1".into()));
        app.navigate(Route::Login);
        assert_eq!(app.route, Route::Restaurants);
    }
}
