//! App module - contains the main application state and logic

mod checkout;
mod events;
mod login;
mod navigation;
mod orders;
mod pay;
mod restaurants;
mod toast;

#[cfg(test)]
pub(crate) mod test_support;

use crate::access::{Capabilities, Route};
use crate::api::ApiClient;
use crate::cart::Cart;
use crate::db::Database;
use crate::settings::Settings;
use crate::theme;
use crate::types::User;
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub(crate) use events::ApiEvent;
pub(crate) use toast::Toasts;

use checkout::CheckoutState;
use login::LoginForm;
use orders::OrdersState;
use pay::PayState;
use restaurants::RestaurantsState;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) ctx: egui::Context,
    pub(crate) db: Database,
    pub(crate) api: ApiClient,
    pub(crate) runtime: tokio::runtime::Runtime,
    // Finished requests waiting to be applied on the next frame
    pub(crate) inbox: Arc<Mutex<Vec<ApiEvent>>>,
    // Session
    pub(crate) session_token: Option<String>,
    pub(crate) user: Option<User>,
    pub(crate) profile_in_flight: bool,
    pub(crate) logout_in_flight: bool,
    // Navigation
    pub(crate) route: Route,
    // Pages
    pub(crate) login: LoginForm,
    pub(crate) restaurants: RestaurantsState,
    pub(crate) cart: Cart,
    pub(crate) checkout: CheckoutState,
    pub(crate) orders: OrdersState,
    pub(crate) pay: PayState,
    pub(crate) toasts: Toasts,
    // Settings
    pub(crate) settings: Settings,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        db: Database,
        api: ApiClient,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        // Add Phosphor icons font
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        let mut app = Self::from_parts(cc.egui_ctx.clone(), db, api, settings, data_dir, runtime);
        app.navigate(Route::Root);
        app
    }

    /// Assemble the state without touching the window; `new` adds fonts,
    /// visuals and the first navigation
    pub(crate) fn from_parts(
        ctx: egui::Context,
        db: Database,
        api: ApiClient,
        settings: Settings,
        data_dir: PathBuf,
        runtime: tokio::runtime::Runtime,
    ) -> Self {
        let session_token = db.session_token().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored session");
            None
        });
        let cart = db.load_cart().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored cart");
            Cart::default()
        });

        info!(
            logged_in = session_token.is_some(),
            cart_lines = cart.len(),
            api = %api.base_url(),
            "Session restored"
        );

        Self {
            ctx,
            db,
            api,
            runtime,
            inbox: Arc::new(Mutex::new(Vec::new())),
            session_token,
            user: None,
            profile_in_flight: false,
            logout_in_flight: false,
            route: Route::Root,
            login: LoginForm::default(),
            restaurants: RestaurantsState::default(),
            cart,
            checkout: CheckoutState::default(),
            orders: OrdersState::default(),
            pay: PayState::default(),
            toasts: Toasts::default(),
            settings,
            window_pos: None,
            window_size: None,
            needs_center: false,
            data_dir,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            ..self.settings.clone()
        };
        settings.save(&self.data_dir);
    }

    /// What the signed-in user may see; an unloaded profile counts as a shopper
    pub(crate) fn caps(&self) -> Capabilities {
        Capabilities::for_role(self.user.as_ref().map(|u| u.role))
    }

    /// Write the cart through to local storage
    pub(crate) fn persist_cart(&self) {
        if let Err(e) = self.db.save_cart(&self.cart) {
            warn!(error = %e, "Failed to save cart");
        }
    }

    pub(crate) fn store_session(&mut self, token: Option<String>) {
        let result = match &token {
            Some(t) => self.db.set_session_token(t),
            None => self.db.clear_session_token(),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
        self.session_token = token;
    }
}
