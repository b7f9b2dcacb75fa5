//! Login page

use super::events::ApiEvent;
use super::App;
use crate::access::Route;
use crate::api::ApiError;
use crate::constants::APP_NAME;
use crate::theme;
use crate::utils;
use eframe::egui;
use tracing::warn;

#[derive(Default)]
pub(crate) struct LoginForm {
    pub email: String,
    pub password: String,
    pub loading: bool,
    logo: Option<egui::TextureHandle>,
}

impl LoginForm {
    /// Fresh form for a new visit; the email is kept for convenience
    pub fn reset(&mut self) {
        self.password.clear();
        self.loading = false;
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

/// Toast text for a failed login
fn login_error_message(error: &ApiError) -> &'static str {
    match error {
        ApiError::InvalidCredentials => "Invalid credentials. Please try again.",
        e if e.is_network() => "Network error. Please check your connection.",
        _ => "Internal server error. Please try later.",
    }
}

impl App {
    fn submit_login(&mut self) {
        if !self.login.can_submit() {
            return;
        }
        self.login.loading = true;
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        self.spawn_request(move |api| async move {
            ApiEvent::LoggedIn(api.login(&email, &password).await)
        });
    }

    pub(super) fn on_logged_in(&mut self, result: Result<Option<String>, ApiError>) {
        self.login.loading = false;
        match result {
            Ok(Some(token)) => {
                self.store_session(Some(token));
                self.login.password.clear();
                self.toasts.success("Login successful!");
                self.navigate(Route::Restaurants);
            }
            Ok(None) => {
                warn!("Login succeeded without a session cookie");
                self.toasts.error("Internal server error. Please try later.");
            }
            Err(e) => self.toasts.error(login_error_message(&e)),
        }
    }

    pub(crate) fn render_login(&mut self, ui: &mut egui::Ui) {
        let logo = self
            .login
            .logo
            .get_or_insert_with(|| {
                let image = utils::rasterize_icon(128)
                    .map(|(pixels, w, h)| {
                        egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels)
                    })
                    .unwrap_or_else(|| egui::ColorImage::new([1, 1], egui::Color32::TRANSPARENT));
                ui.ctx().load_texture("login_logo", image, egui::TextureOptions::LINEAR)
            })
            .clone();

        let mut submit = false;
        ui.vertical_centered(|ui| {
            ui.add_space((ui.available_height() * 0.15).max(theme::SPACING_XXL));
            theme::card_frame().show(ui, |ui| {
                ui.set_width(theme::FORM_WIDTH);
                ui.vertical_centered(|ui| {
                    ui.add(egui::Image::new(&logo).fit_to_exact_size(egui::vec2(56.0, 56.0)));
                    ui.add_space(theme::SPACING_MD);
                    ui.label(
                        egui::RichText::new(format!("Login to {APP_NAME}"))
                            .size(theme::FONT_TITLE)
                            .color(theme::TEXT_PRIMARY)
                            .strong(),
                    );
                });
                ui.add_space(theme::SPACING_XL);

                ui.label(egui::RichText::new("Email").color(theme::TEXT_MUTED));
                let email = ui.add(
                    egui::TextEdit::singleline(&mut self.login.email)
                        .hint_text("you@example.com")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(theme::SPACING_MD);

                ui.label(egui::RichText::new("Password").color(theme::TEXT_MUTED));
                let password = ui.add(
                    egui::TextEdit::singleline(&mut self.login.password)
                        .password(true)
                        .hint_text("••••••••")
                        .desired_width(f32::INFINITY),
                );
                ui.add_space(theme::SPACING_XL);

                let enter = (email.lost_focus() || password.lost_focus())
                    && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let label = if self.login.loading { "Logging in..." } else { "Login" };
                let button = theme::button_accent(label).min_size(egui::vec2(ui.available_width(), 34.0));
                if ui.add_enabled(self.login.can_submit(), button).clicked() || enter {
                    submit = true;
                }
            });
        });

        if submit {
            self.submit_login();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::conflict(ApiError::InvalidCredentials, "Invalid credentials. Please try again.")]
    #[case::server(ApiError::Status { status: 500, message: None }, "Internal server error. Please try later.")]
    #[case::bad_body(ApiError::Decode("eof".into()), "Internal server error. Please try later.")]
    #[case::unreachable(ApiError::InvalidUrl("x".into()), "Network error. Please check your connection.")]
    fn login_failures_map_to_toasts(#[case] error: ApiError, #[case] expected: &str) {
        assert_eq!(login_error_message(&error), expected);
    }

    #[test]
    fn form_needs_both_fields_and_no_pending_request() {
        let mut form = LoginForm::default();
        assert!(!form.can_submit());
        form.email = "ana@slooze.xyz".into();
        form.password = "secret".into();
        assert!(form.can_submit());
        form.loading = true;
        assert!(!form.can_submit());

        form.reset();
        assert!(!form.loading);
        assert!(form.password.is_empty());
        assert_eq!(form.email, "ana@slooze.xyz");
    }
}
