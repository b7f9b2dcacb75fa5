//! Reusable UI components
//!
//! Small formatting helpers and widgets shared by the pages.

use crate::constants::CURRENCY;
use crate::payment::PaymentForm;
use crate::theme;
use crate::types::{OrderStatus, PaymentType};
use chrono::{DateTime, Local, NaiveDate};
use eframe::egui;

/// "₹250.00"
pub fn format_price(amount: f64) -> String {
    format!("{CURRENCY}{amount:.2}")
}

/// Date part of an ISO timestamp in local time, "N/A" when unparseable
pub fn format_date(iso: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return dt.with_timezone(&Local).format("%d %b %Y").to_string();
    }
    match NaiveDate::parse_from_str(iso.get(..10).unwrap_or(iso), "%Y-%m-%d") {
        Ok(date) => date.format("%d %b %Y").to_string(),
        Err(_) => "N/A".to_string(),
    }
}

/// Full local date and time of an ISO timestamp, "N/A" when unparseable
pub fn format_datetime(iso: &str) -> String {
    DateTime::parse_from_rfc3339(iso)
        .map(|dt| dt.with_timezone(&Local).format("%d %b %Y, %H:%M").to_string())
        .unwrap_or_else(|_| "N/A".to_string())
}

/// First 8 characters of an order id followed by "..."
pub fn short_id(id: &str) -> String {
    let head: String = id.chars().take(8).collect();
    format!("{head}...")
}

pub fn status_color(status: &OrderStatus) -> egui::Color32 {
    match status {
        OrderStatus::Paid => theme::STATUS_SUCCESS,
        OrderStatus::Cancelled => theme::STATUS_ERROR,
        OrderStatus::Pending | OrderStatus::Other(_) => theme::STATUS_WARNING,
    }
}

/// What the user clicked on a quantity stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Decrease,
    Increase,
}

/// "− n +" stepper. The minus button is disabled at 1.
pub fn quantity_stepper(ui: &mut egui::Ui, qty: u32) -> Option<Step> {
    let mut step = None;
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = theme::SPACING_SM;
        let minus = egui::Button::new(egui_phosphor::regular::MINUS).min_size(egui::vec2(24.0, 24.0));
        if ui.add_enabled(qty > 1, minus).clicked() {
            step = Some(Step::Decrease);
        }
        ui.add_sized(
            egui::vec2(28.0, 24.0),
            egui::Label::new(egui::RichText::new(qty.to_string()).color(theme::TEXT_PRIMARY).strong()),
        );
        let plus = egui::Button::new(egui_phosphor::regular::PLUS).min_size(egui::vec2(24.0, 24.0));
        if ui.add(plus).clicked() {
            step = Some(Step::Increase);
        }
    });
    step
}

/// Apply a stepper click to a quantity, never going below 1
pub fn apply_step(qty: u32, step: Step) -> u32 {
    match step {
        Step::Decrease => qty.saturating_sub(1).max(1),
        Step::Increase => qty.saturating_add(1),
    }
}

/// Borderless "X" in the corner of a modal
pub fn close_button(ui: &mut egui::Ui) -> bool {
    ui.add(
        egui::Button::new(egui::RichText::new(egui_phosphor::regular::X).color(theme::TEXT_MUTED))
            .frame(false),
    )
    .on_hover_text("Close")
    .clicked()
}

/// Payment type selector plus the one input that type needs
pub fn payment_form(ui: &mut egui::Ui, form: &mut PaymentForm) {
    egui::ComboBox::from_id_salt("payment_type")
        .selected_text(form.payment_type.label())
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for payment_type in PaymentType::ALL {
                ui.selectable_value(&mut form.payment_type, payment_type, payment_type.label());
            }
        });
    if let Some((placeholder, value)) = form.detail_field() {
        ui.add_space(theme::SPACING_MD);
        ui.add(
            egui::TextEdit::singleline(value)
                .hint_text(placeholder)
                .desired_width(f32::INFINITY),
        );
    }
}

/// Page heading with an optional right-aligned action area
pub fn page_header(ui: &mut egui::Ui, title: &str, actions: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(title)
                .size(theme::FONT_TITLE)
                .color(theme::TEXT_PRIMARY)
                .strong(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), actions);
    });
    ui.add_space(theme::SPACING_XL);
}

/// Centered spinner with a caption, for pages waiting on their first load
pub fn loading(ui: &mut egui::Ui, caption: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(theme::SPACING_XXL * 2.0);
        ui.spinner();
        ui.add_space(theme::SPACING_MD);
        ui.label(egui::RichText::new(caption).color(theme::TEXT_MUTED));
    });
}

/// Muted centered message for empty lists
pub fn empty_state(ui: &mut egui::Ui, icon: &str, message: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(theme::SPACING_XXL * 2.0);
        ui.label(egui::RichText::new(icon).size(40.0).color(theme::TEXT_DIM));
        ui.add_space(theme::SPACING_MD);
        ui.label(egui::RichText::new(message).color(theme::TEXT_MUTED));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(250.0, "₹250.00")]
    #[case(80.5, "₹80.50")]
    #[case(0.0, "₹0.00")]
    fn prices_have_two_decimals(#[case] amount: f64, #[case] expected: &str) {
        assert_eq!(format_price(amount), expected);
    }

    #[test]
    fn short_id_keeps_eight_chars() {
        assert_eq!(short_id("4f1c2a7e-1234-5678"), "4f1c2a7e...");
        assert_eq!(short_id("abc"), "abc...");
    }

    #[test]
    fn bad_dates_show_na() {
        assert_eq!(format_date("not a date"), "N/A");
        assert_eq!(format_date(""), "N/A");
        assert_eq!(format_datetime("yesterday"), "N/A");
    }

    #[test]
    fn plain_dates_are_formatted() {
        assert_eq!(format_date("2025-01-05"), "05 Jan 2025");
        assert_ne!(format_date("2025-01-05T10:00:00.000Z"), "N/A");
    }

    #[test]
    fn status_colours() {
        assert_eq!(status_color(&OrderStatus::Paid), theme::STATUS_SUCCESS);
        assert_eq!(status_color(&OrderStatus::Cancelled), theme::STATUS_ERROR);
        assert_eq!(status_color(&OrderStatus::Pending), theme::STATUS_WARNING);
        assert_eq!(status_color(&OrderStatus::Other("ON_HOLD".into())), theme::STATUS_WARNING);
    }

    #[rstest]
    #[case(1, Step::Decrease, 1)]
    #[case(3, Step::Decrease, 2)]
    #[case(1, Step::Increase, 2)]
    fn steps_floor_at_one(#[case] qty: u32, #[case] step: Step, #[case] expected: u32) {
        assert_eq!(apply_step(qty, step), expected);
    }
}
