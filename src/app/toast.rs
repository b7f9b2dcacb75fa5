//! Toast notifications (top-right stack, success and error flavours)

use crate::theme;
use eframe::egui;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const VISIBLE: Duration = Duration::from_millis(3000);
const FADE: Duration = Duration::from_millis(500);
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown: Instant,
}

impl Toast {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.shown)
    }

    /// 1.0 while visible, fading to 0.0
    fn alpha(&self, now: Instant) -> f32 {
        let age = self.age(now);
        if age <= VISIBLE {
            1.0
        } else {
            let faded = (age - VISIBLE).as_secs_f32() / FADE.as_secs_f32();
            (1.0 - faded).clamp(0.0, 1.0)
        }
    }
}

#[derive(Default)]
pub(crate) struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn success(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(message = %message, "Toast");
        self.push(message, ToastKind::Success, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(message = %message, "Error toast");
        self.push(message, ToastKind::Error, Instant::now());
    }

    fn push(&mut self, message: String, kind: ToastKind, now: Instant) {
        self.items.push(Toast { message, kind, shown: now });
        if self.items.len() > MAX_TOASTS {
            let overflow = self.items.len() - MAX_TOASTS;
            self.items.drain(..overflow);
        }
    }

    /// Drop toasts that have fully faded
    fn prune(&mut self, now: Instant) {
        self.items.retain(|t| t.age(now) < VISIBLE + FADE);
    }

    pub fn render(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.prune(now);
        if self.items.is_empty() {
            return;
        }

        let screen = ctx.screen_rect();
        let margin = 16.0;
        let toast_pos = egui::pos2(screen.right() - margin, screen.top() + 56.0);
        let mut hovered = false;

        egui::Area::new(egui::Id::new("toasts"))
            .fixed_pos(toast_pos)
            .pivot(egui::Align2::RIGHT_TOP)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.items {
                    let alpha = toast.alpha(now);
                    let (icon, color) = match toast.kind {
                        ToastKind::Success => (egui_phosphor::regular::CHECK_CIRCLE, theme::STATUS_SUCCESS),
                        ToastKind::Error => (egui_phosphor::regular::WARNING_CIRCLE, theme::STATUS_ERROR),
                    };
                    let response = egui::Frame::new()
                        .fill(theme::with_alpha(theme::BG_ELEVATED, 235.0 * alpha))
                        .stroke(egui::Stroke::new(1.0, theme::with_alpha(color, 120.0 * alpha)))
                        .corner_radius(theme::RADIUS_MEDIUM)
                        .inner_margin(egui::Margin::symmetric(16, 10))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(icon).color(theme::with_alpha(color, 255.0 * alpha)));
                                ui.label(
                                    egui::RichText::new(&toast.message)
                                        .color(theme::with_alpha(theme::TEXT_PRIMARY, 255.0 * alpha)),
                                );
                            });
                        })
                        .response;
                    hovered |= response.hovered();
                    ui.add_space(theme::SPACING_SM);
                }
            });

        // Pause timers while hovering
        if hovered {
            for toast in &mut self.items {
                toast.shown = now;
            }
        }
        ctx.request_repaint();
    }
}

#[cfg(test)]
impl Toasts {
    pub fn messages(&self) -> impl Iterator<Item = (&str, ToastKind)> {
        self.items.iter().map(|t| (t.message.as_str(), t.kind))
    }

    pub fn latest(&self) -> Option<(&str, ToastKind)> {
        self.messages().last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_expire_after_visible_and_fade() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.push("Order placed successfully!".into(), ToastKind::Success, start);

        toasts.prune(start + VISIBLE);
        assert_eq!(toasts.messages().count(), 1);

        toasts.prune(start + VISIBLE + FADE);
        assert_eq!(toasts.messages().count(), 0);
    }

    #[test]
    fn stack_keeps_newest() {
        let now = Instant::now();
        let mut toasts = Toasts::default();
        for i in 0..6 {
            toasts.push(format!("toast {i}"), ToastKind::Error, now);
        }
        let messages: Vec<&str> = toasts.messages().map(|(m, _)| m).collect();
        assert_eq!(messages, ["toast 2", "toast 3", "toast 4", "toast 5"]);
    }

    #[test]
    fn alpha_fades_linearly() {
        let start = Instant::now();
        let toast = Toast { message: String::new(), kind: ToastKind::Success, shown: start };
        assert_eq!(toast.alpha(start), 1.0);
        let halfway = toast.alpha(start + VISIBLE + FADE / 2);
        assert!((halfway - 0.5).abs() < 0.01);
        assert_eq!(toast.alpha(start + VISIBLE + FADE * 2), 0.0);
    }
}
