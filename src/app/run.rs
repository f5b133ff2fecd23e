//! Main application loop - eframe::App implementation.
//!
//! Each frame:
//! - Advance the controller (gamepad poll, due timers)
//! - Paint the layer stack on the full-window surface
//! - Forward click / Enter / Space as trigger requests
//! - Drain controller notifications
//! - Schedule the next repaint from the controller's next wakeup

use std::time::Instant;

use eframe::{egui, glow};
use log::{info, trace};

use crate::app::BootApp;
use crate::input::{close_requested, key_trigger, surface_trigger};

impl eframe::App for BootApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        if ctx.input(|i| close_requested(&i.events)) {
            info!("Escape pressed, closing");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.controller.tick(now);
        let key_source = ctx.input(|i| key_trigger(&i.events));

        let stack = self.controller.composition(now);
        let response = egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.stage.show(ui, &stack, &self.assets))
            .inner;

        if !self.focus_given {
            response.request_focus();
            self.focus_given = true;
        }
        if !self.controller.is_triggered() {
            ctx.set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        if let Some(source) = key_source.or_else(|| surface_trigger(&response)) {
            self.request_trigger(source, now);
        }

        if self.handle_events() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
                "bootseq - {}",
                self.shown_phase()
            )));
        }

        match self.repaint_after(Instant::now()) {
            Some(delay) if delay.is_zero() => ctx.request_repaint(),
            Some(delay) => ctx.request_repaint_after(delay),
            None => trace!("Nothing scheduled, idling until input"),
        }
    }

    /// Cancel polling and pending timers before the window goes away.
    fn on_exit(&mut self, _gl: Option<&glow::Context>) {
        self.shutdown();
    }
}
