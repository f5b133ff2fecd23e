//! Full-window trigger surface and layered presentation.
//!
//! The whole window is one clickable, focusable control announced to
//! assistive technology as a button labeled "start animation". Layers are
//! painted bottom to top with the opacities from [`LayerStack`], each
//! scaled to fit inside the window and pinned to the top edge.

use eframe::egui;
use log::{debug, trace};

use crate::assets::Assets;
use crate::core::composition::{LayerKind, LayerStack};

/// Accessible label of the trigger surface.
pub const SURFACE_LABEL: &str = "start animation";

const FULL_UV: egui::Rect = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

/// GPU textures for the asset layers.
#[derive(Default)]
pub struct Stage {
    start: Option<egui::TextureHandle>,
    animation: Vec<egui::TextureHandle>,
    final_frame: Option<egui::TextureHandle>,
    uploaded: bool,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload the eagerly decoded layers. Runs once.
    fn upload_eager(&mut self, ctx: &egui::Context, assets: &Assets) {
        if self.uploaded {
            return;
        }
        self.uploaded = true;

        self.start = assets.start.as_ref().map(|img| upload(ctx, "start", img));
        if let Some(anim) = &assets.animation {
            self.animation = anim
                .frames()
                .iter()
                .enumerate()
                .map(|(i, f)| upload(ctx, &format!("animation_{i}"), &f.image))
                .collect();
        }
        debug!(
            "Uploaded textures: start={}, animation frames={}",
            self.start.is_some(),
            self.animation.len()
        );
    }

    /// Final frame texture, decoded and uploaded on first request.
    fn final_frame(&mut self, ctx: &egui::Context, assets: &Assets) -> Option<&egui::TextureHandle> {
        if self.final_frame.is_none() {
            let image = assets.final_frame.get()?;
            self.final_frame = Some(upload(ctx, "final_frame", image));
        }
        self.final_frame.as_ref()
    }

    pub fn has_final_frame(&self) -> bool {
        self.final_frame.is_some()
    }

    /// Paint the stack and return the surface response.
    pub fn show(&mut self, ui: &mut egui::Ui, stack: &LayerStack, assets: &Assets) -> egui::Response {
        let ctx = ui.ctx().clone();
        self.upload_eager(&ctx, assets);

        let rect = ui.max_rect();
        let response = ui.interact(rect, ui.id().with("boot_surface"), egui::Sense::click());
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, true, SURFACE_LABEL));

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

        for (kind, opacity) in stack.layers() {
            if opacity <= 0.0 {
                continue;
            }
            let texture = match kind {
                LayerKind::Static => self.start.as_ref(),
                LayerKind::Animated => {
                    let idx = assets
                        .animation
                        .as_ref()
                        .map(|a| a.frame_at(stack.animation_elapsed))
                        .unwrap_or(0);
                    self.animation.get(idx)
                }
                LayerKind::FinalFrame => self.final_frame(&ctx, assets),
            };
            let Some(texture) = texture else {
                trace!("No texture for {:?} layer", kind);
                continue;
            };
            let dest = contain_top(texture.size_vec2(), rect);
            painter.image(texture.id(), dest, FULL_UV, egui::Color32::WHITE.gamma_multiply(opacity));
        }

        response
    }
}

fn upload(ctx: &egui::Context, name: &str, image: &image::RgbaImage) -> egui::TextureHandle {
    let size = [image.width() as usize, image.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    ctx.load_texture(name, color, egui::TextureOptions::LINEAR)
}

/// Largest rect with the image's aspect ratio that fits `area`,
/// horizontally centered and aligned to the top edge.
pub fn contain_top(image_size: egui::Vec2, area: egui::Rect) -> egui::Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return area;
    }
    let scale = (area.width() / image_size.x).min(area.height() / image_size.y);
    let size = image_size * scale;
    let left = area.center().x - size.x * 0.5;
    egui::Rect::from_min_size(egui::pos2(left, area.top()), size)
}
