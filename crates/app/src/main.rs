//! RefScrn - screenshot overlay with annotation

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod assist;
mod fonts;
mod ocr;
mod paint;
mod settings;
mod translate;
mod ui;

use crate::settings::AppSettings;
use crate::ui::OverlayApp;
use anyhow::{anyhow, Context};
use eframe::egui;
use overlay::{DpiContext, OverlayController};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(windows)]
    unsafe {
        use windows::Win32::UI::HiDpi::{
            SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        };
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let settings = AppSettings::load();
    log::info!(
        "Hotkey {}, saving to {}",
        settings.hotkey(),
        settings.default_save_path.display()
    );

    let screenshot = capture::capture_monitor_under_cursor().context("capture screen")?;
    let dpi = DpiContext::resolve(screenshot.scale);
    let placement = dpi.window_placement(&screenshot.bounds);
    log::info!(
        "Overlay at ({}, {}) {}x{} logical, scale {}x{}",
        placement.x,
        placement.y,
        placement.width,
        placement.height,
        dpi.scale_x,
        dpi.scale_y
    );

    let controller = OverlayController::new(screenshot.image, dpi);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("RefScrn")
            .with_position([placement.x as f32, placement.y as f32])
            .with_inner_size([placement.width as f32, placement.height as f32])
            .with_decorations(false)
            .with_resizable(false)
            .with_always_on_top()
            .with_taskbar(false),
        ..Default::default()
    };

    eframe::run_native(
        "RefScrn",
        native_options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, controller, settings)))),
    )
    .map_err(|e| anyhow!("overlay window failed: {}", e))?;

    Ok(())
}
