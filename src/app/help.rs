use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help")
        .open(open)
        .resizable(true)
        .default_width(420.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Keyboard Shortcuts");
                ui.separator();

                ui.label("Editor");
                help_row(ui, "Arrow keys", "Nudge placement by 1%");
                help_row(ui, "Shift + Arrows", "Nudge placement by 5%");
                help_row(ui, "+ / =", "Grow placement by 1%");
                help_row(ui, "-", "Shrink placement by 1% (min 5%)");
                help_row(ui, "⌘Enter", "Save placement");
                help_row(ui, "Escape", "Cancel editing, keep previous placement");

                ui.add_space(10.0);
                ui.label("Pages & View");
                help_row(ui, "PageDown / PageUp", "Next / previous PDF page");
                help_row(ui, "Scroll", "Pan the page");
                help_row(ui, "Pinch / ⌘Scroll", "Zoom about the view center");

                ui.add_space(10.0);
                ui.label("Form");
                help_row(ui, "⌘O", "Attach template (png, jpeg or pdf)");
                help_row(ui, "⌘S", "Save record");
                help_row(ui, "F1", "This window");

                ui.add_space(16.0);
                ui.heading("Notes");
                ui.separator();
                ui.label("• Placement is stored in percent of the page, so it is independent of zoom and window size.");
                ui.label("• Attaching a different template clears the confirmed placement; the record cannot be saved until a placement is confirmed again.");
                ui.label("• Settings live in settings.toml (or ~/.config/qrplace.toml).");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized(
            [120.0, 16.0],
            egui::Label::new(egui::RichText::new(shortcut).monospace().strong()),
        );
        ui.label(description);
    });
}
