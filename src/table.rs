use eframe::egui::{self, RichText, Ui};
use egui::{Align, Align2, CornerRadius, CursorIcon, FontId, Layout, Sense, UiBuilder};

use crate::model::{Cell, ResultDocument};
use crate::view_state::{SortDirection, ViewState};
use crate::viewport::{HEADER_HEIGHT, ROW_HEIGHT, Viewport, VisibleWindow};

const MIN_COLUMN_WIDTH: f32 = 200.0;
const CELL_PADDING: f32 = 12.0;

/// How a single cell is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDisplay<'a> {
    Text(&'a str),
    Link { text: &'a str, href: &'a str },
}

pub fn display_cell(cell: Option<&Cell>) -> CellDisplay<'_> {
    match cell {
        Some(cell) if cell.is_uri() => CellDisplay::Link {
            text: strip_scheme(&cell.value),
            href: &cell.value,
        },
        Some(cell) => CellDisplay::Text(&cell.value),
        None => CellDisplay::Text(""),
    }
}

/// Drops a leading `https://` or `http://` for display.
pub fn strip_scheme(value: &str) -> &str {
    value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"))
        .unwrap_or(value)
}

pub fn header_label(column: &str, sort: Option<(&str, SortDirection)>) -> String {
    match sort {
        Some((active, direction)) if active == column => {
            format!("{} {}", column, direction.indicator())
        }
        _ => column.to_string(),
    }
}

pub fn column_width(available: f32, columns: usize) -> f32 {
    if columns == 0 {
        return 0.0;
    }
    (available / columns as f32).max(MIN_COLUMN_WIDTH)
}

/// Search box, row count and the virtualized result table.
pub struct DataTable {
    viewport: Viewport,
    table_height: f32,
    visible: VisibleWindow,
}

impl DataTable {
    pub fn new(table_height: f32, overscan: usize) -> Self {
        Self {
            viewport: Viewport::new(overscan),
            table_height,
            visible: VisibleWindow::default(),
        }
    }

    /// Window drawn during the last frame.
    pub fn visible_window(&self) -> VisibleWindow {
        self.visible
    }

    pub fn show(&mut self, ui: &mut Ui, view: &mut ViewState) {
        if view.document().is_none() {
            self.visible = VisibleWindow::default();
            placeholder(
                ui,
                "No data available. Please upload a .gz file or wait for default data to load.",
            );
            return;
        }

        let mut query = view.search_query().to_string();
        let search = ui.add(
            egui::TextEdit::singleline(&mut query)
                .desired_width(f32::INFINITY)
                .hint_text("🔍 Search in data..."),
        );
        if search.changed() {
            view.set_search_query(query);
        }
        ui.separator();

        if view.search_query().is_empty() {
            self.visible = VisibleWindow::default();
            placeholder(ui, "Start typing above to view the table.");
            return;
        }

        ui.label(RichText::new(view.summary()).weak());
        ui.add_space(4.0);

        if let Some(column) = self.render_table(ui, view) {
            view.toggle_sort(&column);
        }
    }

    fn render_table(&mut self, ui: &mut Ui, view: &ViewState) -> Option<String> {
        let doc = view.document()?;
        let columns = doc.columns();
        let rows = view.visible_rows();
        let col_width = column_width(ui.available_width(), columns.len());
        let total_width = col_width * columns.len() as f32;
        let body_height = Viewport::body_height(self.table_height);
        let sort = view.sort_column().map(|c| (c, view.sort_direction()));

        let mut clicked = None;
        egui::ScrollArea::horizontal()
            .id_salt("table_hscroll")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = 0.0;
                ui.set_min_width(total_width);

                clicked = render_header(ui, columns, sort, col_width, total_width);

                egui::ScrollArea::vertical()
                    .id_salt("table_body")
                    .auto_shrink([false; 2])
                    .min_scrolled_height(body_height)
                    .max_height(body_height)
                    .show(ui, |ui| {
                        ui.spacing_mut().item_spacing.y = 0.0;
                        let scroll_offset = ui.clip_rect().top() - ui.min_rect().top();
                        let window = self.viewport.window(rows.len(), scroll_offset, body_height);
                        self.visible = window;

                        ui.add_space(window.space_before);
                        for position in window.rows() {
                            render_row(ui, doc, rows[position], position, col_width, total_width);
                        }
                        if window.space_after > 0.0 {
                            ui.add_space(window.space_after);
                        }
                    });
            });
        clicked
    }
}

fn placeholder(ui: &mut Ui, text: &str) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.label(RichText::new(text).weak());
    });
    ui.add_space(24.0);
}

/// Returns the column whose header was clicked.
fn render_header(
    ui: &mut Ui,
    columns: &[String],
    sort: Option<(&str, SortDirection)>,
    col_width: f32,
    total_width: f32,
) -> Option<String> {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(total_width, HEADER_HEIGHT), Sense::hover());
    if !ui.is_rect_visible(rect) {
        return None;
    }

    let dark_mode = ui.visuals().dark_mode;
    let (bg, hover_bg, text_color) = if dark_mode {
        (
            egui::Color32::from_rgb(45, 46, 50),
            egui::Color32::from_rgb(58, 60, 66),
            egui::Color32::from_rgb(180, 180, 180),
        )
    } else {
        (
            egui::Color32::from_rgb(235, 236, 240),
            egui::Color32::from_rgb(222, 224, 230),
            egui::Color32::from_rgb(70, 70, 70),
        )
    };
    ui.painter().rect_filled(rect, CornerRadius::ZERO, bg);

    let mut clicked = None;
    for (index, column) in columns.iter().enumerate() {
        let cell_rect = egui::Rect::from_min_size(
            rect.min + egui::vec2(index as f32 * col_width, 0.0),
            egui::vec2(col_width, HEADER_HEIGHT),
        );
        let response = ui
            .interact(cell_rect, ui.id().with(("table_header", index)), Sense::click())
            .on_hover_cursor(CursorIcon::PointingHand);
        if response.hovered() {
            ui.painter().rect_filled(cell_rect, CornerRadius::ZERO, hover_bg);
        }
        ui.painter_at(cell_rect).text(
            cell_rect.left_center() + egui::vec2(CELL_PADDING, 0.0),
            Align2::LEFT_CENTER,
            header_label(column, sort),
            FontId::proportional(13.0),
            text_color,
        );
        if response.clicked() {
            clicked = Some(column.clone());
        }
    }
    clicked
}

fn render_row(
    ui: &mut Ui,
    doc: &ResultDocument,
    row_index: usize,
    position: usize,
    col_width: f32,
    total_width: f32,
) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(total_width, ROW_HEIGHT), Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }

    let dark_mode = ui.visuals().dark_mode;
    let bg_color = match (position % 2 == 0, dark_mode) {
        (true, true) => egui::Color32::from_rgb(32, 33, 36),
        (false, true) => egui::Color32::from_rgb(40, 41, 45),
        (true, false) => egui::Color32::from_rgb(245, 245, 245),
        (false, false) => egui::Color32::from_rgb(255, 255, 255),
    };
    ui.painter().rect_filled(rect, CornerRadius::ZERO, bg_color);

    let row = &doc.rows()[row_index];
    for (index, column) in doc.columns().iter().enumerate() {
        let cell_rect = egui::Rect::from_min_size(
            rect.min + egui::vec2(index as f32 * col_width, 0.0),
            egui::vec2(col_width, ROW_HEIGHT),
        )
        .shrink2(egui::vec2(CELL_PADDING, 0.0));

        let mut child = ui.new_child(
            UiBuilder::new()
                .max_rect(cell_rect)
                .layout(Layout::left_to_right(Align::Center)),
        );
        child.set_clip_rect(cell_rect.intersect(ui.clip_rect()));

        match display_cell(row.cell(column)) {
            CellDisplay::Link { text, href } => {
                child
                    .add(egui::Hyperlink::from_label_and_url(text, href).open_in_new_tab(true))
                    .on_hover_text(href);
            }
            CellDisplay::Text(value) => {
                child.add(egui::Label::new(value).truncate());
            }
        }
    }
}
