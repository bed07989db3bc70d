//! Exports of planner output: CSV tables, SVG layout drawings and PDF reports.

use crate::catalog::Catalog;
use crate::planner::LAYOUT_MARGIN;
use crate::types::*;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::fmt::Write;

/// Pixels per meter in layout drawings.
const SCALE: f64 = 20.0;
const PAD: f64 = 20.0;
const CAPTION_HEIGHT: f64 = 36.0;
/// Upper bound on fixtures drawn across all options of one plan.
pub const MAX_DRAWN_FIXTURES: u64 = 100_000;

/// Single-run export: project details, then one row per result.
pub fn results_csv(results: &[LightingResult], project_info: &ProjectInfo) -> Result<String> {
    let mut csv = String::new();

    write_row(&mut csv, ["Project Info"])?;
    for (label, value) in project_info.fields() {
        write_row(&mut csv, [label, value])?;
    }
    writeln!(&mut csv)?;

    write_row(&mut csv, LightingResult::LABELS)?;
    for result in results {
        write_row(&mut csv, result.cells().iter().map(String::as_str))?;
    }

    Ok(csv)
}

/// Flattens a run log into one row per result, prefixed by its project fields.
pub fn history_csv(records: &[RunRecord]) -> Result<String> {
    let mut csv = String::new();

    let header = ProjectInfo::default()
        .fields()
        .map(|(label, _)| label)
        .into_iter()
        .chain(LightingResult::LABELS);
    write_row(&mut csv, header)?;

    for record in records {
        let project: Vec<&str> = record
            .project_info
            .fields()
            .iter()
            .map(|(_, value)| *value)
            .collect();
        for result in &record.results {
            let cells = result.cells();
            let row = project
                .iter()
                .copied()
                .chain(cells.iter().map(String::as_str));
            write_row(&mut csv, row)?;
        }
    }

    Ok(csv)
}

fn write_row<'a>(csv: &mut String, cells: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            csv.push(',');
        }
        if cell.contains([',', '"', '\n', '\r']) {
            write!(csv, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            csv.push_str(cell);
        }
    }
    writeln!(csv)?;
    Ok(())
}

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const PAGE_LEFT: f32 = 20.0;
const PAGE_TOP: f32 = 270.0;
const LINE_HEIGHT: f32 = 8.0;

const DRIVER_NOTE: [&str; 3] = [
    "To avoid electrical instability issues, always use drivers with built-in protections:",
    "- Over voltage protection",
    "- Over current protection",
];

struct ReportPage {
    title: String,
    lines: Vec<String>,
}

/// Cover page with project details and notes, then one page per result.
fn report_pages(results: &[LightingResult], project_info: &ProjectInfo) -> Vec<ReportPage> {
    let mut cover = project_info
        .fields()
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>();
    cover.push(format!("Options: {}", results.len()));
    cover.push(String::new());
    cover.extend(DRIVER_NOTE.iter().map(|line| line.to_string()));

    let mut pages = vec![ReportPage {
        title: "Lighting Design Report".to_string(),
        lines: cover,
    }];

    for (index, result) in results.iter().enumerate() {
        let lines = LightingResult::LABELS
            .iter()
            .zip(result.cells())
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect();
        pages.push(ReportPage {
            title: format!("Option {}", index + 1),
            lines,
        });
    }

    pages
}

fn write_page(
    layer: &PdfLayerReference,
    page: &ReportPage,
    title_font: &IndirectFontRef,
    font: &IndirectFontRef,
) {
    layer.use_text(&page.title, 16.0, Mm(PAGE_LEFT), Mm(PAGE_TOP), title_font);
    let mut y = PAGE_TOP - 2.0 * LINE_HEIGHT;
    for line in &page.lines {
        layer.use_text(line, 11.0, Mm(PAGE_LEFT), Mm(y), font);
        y -= LINE_HEIGHT;
    }
}

fn pdf_error(err: impl std::fmt::Display) -> PlannerError {
    PlannerError::Pdf(err.to_string())
}

/// Paginated A4 report: a cover page, then one page per result.
pub fn results_pdf(results: &[LightingResult], project_info: &ProjectInfo) -> Result<Vec<u8>> {
    let pages = report_pages(results, project_info);

    let (doc, first_page, first_layer) =
        PdfDocument::new("Lighting Design Report", PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        write_page(&layer, page, &title_font, &font);
    }

    doc.save_to_bytes().map_err(pdf_error)
}

/// Fixture centres along one axis. Collapses to the middle of the room when
/// the margin leaves no usable extent.
fn fixture_positions(extent: f64, count: u32) -> Vec<f64> {
    let usable = extent - 2.0 * LAYOUT_MARGIN;
    if usable <= 0.0 {
        return vec![extent / 2.0; count as usize];
    }
    let step = usable / count as f64;
    (0..count)
        .map(|i| LAYOUT_MARGIN + (i as f64 + 0.5) * step)
        .collect()
}

/// Grid to draw for a result. Results without a stored grid get a near-square split.
fn drawing_grid(result: &LightingResult) -> (u32, u32) {
    if result.columns > 0 && result.rows > 0 {
        return (result.columns, result.rows);
    }
    let fixtures = result.fixtures.max(1);
    let columns = ((fixtures as f64).sqrt() as u32).max(1);
    (columns, fixtures.div_ceil(columns))
}

/// Rejects plans that cannot be drawn or would produce an unbounded drawing.
fn check_drawable(plan: &LightingPlan) -> Result<()> {
    for (name, extent) in [("length", plan.length), ("width", plan.width)] {
        if !extent.is_finite() || extent <= 0.0 {
            return Err(PlannerError::InvalidInput(format!(
                "room {} must be positive, got {}",
                name, extent
            )));
        }
    }

    let mut total_fixtures = 0u64;
    for result in &plan.results {
        total_fixtures += u64::from(result.fixtures);
        let cells = u64::from(result.columns) * u64::from(result.rows);
        if cells > 2 * MAX_DRAWN_FIXTURES {
            return Err(PlannerError::InvalidInput(format!(
                "grid of {} x {} is too large to draw",
                result.columns, result.rows
            )));
        }
    }

    if total_fixtures > MAX_DRAWN_FIXTURES {
        return Err(PlannerError::InvalidInput(format!(
            "plan has {} fixtures, at most {} can be drawn",
            total_fixtures, MAX_DRAWN_FIXTURES
        )));
    }

    Ok(())
}

/// Draws every result of a plan as a room outline with its fixture grid.
pub fn layout_svg(plan: &LightingPlan, catalog: &Catalog) -> Result<String> {
    check_drawable(plan)?;

    let mut svg = String::new();

    let room_width = plan.length * SCALE;
    let room_height = plan.width * SCALE;
    let panel_height = room_height + CAPTION_HEIGHT + PAD;

    let svg_width = room_width + 2.0 * PAD;
    let svg_height = panel_height * plan.results.len().max(1) as f64 + PAD;

    writeln!(&mut svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        &mut svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        svg_width, svg_height, svg_width, svg_height
    )?;
    writeln!(
        &mut svg,
        r##"  <rect width="100%" height="100%" fill="#f5f5f5"/>"##
    )?;

    if plan.results.is_empty() {
        writeln!(
            &mut svg,
            r##"  <text x="{}" y="{}" font-family="Arial" font-size="14" fill="#333">No layout meets the target</text>"##,
            PAD,
            PAD + 14.0
        )?;
    }

    let mut y_offset = PAD;

    for (index, result) in plan.results.iter().enumerate() {
        let x = PAD;
        let room_top = y_offset + CAPTION_HEIGHT;

        writeln!(
            &mut svg,
            r##"  <text x="{}" y="{}" font-family="Arial" font-size="14" fill="#333">Option {}: {} {} W @ {} lm/W</text>"##,
            x,
            y_offset + 14.0,
            index + 1,
            escape(&result.luminaire),
            result.power,
            result.efficacy
        )?;
        writeln!(
            &mut svg,
            r##"  <text x="{}" y="{}" font-family="Arial" font-size="11" fill="#666">{} fixtures, {:.1} lx, spacing {} x {} m</text>"##,
            x,
            y_offset + 30.0,
            result.fixtures,
            result.average_lux,
            result.spacing_x,
            result.spacing_y
        )?;

        writeln!(
            &mut svg,
            r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="#ffffff" stroke="#333" stroke-width="2"/>"##,
            x, room_top, room_width, room_height
        )?;

        let (columns, rows) = drawing_grid(result);
        let xs = fixture_positions(plan.length, columns);
        let ys = fixture_positions(plan.width, rows);
        let shape = catalog.shape_for(&result.luminaire);
        let (size_x, size_y) = shape.extent();

        let centres = ys
            .iter()
            .flat_map(|cy| xs.iter().map(move |cx| (*cx, *cy)))
            .take(result.fixtures as usize);

        for (cx, cy) in centres {
            let px = x + cx * SCALE;
            let py = room_top + cy * SCALE;
            match shape {
                LuminaireShape::Circle { diameter } => writeln!(
                    &mut svg,
                    r##"  <circle cx="{}" cy="{}" r="{}" fill="#ff9800" stroke="#e65100" stroke-width="1"/>"##,
                    px,
                    py,
                    diameter * SCALE / 2.0
                )?,
                _ => writeln!(
                    &mut svg,
                    r##"  <rect x="{}" y="{}" width="{}" height="{}" fill="#ff9800" stroke="#e65100" stroke-width="1"/>"##,
                    px - size_x * SCALE / 2.0,
                    py - size_y * SCALE / 2.0,
                    size_x * SCALE,
                    size_y * SCALE
                )?,
            }
        }

        y_offset += panel_height;
    }

    writeln!(&mut svg, "</svg>")?;

    Ok(svg)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Planner;

    fn office_plan() -> LightingPlan {
        Planner::new(Catalog::default())
            .unwrap()
            .plan("Office", [10.0, 8.0, 10.0, 8.0], 3.0)
            .unwrap()
    }

    #[test]
    fn test_results_csv_layout() {
        let plan = office_plan();
        let info = ProjectInfo {
            project_name: "HQ, floor 2".into(),
            client_name: "Acme".into(),
            ..Default::default()
        };

        let csv = results_csv(&plan.results, &info).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Project Info");
        assert_eq!(lines[1], "Project Name,\"HQ, floor 2\"");
        assert_eq!(lines[2], "Client Name,Acme");
        assert_eq!(lines[5], "");
        assert!(lines[6].starts_with("Luminaire,Power (W),Efficacy (lm/W),Fixtures"));
        assert_eq!(lines.len(), 7 + plan.results.len());
        assert!(lines[7].starts_with("SC downlight,9,110,61,2,2,"));
    }

    #[test]
    fn test_history_csv_flattens_records() {
        let plan = office_plan();
        let records = vec![
            RunRecord {
                project_info: ProjectInfo {
                    project_name: "A".into(),
                    ..Default::default()
                },
                results: plan.results.clone(),
            },
            RunRecord {
                project_info: ProjectInfo::default(),
                results: vec![],
            },
        ];

        let csv = history_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].starts_with("Project Name,Client Name,Client Number,Company Name,Luminaire"));
        assert_eq!(lines.len(), 1 + plan.results.len());
        assert!(lines[1].starts_with("A,,,,SC downlight,"));
    }

    #[test]
    fn test_report_pages_one_per_result_plus_cover() {
        let plan = office_plan();
        let info = ProjectInfo {
            client_name: "Acme".into(),
            ..Default::default()
        };

        let pages = report_pages(&plan.results, &info);
        assert_eq!(pages.len(), plan.results.len() + 1);
        assert_eq!(pages[0].title, "Lighting Design Report");
        assert!(pages[0].lines.contains(&"Client Name: Acme".to_string()));
        assert_eq!(pages[1].title, "Option 1");
        assert_eq!(pages[1].lines[0], "Luminaire: SC downlight");
        assert!(pages[1].lines.contains(&"Fixtures: 61".to_string()));

        assert_eq!(report_pages(&[], &info).len(), 1);
    }

    #[test]
    fn test_results_pdf_is_a_pdf() {
        let plan = office_plan();
        let pdf = results_pdf(&plan.results, &ProjectInfo::default()).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_layout_svg_draws_every_fixture() {
        let plan = office_plan();
        let svg = layout_svg(&plan, &Catalog::default()).unwrap();

        assert!(svg.starts_with("<?xml"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Option 4: SC backlight 48 W"));

        let expected_fixtures: u32 = plan.results.iter().map(|r| r.fixtures).sum();
        let fixture_marks = svg.matches(r##"fill="#ff9800""##).count();
        assert_eq!(fixture_marks as u32, expected_fixtures);
    }

    #[test]
    fn test_layout_svg_circles_for_highbay() {
        let plan = Planner::new(Catalog::default())
            .unwrap()
            .plan("Factory warehouse", [30.0, 20.0, 30.0, 20.0], 8.0)
            .unwrap();
        let svg = layout_svg(&plan, &Catalog::default()).unwrap();
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn test_layout_svg_rejects_oversized_plans() {
        let catalog = Catalog::default();
        let mut plan = office_plan();
        plan.results.truncate(1);
        plan.results[0].fixtures = 2_000_000;
        plan.results[0].columns = 0;
        plan.results[0].rows = 0;
        assert!(matches!(
            layout_svg(&plan, &catalog),
            Err(PlannerError::InvalidInput(_))
        ));

        let mut plan = office_plan();
        plan.results[0].columns = u32::MAX;
        plan.results[0].rows = u32::MAX;
        assert!(matches!(
            layout_svg(&plan, &catalog),
            Err(PlannerError::InvalidInput(_))
        ));

        let mut plan = office_plan();
        plan.width = f64::NAN;
        assert!(layout_svg(&plan, &catalog).is_err());
    }

    #[test]
    fn test_fixture_positions_centre_cells() {
        assert_eq!(fixture_positions(10.0, 2), vec![4.0, 6.0]);
        assert_eq!(fixture_positions(4.0, 3), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_drawing_grid_without_stored_grid() {
        let plan = office_plan();
        let mut result = plan.results[1].clone();
        result.columns = 0;
        result.rows = 0;
        // 16 fixtures -> 4 x 4
        assert_eq!(drawing_grid(&result), (4, 4));
    }
}
