use std::path::Path;

use chromafix_core::cache::margin_for;
use chromafix_core::config::{CorrectionParams, EngineConfig};
use chromafix_core::geom::Rect;
use chromafix_core::shift::{ChannelShifts, ShiftModel};
use console::Style;

pub struct Styles {
    pub title: Style,
    pub label: Style,
    pub value: Style,
    pub method: Style,
    pub disabled: Style,
    pub path: Style,
}

impl Styles {
    pub fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

fn print_shifts(s: &Styles, label: &str, shifts: &ChannelShifts, active: bool) {
    if !active {
        println!("  {:<14}{}", s.label.apply_to(label), s.disabled.apply_to("off"));
        return;
    }
    let values: Vec<String> = shifts
        .labeled()
        .iter()
        .map(|(axis, v)| format!("{axis}={v:+.2}"))
        .collect();
    println!(
        "  {:<14}{}",
        s.label.apply_to(label),
        s.value.apply_to(values.join("  "))
    );
}

/// Print what a correction run is about to do.
pub fn print_correction_summary(
    input: &Path,
    output: &Path,
    size: (usize, usize),
    params: &CorrectionParams,
    engine: &EngineConfig,
    region: Option<Rect>,
) {
    let s = Styles::new();
    let (width, height) = size;
    let shift = &params.shift;
    let model = ShiftModel::new(shift, width, height);

    print_title(&s, "Chromatic Aberration Fix");

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(input.display()));
    println!("  {:<14}{}", s.label.apply_to("Output"), s.path.apply_to(output.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Size"),
        s.value.apply_to(format!("{width}x{height}"))
    );
    if let Some(region) = region {
        println!("  {:<14}{}", s.label.apply_to("Region"), s.value.apply_to(region));
    }
    println!("  {:<14}{}", s.label.apply_to("Mode"), s.method.apply_to(shift.mode));
    print_shifts(&s, "Lateral", &shift.lateral, shift.mode.uses_lateral());
    print_shifts(&s, "Directional", &shift.directional, shift.mode.uses_directional());
    if let Some([cx, cy]) = shift.center {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Center"),
            s.value.apply_to(format!("({cx:.1}, {cy:.1})"))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Interpolation"),
        s.method.apply_to(params.interpolation)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Margin"),
        s.value.apply_to(format!(
            "{} px (max displacement {:.2})",
            margin_for(&model, params.interpolation),
            model.max_displacement()
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Tiles"),
        s.value.apply_to(format!(
            "{} px, {}",
            engine.tile_size,
            if engine.parallel { "parallel" } else { "sequential" }
        ))
    );
    println!();
}
