use console::Style;
use pano_core::pipeline::config::PipelineConfig;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    path: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            path: Style::new().underlined(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

pub fn print_run_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Pano"));
    println!("  {}", s.title.apply_to("\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}\u{2550}"));
    println!();

    for (i, input) in config.inputs.iter().enumerate() {
        let label = if i == 0 { "Input" } else { "" };
        println!(
            "  {:<14}{}",
            s.label.apply_to(label),
            s.path.apply_to(input.display())
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}every {} frame(s)",
        s.label.apply_to("Step"),
        s.value.apply_to(config.sampling.step)
    );
    match config.sampling.resize_width {
        Some(width) => println!(
            "  {:<14}max width {} px",
            s.label.apply_to("Resize"),
            s.value.apply_to(width)
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Resize"),
            s.disabled.apply_to("disabled")
        ),
    }
    println!(
        "  {:<14}{} frames, {} attempt(s)",
        s.label.apply_to("Limits"),
        s.value.apply_to(config.sampling.max_frames),
        s.value.apply_to(config.stitching.max_attempts)
    );
    if let Some(seed) = config.stitching.seed {
        println!("  {:<14}{}", s.label.apply_to("Seed"), s.value.apply_to(seed));
    }
    println!();
}
