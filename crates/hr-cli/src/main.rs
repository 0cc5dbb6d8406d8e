use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hr_lib::{
    config::{AnalysisSection, AppConfig, DemoSection, Settings},
    io::csv as csv_io,
    pipeline::{analyze, AnalysisResult},
    plot::{figure_from_analysis, Figure, PlotBackend, Series},
    signal::Recording,
    synth::generate_demo_ecg,
};
use log::info;
use plotters::prelude::*;
use std::{
    io,
    path::{Path, PathBuf},
};

const PLOT_MAX_POINTS: usize = 4096;

#[derive(Parser)]
#[command(
    name = "hr",
    version,
    about = "ECG viewer & heart rate calculator: R-peak detection and BPM estimation"
)]
struct Cli {
    /// TOML file with [analysis] and [demo] settings; flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Default)]
struct AnalysisArgs {
    /// Sampling rate (Hz)
    #[arg(long)]
    fs: Option<f64>,
    /// Minimum R-R distance (ms)
    #[arg(long)]
    min_distance_ms: Option<f64>,
    /// Standard deviations above the mean a peak must exceed
    #[arg(long)]
    threshold_factor: Option<f64>,
}

#[derive(Args, Default)]
struct DemoArgs {
    /// Demo duration (seconds)
    #[arg(long)]
    duration_s: Option<f64>,
    /// Seed for the demo noise
    #[arg(long)]
    seed: Option<u64>,
    /// Generate pulses without background noise
    #[arg(long)]
    no_noise: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a demo ECG, detect R-peaks and print the result as JSON
    Demo {
        #[command(flatten)]
        analysis: AnalysisArgs,
        #[command(flatten)]
        demo: DemoArgs,
        /// Render the waveform with R-peak markers to a PNG
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Analyze a CSV with 'time' and 'ecg' columns read from --input or stdin
    Analyze {
        #[arg(long)]
        input: Option<PathBuf>,
        #[command(flatten)]
        analysis: AnalysisArgs,
        /// Render the waveform with R-peak markers to a PNG
        #[arg(long)]
        plot: Option<PathBuf>,
    },
    /// Write a demo ECG as a 'time,ecg' CSV
    Generate {
        #[arg(long)]
        fs: Option<f64>,
        #[command(flatten)]
        demo: DemoArgs,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let file_config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    match cli.command {
        Commands::Demo {
            analysis,
            demo,
            plot,
        } => {
            let settings = resolve(file_config, &analysis, &demo)?;
            cmd_demo(&settings, plot.as_deref())?
        }
        Commands::Analyze {
            input,
            analysis,
            plot,
        } => {
            let settings = resolve(file_config, &analysis, &DemoArgs::default())?;
            cmd_analyze(&settings, input.as_deref(), plot.as_deref())?
        }
        Commands::Generate { fs, demo, out } => {
            let analysis = AnalysisArgs {
                fs,
                ..AnalysisArgs::default()
            };
            let settings = resolve(file_config, &analysis, &demo)?;
            cmd_generate(&settings, &out)?
        }
    }
    Ok(())
}

fn resolve(file_config: AppConfig, analysis: &AnalysisArgs, demo: &DemoArgs) -> Result<Settings> {
    let flags = AppConfig {
        analysis: AnalysisSection {
            fs: analysis.fs,
            min_distance_ms: analysis.min_distance_ms,
            threshold_factor: analysis.threshold_factor,
        },
        demo: DemoSection {
            duration_s: demo.duration_s,
            seed: demo.seed,
            noise: demo.no_noise.then_some(false),
        },
    };
    Ok(file_config.merge(flags).settings()?)
}

fn cmd_demo(settings: &Settings, plot: Option<&Path>) -> Result<()> {
    let recording = generate_demo_ecg(&settings.demo);
    report(&recording, settings, plot)
}

fn cmd_analyze(settings: &Settings, input: Option<&Path>, plot: Option<&Path>) -> Result<()> {
    let recording = match input {
        Some(path) => csv_io::read_ecg_csv(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => csv_io::read_ecg_csv_from_reader(io::stdin().lock())
            .context("loading CSV from stdin")?,
    };
    info!("loaded {} samples", recording.len());
    report(&recording, settings, plot)
}

fn cmd_generate(settings: &Settings, out: &Path) -> Result<()> {
    let recording = generate_demo_ecg(&settings.demo);
    csv_io::write_ecg_csv(out, &recording)
        .with_context(|| format!("writing {}", out.display()))?;
    info!("wrote {} samples to {}", recording.len(), out.display());
    Ok(())
}

fn report(recording: &Recording, settings: &Settings, plot: Option<&Path>) -> Result<()> {
    let result: AnalysisResult = analyze(recording, settings.fs, &settings.thresholds);
    if let Some(path) = plot {
        let fig = figure_from_analysis(recording, &result.events, PLOT_MAX_POINTS);
        PngBackend::new(path).draw(&fig)?;
        info!("plot written to {}", path.display());
    }
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

struct PngBackend<'a> {
    path: &'a Path,
    size: (u32, u32),
}

impl<'a> PngBackend<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            size: (1000, 400),
        }
    }
}

impl PlotBackend for PngBackend<'_> {
    fn draw(&mut self, fig: &Figure) -> Result<()> {
        let root = BitMapBackend::new(self.path, self.size).into_drawing_area();
        root.fill(&WHITE)?;
        let (x_min, mut x_max, mut y_min, mut y_max) =
            fig.bounds().unwrap_or((0.0, 1.0, 0.0, 1.0));
        if x_max <= x_min {
            x_max = x_min + 1.0;
        }
        if y_max <= y_min {
            y_min -= 0.5;
            y_max += 0.5;
        }
        let y_pad = (y_max - y_min) * 0.05;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .caption(
                fig.title.clone().unwrap_or_else(|| "Plot".into()),
                ("sans-serif", 24),
            )
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, (y_min - y_pad)..(y_max + y_pad))?;
        chart
            .configure_mesh()
            .x_desc(fig.x.label.clone().unwrap_or_default())
            .y_desc(fig.y.label.clone().unwrap_or_default())
            .draw()?;
        for series in &fig.series {
            match series {
                Series::Line(line) => {
                    let (r, g, b) = line.style.color.rgb();
                    let color = RGBColor(r, g, b);
                    chart
                        .draw_series(LineSeries::new(
                            line.points.iter().map(|p| (p[0], p[1])),
                            color.stroke_width(line.style.width.round().max(1.0) as u32),
                        ))?
                        .label(line.name.clone())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
                Series::Points(points) => {
                    let (r, g, b) = points.color.rgb();
                    let color = RGBColor(r, g, b);
                    let radius = points.radius.round().max(1.0) as i32;
                    chart
                        .draw_series(
                            points
                                .points
                                .iter()
                                .map(|p| Circle::new((p[0], p[1]), radius, color.filled())),
                        )?
                        .label(points.name.clone())
                        .legend(move |(x, y)| Circle::new((x + 10, y), radius, color.filled()));
                }
            }
        }
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    }
}
