use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use laserpath::encode::{
    draw_jumps, encode_commands, parse_coe, parse_csv, parse_traj, render_colored, write_coe,
    write_traj,
};
use laserpath::link::{CommandSink, LinkFrame, LinkSink, MacAddr, Pacer, UdpSink, send_frame};
use laserpath::{
    Command as GalvoCommand, Config, Destination, FrameOutput, FrameSummary, Image, OutputFormat,
    Point, Rgb, next_numbered_path, numbered_files, process_frame, write_text_output,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "laserpath")]
#[command(about = "Plan galvo laser trajectories from edge masks and stream them")]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process mask/color frame pairs into outputs and/or a live stream.
    #[command(name = "trace")]
    Trace(TraceArgs),
    /// Convert a saved frame between csv, coe and traj.
    #[command(name = "convert")]
    Convert(ConvertArgs),
    /// Stream a directory of numbered .traj frames to the controller.
    #[command(name = "play")]
    Play(PlayArgs),
}

#[derive(Args, Debug, Clone)]
struct SinkArgs {
    #[arg(long, conflicts_with = "link_iface")]
    udp: Option<String>,
    /// Network interface for raw Ethernet frames. Needs raw-socket
    /// privileges (CAP_NET_RAW).
    #[arg(long)]
    link_iface: Option<String>,
    #[arg(long, requires = "link_iface")]
    link_dst: Option<MacAddr>,
    #[arg(long, requires = "link_iface")]
    link_src: Option<MacAddr>,
    /// Packets per second.
    #[arg(long)]
    rate_limit: Option<u32>,
}

impl SinkArgs {
    fn destination(&self) -> Option<Destination> {
        if let Some(addr) = &self.udp {
            return Some(Destination::Udp { addr: addr.clone() });
        }
        let interface = self.link_iface.clone()?;
        let mut frame = LinkFrame::default();
        if let Some(dst) = self.link_dst {
            frame.dst = dst;
        }
        if let Some(src) = self.link_src {
            frame.src = src;
        }
        Some(Destination::Link { interface, frame })
    }
}

#[derive(Args, Debug, Clone)]
struct TraceArgs {
    /// Edge mask images, one per frame, processed in order.
    #[arg(long = "mask", required = true)]
    masks: Vec<PathBuf>,
    /// Color images: one per mask, or a single image reused for all.
    /// Without any, every lit point is white.
    #[arg(long = "color")]
    colors: Vec<PathBuf>,
    /// JSON run configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, value_delimiter = ',')]
    format: Vec<OutputFormat>,
    #[command(flatten)]
    sink: SinkArgs,
    /// Pen start position as X,Y.
    #[arg(long, value_parser = parse_point)]
    start: Option<Point>,
    #[arg(long)]
    threshold: Option<u8>,
    /// Draw jumps in red on png previews.
    #[arg(long, default_value_t = false)]
    show_jumps: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CommandFormat {
    Coe,
    Traj,
}

#[derive(Args, Debug, Clone)]
struct ConvertArgs {
    /// A csv, coe or traj file, chosen by extension.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, value_enum)]
    to: CommandFormat,
    /// Defaults to the input path with the new extension.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct PlayArgs {
    /// Directory of `{n}.traj` files, played in numeric order.
    #[arg(long)]
    dir: PathBuf,
    #[command(flatten)]
    sink: SinkArgs,
    /// Start over after the last frame until interrupted.
    #[arg(long = "loop", default_value_t = false)]
    repeat: bool,
}

#[derive(Debug, Clone, Serialize)]
struct RunSummary {
    frames: Vec<FrameSummary>,
    packets_sent: usize,
    failed_frames: Vec<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.cmd {
        Command::Trace(args) => run_trace(args),
        Command::Convert(args) => run_convert(args),
        Command::Play(args) => run_play(args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("parsing log level {level:?}"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn run_trace(args: TraceArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;
    if !args.colors.is_empty() && args.colors.len() != 1 && args.colors.len() != args.masks.len() {
        bail!(
            "got {} color images for {} masks; pass one per mask or a single one",
            args.colors.len(),
            args.masks.len()
        );
    }

    let out_dir = cfg.output.directory.clone();
    let mut sink = cfg.output.destination.as_ref().map(open_sink).transpose()?;
    let mut pacer = Pacer::new(cfg.output.rate_limit);
    let mut summary = RunSummary {
        frames: Vec::with_capacity(args.masks.len()),
        packets_sent: 0,
        failed_frames: Vec::new(),
    };

    for (index, mask_path) in args.masks.iter().enumerate() {
        let mask = load_mask(mask_path)?;
        let color = match args.colors.get(index).or(args.colors.first()) {
            Some(path) => load_color(path)?,
            None => Image::new_fill(mask.width(), mask.height(), Rgb::WHITE),
        };
        let frame = process_frame(&mask.as_view(), &color.as_view(), &cfg.frame)
            .with_context(|| format!("processing frame {index} ({})", mask_path.display()))?;

        write_outputs(
            &out_dir,
            &cfg.output.formats,
            &frame,
            mask.dimensions(),
            args.show_jumps,
        )?;

        if let Some(sink) = sink.as_mut() {
            match send_frame(sink, &frame.commands, &mut pacer) {
                Ok(n) => summary.packets_sent += n,
                Err(e) => {
                    warn!(frame = index, error = %e, "frame not delivered");
                    summary.failed_frames.push(index);
                }
            }
        }
        summary.frames.push(frame.summary(index));
    }

    if !cfg.output.formats.is_empty() {
        write_json(out_dir.join("summary.json"), &summary)?;
    }
    info!(
        frames = summary.frames.len(),
        packets = summary.packets_sent,
        failed = summary.failed_frames.len(),
        "run finished"
    );
    Ok(())
}

fn resolve_config(args: &TraceArgs) -> Result<Config> {
    let mut cfg: Config = match &args.config {
        Some(path) => read_json(path)?,
        None => Config::default(),
    };

    if let Some(start) = args.start {
        cfg.frame.plan.start = start;
    }
    if let Some(t) = args.threshold {
        cfg.frame.mask_threshold = t;
    }
    if let Some(dir) = &args.out {
        cfg.output.directory = dir.clone();
    }
    if !args.format.is_empty() {
        cfg.output.formats = args.format.clone();
    }
    if args.sink.rate_limit.is_some() {
        cfg.output.rate_limit = args.sink.rate_limit;
    }
    if let Some(dest) = args.sink.destination() {
        cfg.output.destination = Some(dest);
    }

    cfg.output.formats.sort();
    cfg.output.formats.dedup();
    Ok(cfg)
}

fn open_sink(dest: &Destination) -> Result<Box<dyn CommandSink>> {
    let sink: Box<dyn CommandSink> = match dest {
        Destination::Udp { addr } => Box::new(
            UdpSink::connect(addr.as_str())
                .with_context(|| format!("opening udp destination {addr}"))?,
        ),
        Destination::Link { interface, frame } => Box::new(
            LinkSink::open_interface(interface, *frame)
                .with_context(|| format!("opening link interface {interface}"))?,
        ),
    };
    Ok(sink)
}

fn write_outputs(
    dir: &Path,
    formats: &[OutputFormat],
    frame: &FrameOutput,
    canvas: (usize, usize),
    show_jumps: bool,
) -> Result<()> {
    for &format in formats {
        match format {
            OutputFormat::Png => {
                let path = next_numbered_path(dir, format.extension())
                    .with_context(|| format!("numbering png in {}", dir.display()))?;
                save_preview(&path, frame, canvas, show_jumps)?;
            }
            _ => {
                write_text_output(dir, format, frame)
                    .with_context(|| format!("writing {format} output in {}", dir.display()))?;
            }
        }
    }
    Ok(())
}

fn save_preview(
    path: &Path,
    frame: &FrameOutput,
    (w, h): (usize, usize),
    show_jumps: bool,
) -> Result<()> {
    let mut img = render_colored(w as u32, h as u32, &frame.colored);
    if show_jumps {
        draw_jumps(&mut img, frame.trajectory.points(), Rgb::new(255, 0, 0));
    }
    img.save(path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let ext = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let commands: Vec<GalvoCommand> = match ext.as_deref() {
        Some("csv") => encode_commands(
            &parse_csv(&text).with_context(|| format!("parsing {}", args.input.display()))?,
        ),
        Some("coe") => {
            parse_coe(&text).with_context(|| format!("parsing {}", args.input.display()))?
        }
        Some("traj") => {
            parse_traj(&text).with_context(|| format!("parsing {}", args.input.display()))?
        }
        _ => bail!(
            "cannot tell the format of {}; expected .csv, .coe or .traj",
            args.input.display()
        ),
    };

    let out_ext = match args.to {
        CommandFormat::Coe => "coe",
        CommandFormat::Traj => "traj",
    };
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension(out_ext));
    if output == args.input {
        bail!("refusing to overwrite input {}", args.input.display());
    }

    let file = fs::File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    let w = std::io::BufWriter::new(file);
    let written = match args.to {
        CommandFormat::Coe => write_coe(w, &commands),
        CommandFormat::Traj => write_traj(w, &commands),
    };
    written.with_context(|| format!("writing {}", output.display()))?;

    info!(
        input = %args.input.display(),
        output = %output.display(),
        commands = commands.len(),
        "converted"
    );
    Ok(())
}

fn run_play(args: PlayArgs) -> Result<()> {
    let Some(dest) = args.sink.destination() else {
        bail!("play needs a destination: pass --udp or --link-iface");
    };
    let paths = numbered_files(&args.dir, "traj")
        .with_context(|| format!("listing frames in {}", args.dir.display()))?;
    if paths.is_empty() {
        bail!("no numbered .traj files in {}", args.dir.display());
    }
    let frames = paths
        .iter()
        .map(|p| load_traj(p))
        .collect::<Result<Vec<_>>>()?;
    info!(dir = %args.dir.display(), frames = frames.len(), "playlist loaded");

    let mut sink = open_sink(&dest)?;
    let mut pacer = Pacer::new(args.sink.rate_limit);
    let mut pass = 0usize;
    loop {
        let mut packets = 0usize;
        let mut failed = 0usize;
        for (index, commands) in frames.iter().enumerate() {
            match send_frame(&mut sink, commands, &mut pacer) {
                Ok(n) => packets += n,
                Err(e) => {
                    warn!(frame = index, error = %e, "frame not delivered");
                    failed += 1;
                }
            }
        }
        info!(pass, packets, failed, "playlist pass finished");
        if !args.repeat {
            return Ok(());
        }
        pass += 1;
    }
}

fn load_traj(path: &Path) -> Result<Vec<GalvoCommand>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_traj(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_mask(path: &Path) -> Result<Image<u8>> {
    ensure_file_exists(path, "mask")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening mask image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    Image::from_vec(w as usize, h as usize, luma.into_raw())
        .with_context(|| format!("constructing mask from {}", path.display()))
}

fn load_color(path: &Path) -> Result<Image<Rgb>> {
    ensure_file_exists(path, "color")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening color image {}", path.display()))?;
    let rgb = dyn_img.to_rgb8();
    let (w, h) = rgb.dimensions();
    Image::from_packed_rgb(w as usize, h as usize, rgb.as_raw())
        .with_context(|| format!("constructing color image from {}", path.display()))
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
    };
    Ok(Point::new(coord(x)?, coord(y)?))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
