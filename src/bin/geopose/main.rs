//! geopose CLI - inspect and run GeoPose sandboxes headlessly.

use anyhow::{bail, Context, Result};
use geopose::app::{GeoPoseSandbox, SandboxData, SandboxSettings};
use geopose::core::{names, to_csv, to_json, ItemId, Model, TypeId, TypeRegistry};
use geopose::geo::{geodetic_to_cartesian, WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Verbosity from the global flags
#[derive(Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Install the fmt subscriber plus a chrome trace layer when `GEOPOSE_TRACE=1`.
#[cfg(feature = "trace")]
fn init_tracing(verbosity: Verbosity) -> Option<tracing_chrome::FlushGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);

    if env::var("GEOPOSE_TRACE").ok().as_deref() != Some("1") {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        return None;
    }
    let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().file("trace.json").build();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(chrome_layer)
        .init();
    Some(guard)
}

/// Install the fmt subscriber; `RUST_LOG` wins over the flags.
#[cfg(not(feature = "trace"))]
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);
    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity = Verbosity::Info;
    let mut settings_path: Option<PathBuf> = None;
    let mut filtered_args: Vec<&str> = Vec::new();
    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Verbosity::Debug,
            "-vv" | "--trace" => verbosity = Verbosity::Trace,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            "-s" | "--settings" => settings_path = iter.next().map(PathBuf::from),
            _ => filtered_args.push(arg),
        }
    }
    #[allow(clippy::let_unit_value)]
    let _guard = init_tracing(verbosity);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => cmd_info(settings_path.as_deref()),
        "tree" | "t" => cmd_tree(settings_path.as_deref(), filtered_args.get(1).copied()),
        "convert" | "c" => cmd_convert(&filtered_args[1..]),
        "run" | "r" => cmd_run(settings_path.as_deref(), &filtered_args[1..]),
        "dump" | "d" => cmd_dump(settings_path.as_deref(), &filtered_args[1..]),
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_help() {
    println!(
        "geopose - GeoPose sandbox toolkit (built {} {})",
        env!("GEOPOSE_BUILD_DATE"),
        env!("GEOPOSE_BUILD_TIME")
    );
    println!();
    println!("USAGE:");
    println!("    geopose [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info                              Show item types and the default sandbox");
    println!("    t, tree    [data.json]               Print the item tree");
    println!("    c, convert <lat> <lon> <alt> [--sphere R]");
    println!("                                         Geodetic to Cartesian on WGS84 or a sphere");
    println!("    r, run     [data.json] [--frames N]  Run frames headlessly and report stats");
    println!("    d, dump    [data.json] [--csv]       Serialize the first user's presence pose");
    println!("    h, help                              Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose          Show debug output");
    println!("    -vv, --trace           Show trace output (very verbose)");
    println!("    -q, --quiet            Errors only");
    println!("    -s, --settings <file>  Settings file (default: platform config dir)");
    println!();
    println!("EXAMPLES:");
    println!("    geopose convert 48.85 2.35 35        # Paris on WGS84");
    println!("    geopose run world.json --frames 120  # Two seconds at 60 fps");
    println!("    geopose dump --csv                   # Default user's pose as CSV");
    println!();
    println!("NOTES:");
    println!("    - RUST_LOG overrides the verbosity flags");
    println!("    - With --features trace, GEOPOSE_TRACE=1 writes trace.json");
}

fn load_settings(path: Option<&Path>) -> Result<SandboxSettings> {
    match path {
        Some(p) => SandboxSettings::load_from(p).with_context(|| format!("reading settings {}", p.display())),
        None => Ok(SandboxSettings::load()),
    }
}

fn build_sandbox(settings: Option<&Path>, data: Option<&str>) -> Result<GeoPoseSandbox> {
    let settings = load_settings(settings)?;
    let data = match data {
        Some(path) => SandboxData::load(Path::new(path)).with_context(|| format!("reading sandbox data {}", path))?,
        None => SandboxData::default(),
    };
    debug!(spaces = data.spaces.len(), users = data.users.len(), "sandbox data");
    Ok(GeoPoseSandbox::new(settings, data)?)
}

/// Split positional arguments from `--flag [value]` options.
fn split_args<'a>(args: &[&'a str], valued: &[&str]) -> Result<(Vec<&'a str>, Vec<(&'a str, Option<&'a str>)>)> {
    let mut positional = Vec::new();
    let mut options = Vec::new();
    let mut iter = args.iter().copied();
    while let Some(arg) = iter.next() {
        if arg.starts_with("--") {
            if valued.contains(&arg) {
                match iter.next() {
                    Some(value) => options.push((arg, Some(value))),
                    None => bail!("missing value for {}", arg),
                }
            } else {
                options.push((arg, None));
            }
        } else {
            positional.push(arg);
        }
    }
    Ok((positional, options))
}

fn print_types(types: &TypeRegistry, id: TypeId, depth: usize) {
    println!("  {}{}", "  ".repeat(depth), types.name(id));
    for child in types.info(id).children() {
        print_types(types, *child, depth + 1);
    }
}

fn cmd_info(settings: Option<&Path>) -> Result<()> {
    let sandbox = build_sandbox(settings, None)?;
    let world = sandbox.world();
    let types = world.model.types();

    println!("Types ({}):", types.len());
    for (id, ty) in types.iter() {
        if ty.parent().is_none() {
            print_types(types, id, 0);
        }
    }
    println!();

    println!("Default sandbox:");
    for space in sandbox.spaces() {
        let (equatorial, polar) = space.frame.radii(&world.model)?;
        println!(
            "  Space {:<16} frame {} ({:.0} m / {:.0} m)",
            space.name(world)?,
            world.model.name(space.frame.id())?,
            equatorial,
            polar
        );
    }
    for user in sandbox.users() {
        let ypr = user.presence.to_basic_ypr(world)?;
        println!(
            "  User  {:<16} at lat {:.4} lon {:.4} h {:.0} m",
            user.name(world)?,
            ypr.position.lat,
            ypr.position.lon,
            ypr.position.h
        );
    }
    println!("  Items: {}", world.model.len());
    println!("  Scene nodes: {}", world.scene.len());
    Ok(())
}

fn print_item(model: &Model, id: ItemId, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    let name = model.name(id)?;
    let type_name = model.type_name(id)?;
    if model.is(id, names::SIMPLE) {
        let state = model.simple(id)?;
        let value = state.get().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        match state.unit() {
            Some(unit) => println!("{}{} [{}] = {} {}", indent, name, type_name, value, unit.id),
            None => println!("{}{} [{}] = {}", indent, name, type_name, value),
        }
    } else {
        println!("{}{} [{}]", indent, name, type_name);
    }
    for child in model.children(id)?.iter() {
        print_item(model, *child, depth + 1)?;
    }
    Ok(())
}

fn cmd_tree(settings: Option<&Path>, data: Option<&str>) -> Result<()> {
    let sandbox = build_sandbox(settings, data)?;
    let model = &sandbox.world().model;
    for root in model.roots() {
        print_item(model, root, 0)?;
    }
    Ok(())
}

fn cmd_convert(args: &[&str]) -> Result<()> {
    let (positional, options) = split_args(args, &["--sphere"])?;
    if positional.len() != 3 {
        bail!("usage: geopose convert <lat> <lon> <alt> [--sphere R]");
    }
    let parse = |s: &str, what: &str| -> Result<f64> { s.parse().with_context(|| format!("invalid {}: {}", what, s)) };
    let lat = parse(positional[0], "latitude")?;
    let lon = parse(positional[1], "longitude")?;
    let alt = parse(positional[2], "altitude")?;

    let (equatorial, polar) = match options.iter().find(|(k, _)| *k == "--sphere") {
        Some((_, Some(r))) => {
            let r = parse(*r, "radius")?;
            (r, r)
        }
        _ => (WGS84_EQUATORIAL_RADIUS, WGS84_POLAR_RADIUS),
    };
    info!(lat, lon, alt, equatorial, polar, "converting");

    let state = geodetic_to_cartesian(lon.to_radians(), lat.to_radians(), alt, equatorial, polar);
    let r = state.additional_rotation;
    println!("Position:            ({:.3}, {:.3}, {:.3})", state.relative.x, state.relative.y, state.relative.z);
    println!("Vertical:            ({:.6}, {:.6}, {:.6})", state.vertical.x, state.vertical.y, state.vertical.z);
    println!(
        "Additional rotation: ({:.4}, {:.4}, {:.4}) deg",
        r.x.to_degrees(),
        r.y.to_degrees(),
        r.z.to_degrees()
    );
    Ok(())
}

fn cmd_run(settings: Option<&Path>, args: &[&str]) -> Result<()> {
    let (positional, options) = split_args(args, &["--frames"])?;
    let frames = match options.iter().find(|(k, _)| *k == "--frames") {
        Some((_, Some(n))) => n.parse::<usize>().with_context(|| format!("invalid frame count: {}", n))?,
        _ => 60,
    };

    let mut sandbox = build_sandbox(settings, positional.first().copied())?;
    let step = sandbox.settings().frame_step();
    let started = std::time::Instant::now();
    let stats = sandbox.run_frames(frames, step)?;
    let elapsed = started.elapsed();

    println!("Frames:      {}", stats.frame);
    println!("Sandbox time: {:.3} s (step {:.4} s)", sandbox.time(), step);
    println!("Sandbox fps: {:.0}", sandbox.view().fps().fps());
    println!(
        "Wall time:   {:.2} ms ({:.3} ms/frame)",
        elapsed.as_secs_f64() * 1000.0,
        elapsed.as_secs_f64() * 1000.0 / frames.max(1) as f64
    );
    println!("Last frame:  {} meshes, {} line sets, {} vertices", stats.meshes, stats.lines, stats.vertices);
    Ok(())
}

fn cmd_dump(settings: Option<&Path>, args: &[&str]) -> Result<()> {
    let (positional, options) = split_args(args, &[])?;
    let csv = options.iter().any(|(k, _)| *k == "--csv");

    let mut sandbox = build_sandbox(settings, positional.first().copied())?;
    sandbox.update(0.0)?;
    let Some(user) = sandbox.users().first().copied() else {
        bail!("sandbox has no users");
    };
    let world = sandbox.world();
    let pose = user.presence.pose.id();

    if csv {
        print!("{}", to_csv(&world.model, pose)?);
    } else {
        println!("{}", to_json(&world.model, pose, true)?);
        println!("{}", user.presence.to_basic_ypr(world)?.to_json()?);
    }
    Ok(())
}
