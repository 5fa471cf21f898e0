//! HGLY CLI - inspect, convert and dry-run voxel animations.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use hologlyph::{
    animation::Animation,
    format::{CompressionType, HeaderOptions, compress_file, decompress_file, parse_header},
    render::{FrameGeometry, RenderError, Renderer},
    schema::SessionConfig,
    session::Session,
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "--example" => print_example_config(),
        "info" if args.len() >= 3 => info(&PathBuf::from(&args[2])),
        "compress" if args.len() >= 4 => compress(&PathBuf::from(&args[2]), &PathBuf::from(&args[3])),
        "decompress" if args.len() >= 4 => {
            decompress(&PathBuf::from(&args[2]), &PathBuf::from(&args[3]))
        }
        "new" if args.len() >= 4 => create(&PathBuf::from(&args[2]), &PathBuf::from(&args[3])),
        "play" if args.len() >= 3 => {
            let duration_ms: f64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(1000.0);
            play(&PathBuf::from(&args[2]), duration_ms)
        }
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [args]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file.hgly>                 Print header fields");
    eprintln!("  compress <in> <out>              RLE-compress the payload");
    eprintln!("  decompress <in> <out>            Expand an RLE payload");
    eprintln!("  new <options.json> <out>         Create a blank animation");
    eprintln!("  play <file.hgly> [ms]            Run playback headless for ms (default 1000)");
    eprintln!("  --example                        Print example configuration");
}

fn read(path: &PathBuf) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn write(path: &PathBuf, bytes: &[u8]) {
    fs::write(path, bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {}", path.display(), e);
        std::process::exit(1);
    });
}

fn info(path: &PathBuf) {
    let bytes = read(path);
    let header = parse_header(&bytes).unwrap_or_else(|e| {
        eprintln!("Error parsing header: {}", e);
        std::process::exit(1);
    });

    println!("HGLY Animation");
    println!("==============");
    println!(
        "Version: {}{}",
        header.version,
        if header.is_newer_than_supported() {
            " (newer than supported)"
        } else {
            ""
        }
    );
    println!(
        "Grid: {}x{}x{} ({} bytes/voxel)",
        header.width, header.height, header.depth, header.bytes_per_voxel
    );
    println!("Color model: {:?}", header.color_model);
    println!("Frames: {}", header.frame_count);
    println!("Frame duration: {} ms", header.frame_duration_ms);
    println!(
        "Loop: {} (from frame {})",
        header.looping(),
        header.loop_start_frame
    );
    println!("Compression: {:?}", header.compression);
    println!(
        "Payload: {} bytes on disk, {} bytes decompressed",
        bytes.len() - hologlyph::format::HEADER_SIZE,
        header.frame_size_bytes() as u64 * u64::from(header.frame_count)
    );
}

fn compress(input: &PathBuf, output: &PathBuf) {
    let bytes = read(input);
    let outcome = compress_file(&bytes).unwrap_or_else(|e| {
        eprintln!("Error compressing: {}", e);
        std::process::exit(1);
    });
    if outcome.was_already_compressed() {
        eprintln!("Warning: {} is already compressed", input.display());
    }
    let packed = outcome.into_bytes();
    log::info!("{} -> {} bytes", bytes.len(), packed.len());
    write(output, &packed);
}

fn decompress(input: &PathBuf, output: &PathBuf) {
    let bytes = read(input);
    let raw = decompress_file(&bytes).unwrap_or_else(|e| {
        eprintln!("Error decompressing: {}", e);
        std::process::exit(1);
    });
    log::info!("{} -> {} bytes", bytes.len(), raw.len());
    write(output, &raw);
}

fn create(options_path: &PathBuf, output: &PathBuf) {
    let options_str = fs::read_to_string(options_path).unwrap_or_else(|e| {
        eprintln!("Error reading options file: {}", e);
        std::process::exit(1);
    });
    let options: HeaderOptions = serde_json::from_str(&options_str).unwrap_or_else(|e| {
        eprintln!("Error parsing options: {}", e);
        std::process::exit(1);
    });

    let compression = options.compression;
    let animation = Animation::new(&options).unwrap_or_else(|e| {
        eprintln!("Error creating animation: {}", e);
        std::process::exit(1);
    });
    animation.save(output, compression).unwrap_or_else(|e| {
        eprintln!("Error writing animation: {}", e);
        std::process::exit(1);
    });
    log::info!("Created {}", output.display());
}

/// Counts what a real backend would draw.
#[derive(Default)]
struct StatsRenderer {
    draws: usize,
    cubes: usize,
}

impl Renderer for StatsRenderer {
    fn name(&self) -> &str {
        "stats"
    }

    fn draw(&mut self, frame: &FrameGeometry<'_>) -> Result<(), RenderError> {
        self.draws += 1;
        self.cubes += frame.instances.len();
        println!(
            "  frame {:>4}: {} cubes",
            frame.frame_index,
            frame.instances.len()
        );
        Ok(())
    }
}

fn play(path: &PathBuf, duration_ms: f64) {
    let animation = Animation::from_bytes(&read(path)).unwrap_or_else(|e| {
        eprintln!("Error loading animation: {}", e);
        std::process::exit(1);
    });
    let frame_ms = f64::from(animation.header().frame_duration_ms.max(1));

    println!("Playing {} for {} ms", path.display(), duration_ms);
    let start = Instant::now();

    let mut session = Session::new(
        animation,
        Box::new(StatsRenderer::default()),
        &SessionConfig::default(),
    )
    .unwrap_or_else(|e| {
        eprintln!("Error starting session: {}", e);
        std::process::exit(1);
    });

    session.play();
    let mut elapsed = 0.0;
    while elapsed < duration_ms && session.engine().is_playing() {
        let step = frame_ms.min(duration_ms - elapsed);
        if let Err(e) = session.tick(step) {
            eprintln!("Error during playback: {}", e);
            std::process::exit(1);
        }
        elapsed += step;
    }

    println!();
    println!(
        "Final frame: {} ({:?}), simulated {} ms in {:.2} ms",
        session.current_frame(),
        session.status(),
        elapsed,
        start.elapsed().as_secs_f64() * 1000.0
    );
}

fn print_example_config() {
    let options = HeaderOptions {
        compression: CompressionType::Rle,
        ..Default::default()
    };
    let config = SessionConfig::default();

    println!("Example animation options (options.json):");
    println!("{}", serde_json::to_string_pretty(&options).unwrap());
    println!();
    println!("Example session configuration:");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
