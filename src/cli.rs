// ============================================================================
// MiniPaint CLI: headless gesture scripts via command-line arguments
// ============================================================================
//
// Usage examples:
//   MiniPaint --script logo.rhai --output logo.png
//   MiniPaint -s "fixtures/*.rhai" --output-dir out/ --format bmp
//   MiniPaint -s annotate.rhai -i photo.jpg -o annotated.jpg --quality 85
//   MiniPaint -s sketch.rhai --width 1024 --height 768 -v
//
// No window is opened in CLI mode. Every script runs on the calling thread
// against its own document and the committed canvas is written out.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::io::{SaveFormat, encode_and_write, load_image};
use crate::ops::scripting::execute_script;
use crate::project::Project;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// MiniPaint headless renderer.
///
/// Replays Rhai gesture scripts against a canvas and saves the result.
#[derive(Parser, Debug)]
#[command(
    name = "MiniPaint",
    about = "MiniPaint headless gesture-script renderer",
    long_about = "Run Rhai gesture scripts (tool/colour changes, pointer down/drag/up)\n\
                  against a fresh canvas or a loaded image and save the result as\n\
                  PNG, JPEG or BMP without opening the window.\n\n\
                  Example:\n  \
                  MiniPaint --script logo.rhai --output logo.png\n  \
                  MiniPaint -s \"fixtures/*.rhai\" --output-dir out/ --format bmp"
)]
pub struct CliArgs {
    /// Script file(s). Glob patterns accepted (e.g. "fixtures/*.rhai").
    #[arg(short, long, required = true, num_args = 1.., value_name = "SCRIPT.rhai")]
    pub script: Vec<String>,

    /// Image to start from instead of a blank canvas.
    #[arg(short, long, value_name = "IMAGE")]
    pub input: Option<PathBuf>,

    /// Blank canvas width (raised to at least 800).
    #[arg(long, default_value_t = 800)]
    pub width: i32,

    /// Blank canvas height (raised to at least 600).
    #[arg(long, default_value_t = 600)]
    pub height: i32,

    /// Output file path. Only valid for a single script.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for several scripts; files are named after each script.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Print script console output and per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when the process was started in CLI mode.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--script" || a == "-s" || a.starts_with("--script="))
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run every script and return an OS exit code.
/// `0` = all scripts succeeded, `1` = one or more failed.
pub fn run(args: CliArgs) -> ExitCode {
    if process(&args) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// True when every script rendered and saved.
fn process(args: &CliArgs) -> bool {
    let scripts = resolve_inputs(&args.script);
    if scripts.is_empty() {
        eprintln!("error: no script files matched the given pattern(s).");
        return false;
    }

    if scripts.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} scripts given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory.",
            scripts.len()
        );
        return false;
    }

    let save_format = match parse_format(args.format.as_deref(), args.output.as_deref()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {}", e);
            return false;
        }
    };

    let start_image = match &args.input {
        Some(path) => match load_image(path) {
            Ok(img) => Some(img),
            Err(e) => {
                eprintln!("error: could not load input image: {}", e);
                return false;
            }
        },
        None => None,
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        return false;
    }

    let total = scripts.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, script_path) in scripts.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, script_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            script_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                script_path.display()
            );
            any_failure = true;
            continue;
        };

        let mut project = Project::new_untitled(idx + 1);
        match &start_image {
            Some(img) => project.load_image(img),
            None => {
                project.create_canvas(args.width, args.height);
            }
        }

        match run_one(script_path, &output_path, project, save_format, args.quality, args.verbose) {
            Ok(()) => {
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", script_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    !any_failure
}

// ============================================================================
// Per-script pipeline
// ============================================================================

fn run_one(
    script: &Path,
    output: &Path,
    project: Project,
    format: SaveFormat,
    quality: u8,
    verbose: bool,
) -> Result<(), String> {
    let source = std::fs::read_to_string(script)
        .map_err(|e| format!("could not read script: {}", e))?;

    let outcome = execute_script(&source, project)
        .map_err(|e| format!("script error:\n{}", e.friendly_message()))?;

    if verbose {
        for line in &outcome.console_output {
            println!("  [script] {}", line);
        }
    }

    let img = outcome
        .project
        .export_pixels()
        .ok_or_else(|| "script left no canvas to save".to_string())?;
    encode_and_write(&img, output, format, quality).map_err(|e| format!("save failed: {}", e))
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);
        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// `--format` wins; otherwise the `--output` extension; otherwise PNG.
fn parse_format(format_arg: Option<&str>, output: Option<&Path>) -> Result<SaveFormat, String> {
    if let Some(f) = format_arg {
        return SaveFormat::from_name(f)
            .ok_or_else(|| format!("unsupported format '{}' (png, jpeg, bmp)", f));
    }
    Ok(output.map(SaveFormat::from_path).unwrap_or_default())
}

/// Compute the output path for one script.
///
/// Priority:
/// 1. `--output`
/// 2. `--output-dir`, named after the script stem
/// 3. next to the script, same stem, image extension
fn build_output_path(
    script: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = script.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let parent = script.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}.{}", stem, ext)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("minipaint_cli_{}_{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn format_flag_beats_extension() {
        assert_eq!(parse_format(Some("BMP"), Some(Path::new("x.jpg"))), Ok(SaveFormat::Bmp));
        assert_eq!(parse_format(None, Some(Path::new("x.jpeg"))), Ok(SaveFormat::Jpeg));
        assert_eq!(parse_format(None, None), Ok(SaveFormat::Png));
        assert!(parse_format(Some("gif"), None).is_err());
    }

    #[test]
    fn output_paths_follow_priority() {
        let script = Path::new("fixtures/logo.rhai");
        assert_eq!(
            build_output_path(script, Some(Path::new("o.png")), Some(Path::new("d")), SaveFormat::Png),
            Some(PathBuf::from("o.png"))
        );
        assert_eq!(
            build_output_path(script, None, Some(Path::new("d")), SaveFormat::Bmp),
            Some(PathBuf::from("d/logo.bmp"))
        );
        assert_eq!(
            build_output_path(script, None, None, SaveFormat::Jpeg),
            Some(PathBuf::from("fixtures/logo.jpg"))
        );
    }

    #[test]
    fn cli_mode_flags_parse() {
        let args = CliArgs::try_parse_from([
            "MiniPaint", "-s", "a.rhai", "b.rhai", "--width", "1024", "-q", "70", "-v",
        ])
        .unwrap();
        assert_eq!(args.script, vec!["a.rhai".to_string(), "b.rhai".to_string()]);
        assert_eq!(args.width, 1024);
        assert_eq!(args.height, 600);
        assert_eq!(args.quality, 70);
        assert!(args.verbose);
        assert!(CliArgs::try_parse_from(["MiniPaint"]).is_err());
    }

    #[test]
    fn scripts_render_to_the_output_dir() {
        let dir = temp_dir("render");
        let script = dir.join("square.rhai");
        std::fs::write(
            &script,
            "tool(\"rect\"); fill(true); color(0, 0, 255); stroke(10, 10, 60, 60);",
        )
        .unwrap();
        let out_dir = dir.join("out");

        let args = CliArgs::try_parse_from([
            "MiniPaint".to_string(),
            "-s".to_string(),
            script.to_string_lossy().into_owned(),
            "--output-dir".to_string(),
            out_dir.to_string_lossy().into_owned(),
        ])
        .unwrap();
        assert!(process(&args));

        let img = load_image(&out_dir.join("square.png")).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        assert_eq!(img.dimensions(), (800, 600));
        assert_eq!(*img.get_pixel(35, 35), Rgba([0, 0, 255, 255]));
        assert_eq!(*img.get_pixel(100, 100), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn failing_script_reports_failure() {
        let dir = temp_dir("fail");
        let script = dir.join("broken.rhai");
        std::fs::write(&script, "tool(\"spray\");").unwrap();
        let args = CliArgs::try_parse_from([
            "MiniPaint".to_string(),
            "-s".to_string(),
            script.to_string_lossy().into_owned(),
            "-o".to_string(),
            dir.join("x.png").to_string_lossy().into_owned(),
        ])
        .unwrap();
        let ok = process(&args);
        let _ = std::fs::remove_dir_all(&dir);
        assert!(!ok);
    }
}
