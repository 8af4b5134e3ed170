//! qrcad — QR codes as CAD-ready DXF geometry.
//!
//! Usage:
//!   qrcad --text <data> [options]
//!   qrcad --wifi --ssid <ssid> [--password <pw>] [--auth WPA] [--hidden]
//!   qrcad --file <path>

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

use serde::Serialize;

use qrcad_core::{emit, encode, ErrorCorrection, WifiAuth};
use qrcad_io::{save_preview, write_drawing_string, PreviewConfig, RenderSettings};

const USAGE: &str = "\
qrcad - generate QR codes as DXF geometry

Usage:
  qrcad --text <data> [options]
  qrcad --wifi --ssid <ssid> [--password <pw>] [--auth <type>] [--hidden]
  qrcad --file <path> [options]

Payload (exactly one required):
  --text <data>              Literal text/URL to encode
  --wifi                     Encode Wi-Fi credentials (needs --ssid)
  --file <path>              Read the payload from a file

Wi-Fi options:
  --ssid <ssid>              Network name
  --password <pw>            Network password
  --auth <type>              WEP, WPA, WPA2, WPA/WPA2, or nopass (default WPA)
  --hidden                   Mark the network as hidden

Render options:
  -o, --output <path>        DXF output path (default qr_code.dxf)
  --module-size <f>          Side of one module in drawing units (default 1.0)
  --corner-radius <f>        Rounded corner radius (default 0)
  --rounded                  Default rounded style (25% of module size)
  --eye-frame-radius <f>     Radius override for finder-pattern frames
  --eye-ball-radius <f>      Radius override for finder-pattern eyes
  --layer <name>             DXF layer name (default QR)
  --ecc <level>              low, medium, quartile, or high (default medium)
  --border <n>               Quiet-zone width in modules (default 4)
  --settings <path>          Load render settings from JSON; flags override

Output options:
  --preview <path>           Also write a PNG preview
  --logo <path>              Composite a logo onto the preview
  --summary-json             Print a JSON run summary to stdout
  -h, --help                 Show this help";

enum Payload {
    Text(String),
    Wifi {
        ssid: String,
        password: String,
        auth: String,
        hidden: bool,
    },
    File(PathBuf),
}

struct CliArgs {
    payload: Payload,
    output: PathBuf,
    settings: RenderSettings,
    preview: Option<PathBuf>,
    logo: Option<PathBuf>,
    summary_json: bool,
}

#[derive(Serialize)]
struct RunSummary {
    output: String,
    symbol_size: usize,
    dark_modules: usize,
    entities: usize,
    layer: String,
    module_size: f64,
    corner_radius: f64,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!();
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn take_f64(args: &[String], i: &mut usize, flag: &str) -> Result<f64, String> {
    let value = take_value(args, i, flag)?;
    value
        .parse()
        .map_err(|_| format!("{flag} expects a number, got '{value}'"))
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut text: Option<String> = None;
    let mut wifi = false;
    let mut file: Option<PathBuf> = None;
    let mut ssid = String::new();
    let mut password = String::new();
    let mut auth = "WPA".to_string();
    let mut hidden = false;

    let mut output = PathBuf::from("qr_code.dxf");
    let mut settings_path: Option<PathBuf> = None;
    let mut module_size: Option<f64> = None;
    let mut corner_radius: Option<f64> = None;
    let mut rounded = false;
    let mut eye_frame_radius: Option<f64> = None;
    let mut eye_ball_radius: Option<f64> = None;
    let mut layer: Option<String> = None;
    let mut ecc: Option<String> = None;
    let mut border: Option<u32> = None;
    let mut preview: Option<PathBuf> = None;
    let mut logo: Option<PathBuf> = None;
    let mut summary_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            "--text" => text = Some(take_value(args, &mut i, "--text")?.to_string()),
            "--wifi" => wifi = true,
            "--file" => file = Some(PathBuf::from(take_value(args, &mut i, "--file")?)),
            "--ssid" => ssid = take_value(args, &mut i, "--ssid")?.to_string(),
            "--password" => password = take_value(args, &mut i, "--password")?.to_string(),
            "--auth" => auth = take_value(args, &mut i, "--auth")?.to_string(),
            "--hidden" => hidden = true,
            "-o" | "--output" => {
                output = PathBuf::from(take_value(args, &mut i, "--output")?);
            }
            "--module-size" => module_size = Some(take_f64(args, &mut i, "--module-size")?),
            "--corner-radius" => corner_radius = Some(take_f64(args, &mut i, "--corner-radius")?),
            "--rounded" => rounded = true,
            "--eye-frame-radius" => {
                eye_frame_radius = Some(take_f64(args, &mut i, "--eye-frame-radius")?);
            }
            "--eye-ball-radius" => {
                eye_ball_radius = Some(take_f64(args, &mut i, "--eye-ball-radius")?);
            }
            "--layer" => layer = Some(take_value(args, &mut i, "--layer")?.to_string()),
            "--ecc" => ecc = Some(take_value(args, &mut i, "--ecc")?.to_string()),
            "--border" => {
                let value = take_value(args, &mut i, "--border")?;
                border = Some(
                    value
                        .parse()
                        .map_err(|_| format!("--border expects a non-negative integer, got '{value}'"))?,
                );
            }
            "--settings" => {
                settings_path = Some(PathBuf::from(take_value(args, &mut i, "--settings")?));
            }
            "--preview" => preview = Some(PathBuf::from(take_value(args, &mut i, "--preview")?)),
            "--logo" => logo = Some(PathBuf::from(take_value(args, &mut i, "--logo")?)),
            "--summary-json" => summary_json = true,
            other => return Err(format!("unknown argument '{other}'")),
        }
        i += 1;
    }

    let source_count = [text.is_some(), wifi, file.is_some()]
        .iter()
        .filter(|&&set| set)
        .count();
    if source_count > 1 {
        return Err("only one of --text, --wifi, or --file may be given".to_string());
    }

    let payload = if wifi {
        if ssid.is_empty() {
            return Err("--ssid is required with --wifi".to_string());
        }
        Payload::Wifi {
            ssid,
            password,
            auth,
            hidden,
        }
    } else if let Some(text) = text {
        Payload::Text(text)
    } else if let Some(file) = file {
        Payload::File(file)
    } else {
        return Err("exactly one of --text, --wifi, or --file is required".to_string());
    };

    let mut settings = match &settings_path {
        Some(path) => {
            RenderSettings::load(path).map_err(|e| format!("cannot load settings: {e}"))?
        }
        None => RenderSettings::default(),
    };
    if let Some(value) = module_size {
        settings.module_size = value;
    }
    if let Some(value) = corner_radius {
        settings.corner_radius = value;
    }
    settings.rounded |= rounded;
    if let Some(value) = eye_frame_radius {
        settings.eye_frame_radius = Some(value);
    }
    if let Some(value) = eye_ball_radius {
        settings.eye_ball_radius = Some(value);
    }
    if let Some(value) = layer {
        settings.layer = value;
    }
    if let Some(value) = ecc {
        settings.ecc = value;
    }
    if let Some(value) = border {
        settings.border = value;
    }

    Ok(CliArgs {
        payload,
        output,
        settings,
        preview,
        logo,
        summary_json,
    })
}

fn run(args: CliArgs) -> Result<(), Box<dyn Error>> {
    let payload = match &args.payload {
        Payload::Text(text) => text.clone(),
        Payload::Wifi {
            ssid,
            password,
            auth,
            hidden,
        } => {
            let auth: WifiAuth = auth.parse()?;
            encode::wifi_payload(ssid, password, auth, *hidden)
        }
        Payload::File(path) => fs::read_to_string(path)?,
    };

    let ecc: ErrorCorrection = args.settings.ecc.parse()?;
    let matrix = encode::encode_text(&payload, ecc)?;
    let config = args.settings.to_render_config();
    let drawing = emit(&matrix, &config)?;

    // The document is built fully in memory before the file is touched,
    // so a failed run never leaves a partial DXF behind.
    let document = write_drawing_string(&drawing)?;
    fs::write(&args.output, document)?;
    log::info!("saved DXF to {}", args.output.display());

    if let Some(preview_path) = &args.preview {
        let logo_bytes = match &args.logo {
            Some(path) => Some(fs::read(path)?),
            None => None,
        };
        let preview_config = PreviewConfig {
            border: args.settings.border,
            ..PreviewConfig::default()
        };
        save_preview(&matrix, &preview_config, preview_path, logo_bytes.as_deref())?;
    }

    let summary = RunSummary {
        output: args.output.display().to_string(),
        symbol_size: matrix.size(),
        dark_modules: matrix.dark_count(),
        entities: drawing.shape_count(),
        layer: drawing.layer_name.clone(),
        module_size: config.module_size,
        corner_radius: config.clamped_radius(config.corner_radius),
    };
    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        eprintln!(
            "{}x{} symbol, {} dark modules -> {} entities on layer '{}'",
            summary.symbol_size,
            summary.symbol_size,
            summary.dark_modules,
            summary.entities,
            summary.layer
        );
        eprintln!("saved {}", summary.output);
    }

    Ok(())
}
