use clap::{ArgAction, Parser, Subcommand};
use dp_tools::calculators::{bmi, discount, loan, parse_number, percentage, tip, units};
use dp_tools::conversion::{self, Flow, HttpConversionService};
use dp_tools::imaging::{EncodingParams, Quality, ResizeMode, Reencoder, RustBackend, TargetFormat};
use dp_tools::password::{self, PasswordOptions};
use dp_tools::spin_wheel::Wheel;
use dp_tools::text::{self, CaseStyle};
use dp_tools::{batch, config, output};
use std::io::Read;
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "dp-tools")]
#[command(about = "Everyday tools: image re-encoding, calculators, converters, generators")]
#[command(long_about = "\
Everyday tools: image re-encoding, calculators, converters, generators

Image tools share one pipeline: accept → decode → draw → re-encode.
Unsupported files are rejected before anything is decoded.

  dp-tools reencode photo.png --format webp
  dp-tools reencode *.jpg --quality 0.6 --max-width 1600 --out small/
  dp-tools convert heic-to-pdf IMG_0001.heic
  dp-tools loan 250000 5.5 30 --schedule
  dp-tools units 5 km mi

Calculators print nothing for malformed numbers.

Run 'dp-tools gen-config' to generate a documented dp-tools.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing dp-tools.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress, convert or resize images
    Reencode {
        /// Image files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output format: jpeg, png, webp, avif, bmp
        #[arg(long)]
        format: Option<TargetFormat>,
        /// Lossy quality, 0.0 - 1.0
        #[arg(long)]
        quality: Option<f32>,
        /// Fit inside this width, preserving aspect ratio
        #[arg(long, conflicts_with_all = ["width", "height"])]
        max_width: Option<u32>,
        /// Fit inside this height, preserving aspect ratio
        #[arg(long, conflicts_with_all = ["width", "height"])]
        max_height: Option<u32>,
        /// Exact output width (requires --height)
        #[arg(long, requires = "height")]
        width: Option<u32>,
        /// Exact output height (requires --width)
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// Output directory
        #[arg(long, default_value = "reencoded")]
        out: PathBuf,
    },
    /// Convert an exotic format through the remote conversion service
    Convert {
        /// Flow name, e.g. dwg-to-jpg (see --list)
        #[arg(required_unless_present = "list")]
        flow: Option<Flow>,
        /// Source file
        #[arg(required_unless_present = "list")]
        file: Option<PathBuf>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// List available flows
        #[arg(long)]
        list: bool,
    },
    /// Body mass index
    Bmi {
        /// Height in cm (inches with --imperial)
        height: String,
        /// Weight in kg (pounds with --imperial)
        weight: String,
        #[arg(long)]
        imperial: bool,
    },
    /// Monthly loan payment and totals
    Loan {
        principal: String,
        /// Annual interest rate in percent
        rate: String,
        /// Term in years
        years: String,
        /// Print the full amortization schedule
        #[arg(long)]
        schedule: bool,
    },
    /// Percentage formulas
    Percent {
        #[command(subcommand)]
        query: PercentQuery,
    },
    /// Discounted price and amount saved
    Discount {
        price: String,
        /// Discount in percent
        percent: String,
    },
    /// Tip and bill split
    Tip {
        bill: String,
        /// Tip in percent
        percent: String,
        #[arg(long, default_value_t = 1)]
        people: u32,
    },
    /// Convert between units of length, mass, temperature, volume and data size
    Units {
        #[arg(required_unless_present = "list")]
        value: Option<String>,
        #[arg(required_unless_present = "list")]
        from: Option<String>,
        #[arg(required_unless_present = "list")]
        to: Option<String>,
        /// List known units
        #[arg(long)]
        list: bool,
    },
    /// Case conversion and counts (reads stdin when no text is given)
    Text {
        #[command(subcommand)]
        action: TextAction,
    },
    /// Generate random passwords
    Password {
        #[arg(long, default_value_t = 16)]
        length: usize,
        #[arg(long, default_value_t = 1)]
        count: usize,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_symbols: bool,
        /// Leave out look-alike characters such as l, 1, O and 0
        #[arg(long)]
        exclude_ambiguous: bool,
    },
    /// Pick one of the given labels at random
    Spin {
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Print a stock dp-tools.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum PercentQuery {
    /// X% of Y
    Of { percent: String, value: String },
    /// X is what percent of Y
    What { part: String, whole: String },
    /// Percent change from X to Y
    Change { from: String, to: String },
}

#[derive(Subcommand)]
enum TextAction {
    /// upper, lower, title or sentence
    Case { style: CaseStyle, text: Option<String> },
    /// Word, character, line and sentence counts
    Stats { text: Option<String> },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Reencode {
            paths,
            format,
            quality,
            max_width,
            max_height,
            width,
            height,
            out,
        } => {
            let tools_config = config::load_config(&cli.config)?;
            init_thread_pool(&tools_config.processing);

            let defaults = &tools_config.reencode;
            let mut params = EncodingParams::new(
                format.unwrap_or(defaults.format),
                Quality::new(quality.unwrap_or(defaults.quality)),
            );
            if let Some(resize) = resize_mode(max_width, max_height, width, height) {
                params = params.with_resize(resize);
            }

            let backend = RustBackend::new();
            let reencoder = Reencoder::new(&backend)
                .policy(tools_config.upload.policy())
                .params(params);
            let report = batch::reencode_files(&reencoder, &paths);

            for item in &report.items {
                match &item.outcome {
                    Ok(reencoded) => output::print_reencoded(reencoded),
                    Err(err) => output::print_lines(&output::format_reencode_failure(
                        &display_name(&item.path),
                        err,
                    )),
                }
            }
            let written = batch::write_outputs(&report, &out)?;
            let failed = report.failed().count();
            println!(
                "{}",
                output::format_reencode_summary(written.len(), failed, &report.total_delta())
            );
            if !written.is_empty() {
                println!("==> Wrote {} file(s) to {}", written.len(), out.display());
            }
            if failed > 0 {
                return Err(format!("{failed} file(s) could not be re-encoded").into());
            }
        }
        Command::Convert {
            flow,
            file,
            out,
            list,
        } => {
            if list {
                output::print_lines(&output::format_flow_list());
                return Ok(());
            }
            let (Some(flow), Some(file)) = (flow, file) else {
                return Err("convert needs a flow and a file".into());
            };
            let tools_config = config::load_config(&cli.config)?;
            let service = HttpConversionService::new(&tools_config.service)?;
            let source_name = display_name(&file);
            let bytes = std::fs::read(&file)?;
            let converted = conversion::run_flow(&service, flow, &bytes, &source_name)?;
            std::fs::create_dir_all(&out)?;
            let target = out.join(&converted.result_name);
            std::fs::write(&target, converted.payload.bytes())?;
            output::print_conversion(flow, &source_name, &converted);
        }
        Command::Bmi {
            height,
            weight,
            imperial,
        } => {
            let result = numbers2(&height, &weight).and_then(|(h, w)| {
                if imperial {
                    bmi::imperial(h, w)
                } else {
                    bmi::metric(h, w)
                }
            });
            output::print_lines(&output::format_bmi(result.as_ref()));
        }
        Command::Loan {
            principal,
            rate,
            years,
            schedule,
        } => {
            let terms = match (
                parse_number(&principal),
                parse_number(&rate),
                parse_number(&years),
            ) {
                (Some(p), Some(r), Some(y)) => Some(loan::LoanTerms::new(p, r, y)),
                _ => None,
            };
            let summary = terms.as_ref().and_then(loan::summary);
            let rows = if schedule {
                terms.as_ref().and_then(loan::schedule)
            } else {
                None
            };
            output::print_lines(&output::format_loan(summary.as_ref(), rows.as_deref()));
        }
        Command::Percent { query } => {
            let lines = match query {
                PercentQuery::Of { percent, value } => {
                    numbers2(&percent, &value).map_or_else(Vec::new, |(p, v)| {
                        output::format_percent(
                            &format!("{}% of {}", output::format_quantity(p), output::format_quantity(v)),
                            percentage::percent_of(p, v).map(output::format_quantity),
                        )
                    })
                }
                PercentQuery::What { part, whole } => {
                    numbers2(&part, &whole).map_or_else(Vec::new, |(a, b)| {
                        output::format_percent(
                            &format!("{} of {}", output::format_quantity(a), output::format_quantity(b)),
                            percentage::what_percent(a, b).map(|v| format!("{}%", output::format_quantity(v))),
                        )
                    })
                }
                PercentQuery::Change { from, to } => {
                    numbers2(&from, &to).map_or_else(Vec::new, |(a, b)| {
                        output::format_percent(
                            &format!("{} → {}", output::format_quantity(a), output::format_quantity(b)),
                            percentage::percent_change(a, b).map(|v| format!("{:+.2}%", v)),
                        )
                    })
                }
            };
            output::print_lines(&lines);
        }
        Command::Discount { price, percent } => {
            let result = numbers2(&price, &percent).and_then(|(p, d)| discount::apply(p, d));
            output::print_lines(&output::format_discount(result.as_ref()));
        }
        Command::Tip {
            bill,
            percent,
            people,
        } => {
            let result = numbers2(&bill, &percent).and_then(|(b, t)| tip::split(b, t, people));
            output::print_lines(&output::format_tip(result.as_ref(), people));
        }
        Command::Units {
            value,
            from,
            to,
            list,
        } => {
            if list {
                print_unit_list();
                return Ok(());
            }
            let (Some(value), Some(from), Some(to)) = (value, from, to) else {
                return Err("units needs a value and two units".into());
            };
            let from = units::Unit::lookup(&from)?;
            let to = units::Unit::lookup(&to)?;
            if let Some(value) = parse_number(&value) {
                let result = units::convert(value, from, to)?;
                output::print_lines(&output::format_units(value, from, result, to));
            }
        }
        Command::Text { action } => match action {
            TextAction::Case { style, text } => {
                let input = text_or_stdin(text)?;
                print!("{}", text::convert_case(&input, style));
                if !input.ends_with('\n') {
                    println!();
                }
            }
            TextAction::Stats { text } => {
                let input = text_or_stdin(text)?;
                output::print_lines(&output::format_text_stats(&text::stats(&input)));
            }
        },
        Command::Password {
            length,
            count,
            no_lowercase,
            no_uppercase,
            no_digits,
            no_symbols,
            exclude_ambiguous,
        } => {
            let options = PasswordOptions {
                length,
                lowercase: !no_lowercase,
                uppercase: !no_uppercase,
                digits: !no_digits,
                symbols: !no_symbols,
                exclude_ambiguous,
            };
            let passwords = (0..count.max(1))
                .map(|_| password::generate(&options))
                .collect::<Result<Vec<_>, _>>()?;
            output::print_lines(&output::format_passwords(
                &passwords,
                options.strength(),
                options.entropy_bits(),
            ));
        }
        Command::Spin { labels } => {
            let wheel = Wheel::new(&labels)?;
            output::print_lines(&output::format_spin(&wheel.spin(), wheel.len()));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `warn` by default; each `-v` raises one level. `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn resize_mode(
    max_width: Option<u32>,
    max_height: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
) -> Option<ResizeMode> {
    if let (Some(width), Some(height)) = (width, height) {
        return Some(ResizeMode::Exact { width, height });
    }
    if max_width.is_none() && max_height.is_none() {
        return None;
    }
    Some(ResizeMode::Fit {
        max_width: max_width.unwrap_or(u32::MAX),
        max_height: max_height.unwrap_or(u32::MAX),
    })
}

fn numbers2(a: &str, b: &str) -> Option<(f64, f64)> {
    Some((parse_number(a)?, parse_number(b)?))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn text_or_stdin(text: Option<String>) -> std::io::Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn print_unit_list() {
    for category in units::Category::ALL {
        let symbols: Vec<&str> = units::units_in(category).map(|u| u.symbol).collect();
        println!("{:<12} {}", category.to_string(), symbols.join(", "));
    }
}
