use std::path::PathBuf;

use clap::Parser;
use personal_color::{
    color::{hex_to_lab, LabColor},
    confidence::AnalysisModule,
    config::Configuration,
    error::AppError,
    service::{AnalysisRequest, PersonalColorService},
};
use tower::{Service, ServiceExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "personal-color", about = "Classify skin colors into the 12-tone system")]
struct CliArgs {
    /// Path to a TOML configuration file.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Image-quality confidence as CODE=VALUE, e.g. CIE-1=85. Repeatable.
    #[clap(long = "quality", value_parser = parse_quality)]
    pub quality: Vec<(AnalysisModule, f64)>,

    /// Pretty-print the JSON output.
    #[clap(long)]
    pub pretty: bool,

    /// Skin colors as #RRGGBB or L,a,b
    #[clap(required = true, value_parser = parse_color)]
    pub colors: Vec<LabColor>,
}

fn parse_color(arg: &str) -> Result<LabColor, AppError> {
    if arg.contains(',') {
        let parts: Vec<f64> = arg
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| AppError::InvalidArgument(format!("'{arg}': {e}")))?;
        return match parts.as_slice() {
            [l, a, b] => Ok(LabColor::new(*l, *a, *b)),
            _ => Err(AppError::InvalidArgument(format!(
                "'{arg}': expected three components L,a,b"
            ))),
        };
    }
    Ok(hex_to_lab(arg)?)
}

fn parse_quality(arg: &str) -> Result<(AnalysisModule, f64), AppError> {
    let (code, value) = arg
        .split_once('=')
        .ok_or_else(|| AppError::InvalidArgument(format!("'{arg}': expected CODE=VALUE")))?;
    let confidence = value
        .trim()
        .parse::<f64>()
        .map_err(|e| AppError::InvalidArgument(format!("'{arg}': {e}")))?;
    Ok((AnalysisModule::from(code.trim()), confidence))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = CliArgs::parse();
    let configuration = Configuration::load(args.config.as_deref())?;
    init_logging(&configuration.log_level);

    let mut service = PersonalColorService::new(&configuration)?;
    let mut reports = Vec::with_capacity(args.colors.len());
    for lab in args.colors {
        let request = args
            .quality
            .iter()
            .fold(AnalysisRequest::new(lab), |request, (module, confidence)| {
                request.with_image_quality(module.clone(), *confidence)
            });
        let report = service.ready().await?.call(request).await?;
        reports.push(report);
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&reports)?
    } else {
        serde_json::to_string(&reports)?
    };
    println!("{json}");
    Ok(())
}
