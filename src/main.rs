use bannergen::{
    logger::{self, LoggerConfig},
    save_all, BannerClient, Config, FilenameStyle, Layout, LayoutSession, ReferenceImage,
};
use std::env;
use std::path::PathBuf;

const USAGE: &str = "Usage:
  bannergen list
  bannergen generate <layout-id|all> <prompt> [reference-image] [--out <dir>] [--prompt-names]
  bannergen serve";

struct GenerateArgs {
    layout_id: String,
    prompt: String,
    reference: Option<PathBuf>,
    out_dir: PathBuf,
    style: FilenameStyle,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init_with_config(LoggerConfig::default().with_env_level().with_env_output())?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env();

    match args.first().map(String::as_str) {
        Some("list") => {
            for layout in load_layouts(&config)? {
                println!(
                    "{:<20} {:>5}x{:<5} {:<15} {}",
                    layout.id, layout.width, layout.height, layout.format, layout.name
                );
            }
            Ok(())
        }
        Some("generate") => {
            let generate_args = parse_generate_args(&args[1..])?;
            tokio::runtime::Runtime::new()?.block_on(generate(config, generate_args))
        }
        #[cfg(feature = "server")]
        Some("serve") => {
            actix_web::rt::System::new().block_on(bannergen::gateway::serve(config.gateway))?;
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            Err("unknown or missing command".into())
        }
    }
}

fn load_layouts(config: &Config) -> bannergen::Result<Vec<Layout>> {
    match &config.layouts_file {
        Some(path) => Layout::load_catalog(path),
        None => Ok(Layout::catalog()),
    }
}

fn parse_generate_args(args: &[String]) -> Result<GenerateArgs, Box<dyn std::error::Error>> {
    let mut positional = Vec::new();
    let mut out_dir = PathBuf::from(".");
    let mut style = FilenameStyle::Dimensions;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => {
                out_dir = iter
                    .next()
                    .map(PathBuf::from)
                    .ok_or("--out needs a directory")?;
            }
            "--prompt-names" => style = FilenameStyle::PromptFragment,
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(layout_id), Some(prompt)) = (positional.next(), positional.next()) else {
        eprintln!("{}", USAGE);
        return Err("generate needs a layout id and a prompt".into());
    };

    Ok(GenerateArgs {
        layout_id,
        prompt,
        reference: positional.next().map(PathBuf::from),
        out_dir,
        style,
    })
}

async fn generate(config: Config, args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    logger::log_config_info(&config);

    let layouts = load_layouts(&config)?;
    let selected: Vec<Layout> = if args.layout_id == "all" {
        layouts
    } else {
        vec![bannergen::find_layout(&layouts, &args.layout_id)?.clone()]
    };

    let reference = match &args.reference {
        Some(path) => {
            let image = ReferenceImage::from_path(path)?;
            if image.is_none() {
                log::warn!("⚠️  {} is not an image, generating from scratch", path.display());
            }
            image
        }
        None => None,
    };

    let client = BannerClient::new(&config)?;

    // One independent session per layout, all in flight at once
    let runs = selected.into_iter().map(|layout| {
        let client = client.clone();
        let prompt = args.prompt.clone();
        let reference = reference.clone();
        async move {
            let mut session = LayoutSession::new(layout);
            session.set_prompt(prompt);
            if let Some(reference) = reference {
                session.attach_reference(reference);
            }
            session.generate(&client).await;
            session
        }
    });
    let sessions = futures::future::join_all(runs).await;

    let report = save_all(&sessions, &args.out_dir, args.style);

    log::info!(
        "🎉 {} of {} banners generated",
        report.saved.len(),
        sessions.len()
    );
    if !report.is_complete() {
        return Err(format!("{} layout(s) failed", report.failed.len()).into());
    }
    Ok(())
}
