use bannergen::{BannerClient, Config, FilenameStyle, Layout, LayoutSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    bannergen::logger::init()?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found");
    }

    let config = Config::from_env();
    let client = BannerClient::new(&config)?;

    let layouts = Layout::catalog();
    let layout = bannergen::find_layout(&layouts, "promo-square")?.clone();

    let mut session = LayoutSession::new(layout);
    session.set_prompt("Spring sale: -50% on hair dryers, pink background, bold white headline");

    let outcome = session.generate(&client).await;
    println!("success: {}", outcome.is_success());

    match session.error_message() {
        Some(message) => println!("{}", message),
        None => {
            let path = session.save_to(".", FilenameStyle::Dimensions)?;
            println!("saved {}", path.display());
        }
    }

    Ok(())
}
