use anyhow::{Context, Result};
use reelgen::chain::ScriptGenerator;
use reelgen::config::{Config, SETTINGS_FILE};
use reelgen::local::available_topics;
use reelgen::menu::{self, MenuChoice};
use reelgen::pipeline::run_pipeline;
use reelgen::{ffmpeg, init, platform};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

async fn ask(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> Result<String> {
    print!("{}", question);
    std::io::stdout().flush().ok();
    let line = lines
        .next_line()
        .await
        .context("Failed to read from stdin")?;
    Ok(line.unwrap_or_default())
}

async fn choose_topic(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    let topics = available_topics();
    println!("{}", menu::render_menu(&topics));

    let answer = ask(lines, &format!("Enter your choice (1-{}): ", topics.len() + 1)).await?;
    let topic = match menu::parse_choice(&answer, topics.len()) {
        MenuChoice::Preset(index) => topics[index].to_string(),
        MenuChoice::Custom => ask(lines, "Enter your .NET topic: ").await?.trim().to_string(),
        MenuChoice::Invalid => String::new(),
    };

    Ok((!topic.is_empty()).then_some(topic))
}

async fn run() -> Result<()> {
    let cfg = Config::load(SETTINGS_FILE).await?;

    println!("{}", menu::banner(init::os_name()));

    if !ffmpeg::check_ffmpeg().await {
        eprintln!("[WARNING] FFmpeg not found. Some features may be limited.");
        eprintln!("          Download FFmpeg from: https://ffmpeg.org/download.html");
    }

    init::ensure_directories(&cfg.settings).await?;

    let mut generator = ScriptGenerator::new(&cfg)?;
    println!("{}", generator.status_report());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(topic) = choose_topic(&mut lines).await? else {
        println!("Invalid selection. Exiting.");
        return Ok(());
    };

    println!("\nGenerating Reel for: {}\n", topic);
    let reel = run_pipeline(&cfg, &mut generator, &topic).await?;

    let size = tokio::fs::metadata(&reel.video.path).await.ok().map(|m| m.len());
    println!(
        "\n{}",
        menu::success_report(&reel, &cfg.settings.video, &cfg.settings.output_dir, size)
    );

    platform::open_folder(&cfg.settings.output_dir);
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("\n[ERROR] {}", err);
        for cause in err.chain().skip(1) {
            eprintln!("Details: {}", cause);
        }
        std::process::exit(1);
    }
}
