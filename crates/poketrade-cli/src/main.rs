//! Command-line interface for poketrade
//!
//! # Usage
//!
//! ```bash
//! # Optional provider credentials
//! export FINNHUB_API_KEY="..."
//! export PERPLEXITY_API_KEY="..."
//! export GEMINI_API_KEY="..."
//!
//! poketrade analyze NVDA
//! poketrade ask "how is tesla doing?" --lang hi
//! poketrade chat
//! ```

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use poketrade_market::report::format_thousands;
use poketrade_market::{
    Candle, Language, MarketConfig, MarketService, NewsItem, Quote, ReportText,
    TradingAssistant, render_analysis,
};
use std::io::{self, BufRead, Write};
use tracing::info;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Parser, Debug)]
#[command(name = "poketrade")]
#[command(about = "Market analysis for stocks, with AI insights and translation", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full analysis: quote, candles, news, commentary and AI insight
    Analyze {
        symbol: String,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Current quote
    Quote { symbol: String },
    /// Daily candles
    Candles {
        symbol: String,
        /// Days of history
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Candle resolution
        #[arg(long, default_value = "D")]
        resolution: String,
    },
    /// Company news, or general market news without a symbol
    News { symbol: Option<String> },
    /// Market commentary for a free-text query
    Commentary { query: Vec<String> },
    /// Ask the assistant one question
    Ask {
        input: Vec<String>,
        /// Answer language (en, hi, te)
        #[arg(long, default_value = "en")]
        lang: Language,
    },
    /// Translate text
    Translate {
        text: Vec<String>,
        /// Target language (en, hi, te)
        #[arg(long)]
        lang: Language,
    },
    /// Show which ticker a message refers to
    Symbol { input: Vec<String> },
    /// Show provider credential status
    Status,
    /// Interactive assistant session
    Chat {
        /// Answer language (en, hi, te)
        #[arg(long, default_value = "en")]
        lang: Language,
    },
}

fn format_time(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

fn quote_table(quote: &Quote) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Field", "Value"]);
    table
        .add_row(vec!["Symbol".to_string(), quote.symbol.clone()])
        .add_row(vec!["Price".to_string(), format!("${:.2}", quote.price)])
        .add_row(vec![
            "Change".to_string(),
            format!("{:+.2} ({:+.2}%)", quote.change, quote.change_percent),
        ])
        .add_row(vec!["Open".to_string(), format!("${:.2}", quote.open)])
        .add_row(vec!["High".to_string(), format!("${:.2}", quote.high)])
        .add_row(vec!["Low".to_string(), format!("${:.2}", quote.low)])
        .add_row(vec![
            "Previous Close".to_string(),
            format!("${:.2}", quote.previous_close),
        ])
        .add_row(vec!["Volume".to_string(), format_thousands(quote.volume)])
        .add_row(vec!["Time".to_string(), format_time(quote.timestamp)]);
    table
}

fn candle_table(candles: &[Candle]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Time", "Open", "High", "Low", "Close", "Volume"]);
    for candle in candles {
        table.add_row(vec![
            format_time(candle.timestamp),
            format!("{:.2}", candle.open),
            format!("{:.2}", candle.high),
            format!("{:.2}", candle.low),
            format!("{:.2}", candle.close),
            format_thousands(candle.volume),
        ]);
    }
    table
}

fn news_table(news: &[NewsItem]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Time", "Source", "Sentiment", "Headline"]);
    for item in news {
        table.add_row(vec![
            format_time(item.published_at),
            item.source.clone(),
            item.sentiment.to_string(),
            item.headline.clone(),
        ]);
    }
    table
}

fn status_table(config: &MarketConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Provider", "Status"]);
    for (provider, status) in config.credential_status() {
        table.add_row(vec![provider.to_string(), status]);
    }
    table
}

fn joined(words: &[String]) -> anyhow::Result<String> {
    let text = words.join(" ");
    anyhow::ensure!(!text.trim().is_empty(), "input must not be empty");
    Ok(text)
}

fn print_banner(language: Language) {
    println!(
        r#"
╔══════════════════════════════════════════════════════════════╗
║                     PokeTrade Assistant                      ║
║                                                              ║
║  Ask about a stock by name or ticker:                        ║
║    "How is nvidia doing?"                                    ║
║    "Show me TSLA"                                            ║
║  Or ask any finance question.                                ║
║                                                              ║
║  Commands:                                                   ║
║    /lang <en|hi|te>  - Change answer language                ║
║    /exit             - Exit                                  ║
╚══════════════════════════════════════════════════════════════╝
"#
    );
    println!("Answer language: {}\n", language.name());
}

async fn run_chat(assistant: &TradingAssistant, mut language: Language) -> anyhow::Result<()> {
    print_banner(language);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("poketrade> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/exit" || input == "/quit" {
            println!("Goodbye!");
            break;
        }
        if let Some(code) = input.strip_prefix("/lang") {
            match code.parse::<Language>() {
                Ok(lang) => {
                    language = lang;
                    println!("Answer language: {}\n", language.name());
                }
                Err(e) => eprintln!("Error: {e}\n"),
            }
            continue;
        }

        match assistant.respond(input, language).await {
            Ok(reply) => println!("{}\n", reply.text()),
            Err(e) => eprintln!("Error: {e}\n"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    poketrade_utils::init_tracing();

    let args = Args::parse();
    let service = MarketService::from_env().context("failed to configure market service")?;
    info!(command = ?args.command, "Starting poketrade");

    match args.command {
        Command::Analyze { symbol, json } => {
            let analysis = service.get_comprehensive_analysis(&symbol).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                let report = render_analysis(
                    &analysis.quote.symbol,
                    &analysis,
                    Language::En,
                    &ReportText::from_analysis(&analysis),
                );
                println!("{report}\n");
                println!("{}", candle_table(&analysis.candles));
            }
        }
        Command::Quote { symbol } => {
            let quote = service.get_quote(&symbol.to_uppercase()).await;
            println!("{}", quote_table(&quote));
        }
        Command::Candles {
            symbol,
            days,
            resolution,
        } => {
            let to = Utc::now().timestamp();
            let from = to - i64::from(days) * SECONDS_PER_DAY;
            let candles = service
                .get_candlestick_series(&symbol.to_uppercase(), &resolution, from, to)
                .await;
            println!("{}", candle_table(&candles));
        }
        Command::News { symbol } => {
            let symbol = symbol.map(|s| s.to_uppercase());
            match service.get_market_news(symbol.as_deref()).await {
                Ok(news) => println!("{}", news_table(&news)),
                Err(e) if e.is_not_configured() => println!("News unavailable: {e}"),
                Err(e) => return Err(e.into()),
            }
        }
        Command::Commentary { query } => {
            let commentary = service.get_market_commentary(&joined(&query)?).await?;
            println!("{commentary}");
        }
        Command::Ask { input, lang } => {
            let assistant = TradingAssistant::new(service);
            let reply = assistant.respond(&joined(&input)?, lang).await?;
            println!("{}", reply.text());
        }
        Command::Translate { text, lang } => {
            let assistant = TradingAssistant::new(service);
            let translated = assistant.translator().translate(&joined(&text)?, lang).await;
            println!("{translated}");
        }
        Command::Symbol { input } => {
            let assistant = TradingAssistant::new(service);
            match assistant.extract_symbol(&joined(&input)?).await {
                Some(symbol) => println!("{symbol}"),
                None => println!("none"),
            }
        }
        Command::Status => {
            println!("{}", status_table(service.config()));
        }
        Command::Chat { lang } => {
            let assistant = TradingAssistant::new(service);
            run_chat(&assistant, lang).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_language() {
        let args = Args::try_parse_from(["poketrade", "ask", "how", "is", "nvidia", "--lang", "te"])
            .unwrap();
        match args.command {
            Command::Ask { input, lang } => {
                assert_eq!(input.join(" "), "how is nvidia");
                assert_eq!(lang, Language::Te);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_language() {
        assert!(Args::try_parse_from(["poketrade", "chat", "--lang", "fr"]).is_err());
    }

    #[test]
    fn test_candles_defaults() {
        let args = Args::try_parse_from(["poketrade", "candles", "AAPL"]).unwrap();
        match args.command {
            Command::Candles {
                symbol,
                days,
                resolution,
            } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(days, 7);
                assert_eq!(resolution, "D");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_joined_rejects_blank_input() {
        assert!(joined(&[]).is_err());
        assert_eq!(joined(&["a".to_string(), "b".to_string()]).unwrap(), "a b");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "1970-01-01 00:00");
    }

    #[test]
    fn test_status_table_lists_providers() {
        let rendered = status_table(&MarketConfig::default()).to_string();
        assert!(rendered.contains("finnhub"));
        assert!(rendered.contains("yahoo-finance"));
    }
}
