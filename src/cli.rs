use std::error::Error;
#[cfg(feature = "web")]
use std::net::SocketAddr;

use atty::Stream;
use clap::{Parser, Subcommand};
use kgsearch_rs::config::DEFAULT_LIMIT;
use kgsearch_rs::{CardView, KgClient, Query, ResultsView, SearchConfig, SearchOutcome};
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "kgsearch_rs=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "kgsearch-rs", about = "Search Google's Knowledge Graph", version)]
pub struct Cli {
    /// Emit JSON instead of formatted cards.
    #[arg(long, global = true)]
    json: bool,

    /// API key; falls back to the GOOGLE_API_KEY environment variable.
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Override the entity-search endpoint (also KG_SEARCH_ENDPOINT).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Result limit sent with every request.
    #[arg(long, global = true, default_value_t = DEFAULT_LIMIT)]
    limit: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one search and print the result cards.
    Search {
        /// Words of the query; joined with spaces.
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Serve the web front-end.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
        /// Public base URL used for canonical links.
        #[arg(long)]
        base_url: Option<String>,
    },
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = search_config(&cli)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    match cli.command {
        Command::Search { query } => runtime.block_on(handle_search(config, query, cli.json)),
        #[cfg(feature = "web")]
        Command::Serve { addr, base_url } => {
            let mut web_config = kgsearch_rs::web::WebConfig::new(config);
            web_config.addr = addr;
            web_config.base_url = base_url.unwrap_or_else(|| format!("http://{addr}"));
            runtime.block_on(kgsearch_rs::web::serve(web_config))?;
            Ok(())
        }
    }
}

fn search_config(cli: &Cli) -> Result<SearchConfig, Box<dyn Error>> {
    let mut config = match &cli.api_key {
        Some(key) => SearchConfig::new(key.clone())?,
        None => SearchConfig::from_env()?,
    };
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    Ok(config.with_limit(cli.limit))
}

async fn handle_search(
    config: SearchConfig,
    words: Vec<String>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let query = Query::parse(&words.join(" ")).ok_or("Search query cannot be empty")?;
    let items = match KgClient::new(config).search(&query).await? {
        SearchOutcome::Empty => Vec::new(),
        SearchOutcome::Found(items) => items,
    };
    let view = ResultsView::build(&query, &items);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else if view.total == 0 {
        println!("No results found for \"{query}\".");
    } else {
        print_results(&view);
    }
    Ok(())
}

fn print_results(view: &ResultsView) {
    println!("{}", view.headline());
    for (position, card) in view.results.iter().enumerate() {
        println!();
        print_card(position + 1, card);
    }
}

fn print_card(position: usize, card: &CardView) {
    println!(
        "{position}. {}  [{}]  confidence {}",
        card.title,
        card.types.join(", "),
        card.confidence
    );
    println!(
        "   {}",
        card.subtitle.as_deref().unwrap_or("No description available")
    );
    match &card.description {
        Some(description) => render_text_block(description),
        None => println!("   No detailed description available in Google's Knowledge Graph"),
    }
    for link in &card.links {
        println!("   {}: {} <{}>", link.kind.title(), link.label, link.href);
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn text_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_text_block(body: &str) {
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, body, Some(text_width()));
        println!("{formatted}");
    } else {
        println!("   {body}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_words_are_collected() {
        let cli = Cli::try_parse_from(["kgsearch-rs", "search", "Eiffel", "Tower", "--json"])
            .expect("valid arguments");
        assert!(cli.json);
        assert_eq!(cli.limit, DEFAULT_LIMIT);
        match cli.command {
            Command::Search { query } => assert_eq!(query, vec!["Eiffel", "Tower"]),
            #[cfg(feature = "web")]
            Command::Serve { .. } => panic!("expected search"),
        }
    }

    #[test]
    fn explicit_key_and_endpoint_build_the_config() {
        let cli = Cli::try_parse_from([
            "kgsearch-rs",
            "--api-key",
            "abc",
            "--endpoint",
            "http://localhost:9000/search",
            "--limit",
            "25",
            "search",
            "rust",
        ])
        .unwrap();
        let config = search_config(&cli).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.endpoint, "http://localhost:9000/search");
        assert_eq!(config.limit, 25);
    }

    #[test]
    fn search_requires_a_query() {
        assert!(Cli::try_parse_from(["kgsearch-rs", "search"]).is_err());
    }
}
