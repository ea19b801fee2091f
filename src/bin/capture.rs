//! Interactive capture client.
//!
//! Drives one extraction session against a running relay from the
//! terminal: pick a PDF, flip pages, extract the current page, copy the
//! result.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use glean::client::{
    ExtractorSession, PdfiumRenderer, RelayClient, SystemClipboard, COPY_NOTICE_TTL,
};

const USAGE: &str = "commands:
  open <path>   load a PDF
  prev | next   change page
  extract       extract products from the current page
  copy          copy the result to the clipboard
  show          print the current result
  quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glean=info".into()),
        )
        .init();

    let relay_url =
        std::env::var("GLEAN_RELAY_URL").unwrap_or_else(|_| "http://localhost:5001".to_string());

    let renderer = PdfiumRenderer::new()?;
    let session = ExtractorSession::new(
        Box::new(renderer),
        RelayClient::new(&relay_url),
        Box::new(SystemClipboard),
    );

    println!("glean capture client — relay at {relay_url}");
    println!("{USAGE}");

    run(session).await;
    Ok(())
}

async fn run(mut session: ExtractorSession) {
    let stdin = io::stdin();
    let mut copied_at: Option<Instant> = None;

    loop {
        if let Some(at) = copied_at {
            if at.elapsed() >= COPY_NOTICE_TTL {
                session.expire_copy_notice();
                copied_at = None;
            }
        }

        print_status(&session);
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let mut parts = line.trim().splitn(2, ' ');
        match (parts.next().unwrap_or(""), parts.next()) {
            ("open", Some(path)) => session.select_file(Path::new(path.trim())),
            ("open", None) => println!("usage: open <path>"),
            ("prev", _) => session.prev_page(),
            ("next", _) => session.next_page(),
            ("extract", _) => {
                println!("extracting...");
                session.extract().await;
            }
            ("copy", _) => {
                session.copy_to_clipboard();
                copied_at = Some(Instant::now());
            }
            ("show", _) => print_result(&session),
            ("help", _) => println!("{USAGE}"),
            ("quit", _) | ("q", _) => break,
            ("", _) => {}
            (cmd, _) => println!("unknown command: {cmd} (try 'help')"),
        }
    }
}

fn print_status(session: &ExtractorSession) {
    let state = session.state();

    match (&state.pdf_path, state.num_pages) {
        (Some(path), Some(num_pages)) => {
            println!(
                "[{} — page {}/{}]",
                path.display(),
                state.current_page,
                num_pages
            );
        }
        (Some(path), None) => println!("[{} — loading]", path.display()),
        (None, _) => println!("[no document]"),
    }

    if let Some(error) = &state.error {
        println!("error: {error}");
    }
    if let Some(notice) = state.copy_notice {
        println!("{}", notice.message());
    }
}

fn print_result(session: &ExtractorSession) {
    let state = session.state();

    let Some(data) = &state.extracted else {
        println!("no extraction result yet");
        return;
    };

    // Tabular when the model produced the product shape, raw otherwise.
    match state.products() {
        Some(products) => {
            for product in products {
                println!(
                    "  {} — {}{}",
                    product.product_name,
                    product.price,
                    product
                        .description
                        .map(|d| format!(" — {d}"))
                        .unwrap_or_default()
                );
            }
        }
        None => match serde_json::to_string_pretty(data) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{data}"),
        },
    }
}
