//! Interactive stock-market order CLI.
//!
//! A REPL for placing limit and stop orders against house quotes.
//!
//! Usage:
//!   cargo run --features cli --bin tix -- --config market.toml

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use tixbook::config::EngineConfig;
use tixbook::{
    Market, NotificationSink, OrderEvent, OrderId, OrderType, PositionType, Price, SimAccount,
    Symbol,
};

#[derive(Parser)]
#[command(name = "tix")]
#[command(about = "Resting limit/stop order simulator")]
#[command(version)]
struct Cli {
    /// Path to a market config (TOML). Without one, a small demo market is used.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load resting orders from a JSON Lines file on startup
    #[arg(long)]
    orders: Option<PathBuf>,
}

const DEMO_CONFIG: &str = r#"
[account]
starting_cash = 1000000.0
commission = 100.0

[[stocks]]
symbol = "ECP"
name = "ECorp"
price = 50.0
max_shares = 100000

[[stocks]]
symbol = "JGN"
name = "Joes Guns"
price = 8.5
max_shares = 500000
"#;

/// Prints notifications as they happen.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, event: OrderEvent) {
        println!("  >> {event}");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::from_toml(DEMO_CONFIG),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let mut market = config.build_market();
    let mut account = config.build_account();

    if let Some(path) = &cli.orders {
        match market.load_orders(path) {
            Ok(n) => println!("Loaded {n} resting orders."),
            Err(e) => {
                eprintln!("Error loading orders: {e}");
                process::exit(1);
            }
        }
    }

    println!("tix order simulator v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for commands, 'quit' to exit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("tix> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts.first().map(|s| s.to_lowercase());

        match cmd.as_deref() {
            Some("help" | "h" | "?") => print_help(),
            Some("quit" | "exit" | "q") => break,
            Some("stocks" | "s") => print_stocks(&market),
            Some("book" | "b") => print_book(&market, &parts[1..]),
            Some("positions" | "p") => print_positions(&account),
            Some("quote") => handle_quote(&mut market, &mut account, &parts[1..]),
            Some("order" | "o") => handle_order(&mut market, &parts[1..]),
            Some("cancel" | "c") => handle_cancel(&mut market, &parts[1..]),
            Some("tick" | "t") => handle_tick(&mut market, &mut account),
            Some("save") => handle_save(&market, &parts[1..]),
            Some(cmd) => println!("Unknown command: '{}'. Type 'help' for commands.", cmd),
            None => {}
        }
    }

    println!("Goodbye!");
}

fn print_help() {
    println!(
        r#"
Commands:
  stocks                                     List instruments and quotes
  quote <sym> <price>                        Move a quote, then process its orders
  order <type> <long|short> <sym> <price> <qty>
                                             Place a resting order
                                             type: limitbuy, limitsell, stopbuy, stopsell
  cancel <sym> <order_id>                    Cancel a resting order
  book [sym]                                 Show resting orders
  tick                                       Process orders for every instrument
  positions                                  Show cash and holdings
  save <path>                                Save resting orders (JSON Lines)
  help                                       Show this help
  quit                                       Exit

Examples:
  order limitbuy long ECP 45.00 100          Buy 100 ECP once it trades at or below $45
  order stopsell long ECP 40 100             Sell 100 ECP if it falls to $40
  quote ECP 44.50                            Move ECP to $44.50

Prices are in dollars (e.g., 100.50 = $100.50)
"#
    );
}

fn print_stocks(market: &Market) {
    println!();
    for symbol in market.symbols() {
        if let Some(stock) = market.stock(&symbol) {
            println!(
                "  {:<8} {:<20} {:>14}  max {} shares  ({} resting)",
                stock.symbol.as_str(),
                stock.name,
                stock.price.to_string(),
                stock.max_shares,
                market.resting_orders(&symbol).len()
            );
        }
    }
    println!();
}

fn print_book(market: &Market, args: &[&str]) {
    let symbols = match args.first() {
        Some(s) => match parse_symbol(s) {
            Some(sym) => vec![sym],
            None => return,
        },
        None => market.symbols(),
    };

    println!();
    let mut any = false;
    for symbol in symbols {
        for order in market.resting_orders(&symbol) {
            any = true;
            println!(
                "  #{:<4} {:<6} {:<17} {:<5} {:>12}  {:>8} shares",
                order.id.0,
                order.symbol.as_str(),
                order.order_type.label(),
                order.position.label(),
                order.price.to_string(),
                order.shares
            );
        }
    }
    if !any {
        println!("  (no resting orders)");
    }
    println!();
}

fn print_positions(account: &SimAccount) {
    println!();
    println!("  Cash: {}", account.cash());
    let mut holdings: Vec<_> = account.holdings().collect();
    holdings.sort_by_key(|(sym, _)| **sym);
    for (symbol, h) in holdings {
        println!(
            "  {:<8} long {:>8} @ {:<12} short {:>8} @ {}",
            symbol.as_str(),
            h.long_shares,
            h.long_avg_price.to_string(),
            h.short_shares,
            h.short_avg_price
        );
    }
    println!();
}

fn handle_quote(market: &mut Market, account: &mut SimAccount, args: &[&str]) {
    if args.len() < 2 {
        println!("Usage: quote <sym> <price>");
        return;
    }
    let Some(symbol) = parse_symbol(args[0]) else {
        return;
    };
    let Some(price) = parse_price(args[1]) else {
        println!("Invalid price: '{}'", args[1]);
        return;
    };

    match market.set_price(&symbol, price) {
        Ok(old) => println!("{symbol}: {old} -> {price}"),
        Err(e) => {
            println!("{e}");
            return;
        }
    }
    match market.process_symbol(&symbol, account, &mut ConsoleSink) {
        Ok(report) if !report.is_quiet() => println!(
            "  {} triggered, {} filled, {} rejected",
            report.triggered, report.filled, report.rejected
        ),
        Ok(_) => {}
        Err(e) => println!("{e}"),
    }
}

fn handle_order(market: &mut Market, args: &[&str]) {
    if args.len() < 5 {
        println!("Usage: order <type> <long|short> <sym> <price> <qty>");
        return;
    }

    let order_type: OrderType = match args[0].parse() {
        Ok(t) => t,
        Err(e) => {
            println!("{e}. Use limitbuy, limitsell, stopbuy or stopsell.");
            return;
        }
    };

    let position = match args[1].to_lowercase().as_str() {
        "long" | "l" => PositionType::Long,
        "short" | "s" => PositionType::Short,
        other => {
            println!("Invalid position: '{}'. Use long or short.", other);
            return;
        }
    };

    let Some(symbol) = parse_symbol(args[2]) else {
        return;
    };

    let Some(price) = parse_price(args[3]) else {
        println!("Invalid price: '{}'", args[3]);
        return;
    };

    let qty: u64 = match args[4].parse() {
        Ok(q) if q > 0 => q,
        _ => {
            println!("Invalid quantity: '{}'", args[4]);
            return;
        }
    };

    match market.place(&symbol, order_type, position, price, qty) {
        Ok(id) => println!(
            "Order #{}: {} ({}) {} {} @ {}",
            id.0, order_type, position, qty, symbol, price
        ),
        Err(e) => println!("Rejected: {e}"),
    }
}

fn handle_cancel(market: &mut Market, args: &[&str]) {
    if args.len() < 2 {
        println!("Usage: cancel <sym> <order_id>");
        return;
    }

    let Some(symbol) = parse_symbol(args[0]) else {
        return;
    };

    let id: u64 = match args[1].trim_start_matches('#').parse() {
        Ok(i) => i,
        Err(_) => {
            println!("Invalid order ID: '{}'", args[1]);
            return;
        }
    };

    match market.cancel(&symbol, OrderId(id)) {
        Ok(order) => println!("Cancelled order #{} ({} shares)", id, order.shares),
        Err(e) => println!("Failed to cancel order #{}: {e}", id),
    }
}

fn handle_tick(market: &mut Market, account: &mut SimAccount) {
    match market.process_all(account, &mut ConsoleSink) {
        Ok(report) => println!(
            "Examined {}, triggered {}, filled {}, rejected {}",
            report.examined, report.triggered, report.filled, report.rejected
        ),
        Err(e) => println!("{e}"),
    }
}

fn handle_save(market: &Market, args: &[&str]) {
    let Some(path) = args.first() else {
        println!("Usage: save <path>");
        return;
    };
    match market.save_orders(Path::new(path)) {
        Ok(()) => println!("Saved {} orders to {path}", market.book().len()),
        Err(e) => println!("Failed to save: {e}"),
    }
}

fn parse_symbol(s: &str) -> Option<Symbol> {
    let symbol = Symbol::try_new(&s.to_uppercase());
    if symbol.is_none() {
        println!("Invalid symbol: '{}'", s);
    }
    symbol
}

fn parse_price(s: &str) -> Option<Price> {
    // Parse as float, convert to cents
    let f: f64 = s.trim_start_matches('$').parse().ok()?;
    if f <= 0.0 {
        return None;
    }
    Some(Price::from_dollars(f))
}
