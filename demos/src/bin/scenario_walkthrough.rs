//! Replays the book's signature scenarios against the public `Boundary` API
//! and prints what happened at each step — a sanity check you can read,
//! not just run.

use lob_engine::prelude::*;
use std::sync::Arc;

fn request(id: OrderId, side: Side, price: &str, quantity: &str) -> InsertOrderRequest {
    InsertOrderRequest {
        pair: "BTC-USDT".to_string(),
        id,
        side: match side {
            Side::Ask => "ASK".to_string(),
            Side::Bid => "BID".to_string(),
        },
        price: price.to_string(),
        quantity: quantity.to_string(),
        stop_price: None,
        immediate_or_cancel: false,
    }
}

fn print_trades(label: &str, trades: &[Trade]) {
    if trades.is_empty() {
        println!("{label}: no trades");
        return;
    }
    for trade in trades {
        println!(
            "{label}: trade price={} quantity={} maker={} taker={}",
            trade.price, trade.quantity, trade.maker_id, trade.taker_id
        );
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let boundary = Boundary::new(Arc::new(Registry::new()));
    boundary.create_book("BTC-USDT");

    println!("-- resting liquidity, no cross --");
    let trades = boundary
        .insert_order(&request(1, Side::Ask, "3.0", "3.0"))
        .unwrap();
    print_trades("ask 1 @ 3.0 x3.0", &trades);
    let trades = boundary
        .insert_order(&request(2, Side::Bid, "2.1", "3.0"))
        .unwrap();
    print_trades("bid 2 @ 2.1 x3.0", &trades);

    let depth = boundary.get_depth("BTC-USDT").unwrap();
    println!("depth: {} bid levels, {} ask levels", depth.bids.len(), depth.asks.len());

    println!("\n-- a crossing taker walks two price-time-ordered makers --");
    let trades = boundary
        .insert_order(&request(3, Side::Ask, "2.0", "5.0"))
        .unwrap();
    print_trades("ask 3 @ 2.0 x5.0", &trades);
    let trades = boundary
        .insert_order(&request(4, Side::Ask, "2.0", "3.0"))
        .unwrap();
    print_trades("ask 4 @ 2.0 x3.0", &trades);
    let trades = boundary
        .insert_order(&request(5, Side::Bid, "2.0", "6.0"))
        .unwrap();
    print_trades("bid 5 @ 2.0 x6.0 (crosses both asks)", &trades);

    println!("\n-- a stop order arms, then cascades when the price moves through it --");
    let trades = boundary
        .insert_order(&request(6, Side::Ask, "3.0", "1.0"))
        .unwrap();
    print_trades("ask 6 @ 3.0 x1.0", &trades);
    let mut stop_request = request(7, Side::Bid, "5.0", "1.0");
    stop_request.stop_price = Some("2.5".to_string());
    let trades = boundary.insert_order(&stop_request).unwrap();
    print_trades("stop-bid 7, trigger 2.5, price 5.0 x1.0 (arms only)", &trades);
    let trades = boundary
        .insert_order(&request(8, Side::Ask, "2.0", "1.0"))
        .unwrap();
    print_trades("ask 8 @ 2.0 x1.0", &trades);
    let trades = boundary
        .insert_order(&request(9, Side::Bid, "2.0", "1.0"))
        .unwrap();
    print_trades("bid 9 @ 2.0 x1.0 (prints 2.0, triggers stop-bid 7)", &trades);
}
