//! Plain-text rendering for the console.

use tradedesk_core::*;

pub fn print_plan(plan: &BulkOrderPlan) {
    let sep = "=".repeat(64);
    println!("\n{sep}");
    println!(
        "  BULK ORDER  {} {}  ({}, {})",
        plan.request.side, plan.request.symbol, plan.request.distribution, plan.request.price_step
    );
    println!("{sep}");
    println!("  {:>3}  {:<24} {:>12} {:>10} {:>10}", "#", "ID", "PRICE", "VOLUME", "MARGIN");
    for (i, order) in plan.orders.iter().enumerate() {
        println!(
            "  {:>3}  {:<24} {:>12} {:>10} {:>10.2}",
            i + 1,
            order.id,
            order.price,
            order.volume,
            order.expected_margin
        );
    }
    print_summary(&plan.summary);
}

pub fn print_summary(summary: &OrderSummary) {
    let sep = "-".repeat(64);
    println!("{sep}");
    println!("  Orders:          {}", summary.total_orders);
    println!("  Total Volume:    {}", summary.total_volume);
    println!("  Total Margin:    ${:.2}", summary.total_margin);
    println!("  Average Price:   {}", summary.average_price);
    println!(
        "  Price Range:     {} - {}",
        summary.price_range.min, summary.price_range.max
    );
    println!("  Risk Level:      {}", summary.risk_level);
    println!("{sep}\n");
}

pub fn print_account(info: &Mt5AccountInfo) {
    println!("  Login:        {} @ {}", info.login, info.server);
    if !info.name.is_empty() {
        println!("  Name:         {}", info.name);
    }
    println!("  Balance:      {:.2} {}", info.balance, info.currency);
    println!("  Equity:       {:.2}", info.equity);
    println!("  Margin:       {:.2}", info.margin);
    println!("  Free Margin:  {:.2}", info.margin_free);
    println!("  Leverage:     1:{}", info.leverage);
}

pub fn position_line(p: &Mt5LivePosition) -> String {
    format!(
        "{:<12} {:<10} {:<4} {:>8} {:>12} {:>12} {:>10.2}",
        p.ticket,
        p.symbol,
        p.side().as_str(),
        p.volume,
        p.price_open,
        p.price_current,
        p.profit
    )
}

pub fn print_positions(positions: &[Mt5LivePosition]) {
    if positions.is_empty() {
        println!("No open positions");
        return;
    }
    println!(
        "{:<12} {:<10} {:<4} {:>8} {:>12} {:>12} {:>10}",
        "TICKET", "SYMBOL", "SIDE", "VOLUME", "OPEN", "CURRENT", "PROFIT"
    );
    for p in positions {
        println!("{}", position_line(p));
    }
}

pub fn order_line(o: &Mt5LiveOrder) -> String {
    format!(
        "{:<12} {:<10} {:>6} {:>8} {:>12} {:>10} {:>10}",
        o.ticket, o.symbol, o.kind, o.volume_current, o.price_open, o.sl, o.tp
    )
}

pub fn print_orders(orders: &[Mt5LiveOrder]) {
    if orders.is_empty() {
        println!("No working orders");
        return;
    }
    println!(
        "{:<12} {:<10} {:>6} {:>8} {:>12} {:>10} {:>10}",
        "TICKET", "SYMBOL", "TYPE", "VOLUME", "PRICE", "SL", "TP"
    );
    for o in orders {
        println!("{}", order_line(o));
    }
}

pub fn print_history(trades: &[Mt5Trade]) {
    if trades.is_empty() {
        println!("No closed trades");
        return;
    }
    println!(
        "{:<20} {:<10} {:<5} {:>8} {:>12} {:>10}",
        "OPENED", "SYMBOL", "TYPE", "VOLUME", "PRICE", "NET"
    );
    for t in trades {
        println!(
            "{:<20} {:<10} {:<5} {:>8} {:>12} {:>10.2}",
            t.open_time,
            t.symbol,
            t.kind,
            t.volume,
            t.price,
            t.net_profit()
        );
    }
}

pub fn print_saved_accounts(accounts: &[SavedAccount]) {
    if accounts.is_empty() {
        println!("No saved accounts");
        return;
    }
    println!("{:<38} {:>10} {:<24} {:<6}", "ID", "LOGIN", "SERVER", "ACTIVE");
    for a in accounts {
        println!(
            "{:<38} {:>10} {:<24} {:<6}",
            a.id,
            a.login,
            a.server,
            if a.is_active { "yes" } else { "no" }
        );
    }
}

pub fn event_line(event: &Mt5Event) -> String {
    match event {
        Mt5Event::Position(p) => format!("[position] {}", position_line(p)),
        Mt5Event::Order(o) => format!("[order] {}", order_line(o)),
        Mt5Event::Account(a) => format!(
            "[account] balance {:.2} equity {:.2} free margin {:.2}",
            a.balance, a.equity, a.margin_free
        ),
    }
}

fn roles(user: &User) -> String {
    let roles: Vec<String> = user.roles.iter().map(|r| r.to_string()).collect();
    roles.join(",")
}

pub fn user_line(u: &User) -> String {
    format!(
        "{:<38} {:<32} {:<20} {:<12}",
        u.id,
        u.email,
        roles(u),
        u.status.map(|s| s.as_str()).unwrap_or("-")
    )
}

pub fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("No users");
        return;
    }
    println!("{:<38} {:<32} {:<20} {:<12}", "ID", "EMAIL", "ROLES", "STATUS");
    for u in users {
        println!("{}", user_line(u));
    }
}

pub fn print_user(user: &User) {
    println!("  Id:           {}", user.id);
    println!("  Email:        {}", user.email);
    if let Some(name) = user.display_name.as_deref().or(user.username.as_deref()) {
        println!("  Name:         {}", name);
    }
    println!("  Roles:        {}", roles(user));
    if let Some(status) = user.status {
        println!("  Status:       {}", status);
    }
    if let Some(last) = &user.last_login_at {
        println!("  Last Login:   {}", last);
    }
}
