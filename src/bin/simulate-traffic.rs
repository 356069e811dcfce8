use clap::Parser;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "simulate-traffic")]
#[command(about = "Generate realistic traffic against a running JWT Pizza service", long_about = None)]
struct Cli {
    /// API root of the service under test.
    #[arg(short, long, default_value = "http://localhost:3001/api/v1")]
    base_url: String,

    /// Number of traffic rounds (0 runs until interrupted).
    #[arg(short, long, default_value_t = 0)]
    rounds: u64,

    /// Pause between rounds in milliseconds.
    #[arg(short, long, default_value_t = 5000)]
    pause_ms: u64,
}

struct SimUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
}

const USERS: [SimUser; 3] = [
    SimUser { name: "User1", email: "user1@example.com", password: "password1" },
    SimUser { name: "User2", email: "user2@example.com", password: "password2" },
    SimUser { name: "Admin", email: "a@jwt.com", password: "admin" },
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

    for user in USERS.iter().take(2) {
        register(&client, &cli.base_url, user).await;
    }

    let mut round = 0;
    loop {
        round += 1;
        println!("--- round {round} ---");

        let mut tokens = Vec::new();
        for user in &USERS {
            if let Some(token) = login(&client, &cli.base_url, user.email, user.password).await {
                tokens.push(token);
            }
        }
        login(&client, &cli.base_url, "nobody@example.com", "wrong").await;

        get_menu(&client, &cli.base_url).await;
        for token in &tokens {
            create_order(&client, &cli.base_url, token, valid_order()).await;
        }
        if let Some(token) = tokens.first() {
            create_order(&client, &cli.base_url, token, invalid_order()).await;
        }
        for token in &tokens {
            logout(&client, &cli.base_url, token).await;
        }

        if cli.rounds != 0 && round >= cli.rounds {
            break;
        }
        tokio::time::sleep(Duration::from_millis(cli.pause_ms)).await;
    }

    Ok(())
}

fn valid_order() -> Value {
    json!({
        "franchiseId": 1,
        "storeId": 1,
        "items": [
            { "menuId": 1, "description": "Veggie", "price": 0.05 },
            { "menuId": 2, "description": "Pepperoni", "price": 0.07 }
        ]
    })
}

fn invalid_order() -> Value {
    json!({
        "franchiseId": 999,
        "storeId": 999,
        "items": [{ "menuId": 999, "description": "Invalid Pizza", "price": 999.99 }]
    })
}

async fn register(client: &Client, base: &str, user: &SimUser) {
    let body = json!({ "name": user.name, "email": user.email, "password": user.password });
    match client.post(format!("{base}/auth")).json(&body).send().await {
        Ok(res) if res.status().is_success() => println!("Registered user: {}", user.email),
        Ok(res) if res.status() == StatusCode::CONFLICT => println!("User already registered: {}", user.email),
        Ok(res) => println!("Failed to register {}: {}", user.email, res.status()),
        Err(e) => eprintln!("Error registering {}: {e}", user.email),
    }
}

async fn login(client: &Client, base: &str, email: &str, password: &str) -> Option<String> {
    let body = json!({ "email": email, "password": password });
    let res = match client.put(format!("{base}/auth")).json(&body).send().await {
        Ok(res) => res,
        Err(e) => {
            eprintln!("Error logging in {email}: {e}");
            return None;
        }
    };
    if !res.status().is_success() {
        println!("Failed login attempt for: {email}");
        return None;
    }
    let data: Value = res.json().await.ok()?;
    println!("Logged in user: {email}");
    data.get("token").and_then(Value::as_str).map(str::to_string)
}

async fn logout(client: &Client, base: &str, token: &str) {
    if let Err(e) = client.delete(format!("{base}/auth")).bearer_auth(token).send().await {
        eprintln!("Error logging out: {e}");
    }
}

async fn get_menu(client: &Client, base: &str) {
    match client.get(format!("{base}/order/menu")).send().await {
        Ok(res) if res.status().is_success() => println!("Menu fetched successfully"),
        Ok(res) => println!("Failed to fetch menu: {}", res.status()),
        Err(e) => eprintln!("Error fetching menu: {e}"),
    }
}

async fn create_order(client: &Client, base: &str, token: &str, order: Value) {
    match client.post(format!("{base}/order")).bearer_auth(token).json(&order).send().await {
        Ok(res) if res.status().is_success() => println!("Order created"),
        Ok(res) => println!("Order rejected: {}", res.status()),
        Err(e) => eprintln!("Error creating order: {e}"),
    }
}
