//! Kuriftu Rewards CLI
//!
//! Command-line client for the rewards API:
//! - Sign up, log in and out
//! - Show membership, point history and bookings
//! - Book and cancel stays
//! - Submit bed, spa and dining registrations
//! - Generate a config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kuriftu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Kuriftu Rewards member client")]
#[command(long_about = "Kuriftu Rewards command-line client.\nCheck your tier and points, manage stays, and send spa and dining requests.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Session token (default: the one saved by `login`)
    #[arg(long, env = "KURIFTU_TOKEN", global = true)]
    pub token: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and save the session
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in and save the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// End the saved session
    Logout,

    /// Show tier, points and progress
    Membership,

    /// Show point history
    Points {
        /// Search in descriptions
        #[arg(short, long)]
        search: Option<String>,
        /// earn, redeem, all
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// all-time, last-30-days, last-90-days, this-year
        #[arg(short, long)]
        range: Option<String>,
        /// Write CSV to this file instead of printing
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Show bookings
    Bookings {
        /// Search hotel names and confirmation numbers
        #[arg(short, long)]
        search: Option<String>,
        /// upcoming, past, cancelled, all
        #[arg(long)]
        status: Option<String>,
        /// Location substring
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Book a stay
    Book {
        /// Check-in date (YYYY-MM-DD)
        check_in: String,
        /// Check-out date (YYYY-MM-DD)
        check_out: String,
        /// standard, deluxe, suite, presidential
        #[arg(short, long, default_value = "standard")]
        room: String,
        #[arg(short, long, default_value = "1")]
        guests: u8,
        /// Resort name
        #[arg(long)]
        hotel: Option<String>,
        /// Pay with points
        #[arg(long)]
        use_points: bool,
    },

    /// Cancel an upcoming stay
    Cancel {
        /// Booking id
        id: String,
    },

    /// Submit a registration form
    Register {
        /// bed, spa, dining
        kind: String,
        /// Form fields in key=value format (e.g. fullName="Abebe Kebede")
        #[arg(short = 'F', long = "field")]
        fields: Vec<String>,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Thin wrapper over reqwest that attaches the session token
struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base, path)
    }

    fn token(&self) -> anyhow::Result<&str> {
        self.token
            .as_deref()
            .context("Not signed in. Run `kuriftu login` first.")
    }

    async fn get(&self, path: &str) -> anyhow::Result<reqwest::Response> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(self.token()?)
            .send()
            .await?;
        check(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> anyhow::Result<reqwest::Response> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        check(request.send().await?).await
    }
}

/// Turn an API error body into a readable failure
async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = body["error"]["message"].as_str().unwrap_or("request failed");
    let mut details = String::new();
    if let Some(fields) = body["error"]["fields"].as_object() {
        for (field, msg) in fields {
            details.push_str(&format!("\n  {}: {}", field, msg.as_str().unwrap_or_default()));
        }
    }
    bail!("{} ({}){}", message, status, details)
}

fn session_file() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("kuriftu").join("session"))
}

fn save_token(token: &str) -> anyhow::Result<()> {
    let Some(path) = session_file() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, token)?;
    Ok(())
}

fn load_token() -> Option<String> {
    let token = std::fs::read_to_string(session_file()?).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Build `?a=1&b=2` from the parameters that are set
fn query_string(params: &[(&str, &Option<String>)]) -> String {
    let pairs: Vec<String> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

/// Parse `key=value` pairs into a form body
///
/// Numbers stay numbers; `dateRange.from=...` style keys build nested objects.
fn form_body(fields: &[String]) -> anyhow::Result<Value> {
    let mut body = serde_json::Map::new();
    for field in fields {
        let Some((key, raw)) = field.split_once('=') else {
            bail!("Invalid field {:?}, expected key=value", field);
        };
        let value = raw
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::from(raw));

        match key.split_once('.') {
            Some((outer, inner)) => {
                let entry = body
                    .entry(outer.to_string())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                if let Some(nested) = entry.as_object_mut() {
                    nested.insert(inner.to_string(), value);
                }
            }
            None => {
                body.insert(key.to_string(), value);
            }
        }
    }
    Ok(Value::Object(body))
}

fn cents(value: &Value) -> String {
    format!("{:.2}", value.as_i64().unwrap_or(0) as f64 / 100.0)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient {
        http: reqwest::Client::new(),
        base: cli.api_url.trim_end_matches('/').to_string(),
        token: cli.token.clone().or_else(load_token),
    };
    let as_json = cli.format == "json";

    match cli.command {
        Commands::Signup {
            name,
            age,
            email,
            password,
        } => {
            let body = json!({
                "fullName": name,
                "age": age,
                "email": email,
                "password": password,
            });
            let session: Value = client.post("/auth/signup", &body).await?.json().await?;
            save_token(session["token"].as_str().unwrap_or_default())?;
            println!(
                "Welcome to Kuriftu Rewards, {}",
                session["user"]["fullName"].as_str().unwrap_or("member")
            );
        }

        Commands::Login { email, password } => {
            let body = json!({ "email": email, "password": password });
            let session: Value = client.post("/auth/login", &body).await?.json().await?;
            save_token(session["token"].as_str().unwrap_or_default())?;
            println!(
                "Signed in as {}",
                session["user"]["email"].as_str().unwrap_or("-")
            );
        }

        Commands::Logout => {
            client.token()?;
            client.post("/auth/logout", &Value::Null).await?;
            if let Some(path) = session_file() {
                let _ = std::fs::remove_file(path);
            }
            println!("Signed out");
        }

        Commands::Membership => {
            let m: Value = client.get("/membership").await?.json().await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&m)?);
            } else {
                println!("Tier:            {}", m["tier"]["name"].as_str().unwrap_or("-"));
                println!("Points:          {}", m["points"].as_i64().unwrap_or(0));
                println!("Stays this year: {}", m["staysThisYear"].as_u64().unwrap_or(0));
                println!("Member since:    {}", m["memberSince"].as_str().unwrap_or("-"));
                match m["nextTier"]["name"].as_str() {
                    Some(next) => println!(
                        "Next tier:       {} ({} points to go, {:.0}%)",
                        next,
                        m["pointsToNextTier"].as_i64().unwrap_or(0),
                        m["progressPercentage"].as_f64().unwrap_or(0.0)
                    ),
                    None => println!("Next tier:       - (top tier)"),
                }
            }
        }

        Commands::Points {
            search,
            kind,
            range,
            export,
        } => {
            let query = query_string(&[("search", &search), ("type", &kind), ("range", &range)]);

            if let Some(path) = export {
                let csv = client
                    .get(&format!("/points/export{}", query))
                    .await?
                    .text()
                    .await?;
                std::fs::write(&path, csv)?;
                println!("Exported to {:?}", path);
                return Ok(());
            }

            let history: Value = client.get(&format!("/points{}", query)).await?.json().await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                print_points(&history);
            }
        }

        Commands::Bookings {
            search,
            status,
            location,
        } => {
            let query = query_string(&[
                ("search", &search),
                ("status", &status),
                ("location", &location),
            ]);
            let views: Value = client.get(&format!("/bookings{}", query)).await?.json().await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                for tab in ["upcoming", "past", "cancelled"] {
                    print_bookings(tab, &views[tab]);
                }
            }
        }

        Commands::Book {
            check_in,
            check_out,
            room,
            guests,
            hotel,
            use_points,
        } => {
            client.token()?;
            let mut body = json!({
                "checkIn": check_in,
                "checkOut": check_out,
                "roomType": room,
                "guests": guests,
                "usePoints": use_points,
            });
            if let Some(hotel) = hotel {
                body["hotel"] = Value::from(hotel);
            }
            let c: Value = client.post("/bookings", &body).await?.json().await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&c)?);
            } else {
                println!("Booked: {}", c["confirmationNumber"].as_str().unwrap_or("-"));
                println!("Total:  ${}", cents(&c["totalCostCents"]));
                if use_points {
                    println!("Points redeemed: {}", c["pointsRedeemed"].as_i64().unwrap_or(0));
                } else {
                    println!("Points earned:   {}", c["pointsEarned"].as_i64().unwrap_or(0));
                }
                if let Some(upgrades) = c["upgrades"].as_array().filter(|u| !u.is_empty()) {
                    println!("Upgrades:");
                    for upgrade in upgrades {
                        println!("  - {}", upgrade.as_str().unwrap_or_default());
                    }
                }
            }
        }

        Commands::Cancel { id } => {
            client.token()?;
            let path = format!("/bookings/{}/cancel", urlencoding::encode(&id));
            let booking: Value = client.post(&path, &Value::Null).await?.json().await?;
            println!(
                "Cancelled {} at {}",
                booking["confirmationNumber"].as_str().unwrap_or(&id),
                booking["hotel"].as_str().unwrap_or("-")
            );
        }

        Commands::Register { kind, fields } => {
            let body = form_body(&fields)?;
            let path = format!("/registrations/{}", urlencoding::encode(&kind));
            let result: Value = client.post(&path, &body).await?.json().await?;
            println!("{}", result["message"].as_str().unwrap_or("Submitted"));
        }

        Commands::Status => {
            let response = client
                .http
                .get(format!("{}/health", client.base))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;
                    println!("Kuriftu Rewards v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Store:      {}", health["store"].as_str().unwrap_or("unknown"));
                    println!("Listeners:  {}", health["listeners"].as_u64().unwrap_or(0));
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime:     {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to Kuriftu API at {}", client.base);
                    eprintln!();
                    eprintln!("Make sure the API server is running:");
                    eprintln!("  cargo run --bin kuriftu-api");
                    return Err(e.into());
                }
            }
        }

        Commands::Config { output } => {
            let config = kuriftu::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_points(history: &Value) {
    let summary = &history["summary"];
    println!(
        "Balance: {}   Earned: {}   Redeemed: {}",
        history["balance"].as_i64().unwrap_or(0),
        summary["totalEarned"].as_i64().unwrap_or(0),
        summary["totalRedeemed"].as_i64().unwrap_or(0)
    );
    println!();

    let transactions = match history["transactions"].as_array() {
        Some(t) if !t.is_empty() => t,
        _ => {
            println!("No transactions match the filters");
            return;
        }
    };

    println!("{:<12} {:<40} {:>8}", "Date", "Description", "Points");
    println!("{}", "-".repeat(62));
    for tx in transactions {
        println!(
            "{:<12} {:<40} {:>+8}",
            tx["date"].as_str().unwrap_or("-"),
            tx["description"].as_str().unwrap_or("-"),
            tx["points"].as_i64().unwrap_or(0)
        );
    }
}

fn print_bookings(tab: &str, bookings: &Value) {
    let bookings = bookings.as_array().map(Vec::as_slice).unwrap_or_default();
    println!("{} ({})", tab.to_uppercase(), bookings.len());
    for b in bookings {
        println!(
            "  {:<10} {:<28} {} -> {}  {}",
            b["confirmationNumber"].as_str().unwrap_or("-"),
            b["hotel"].as_str().unwrap_or("-"),
            b["checkIn"].as_str().unwrap_or("-"),
            b["checkOut"].as_str().unwrap_or("-"),
            b["id"].as_str().unwrap_or("-")
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let search = Some("lake view".to_string());
        let kind = None;
        let range = Some("this-year".to_string());
        assert_eq!(
            query_string(&[("search", &search), ("type", &kind), ("range", &range)]),
            "?search=lake%20view&range=this-year"
        );
        assert_eq!(query_string(&[("search", &None)]), "");
    }

    #[test]
    fn test_form_body() {
        let body = form_body(&[
            "fullName=Abebe Kebede".to_string(),
            "numberOfGuests=3".to_string(),
            "dateRange.from=2030-01-02".to_string(),
            "dateRange.to=2030-01-05".to_string(),
        ])
        .unwrap();
        assert_eq!(body["fullName"], "Abebe Kebede");
        assert_eq!(body["numberOfGuests"], 3);
        assert_eq!(body["dateRange"]["from"], "2030-01-02");
        assert_eq!(body["dateRange"]["to"], "2030-01-05");

        assert!(form_body(&["missing-equals".to_string()]).is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(3_700), "1h 1m");
        assert_eq!(format_duration(90_000), "1d 1h");
    }
}
