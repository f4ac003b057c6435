use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Operator CLI for the society gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Session cookie forwarded to the backend (e.g. `connect.sid=...`).
    #[arg(short, long, env = "GATEWAY_COOKIE")]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gateway health and backend target
    Health,
    /// List employees with stats
    Employees,
    /// List residents
    Residents,
    /// List bills and payment status
    Payments,
    /// List the current resident's complaints
    Complaints,
    /// Delete a resident by id
    DeleteResident { id: String },
    /// Mark a bill as paid
    MarkPaid { id: String },
    /// Create a bill for every resident
    CreateBill {
        #[arg(long)]
        title: String,
        #[arg(long = "type")]
        bill_type: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        due_date: String,
        #[arg(long)]
        penalty: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(cookie) = &cli.cookie {
        headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
    }

    let request = match cli.command {
        Commands::Health => client.get(format!("{base}/healthz")),
        Commands::Employees => client.get(format!("{base}/api/admin/employees")),
        Commands::Residents => client.get(format!("{base}/api/admin/residents")),
        Commands::Payments => client.get(format!("{base}/api/admin/payments")),
        Commands::Complaints => client.get(format!("{base}/api/resident/complaints")),
        Commands::DeleteResident { id } => client.delete(format!("{base}/api/admin/residents/{id}")),
        Commands::MarkPaid { id } => client.put(format!("{base}/api/admin/payments/{id}")),
        Commands::CreateBill {
            title,
            bill_type,
            amount,
            due_date,
            penalty,
        } => client.post(format!("{base}/api/admin/payments")).json(&json!({
            "title": title,
            "type": bill_type,
            "amount": amount,
            "penalty": penalty,
            "dueDate": due_date,
        })),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{rendered}");
    } else {
        eprintln!("Error: gateway returned status {status}");
        eprintln!("{rendered}");
    }
    Ok(())
}
