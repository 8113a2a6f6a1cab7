mod loader;
mod model;
mod parser;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use model::PolicyDocument;

#[derive(Parser)]
#[command(name = "cyber_brief", about = "Competition README policy extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a README and print the extracted policy
    Parse {
        /// Path to the README HTML file
        readme: PathBuf,
        /// Emit the full document as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// List detected sections and their sizes
    Sections {
        /// Path to the README HTML file
        readme: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { readme, json } => {
            let doc = loader::parse_file(&readme).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_summary(&doc);
            }
        }
        Commands::Sections { readme } => {
            let doc = loader::parse_file(&readme).await;
            if doc.sections.is_empty() {
                println!("No sections detected.");
                return Ok(());
            }
            println!("{:<40} | {:>8}", "Heading", "Bytes");
            println!("{}", "-".repeat(51));
            for s in &doc.sections {
                println!("{:<40} | {:>8}", truncate(&s.heading, 40), s.body.len());
            }
        }
    }

    Ok(())
}

fn print_summary(doc: &PolicyDocument) {
    if !doc.title.is_empty() {
        println!("{}", doc.title);
    }
    if !doc.operating_system.is_empty() {
        println!("OS: {}", doc.operating_system);
    }

    if !doc.administrators.is_empty() || !doc.users.is_empty() {
        println!("\n--- Accounts ---");
        for u in &doc.administrators {
            println!(
                "  admin {:<20}{}{}",
                u.username,
                if u.is_primary_user { " (primary)" } else { "" },
                if u.password.is_some() { " [password]" } else { "" },
            );
        }
        for u in &doc.users {
            println!("  user  {}", u.username);
        }
    }

    if !doc.required_software.is_empty() || !doc.prohibited_software.is_empty() {
        println!("\n--- Software ---");
        for r in &doc.required_software {
            println!(
                "  require {:<24}{}{}",
                r.name,
                if r.should_be_latest { " latest" } else { "" },
                r.notes.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default(),
            );
        }
        for p in &doc.prohibited_software {
            println!("  prohibit {}", p);
        }
    }

    if !doc.critical_services.is_empty() || !doc.prohibited_services.is_empty() {
        println!("\n--- Services ---");
        for s in &doc.critical_services {
            println!("  keep    {}", s);
        }
        for s in &doc.prohibited_services {
            println!("  disable {}", s);
        }
    }

    for g in &doc.group_requirements {
        println!("\n--- Group {} ---", g.group_name);
        for m in &g.members {
            println!("  {}", m);
        }
    }

    if !doc.users_to_create.is_empty() {
        println!("\n--- Users to create ---");
        for u in &doc.users_to_create {
            println!("  {}", u);
        }
    }

    if !doc.actionable_items.is_empty() {
        println!("\n--- Actionable items ---");
        for item in &doc.actionable_items {
            println!("  {:<22} {}", format!("{:?}", item.kind), item.description);
        }
    }

    if !doc.guidelines.is_empty() {
        println!("\n--- Guidelines ---");
        for g in &doc.guidelines {
            println!("  - {}", g);
        }
    }

    println!(
        "\n{} accounts | {} software rules | {} service rules | {} items",
        doc.administrators.len() + doc.users.len(),
        doc.required_software.len() + doc.prohibited_software.len(),
        doc.critical_services.len() + doc.prohibited_services.len(),
        doc.actionable_items.len(),
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
