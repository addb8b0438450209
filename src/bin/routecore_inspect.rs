use anyhow::Context;
use clap::{Parser, Subcommand};
use routecore::logging::{init_logging, LogConfig};
use routecore::router::RouteMatch;
use routecore::{load_route_table, HttpMethod, Resolution};
use serde_json::json;
use std::path::PathBuf;

/// Inspect how a route table resolves requests
#[derive(Parser)]
#[command(name = "routecore-inspect")]
#[command(about = "Load a route table and show how requests resolve", long_about = None)]
struct Cli {
    /// Route table file (.yaml, .yml, .json or .toml)
    #[arg(short, long, env = "ROUTECORE_ROUTES")]
    routes: PathBuf,

    /// Print machine-readable JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every registered route in registration order
    Dump,
    /// Resolve a single request and show filters and the selected handler
    Match {
        /// HTTP method (get, post, ...)
        method: String,
        /// Request path, e.g. /users/42
        path: String,
        /// Accept header value
        #[arg(short, long)]
        accept: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&LogConfig::from_env())?;

    let router = load_route_table(&cli.routes)?;

    match cli.command {
        Command::Dump => {
            if cli.json {
                let routes: Vec<_> = router
                    .registry()
                    .entries()
                    .map(|e| {
                        json!({
                            "method": e.method().as_str(),
                            "path": e.path().as_str(),
                            "accept": e.accept_type(),
                            "handler": e.target(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&routes)?);
            } else {
                for entry in router.registry().entries() {
                    println!("{entry} -> {}", entry.target());
                }
            }
        }
        Command::Match {
            method,
            path,
            accept,
        } => {
            let method: HttpMethod = method
                .parse()
                .with_context(|| format!("Cannot resolve method '{method}'"))?;
            let plan = router.plan(method, &path, accept.as_deref());

            let status = plan.resolution.status();
            let handler = match &plan.resolution {
                Resolution::Matched(m) => Some(m),
                _ => None,
            };

            if cli.json {
                let out = json!({
                    "status": status.as_u16(),
                    "before": plan.before.iter().map(describe).collect::<Vec<_>>(),
                    "handler": handler.map(describe),
                    "after": plan.after.iter().map(describe).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for f in &plan.before {
                    println!("before  {} ({})", f.target, f.matched_path);
                }
                match handler {
                    Some(m) => {
                        println!("handler {} ({} [{}])", m.target, m.matched_path, m.accept_type);
                        for (name, value) in &m.path_params {
                            println!("  {name} = {value}");
                        }
                    }
                    None => println!("handler <none> ({status})"),
                }
                for f in &plan.after {
                    println!("after   {} ({})", f.target, f.matched_path);
                }
            }
        }
    }

    Ok(())
}

fn describe(m: &RouteMatch<'_, String>) -> serde_json::Value {
    json!({
        "handler": m.target,
        "pattern": m.matched_path,
        "accept": m.accept_type,
        "params": m.path_params_map(),
    })
}
