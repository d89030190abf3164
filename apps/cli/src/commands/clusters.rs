//! Cluster collection commands

use clap::{Args, Subcommand};
use strato_client::Connection;

use super::{cluster_header, cluster_row, expect_body, print_json};

#[derive(Subcommand, Debug)]
pub enum ClustersCommands {
    /// List clusters
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter, e.g. "state = 'ready'"
    #[arg(long)]
    pub search: Option<String>,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Items per page
    #[arg(long, default_value_t = 100)]
    pub size: u32,
    /// Print the raw page as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(cmd: ClustersCommands, conn: &Connection) -> anyhow::Result<()> {
    match cmd {
        ClustersCommands::List(args) => list(conn, args).await,
    }
}

async fn list(conn: &Connection, args: ListArgs) -> anyhow::Result<()> {
    let mut request = conn
        .clusters_mgmt()
        .v1()
        .clusters()
        .list()
        .page(args.page)
        .size(args.size);
    if let Some(search) = &args.search {
        request = request.search(search);
    }

    let page = expect_body(request.send().await?, "list clusters")?;
    if args.json {
        return print_json(&page);
    }

    println!("{}", cluster_header());
    for cluster in page.items() {
        println!("{}", cluster_row(cluster));
    }
    if page.has_more(args.size) {
        eprintln!(
            "showing page {} of {} clusters; use --page {} for more",
            args.page,
            page.total.unwrap_or_default(),
            args.page + 1
        );
    }
    Ok(())
}
