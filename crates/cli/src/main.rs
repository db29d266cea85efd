use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Deserialize;

/// Map centre used when no report carries coordinates
const DEFAULT_CENTRE: (f64, f64) = (0.0, 0.0);

/// Largest number of images accepted per submission
const MAX_IMAGES: usize = 4;

#[derive(Parser)]
#[command(name = "amani", version, about = "Client for the Amani Reporting & Support API")]
struct Cli {
    /// Base URL of the API server
    #[arg(
        long,
        env = "AMANI_API",
        default_value = "http://localhost:5000",
        global = true
    )]
    api: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a new incident report
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Free-text place name
        #[arg(long)]
        location: Option<String>,
        #[arg(long, requires = "longitude")]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude")]
        longitude: Option<f64>,
        /// Submit without attaching an identity
        #[arg(long, action = ArgAction::Set, default_value_t = true)]
        anonymous: bool,
        /// Tag the report; repeatable, comma-separated values are split
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Attach an image file; repeatable
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// List recent reports, newest first
    List {
        /// Only show reports in this status
        #[arg(long)]
        status: Option<String>,
        /// Also print descriptions, tags and image paths
        #[arg(long)]
        full: bool,
    },
    /// Change the status of a report (admin)
    Resolve {
        id: String,
        #[arg(long, default_value = "resolved")]
        status: String,
        #[arg(long, env = "AMANI_ADMIN_TOKEN", hide_env_values = true)]
        admin_token: String,
    },
    /// Print per-status report counts
    Summary,
    /// Print map centre and markers for geo-tagged reports
    Map,
}

#[derive(Deserialize)]
struct Report {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    anonymous: bool,
    status: String,
    created_at: String,
}

#[derive(Deserialize)]
struct ReportSummary {
    total: u64,
    open: u64,
    in_progress: u64,
    resolved: u64,
}

/// Split repeated and comma-separated tag input into a trimmed list
fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    tags.iter()
        .flat_map(|tag| tag.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

fn coordinates(report: &Report) -> Option<(f64, f64)> {
    report.latitude.zip(report.longitude)
}

/// Coordinate average of the given points
fn centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }

    let count = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), point| (lat + point.0, lng + point.1));

    Some((lat / count, lng / count))
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Server errors carry a {"type": ...} body
    let kind = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body["type"].as_str().map(String::from))
        .unwrap_or_else(|| "unknown error".to_string());

    bail!("request failed ({status}): {kind}")
}

async fn submit(
    client: &reqwest::Client,
    api: &str,
    title: String,
    description: String,
    location: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    anonymous: bool,
    tags: Vec<String>,
    images: Vec<PathBuf>,
) -> Result<()> {
    if images.len() > MAX_IMAGES {
        bail!("at most {MAX_IMAGES} images can be attached");
    }

    let url = format!("{api}/api/reports");
    let tags = normalise_tags(tags);

    let request = if images.is_empty() {
        let mut body = serde_json::json!({
            "title": title,
            "description": description,
            "anonymous": anonymous,
            "tags": tags,
        });
        if let Some(location) = location {
            body["location"] = location.into();
        }
        if let Some(latitude) = latitude {
            body["latitude"] = latitude.into();
        }
        if let Some(longitude) = longitude {
            body["longitude"] = longitude.into();
        }

        client.post(&url).json(&body)
    } else {
        let mut form = reqwest::multipart::Form::new()
            .text("title", title)
            .text("description", description)
            .text("anonymous", anonymous.to_string())
            .text("tags", tags.join(","));

        if let Some(location) = location {
            form = form.text("location", location);
        }
        if let Some(latitude) = latitude {
            form = form.text("latitude", latitude.to_string());
        }
        if let Some(longitude) = longitude {
            form = form.text("longitude", longitude.to_string());
        }

        for path in images {
            let contents = tokio::fs::read(&path)
                .await
                .with_context(|| format!("could not read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "image".to_string());
            form = form.part(
                "images",
                reqwest::multipart::Part::bytes(contents).file_name(filename),
            );
        }

        client.post(&url).multipart(form)
    };

    let report: Report = expect_success(request.send().await?).await?.json().await?;
    println!("created report {}", report.id);
    Ok(())
}

async fn list(
    client: &reqwest::Client,
    api: &str,
    status: Option<String>,
    full: bool,
) -> Result<()> {
    let mut request = client.get(format!("{api}/api/reports"));
    if let Some(status) = status {
        request = request.query(&[("status", status)]);
    }

    let reports: Vec<Report> = expect_success(request.send().await?).await?.json().await?;
    if reports.is_empty() {
        println!("no reports");
        return Ok(());
    }

    for report in reports {
        println!(
            "{}  {:<11}  {}  {}",
            report.id, report.status, report.created_at, report.title
        );

        if full {
            println!("    {}", report.description);
            if !report.tags.is_empty() {
                println!("    tags: {}", report.tags.join(", "));
            }
            for image in &report.images {
                println!("    image: {image}");
            }
        }
    }

    Ok(())
}

async fn resolve(
    client: &reqwest::Client,
    api: &str,
    id: String,
    status: String,
    admin_token: String,
) -> Result<()> {
    let report: Report = expect_success(
        client
            .patch(format!("{api}/api/reports/{id}"))
            .bearer_auth(admin_token)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?,
    )
    .await?
    .json()
    .await?;

    println!("report {} is now {}", report.id, report.status);
    Ok(())
}

async fn summary(client: &reqwest::Client, api: &str) -> Result<()> {
    let summary: ReportSummary =
        expect_success(client.get(format!("{api}/api/reports/summary")).send().await?)
            .await?
            .json()
            .await?;

    println!("total        {}", summary.total);
    println!("open         {}", summary.open);
    println!("in progress  {}", summary.in_progress);
    println!("resolved     {}", summary.resolved);
    Ok(())
}

async fn map(client: &reqwest::Client, api: &str) -> Result<()> {
    let reports: Vec<Report> =
        expect_success(client.get(format!("{api}/api/reports")).send().await?)
            .await?
            .json()
            .await?;

    let markers: Vec<(&Report, (f64, f64))> = reports
        .iter()
        .filter_map(|report| coordinates(report).map(|point| (report, point)))
        .collect();

    let points: Vec<(f64, f64)> = markers.iter().map(|(_, point)| *point).collect();
    match centroid(&points) {
        Some((lat, lng)) => println!("centre {lat:.5}, {lng:.5}"),
        None => {
            let (lat, lng) = DEFAULT_CENTRE;
            println!("centre {lat:.5}, {lng:.5} (default, no geo-tagged reports)")
        }
    }

    for (report, (lat, lng)) in markers {
        println!(
            "{lat:.5}, {lng:.5}  [{}]  {}{}",
            report.status,
            report.title,
            if report.anonymous { " (anonymous)" } else { "" }
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = cli.api.trim_end_matches('/').to_string();

    match cli.command {
        Command::Submit {
            title,
            description,
            location,
            latitude,
            longitude,
            anonymous,
            tags,
            images,
        } => {
            submit(
                &client,
                &api,
                title,
                description,
                location,
                latitude,
                longitude,
                anonymous,
                tags,
                images,
            )
            .await
        }
        Command::List { status, full } => list(&client, &api, status, full).await,
        Command::Resolve {
            id,
            status,
            admin_token,
        } => resolve(&client, &api, id, status, admin_token).await,
        Command::Summary => summary(&client, &api).await,
        Command::Map => map(&client, &api).await,
    }
}
