use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reconview_metrics::MetricsReport;
use reconview_visualization::{catalog, Catalog, SampleGroup, ViewerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reconview", version, about = "Compare surface reconstructions with their source point clouds")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive viewer (default)
    View {
        /// Directory holding the reconstructed meshes and point clouds
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Reconstruction shown at startup
        #[arg(long)]
        select: Option<String>,

        /// RON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print quality metrics for a mesh, optionally against its source cloud
    Metrics {
        #[arg(long)]
        mesh: PathBuf,

        #[arg(long)]
        cloud: Option<PathBuf>,

        /// Emit JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the selectable reconstructions and whether their files exist
    List {
        #[arg(long, default_value = "assets")]
        assets: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::View {
        assets: None,
        select: None,
        config: None,
    }) {
        Command::View {
            assets,
            select,
            config,
        } => view(assets, select, config),
        Command::Metrics { mesh, cloud, json } => metrics(mesh, cloud, json),
        Command::List { assets } => list(assets),
    }
}

fn view(assets: Option<PathBuf>, select: Option<String>, config: Option<PathBuf>) -> Result<()> {
    let mut config = match config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(assets) = assets {
        config.assets_dir = assets;
    }
    if let Some(select) = select {
        config.initial_selection = select;
    }
    if !catalog::is_known(&config.initial_selection) {
        bail!("Unknown reconstruction '{}'; run `reconview list`", config.initial_selection);
    }

    reconview_visualization::run(config)
}

fn metrics(mesh_path: PathBuf, cloud_path: Option<PathBuf>, json: bool) -> Result<()> {
    let mesh = reconview_io::read_mesh(&mesh_path)
        .with_context(|| format!("Failed to load mesh {}", mesh_path.display()))?;
    let cloud = cloud_path
        .as_ref()
        .map(|path| {
            reconview_io::read_point_cloud(path)
                .with_context(|| format!("Failed to load point cloud {}", path.display()))
        })
        .transpose()?;

    let name = mesh_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");
    let report = MetricsReport::compute(name, &mesh, cloud.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn list(assets: PathBuf) -> Result<()> {
    let catalog = Catalog::new(assets);
    for group in SampleGroup::ALL {
        println!("{}", group.title());
        for option in group.options() {
            let mesh = if catalog.mesh_path(option.key).is_file() { "mesh" } else { "no mesh" };
            let cloud = match catalog.cloud_path(option.key) {
                Some(path) => path.display().to_string(),
                None => "no cloud".to_string(),
            };
            println!("  {:<32} {:<32} [{}, {}]", option.key, option.label, mesh, cloud);
        }
    }
    Ok(())
}
