// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::StageConfig;
use crate::traits::{Mount, StaticMounts};

#[derive(Parser, Debug, Clone)]
#[command(name = "canvas-stage")]
#[command(about = "Interactive 3D model canvases", long_about = None)]
pub struct Cli {
    /// Stage configuration (JSON); the built-in page scenes are used when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory that asset URLs are resolved against
    #[arg(long, default_value = ".")]
    pub assets: PathBuf,

    /// Mount a canvas as `id=WIDTHxHEIGHT`; repeatable. Defaults to every configured canvas.
    #[arg(long = "mount", value_parser = parse_mount)]
    pub mounts: Vec<(String, Mount)>,

    /// Log actions instead of opening URLs
    #[arg(long = "dry-run", default_value = "false")]
    pub dry_run: bool,

    /// Exit after this many frames
    #[arg(long)]
    pub frames: Option<u64>,
}

impl Cli {
    /// Canvases present on this "page"
    pub fn mount_registry(&self, config: &StageConfig) -> StaticMounts {
        if !self.mounts.is_empty() {
            return self
                .mounts
                .iter()
                .fold(StaticMounts::new(), |mounts, (id, mount)| mounts.with(id.clone(), *mount));
        }
        config.scenes.iter().fold(StaticMounts::new(), |mounts, scene| {
            let [width, height] = scene.preferred_size;
            mounts.with(scene.canvas_id.clone(), Mount::new(width, height))
        })
    }
}

fn parse_mount(s: &str) -> Result<(String, Mount), String> {
    let (id, size) = s
        .split_once('=')
        .ok_or_else(|| format!("expected id=WIDTHxHEIGHT, got {:?}", s))?;
    let (width, height) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", size))?;
    let width: u32 = width.trim().parse().map_err(|e| format!("bad width {:?}: {}", width, e))?;
    let height: u32 = height.trim().parse().map_err(|e| format!("bad height {:?}: {}", height, e))?;
    if id.is_empty() || width == 0 || height == 0 {
        return Err(format!("invalid mount {:?}", s));
    }
    Ok((id.to_string(), Mount::new(width, height)))
}
