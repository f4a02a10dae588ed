//! Show command implementation

use super::Context;
use super::helpers::resolve_manifest;
use crate::cli::{OutputFormat, ShowArgs};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::ui::display;

pub fn run(ctx: &Context, args: ShowArgs) -> Result<()> {
    let target = resolve_manifest(args.path, ctx.config_path())?;
    let source = target.read_source()?;
    let manifest = Manifest::parse_named(&source, &target.label())?;

    match ctx.format {
        OutputFormat::Text => print!("{}", display::manifest(&manifest, &target.label())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&manifest)?),
        OutputFormat::Yaml => print!("{}", render_yaml(&manifest)?),
    }
    Ok(())
}

fn render_yaml(manifest: &Manifest) -> Result<String> {
    serde_yaml::to_string(manifest)
        .map_err(|e| crate::error::fs::io_error(format!("Failed to render YAML: {e}")))
}
