//! Generate the layer catalog of every variant of one product version.
//!
//! Reads the run description (`--metadata`), copies each feature pack's
//! documentation from a local mirror, and writes
//! `<output>/<version>/<variant>/wildfly-catalog.json`.

use anyhow::{Result, anyhow, bail};
use layer_catalog::{CatalogGenerator, CatalogMetadata, MirrorDocSource, env_value, init_logging};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const DEFAULT_OUTPUT: &str = "target/catalog";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse(env::args_os().skip(1))?;
    init_logging("info")?;

    let metadata = CatalogMetadata::load(&args.metadata)?;
    let descriptions = metadata.load_rule_descriptions()?;
    let source = MirrorDocSource::new(&args.mirror);
    let generator =
        CatalogGenerator::new(&metadata, &descriptions, &source, &args.version, &args.output);
    let written = generator.run()?;
    tracing::info!(
        variants = written.len(),
        output = %args.output.display(),
        "catalog generated"
    );
    Ok(())
}

#[derive(Debug)]
struct CliArgs {
    metadata: PathBuf,
    mirror: PathBuf,
    output: PathBuf,
    version: String,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = OsString>) -> Result<Self> {
        let mut metadata: Option<PathBuf> = None;
        let mut mirror: Option<PathBuf> = env_value("CATALOG_MIRROR").map(PathBuf::from);
        let mut output: Option<PathBuf> = None;
        let mut version: Option<String> = env_value("CATALOG_VERSION")
            .map(|v| v.to_string_lossy().into_owned());

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--metadata" => metadata = Some(PathBuf::from(next_value(&mut args, "--metadata")?)),
                "--mirror" => mirror = Some(PathBuf::from(next_value(&mut args, "--mirror")?)),
                "--output" => output = Some(PathBuf::from(next_value(&mut args, "--output")?)),
                "--version" => version = Some(next_value(&mut args, "--version")?),
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let version = version.ok_or_else(|| anyhow!("--version (or CATALOG_VERSION) is required"))?;
        if version.trim().is_empty() || version.contains(['/', '\\']) {
            bail!("invalid version '{version}'");
        }
        Ok(CliArgs {
            metadata: metadata.ok_or_else(|| anyhow!("--metadata is required"))?,
            mirror: mirror.ok_or_else(|| anyhow!("--mirror (or CATALOG_MIRROR) is required"))?,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            version,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: catalog-generate --metadata PATH --version VERSION [--mirror DIR] [--output DIR]\n\
Builds the layer catalog of every variant listed in the metadata file.\n\
--mirror defaults to $CATALOG_MIRROR, --version to $CATALOG_VERSION, --output to target/catalog.\n\
Log filtering follows $CATALOG_LOG (default: info).\n"
}
