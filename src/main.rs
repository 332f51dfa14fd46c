// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use hypermedium::config::{load_config, RuntimeBuilder};
use hypermedium::engine::{Event, HypermediaEngine};
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::EnvFilter;

/// Collect every `.json` file below `dir`, sorted for a stable load order.
fn collect_json_files(dir: &Path, found: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, found)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            found.push(path);
        }
    }
    found.sort();
    Ok(())
}

/// URI of a file relative to the site root, always with a leading slash.
fn uri_for(root: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path.strip_prefix(root)?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(format!("/{}", segments.join("/")))
}

async fn load_site(engine: &HypermediaEngine, root: &Path) -> anyhow::Result<Vec<String>> {
    let mut files = Vec::new();
    collect_json_files(root, &mut files)?;

    let mut uris = Vec::with_capacity(files.len());
    for path in files {
        let content = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let document: serde_json::Value =
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        let uri = uri_for(root, &path)?;
        engine.load_resource(&uri, document);
        uris.push(uri);
    }
    Ok(uris)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <config.yaml|config.toml> <site-dir>", args[0]);
        eprintln!("Example: {} hypermedium.yaml site/", args[0]);
        std::process::exit(1);
    }

    let config = load_config(&args[1]).with_context(|| format!("loading {}", args[1]))?;
    let engine = RuntimeBuilder::new(config).build().await?;
    let mut events = engine.subscribe();

    let start = Instant::now();
    let root = PathBuf::from(&args[2]);
    let uris = load_site(&engine, &root).await?;
    for uri in &uris {
        engine.process_resource(uri).await;
    }
    engine.settle().await;

    let mut warnings = 0;
    let mut errors = 0;
    loop {
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Lagged(skipped)) => {
                eprintln!("warning: {} events dropped", skipped);
                continue;
            }
            Err(_) => break,
        };
        match event {
            Event::Warning { message } => {
                warnings += 1;
                eprintln!("warning: {}", message);
            }
            Event::ProcessorError { uri, error } => {
                errors += 1;
                eprintln!("error: {}: {}", uri, error);
            }
            Event::DynamicResourceError { dynamic_resource, error, .. } => {
                errors += 1;
                eprintln!("error: dynamic resource '{}': {}", dynamic_resource, error);
            }
            _ => {}
        }
    }

    for uri in engine.uris() {
        if let Some(resource) = engine.get_resource(&uri) {
            println!("{}", uri);
            println!("{}", serde_json::to_string_pretty(&resource)?);
        }
    }

    eprintln!(
        "Processed {} loaded resources ({} nodes) in {:?}: {} warnings, {} errors",
        uris.len(),
        engine.uris().len(),
        start.elapsed(),
        warnings,
        errors
    );
    Ok(())
}
