use crate::args::ScanArgs;
use classscan_core::{ResourceScanner, Root, RootKind};
use classscan_plugin::ScopeId;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct RootSummary<'a> {
    origin: &'a Path,
    kind: RootKind,
    scope: ScopeId,
    loader: &'a str,
    resources: usize,
}

impl<'a> From<&'a Root> for RootSummary<'a> {
    fn from(root: &'a Root) -> Self {
        Self {
            origin: root.origin(),
            kind: root.kind(),
            scope: root.scope(),
            loader: root.loader().name(),
            resources: root.resources().len(),
        }
    }
}

pub fn run(args: &ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = args.loader()?;
    let scanner = ResourceScanner::new(&loader, &args.scan_config()?)?;
    let summaries: Vec<RootSummary<'_>> = scanner.roots().iter().map(RootSummary::from).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for s in &summaries {
            let kind = match s.kind {
                RootKind::Directory => "dir",
                RootKind::Archive => "jar",
            };
            println!(
                "{:<4} {:<9} {:>6}  {}",
                kind,
                s.scope.to_string(),
                s.resources,
                s.origin.display()
            );
        }
    }
    Ok(())
}
