use crate::args::ScanArgs;
use classscan_core::ResourceScanner;
use tracing::info;

pub fn run(args: &ScanArgs) -> Result<(), Box<dyn std::error::Error>> {
    let loader = args.loader()?;
    let scanner = ResourceScanner::new(&loader, &args.scan_config()?)?;
    let resources = scanner.all_resources();
    info!("{} resources in {} roots", resources.len(), scanner.roots().len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resources)?);
    } else {
        for name in &resources {
            println!("{name}");
        }
    }
    Ok(())
}
