use anyhow::Result;
use gpx_to_sqlite::{
    cli::{Cli, Commands},
    gpx::{export_gpx, import_gpx_file, ExportOptions, ImportOptions},
    schema::table_names,
    store::GeocacheDb,
};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Import {
            gpx_file,
            db,
            strict,
        } => {
            let start = Instant::now();

            let mut store = GeocacheDb::open(&db)?;
            import_gpx_file(&mut store, &gpx_file, ImportOptions { strict })?;

            let elapsed = start.elapsed();
            println!(
                "Imported {:?} into {:?} in {:.1}s",
                gpx_file,
                db,
                elapsed.as_secs_f64()
            );
        }

        Commands::Export {
            db,
            output,
            caches,
            max_logs,
            waypoints,
        } => {
            let start = Instant::now();

            let store = GeocacheDb::open(&db)?;
            let options = ExportOptions {
                list: caches,
                max_logs,
                waypoints,
            };
            let xml = export_gpx(&store, &options)?;
            std::fs::write(&output, xml)?;

            let elapsed = start.elapsed();
            println!(
                "Exported {} caches to {:?} in {:.1}s",
                options.list.len(),
                output,
                elapsed.as_secs_f64()
            );
        }

        Commands::ListTables => {
            println!("Available tables:\n");
            for name in table_names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}
