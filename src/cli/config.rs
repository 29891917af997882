//! `switchyard config init`

use crate::cli::ConfigInitArgs;
use crate::config::EXAMPLE_CONFIG;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Write the annotated example config to `path`.
///
/// Without `force` the file must not exist yet; the check and the create are
/// one `create_new` open.
fn write_example_config(path: &Path, force: bool) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path)?.write_all(EXAMPLE_CONFIG.as_bytes())
}

pub fn handle_config_init(args: &ConfigInitArgs) -> Result<(), Box<dyn std::error::Error>> {
    match write_example_config(&args.output, args.force) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(format!(
                "{} already exists (pass --force to replace it)",
                args.output.display()
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    }

    println!("✓ Wrote {}", args.output.display());
    println!(
        "  Point [[providers]] at your upstreams, then run `switchyard serve -c {}`.",
        args.output.display()
    );
    Ok(())
}
