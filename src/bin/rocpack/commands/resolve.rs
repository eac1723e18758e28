//! `rocpack resolve` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::{GlobalArgs, ResolveArgs};
use crate::commands::Session;
use rocpack::core::depends::translate_dependencies_for;
use rocpack::core::naming::resolve_name_for;
use rocpack::{PackageFormat, PackagingError};

#[derive(Serialize)]
struct Resolved {
    package: String,
    format: PackageFormat,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    depends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommends: Option<String>,
}

pub fn execute(args: ResolveArgs, global: &GlobalArgs) -> Result<()> {
    let session = Session::new(global)?;
    let catalog = session.load_catalog(global)?;
    let cfg = session.build_config(&args.release)?;

    let mut resolved = Vec::new();
    for name in &args.names {
        let pkg = catalog
            .get(name)
            .ok_or_else(|| PackagingError::UnknownPackage { name: name.clone() })?;
        let lists = pkg.depends();

        for format in PackageFormat::selection(args.pkg_type) {
            let (depends, recommends) = if args.depends {
                match format {
                    PackageFormat::Deb => (
                        translate_dependencies_for(&catalog, &lists.deb_depends, &cfg, format),
                        String::new(),
                    ),
                    PackageFormat::Rpm => (
                        translate_dependencies_for(&catalog, &lists.rpm_requires, &cfg, format),
                        translate_dependencies_for(&catalog, &lists.rpm_recommends, &cfg, format),
                    ),
                }
            } else {
                (String::new(), String::new())
            };

            resolved.push(Resolved {
                package: pkg.name().to_string(),
                format,
                name: resolve_name_for(pkg, &cfg, format),
                depends: args.depends.then_some(depends),
                recommends: (args.depends && format == PackageFormat::Rpm)
                    .then_some(recommends),
            });
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    for entry in &resolved {
        println!("{} ({}): {}", entry.package, entry.format, entry.name);
        if let Some(depends) = &entry.depends {
            println!("  depends: {depends}");
        }
        if let Some(recommends) = &entry.recommends {
            println!("  recommends: {recommends}");
        }
    }
    Ok(())
}
