//! Export include files.
//!
//! Every export set gets a primary file defining its top-level targets, and
//! one `<stem>-<component>.<ext>` file per component. The targets fragment
//! includes these by name, so [`verify_exports`] checks every required
//! include against the rendered files before anything is written.

use crate::core::export::{ExportRecord, ExportedTarget};
use crate::core::package::PackageConfig;
use crate::directive::{Directive, DirectiveSerializer, ImportedTarget};
use crate::generate::{Fragment, GenerateError};

/// One rendered export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// File name, relative to the config directory
    pub file_name: String,

    /// Export set the file belongs to
    pub export: String,

    /// Component, for component files
    pub component: Option<String>,

    pub contents: String,
}

/// Render every export file of `pkg`.
pub fn export_files(pkg: &PackageConfig, serializer: &dyn DirectiveSerializer) -> Vec<ExportFile> {
    let depth = pkg.config_depth();
    let mut files = Vec::new();

    for export in &pkg.exports {
        files.push(ExportFile {
            file_name: export.file_name(),
            export: export.name.clone(),
            component: None,
            contents: serializer.render(&export_directives(export, None, &export.targets, depth)),
        });

        for component in &export.components {
            files.push(ExportFile {
                file_name: export.component_file_name(&component.name),
                export: export.name.clone(),
                component: Some(component.name.clone()),
                contents: serializer.render(&export_directives(
                    export,
                    Some(&component.name),
                    &component.targets,
                    depth,
                )),
            });
        }
    }

    files
}

fn export_directives(
    export: &ExportRecord,
    component: Option<&str>,
    targets: &[ExportedTarget],
    depth: usize,
) -> Vec<Directive> {
    let title = match component {
        Some(component) => format!("Targets of export set {} (component {})", export.name, component),
        None => format!("Targets of export set {}", export.name),
    };

    let mut directives = vec![
        Directive::Comment(format!("{}.\nGenerated by pkgmeta. Do not edit.", title)),
        Directive::Blank,
        Directive::ImportPrefix { depth },
    ];
    directives.extend(targets.iter().map(|target| {
        Directive::ImportedTarget(ImportedTarget {
            name: export.qualified(&target.name),
            kind: target.kind,
            location: target.location.clone(),
        })
    }));
    directives.push(Directive::Blank);
    directives.push(Directive::Unset("_IMPORT_PREFIX".to_string()));
    directives
}

/// Check that every required include of the targets fragment names a
/// produced file.
pub fn verify_exports(targets: &Fragment, files: &[ExportFile]) -> Result<(), GenerateError> {
    let mut included = Vec::new();
    required_includes(&targets.directives, &mut included);

    for file in included {
        if !files.iter().any(|f| f.file_name == file) {
            return Err(GenerateError::MissingExportArtifact {
                file: file.to_string(),
            });
        }
    }

    Ok(())
}

fn required_includes<'a>(directives: &'a [Directive], out: &mut Vec<&'a str>) {
    for directive in directives {
        match directive {
            Directive::Include { file, optional: false } => out.push(file),
            Directive::IfComponent { body, .. } | Directive::IfPathExists { body, .. } => {
                required_includes(body, out)
            }
            Directive::DefineIfAbsent(guard) => required_includes(&guard.commands, out),
            _ => {}
        }
    }
}
