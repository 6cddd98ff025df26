//! Compiles a manifest into supervisor configuration.
use std::path::Path;

use toml::Value;
use tracing::{info, warn};

use crate::{
    document::{ConfigDocument, is_valid_key, is_valid_section_name, load_template},
    error::{Result, SupmanError},
    manifest::{Manifest, read_manifest, render_value},
    settings::Settings,
};

/// Namespace supervisor uses for program sections.
pub const PROGRAM_PREFIX: &str = "program:";

/// Section name for a service.
pub fn program_section_name(service: &str) -> String {
    format!("{PROGRAM_PREFIX}{service}")
}

/// Merges every manifest service into `template` as a `program:<service>` section.
///
/// Services are visited in manifest order and their settings are copied verbatim.
/// A program section that already exists in the template is replaced. Keys that
/// the config format cannot hold are rejected rather than silently altered.
pub fn compile(mut template: ConfigDocument, manifest: &Manifest) -> Result<ConfigDocument> {
    for (service, settings) in manifest.services()? {
        let Value::Table(settings) = settings else {
            return Err(SupmanError::InvalidService {
                service: service.clone(),
            });
        };

        let name = program_section_name(service);
        if !is_valid_section_name(&name) {
            return Err(SupmanError::InvalidServiceName {
                service: service.clone(),
            });
        }
        if let Some(key) = settings.keys().find(|key| !is_valid_key(key)) {
            return Err(SupmanError::InvalidSettingKey {
                service: service.clone(),
                key: key.clone(),
            });
        }

        let entries = settings
            .iter()
            .map(|(key, value)| (key.clone(), render_value(value)));
        if template.set_section(&name, entries) {
            warn!("Section [{name}] from the template was replaced by service '{service}'");
        }
    }

    Ok(template)
}

/// Reads `manifest_path` and the configured template, then writes the compiled
/// configuration to `settings.config_path`. Nothing is written if compilation fails.
pub fn init(settings: &Settings, manifest_path: &Path) -> Result<ConfigDocument> {
    let manifest = read_manifest(manifest_path)?;
    let template = load_template(&settings.template_path)?;
    let compiled = compile(template, &manifest)?;
    compiled.write(&settings.config_path)?;
    info!(
        "Wrote {} ({} services)",
        settings.config_path.display(),
        manifest.services()?.len()
    );
    Ok(compiled)
}
