use jn_address::Address;
use jn_core::{Config, Mode, PluginMeta, Role};
use jn_registry::Registry;

use crate::error::ResolveError;
use crate::resolved::ResolvedAddress;

/// Bind `address` + `mode` to a plugin and merged config (spec.md §4.3).
///
/// Dispatches in the order the spec lays out: an explicit format override
/// wins outright (step 1), then protocol scheme (step 2), then profile
/// reference (step 3), then bare plugin reference (step 4), and only then
/// does a file/glob/stdio address fall through to regex matching against
/// the registry (step 5). Every path converges on step 6's mode check.
pub fn resolve(address: &Address, mode: Mode, registry: &Registry) -> Result<ResolvedAddress, ResolveError> {
    let (plugin, profile_defaults, effective_target) = if let Some(fmt) = &address.format_override {
        let plugin = registry
            .find_by_name(fmt)
            .ok_or_else(|| ResolveError::PluginNotFound(fmt.clone()))?;
        (plugin.clone(), None, effective_path(address))
    } else if address.kind == jn_address::Kind::Protocol {
        let scheme = address.base.split("://").next().unwrap_or(&address.base);
        let plugin = registry
            .find_protocol(scheme)
            .ok_or_else(|| ResolveError::ProtocolUnsupported(scheme.to_string()))?;
        (plugin.clone(), None, effective_path(address))
    } else if address.kind == jn_address::Kind::Profile {
        resolve_profile(address, registry)?
    } else if address.kind == jn_address::Kind::Plugin {
        let name = address.base.trim_start_matches('@');
        let plugin = registry
            .find_by_name(name)
            .ok_or_else(|| ResolveError::PluginNotFound(name.to_string()))?;
        (plugin.clone(), None, effective_path(address))
    } else {
        let plugin = registry.find_for_address(&address.base, mode)?;
        (plugin.clone(), None, effective_path(address))
    };

    if !plugin.supports_mode(mode) {
        return Err(ResolveError::ModeUnsupported {
            plugin: plugin.name.clone(),
            mode: mode.to_string(),
        });
    }

    let config = build_config(&plugin, profile_defaults.as_ref(), address);

    Ok(ResolvedAddress {
        address: address.clone(),
        plugin,
        config,
        effective_target,
    })
}

/// Rebuild the on-disk/wire path the plugin should actually read or write:
/// `address.base` with any stripped compression suffix reattached (spec.md
/// §4.1 strips `.gz`/`.bz2`/`.xz` from `base` for classification purposes,
/// but the plugin still needs the real path to open).
fn effective_path(address: &Address) -> String {
    match &address.compression {
        Some(suffix) => format!("{}.{}", address.base, suffix),
        None => address.base.clone(),
    }
}

/// Step 3: `@namespace[/component]` profile resolution (spec.md §4.3, §6.5).
fn resolve_profile(
    address: &Address,
    registry: &Registry,
) -> Result<(PluginMeta, Option<Config>, String), ResolveError> {
    let body = address.base.trim_start_matches('@');
    let (namespace, component) = match body.split_once('/') {
        Some((ns, comp)) => (ns, Some(comp)),
        None => (body, None),
    };

    // The on-disk layout keys profiles by plugin role
    // (`profiles/<role>/<namespace>/...`); the resolver doesn't know the
    // role ahead of time, so it probes every role and takes the first
    // namespace that actually exists on disk.
    let mut last_err = None;
    for role in [Role::Protocol, Role::Format, Role::Filter, Role::Display, Role::Shell] {
        match jn_core::profile::load_profile(&role.to_string(), namespace, component) {
            Ok(descriptor) => {
                let plugin_name = if descriptor.meta.kind.is_empty() {
                    namespace
                } else {
                    descriptor.meta.kind.as_str()
                };
                let plugin = registry.find_by_name(plugin_name).ok_or_else(|| {
                    ResolveError::ProfileMissing(
                        namespace.to_string(),
                        format!("no plugin named '{plugin_name}' backs this profile's type"),
                    )
                })?;

                let mut defaults = jn_core::profile::defaults_to_config(&descriptor.meta.defaults);
                if let Some(component_def) = &descriptor.component_def {
                    defaults.merge(&jn_core::profile::defaults_to_config(&component_def.defaults));
                }

                let effective_target = rewrite_target(&descriptor.meta, component, address);

                return Ok((plugin.clone(), Some(defaults), effective_target));
            }
            Err(jn_core::ProfileError::NamespaceMissing(_)) => continue,
            Err(other) => {
                last_err = Some(other.to_string());
            }
        }
    }

    Err(ResolveError::ProfileMissing(
        namespace.to_string(),
        last_err.unwrap_or_else(|| "no matching namespace or component in any scope".to_string()),
    ))
}

/// Rewrite the effective URL/argument from a profile's `base_url`/`command`
/// plus the addressed component, falling back to the raw address base if
/// the profile declares neither (spec.md §4.3 step 3).
fn rewrite_target(meta: &jn_core::ProfileMeta, component: Option<&str>, address: &Address) -> String {
    if let Some(base_url) = &meta.base_url {
        return match component {
            Some(c) => format!("{}/{}", base_url.trim_end_matches('/'), c),
            None => base_url.clone(),
        };
    }
    if let Some(command) = &meta.command {
        return command.clone();
    }
    address.base.clone()
}

/// Merge order, later overrides earlier (spec.md §4.3): plugin defaults →
/// profile component defaults → `address.parameters`, then `${NAME}`
/// environment expansion over the merged strings.
fn build_config(plugin: &PluginMeta, profile_defaults: Option<&Config>, address: &Address) -> Config {
    let mut config = Config::new();
    for (k, v) in &plugin.defaults {
        config.set_text(k, v);
    }
    if let Some(profile_defaults) = profile_defaults {
        config.merge(profile_defaults);
    }
    for (k, v) in &address.parameters {
        config.set_text(k, v);
    }
    config.expand_env();
    config
}
