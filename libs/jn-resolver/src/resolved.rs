use jn_address::Address;
use jn_core::{Config, PluginMeta};

/// Product of resolution (spec.md §3): the input address, the plugin
/// chosen to handle it, its fully merged configuration, and the effective
/// target (URL or path) to hand the plugin on its command line.
#[derive(Debug, Clone)]
pub struct ResolvedAddress {
    pub address: Address,
    pub plugin: PluginMeta,
    pub config: Config,
    pub effective_target: String,
}
