/// Generate the default TOML config content with comments.
pub(super) fn default_config_toml() -> &'static str {
    r##"# panelkit configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[registry]
# shards = 16              # 1-256
# session_ttl_secs = 0     # 0 disables idle reaping
# reap_interval_secs = 60  # 1-3600

[panels]
# default_capacity = 27    # 1-max_capacity
# max_capacity = 54        # 1-1024
# default_title = "Menu"
# suppress_default_action = true

[events]
# bus_capacity = 256       # 16-65536

[logging]
# level = "INFO"           # DEBUG, INFO, WARNING, ERROR
"##
}
