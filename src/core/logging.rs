use log::LevelFilter;

/// Logs everything the relayer emits at info and above; `RUST_LOG` overrides it. Calling
/// it again is a no-op.
pub fn setup_logging() {
    let _ = env_logger::builder()
        .filter_module("packet-relayer", LevelFilter::Info)
        .format_module_path(false)
        .parse_default_env()
        .try_init();
}
