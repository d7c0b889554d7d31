use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static TUI_MODE: AtomicBool = AtomicBool::new(false);

/// Initialize logging for headless (console) use. TUI entry points call
/// `tui_logger::init_logger` directly instead; this path forwards every
/// record to tui-logger through a Drain so a later switch to the TUI
/// still has the backlog.
pub fn init_logger() {
    if TUI_MODE.load(Ordering::Relaxed) {
        tui_logger::init_logger(log::LevelFilter::Debug).ok();
        tui_logger::set_default_level(log::LevelFilter::Debug);
    } else {
        let drain = tui_logger::Drain::new();
        env_logger::Builder::default()
            .filter_level(log::LevelFilter::Info)
            .format(move |buf, record| {
                drain.log(record);

                if !TUI_MODE.load(Ordering::Relaxed) {
                    let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
                    writeln!(
                        buf,
                        "[{timestamp}] {}: {}",
                        record.level(),
                        record.args()
                    )
                } else {
                    Ok(())
                }
            })
            .init();
    }

    log::debug!("Logger initialized");
}

pub fn switch_to_tui_logging() {
    TUI_MODE.store(true, Ordering::Relaxed);
}
