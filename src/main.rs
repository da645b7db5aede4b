use gtk4::glib;

static GLIB_LOGGER: glib::GlibLogger = glib::GlibLogger::new(
    glib::GlibLoggerFormat::Plain,
    glib::GlibLoggerDomain::CrateTarget,
);

fn main() -> glib::ExitCode {
    if log::set_logger(&GLIB_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }
    pairs::ui::run()
}
